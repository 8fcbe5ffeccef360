//! ストリームからページ単位で読み込む[`Text`]の実装。
//!
//! 全体をメモリに載せずに大きなテキストを走査するためのものです。
//! ページは固定文字数で区切られ、最大ページ数を超えると最も古く読み込んだページから破棄されます。
//!
//! 可変長エンコーディング（UTF-8）の場合、文字数を知るために構築時にストリーム全体を一度走査します。
//! 固定長エンコーディングの場合はバイト長から文字数を計算します。

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::errors::{Result, UdarError};
use crate::text::{
    Comparison, Text, TextReader, check_backward, check_forward, find_char, find_str, rfind_char,
    rfind_str,
};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// ストリームの文字エンコーディング
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// 可変長。先頭のBOMは読み飛ばされます。
    #[default]
    Utf8,
    /// 1バイト固定長。
    Latin1,
    /// 2バイト固定長。サロゲートは1単位ずつU+FFFDとして読み込まれます。
    Utf16Le,
}

impl Encoding {
    /// 固定長エンコーディングの場合、1文字あたりのバイト数を返します。
    #[inline(always)]
    pub const fn char_width(self) -> Option<usize> {
        match self {
            Self::Utf8 => None,
            Self::Latin1 => Some(1),
            Self::Utf16Le => Some(2),
        }
    }
}

/// [`PagedText`]の構築パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagedTextOptions {
    page_size: usize,
    max_pages: usize,
    encoding: Encoding,
}

impl Default for PagedTextOptions {
    fn default() -> Self {
        Self {
            page_size: 4096,
            max_pages: 4,
            encoding: Encoding::Utf8,
        }
    }
}

impl PagedTextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1ページの文字数を設定します。
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// 同時にキャッシュするページ数の上限を設定します（2以上）。
    pub const fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub const fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(UdarError::invalid_argument(
                "page_size",
                "page size must be at least 1",
            ));
        }
        if self.max_pages < 2 {
            return Err(UdarError::invalid_argument(
                "max_pages",
                "at least 2 pages must be cached",
            ));
        }
        Ok(())
    }
}

struct Page {
    start: usize,
    chars: Vec<char>,
}

impl Page {
    #[inline(always)]
    fn end(&self) -> usize {
        self.start + self.chars.len()
    }

    #[inline(always)]
    fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end()
    }
}

/// ページ単位で読み込むテキスト。
///
/// 読み取り位置より前のページが必要になった場合はストリームを先頭まで巻き戻し、
/// それ以外は現在位置から目的のページまで読み飛ばします。
///
/// # 例
///
/// ```
/// use std::io::Cursor;
/// use udar::text::{PagedText, PagedTextOptions, Text};
///
/// let options = PagedTextOptions::new().page_size(4).max_pages(2);
/// let mut text = PagedText::new(Cursor::new("Мама мыла раму"), options)?;
/// assert_eq!(text.len(), 14);
/// assert_eq!(text.substring(5, 4)?, "мыла");
/// # Ok::<(), udar::errors::UdarError>(())
/// ```
pub struct PagedText<R> {
    reader: BufReader<R>,
    options: PagedTextOptions,
    data_start: u64,
    /// Number of chars consumed from `reader`.
    position: usize,
    len: usize,
    pages: VecDeque<Page>,
}

impl PagedText<File> {
    /// ファイルを開いてテキストを作成します。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合、またはパラメータが無効な場合にエラーを返します。
    pub fn from_path<P: AsRef<Path>>(path: P, options: PagedTextOptions) -> Result<Self> {
        Self::new(File::open(path)?, options)
    }
}

impl<R> PagedText<R>
where
    R: Read + Seek,
{
    /// ストリームからテキストを作成します。
    ///
    /// # 引数
    ///
    /// * `reader` - 読み込み元のストリーム
    /// * `options` - ページサイズ、キャッシュ数、エンコーディング
    ///
    /// # エラー
    ///
    /// パラメータが無効な場合は[`UdarError::InvalidArgument`]を、
    /// ストリームの読み込みに失敗した場合はI/Oエラーを返します。
    pub fn new(reader: R, options: PagedTextOptions) -> Result<Self> {
        options.validate()?;
        let mut reader = BufReader::new(reader);
        let total = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let mut data_start = 0;
        if options.encoding == Encoding::Utf8 {
            let mut head = Vec::with_capacity(UTF8_BOM.len());
            (&mut reader)
                .take(UTF8_BOM.len() as u64)
                .read_to_end(&mut head)?;
            if head == UTF8_BOM {
                data_start = UTF8_BOM.len() as u64;
            }
        }
        reader.seek(SeekFrom::Start(data_start))?;

        let len = match options.encoding.char_width() {
            Some(width) => usize::try_from((total - data_start) / width as u64)?,
            None => {
                let len = count_utf8_chars(&mut reader)?;
                reader.seek(SeekFrom::Start(data_start))?;
                len
            }
        };
        log::debug!(
            "[udar] paged text: {} chars, page size {}, {} pages",
            len,
            options.page_size,
            options.max_pages
        );

        Ok(Self {
            reader,
            options,
            data_start,
            position: 0,
            len,
            pages: VecDeque::with_capacity(options.max_pages + 1),
        })
    }

    /// 現在キャッシュされているページ数を返します。
    #[inline(always)]
    pub fn num_cached_pages(&self) -> usize {
        self.pages.len()
    }

    #[inline(always)]
    pub fn options(&self) -> &PagedTextOptions {
        &self.options
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        let Some(&b) = buf.first() else {
            return Ok(None);
        };
        self.reader.consume(1);
        Ok(Some(b))
    }

    fn read_char(&mut self) -> Result<Option<char>> {
        let Some(lead) = self.read_byte()? else {
            return Ok(None);
        };
        match self.options.encoding {
            Encoding::Latin1 => Ok(Some(char::from(lead))),
            Encoding::Utf16Le => {
                let Some(high) = self.read_byte()? else {
                    return Err(UdarError::invalid_format(
                        "text",
                        "truncated UTF-16 code unit",
                    ));
                };
                let unit = u16::from_le_bytes([lead, high]);
                Ok(Some(
                    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER),
                ))
            }
            Encoding::Utf8 => {
                let width = match lead {
                    0x00..=0x7F => 1,
                    0xC0..=0xDF => 2,
                    0xE0..=0xEF => 3,
                    0xF0..=0xF7 => 4,
                    _ => {
                        return Err(UdarError::invalid_format(
                            "text",
                            format!("invalid UTF-8 lead byte 0x{lead:02X}"),
                        ));
                    }
                };
                let mut buf = [lead, 0, 0, 0];
                self.reader.read_exact(&mut buf[1..width])?;
                let s = std::str::from_utf8(&buf[..width])?;
                s.chars()
                    .next()
                    .map(Some)
                    .ok_or_else(|| UdarError::invalid_format("text", "empty UTF-8 sequence"))
            }
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(self.data_start))?;
        self.position = 0;
        Ok(())
    }

    /// `offset`を含むページを読み込み、キャッシュ内の位置を返します。
    fn load_page(&mut self, offset: usize) -> Result<usize> {
        let page_size = self.options.page_size;
        let from = offset / page_size * page_size;
        if from < self.position {
            log::trace!("[udar] rewinding text stream for page {}", from);
            self.rewind()?;
        }
        if let Some(width) = self.options.encoding.char_width() {
            if from > self.position {
                let byte_offset = u64::try_from(from * width)?;
                self.reader
                    .seek(SeekFrom::Start(self.data_start + byte_offset))?;
                self.position = from;
            }
        } else {
            while self.position < from {
                if self.read_char()?.is_none() {
                    return Err(UdarError::invalid_state(
                        "unexpected end of text stream",
                        format!("skipping to char {from}"),
                    ));
                }
                self.position += 1;
            }
        }

        let mut chars = Vec::with_capacity(page_size.min(self.len - from));
        while chars.len() < page_size {
            match self.read_char()? {
                Some(c) => chars.push(c),
                None => break,
            }
        }
        if chars.is_empty() {
            return Err(UdarError::invalid_operation(format!(
                "end of text stream reached while loading the page at {from}"
            )));
        }
        self.position += chars.len();

        self.pages.push_back(Page { start: from, chars });
        if self.pages.len() > self.options.max_pages {
            self.pages.pop_front();
        }
        Ok(self.pages.len() - 1)
    }

    /// `offset`を含むページのキャッシュ内の位置を返します。無ければ読み込みます。
    fn page_index(&mut self, offset: usize) -> Result<usize> {
        if offset >= self.len {
            return Err(UdarError::out_of_range("text", offset, self.len, "page"));
        }
        match self.pages.iter().position(|p| p.contains(offset)) {
            Some(i) => Ok(i),
            None => self.load_page(offset),
        }
    }

    fn collect_chars(&mut self, start: usize, count: usize) -> Result<Vec<char>> {
        let mut out = Vec::with_capacity(count);
        self.look_forward(start, count, 0, |chars, local_start, local_count| {
            out.extend_from_slice(&chars[local_start..local_start + local_count]);
            None
        })?;
        Ok(out)
    }

    /// 前方の検索範囲をページごとの局所範囲に分けて`f`を呼び出します。
    ///
    /// `f`はページの文字列と局所範囲を受け取り、見つかった局所位置を返します。
    /// `extend`が正の場合、ページの文字列に続くページの先頭`extend`文字（検索範囲内に限る）を連結し、
    /// 局所範囲もその分だけ延長します。
    fn look_forward<F>(
        &mut self,
        start: usize,
        count: usize,
        extend: usize,
        mut f: F,
    ) -> Result<Option<usize>>
    where
        F: FnMut(&[char], usize, usize) -> Option<usize>,
    {
        check_forward(self.len, start, count)?;
        let end = start + count;
        let mut pos = start;
        while pos < end {
            let idx = self.page_index(pos)?;
            let page_start = self.pages[idx].start;
            let page_end = self.pages[idx].end();
            let local_start = pos - page_start;
            let local_count = (page_end - pos).min(end - pos);
            let tail = if page_end < end {
                extend.min(end - page_end)
            } else {
                0
            };
            let found = if tail > 0 {
                let mut buf = self.pages[idx].chars.clone();
                buf.extend(self.collect_chars(page_end, tail)?);
                f(&buf, local_start, local_count + tail)
            } else {
                f(&self.pages[idx].chars, local_start, local_count)
            };
            if let Some(i) = found {
                return Ok(Some(page_start + i));
            }
            pos += local_count;
        }
        Ok(None)
    }

    /// 後方の検索範囲をページごとの局所範囲に分けて、右のページから順に`f`を呼び出します。
    ///
    /// `extend`の扱いは[`Self::look_forward`]と同じで、右隣のページの文字を連結します。
    fn look_backward<F>(
        &mut self,
        start: usize,
        count: usize,
        extend: usize,
        mut f: F,
    ) -> Result<Option<usize>>
    where
        F: FnMut(&[char], usize, usize) -> Option<usize>,
    {
        check_backward(self.len, start, count)?;
        if count == 0 {
            return Ok(None);
        }
        let low = start + 1 - count;
        let mut pos = start;
        loop {
            let idx = self.page_index(pos)?;
            let page_start = self.pages[idx].start;
            let local_start = pos - page_start;
            let local_count = (local_start + 1).min(pos + 1 - low);
            let tail = extend.min(start - pos);
            let found = if tail > 0 {
                let mut buf = self.pages[idx].chars[..=local_start].to_vec();
                buf.extend(self.collect_chars(pos + 1, tail)?);
                f(&buf, local_start + tail, local_count + tail)
            } else {
                f(&self.pages[idx].chars, local_start, local_count)
            };
            if let Some(i) = found {
                return Ok(Some(page_start + i));
            }
            if pos + 1 - local_count == low {
                return Ok(None);
            }
            pos -= local_count;
        }
    }

    fn check_needle(&self, needle: &[char]) -> Result<()> {
        if needle.len() > self.options.page_size {
            return Err(UdarError::invalid_operation(format!(
                "search text of {} chars is longer than the page size {}",
                needle.len(),
                self.options.page_size
            )));
        }
        Ok(())
    }
}

impl<R> Text for PagedText<R>
where
    R: Read + Seek,
{
    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }

    fn char_at(&mut self, offset: usize) -> Result<char> {
        let idx = self.page_index(offset)?;
        let page = &self.pages[idx];
        Ok(page.chars[offset - page.start])
    }

    fn substring(&mut self, offset: usize, length: usize) -> Result<String> {
        let mut s = String::with_capacity(length);
        self.look_forward(offset, length, 0, |chars, local_start, local_count| {
            s.extend(&chars[local_start..local_start + local_count]);
            None
        })?;
        Ok(s)
    }

    fn index_of(&mut self, c: char, start: usize, count: usize) -> Result<Option<usize>> {
        self.look_forward(start, count, 0, |chars, ls, lc| {
            find_char(chars, ls, lc, |x| x == c)
        })
    }

    fn index_of_any(
        &mut self,
        any_of: &[char],
        start: usize,
        count: usize,
    ) -> Result<Option<usize>> {
        self.look_forward(start, count, 0, |chars, ls, lc| {
            find_char(chars, ls, lc, |x| any_of.contains(&x))
        })
    }

    fn index_of_str(
        &mut self,
        needle: &str,
        start: usize,
        count: usize,
        comparison: Comparison,
    ) -> Result<Option<usize>> {
        let needle: Vec<char> = needle.chars().collect();
        self.check_needle(&needle)?;
        if needle.is_empty() {
            check_forward(self.len, start, count)?;
            return Ok(Some(start));
        }
        self.look_forward(start, count, needle.len() - 1, |chars, ls, lc| {
            find_str(chars, ls, lc, &needle, comparison)
        })
    }

    fn last_index_of(&mut self, c: char, start: usize, count: usize) -> Result<Option<usize>> {
        self.look_backward(start, count, 0, |chars, ls, lc| {
            rfind_char(chars, ls, lc, |x| x == c)
        })
    }

    fn last_index_of_any(
        &mut self,
        any_of: &[char],
        start: usize,
        count: usize,
    ) -> Result<Option<usize>> {
        self.look_backward(start, count, 0, |chars, ls, lc| {
            rfind_char(chars, ls, lc, |x| any_of.contains(&x))
        })
    }

    fn last_index_of_str(
        &mut self,
        needle: &str,
        start: usize,
        count: usize,
        comparison: Comparison,
    ) -> Result<Option<usize>> {
        let needle: Vec<char> = needle.chars().collect();
        self.check_needle(&needle)?;
        if needle.is_empty() {
            check_backward(self.len, start, count)?;
            return Ok(Some(start));
        }
        self.look_backward(start, count, needle.len() - 1, |chars, ls, lc| {
            rfind_str(chars, ls, lc, &needle, comparison)
        })
    }

    fn create_reader(&mut self) -> TextReader<'_> {
        TextReader::new(self)
    }
}

fn count_utf8_chars<R: BufRead>(reader: &mut R) -> Result<usize> {
    let mut count = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(count);
        }
        count += buf.iter().filter(|&&b| b & 0xC0 != 0x80).count();
        let n = buf.len();
        reader.consume(n);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn paged(s: &str, page_size: usize, max_pages: usize) -> PagedText<Cursor<Vec<u8>>> {
        let options = PagedTextOptions::new()
            .page_size(page_size)
            .max_pages(max_pages);
        PagedText::new(Cursor::new(s.as_bytes().to_vec()), options).unwrap()
    }

    #[test]
    fn test_invalid_options() {
        let zero = PagedTextOptions::new().page_size(0);
        assert!(matches!(
            PagedText::new(Cursor::new(b"abc".to_vec()), zero),
            Err(UdarError::InvalidArgument(_))
        ));
        let one = PagedTextOptions::new().max_pages(1);
        assert!(matches!(
            PagedText::new(Cursor::new(b"abc".to_vec()), one),
            Err(UdarError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_char_at_rewind() {
        let mut text = paged("абвгдеёжзи", 3, 2);
        assert_eq!(text.len(), 10);
        assert_eq!(text.char_at(9).unwrap(), 'и');
        assert_eq!(text.char_at(0).unwrap(), 'а');
        assert_eq!(text.char_at(4).unwrap(), 'д');
        assert_eq!(text.char_at(7).unwrap(), 'ж');
        assert!(text.num_cached_pages() <= 2);
        assert!(text.char_at(10).is_err());
    }

    #[test]
    fn test_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("дом".as_bytes());
        let mut text = PagedText::new(Cursor::new(bytes), PagedTextOptions::new()).unwrap();
        assert_eq!(text.len(), 3);
        assert_eq!(text.substring(0, 3).unwrap(), "дом");
        assert_eq!(text.char_at(0).unwrap(), 'д');
    }

    #[test]
    fn test_fixed_width() {
        let options = PagedTextOptions::new()
            .page_size(2)
            .encoding(Encoding::Latin1);
        let mut text = PagedText::new(Cursor::new(b"hello".to_vec()), options).unwrap();
        assert_eq!(text.len(), 5);
        assert_eq!(text.char_at(4).unwrap(), 'o');
        assert_eq!(text.substring(1, 3).unwrap(), "ell");

        let bytes: Vec<u8> = "мир".encode_utf16().flat_map(u16::to_le_bytes).collect();
        let options = PagedTextOptions::new()
            .page_size(2)
            .encoding(Encoding::Utf16Le);
        let mut text = PagedText::new(Cursor::new(bytes), options).unwrap();
        assert_eq!(text.len(), 3);
        assert_eq!(text.substring(0, 3).unwrap(), "мир");
        assert_eq!(text.char_at(1).unwrap(), 'и');
    }

    #[test]
    fn test_search_across_pages() {
        let mut text = paged("abcdefghij", 3, 2);
        assert_eq!(text.index_of('h', 0, 10).unwrap(), Some(7));
        assert_eq!(text.index_of('h', 0, 7).unwrap(), None);
        assert_eq!(text.last_index_of('b', 9, 10).unwrap(), Some(1));
        assert_eq!(text.last_index_of('b', 9, 8).unwrap(), None);
        assert_eq!(text.index_of_any(&['x', 'e'], 2, 8).unwrap(), Some(4));
        assert_eq!(text.last_index_of_any(&['a', 'e'], 8, 9).unwrap(), Some(4));
    }

    #[test]
    fn test_substring_straddles_page() {
        let mut text = paged("abcdefghij", 3, 2);
        assert_eq!(
            text.index_of_str("cde", 0, 10, Comparison::Ordinal).unwrap(),
            Some(2)
        );
        assert_eq!(
            text.index_of_str("CDE", 0, 4, Comparison::IgnoreCase).unwrap(),
            None
        );
        assert_eq!(
            text.last_index_of_str("fg", 9, 10, Comparison::Ordinal).unwrap(),
            Some(5)
        );
        assert_eq!(
            text.last_index_of_str("fg", 5, 6, Comparison::Ordinal).unwrap(),
            None
        );
        assert!(text.num_cached_pages() <= 2);
    }

    #[test]
    fn test_needle_longer_than_page() {
        let mut text = paged("abcdefghij", 3, 2);
        assert!(matches!(
            text.index_of_str("abcd", 0, 10, Comparison::Ordinal),
            Err(UdarError::InvalidOperation(_))
        ));
        assert!(matches!(
            text.last_index_of_str("abcd", 9, 10, Comparison::Ordinal),
            Err(UdarError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_reader() {
        let mut text = paged("пять слов", 2, 2);
        assert_eq!(text.create_reader().read_to_string().unwrap(), "пять слов");
    }
}
