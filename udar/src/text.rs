//! ランダムアクセス可能なテキスト。
//!
//! [`Text`]は、文字単位でインデックス付けと検索ができる文字列の抽象です。
//! 実装として以下を提供します:
//!
//! - [`StringText`]: メモリ上に全体を持つテキスト
//! - [`PagedText`]: ストリームからページ単位で読み込むテキスト
//!
//! オフセットと長さはすべて文字（Unicodeスカラー値）単位です。
//!
//! # 検索範囲
//!
//! 前方検索は`[start, start + count)`を、後方検索は`start`を右端として
//! `[start + 1 - count, start]`を`start`から左へ走査します。
//! 範囲がテキストからはみ出す場合は[`UdarError::OutOfRange`]を返します。
pub mod navigation;
pub mod paged;
pub mod segment;
pub mod string_text;

use crate::errors::{Result, UdarError};

pub use crate::text::paged::{Encoding, PagedText, PagedTextOptions};
pub use crate::text::segment::Segment;
pub use crate::text::string_text::StringText;

/// 部分文字列検索での文字の比較方法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Comparison {
    /// 文字をそのまま比較します。
    #[default]
    Ordinal,
    /// 小文字に変換してから比較します。
    IgnoreCase,
}

impl Comparison {
    #[inline]
    fn chars_eq(self, a: char, b: char) -> bool {
        a == b || (self == Self::IgnoreCase && a.to_lowercase().eq(b.to_lowercase()))
    }

    fn slice_eq(self, hay: &[char], needle: &[char]) -> bool {
        hay.len() == needle.len() && hay.iter().zip(needle).all(|(&a, &b)| self.chars_eq(a, b))
    }
}

/// インデックス付けと検索ができる文字列。
///
/// 読み取りでもページキャッシュを更新する実装があるため、すべての読み取りは`&mut self`を取ります。
pub trait Text {
    /// 文字数を返します。
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 指定位置の文字を返します。
    ///
    /// # エラー
    ///
    /// `offset`が範囲外の場合に[`UdarError::OutOfRange`]を返します。
    fn char_at(&mut self, offset: usize) -> Result<char>;

    /// `[offset, offset + length)`の部分文字列を返します。
    ///
    /// # エラー
    ///
    /// 範囲がテキストからはみ出す場合に[`UdarError::OutOfRange`]を返します。
    fn substring(&mut self, offset: usize, length: usize) -> Result<String>;

    /// 区間の部分文字列を返します。
    ///
    /// # エラー
    ///
    /// 区間が負の値を含む場合、またはテキストからはみ出す場合にエラーを返します。
    fn substring_segment(&mut self, segment: Segment) -> Result<String> {
        let range = segment.range().ok_or_else(|| {
            UdarError::invalid_argument("segment", format!("{segment} is not a text range"))
        })?;
        self.substring(range.start, range.len())
    }

    /// 前方の検索範囲で`c`が最初に現れる位置を返します。
    fn index_of(&mut self, c: char, start: usize, count: usize) -> Result<Option<usize>>;

    /// 前方の検索範囲で`any_of`のいずれかが最初に現れる位置を返します。
    fn index_of_any(&mut self, any_of: &[char], start: usize, count: usize)
    -> Result<Option<usize>>;

    /// 前方の検索範囲に完全に収まる`needle`の最初の出現位置を返します。
    fn index_of_str(
        &mut self,
        needle: &str,
        start: usize,
        count: usize,
        comparison: Comparison,
    ) -> Result<Option<usize>>;

    /// 後方の検索範囲で`c`が最後に現れる位置を返します。
    fn last_index_of(&mut self, c: char, start: usize, count: usize) -> Result<Option<usize>>;

    /// 後方の検索範囲で`any_of`のいずれかが最後に現れる位置を返します。
    fn last_index_of_any(
        &mut self,
        any_of: &[char],
        start: usize,
        count: usize,
    ) -> Result<Option<usize>>;

    /// 後方の検索範囲に完全に収まる`needle`の最後の出現位置を返します。
    fn last_index_of_str(
        &mut self,
        needle: &str,
        start: usize,
        count: usize,
        comparison: Comparison,
    ) -> Result<Option<usize>>;

    /// 先頭から1文字ずつ読むリーダーを作成します。
    fn create_reader(&mut self) -> TextReader<'_>;
}

/// [`Text`]を先頭から順に読むイテレーター
pub struct TextReader<'a> {
    text: &'a mut dyn Text,
    pos: usize,
}

impl<'a> TextReader<'a> {
    pub fn new(text: &'a mut dyn Text) -> Self {
        Self { text, pos: 0 }
    }

    /// 残りのすべての文字を読み込みます。
    pub fn read_to_string(&mut self) -> Result<String> {
        let len = self.text.len();
        let s = self.text.substring(self.pos, len.saturating_sub(self.pos))?;
        self.pos = len;
        Ok(s)
    }
}

impl Iterator for TextReader<'_> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }
        let c = self.text.char_at(self.pos);
        self.pos += 1;
        Some(c)
    }
}

/// 前方の検索範囲`[start, start + count)`がテキストに収まることを確認します。
pub(crate) fn check_forward(len: usize, start: usize, count: usize) -> Result<()> {
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(UdarError::out_of_range(
            "text",
            start.saturating_add(count),
            len,
            format!("forward window start={start} count={count}"),
        )),
    }
}

/// 後方の検索範囲`[start + 1 - count, start]`がテキストに収まることを確認します。
pub(crate) fn check_backward(len: usize, start: usize, count: usize) -> Result<()> {
    if count == 0 && start <= len {
        return Ok(());
    }
    if start < len && count <= start + 1 {
        Ok(())
    } else {
        Err(UdarError::out_of_range(
            "text",
            start,
            len,
            format!("backward window start={start} count={count}"),
        ))
    }
}

// Primitives over a char slice. `start`/`count` are already validated against `chars`.

pub(crate) fn find_char<P>(chars: &[char], start: usize, count: usize, pred: P) -> Option<usize>
where
    P: Fn(char) -> bool,
{
    chars[start..start + count]
        .iter()
        .position(|&c| pred(c))
        .map(|i| i + start)
}

pub(crate) fn rfind_char<P>(chars: &[char], start: usize, count: usize, pred: P) -> Option<usize>
where
    P: Fn(char) -> bool,
{
    if count == 0 {
        return None;
    }
    let low = start + 1 - count;
    chars[low..=start]
        .iter()
        .rposition(|&c| pred(c))
        .map(|i| i + low)
}

pub(crate) fn find_str(
    chars: &[char],
    start: usize,
    count: usize,
    needle: &[char],
    comparison: Comparison,
) -> Option<usize> {
    if needle.is_empty() {
        return Some(start);
    }
    if needle.len() > count {
        return None;
    }
    chars[start..start + count]
        .windows(needle.len())
        .position(|w| comparison.slice_eq(w, needle))
        .map(|i| i + start)
}

pub(crate) fn rfind_str(
    chars: &[char],
    start: usize,
    count: usize,
    needle: &[char],
    comparison: Comparison,
) -> Option<usize> {
    if needle.is_empty() {
        return Some(start);
    }
    if needle.len() > count {
        return None;
    }
    let low = start + 1 - count;
    chars[low..=start]
        .windows(needle.len())
        .rposition(|w| comparison.slice_eq(w, needle))
        .map(|i| i + low)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_windows() {
        assert!(check_forward(5, 0, 5).is_ok());
        assert!(check_forward(5, 5, 0).is_ok());
        assert!(check_forward(5, 3, 3).is_err());
        assert!(check_backward(5, 4, 5).is_ok());
        assert!(check_backward(5, 4, 6).is_err());
        assert!(check_backward(5, 5, 1).is_err());
        assert!(check_backward(5, 5, 0).is_ok());
    }

    #[test]
    fn test_find_char() {
        let c = chars("abcabc");
        assert_eq!(find_char(&c, 1, 5, |x| x == 'a'), Some(3));
        assert_eq!(find_char(&c, 1, 2, |x| x == 'a'), None);
        assert_eq!(rfind_char(&c, 5, 6, |x| x == 'a'), Some(3));
        assert_eq!(rfind_char(&c, 2, 3, |x| x == 'a'), Some(0));
        assert_eq!(rfind_char(&c, 2, 2, |x| x == 'a'), None);
    }

    #[test]
    fn test_find_str() {
        let c = chars("Замок замок");
        let n = chars("замок");
        assert_eq!(find_str(&c, 0, 11, &n, Comparison::Ordinal), Some(6));
        assert_eq!(find_str(&c, 0, 11, &n, Comparison::IgnoreCase), Some(0));
        assert_eq!(find_str(&c, 0, 10, &n, Comparison::Ordinal), None);
        assert_eq!(rfind_str(&c, 10, 11, &n, Comparison::IgnoreCase), Some(6));
        assert_eq!(rfind_str(&c, 9, 10, &n, Comparison::IgnoreCase), Some(0));
        assert_eq!(rfind_str(&c, 4, 5, &n, Comparison::IgnoreCase), Some(0));
        assert_eq!(rfind_str(&c, 4, 4, &n, Comparison::IgnoreCase), None);
    }
}
