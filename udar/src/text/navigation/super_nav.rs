use crate::errors::Result;
use crate::text::Segment;
use crate::text::Text;
use crate::text::navigation::{UnitNavigator, text_len};

/// 単位の内容に区切りを含めるかどうか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// 内容は2つの区切りの間です（単語、行）。
    ExcludeDelimiter,
    /// 内容は閉じる側の区切りまで含みます（文）。
    IncludeDelimiter,
}

/// 区切りを探すナビゲーターを包み、単位の内容を返すナビゲーター。
///
/// `next`は現在の単位を閉じる区切りの後ろから次の区切りまでを、
/// `prev`はその鏡像を返します。内容が空の場合は[`Segment::INVALID`]を返します。
pub struct SuperNavigator {
    base: Box<dyn UnitNavigator>,
    mode: ContentMode,
}

impl SuperNavigator {
    pub fn new<N>(base: N, mode: ContentMode) -> Self
    where
        N: UnitNavigator + 'static,
    {
        Self {
            base: Box::new(base),
            mode,
        }
    }

    #[inline(always)]
    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    #[inline(always)]
    fn content_end(&self, delimiter: Segment) -> isize {
        match self.mode {
            ContentMode::ExcludeDelimiter => delimiter.offset(),
            ContentMode::IncludeDelimiter => delimiter.end_offset(),
        }
    }

    /// テキスト先頭から単位を順に返すカーソルを作成します。
    pub fn cursor(&self) -> UnitCursor<'_> {
        UnitCursor {
            nav: self,
            delimiter: None,
            finished: false,
        }
    }

    /// テキスト先頭からの単位のイテレーターを返します。
    ///
    /// [`UnitNavigator::next`]と異なり、空の単位（連続する区切りの間など）は読み飛ばされます。
    ///
    /// # 例
    ///
    /// ```
    /// use udar::text::{StringText, Text};
    /// use udar::text::navigation::{UnitKind, content_navigator};
    ///
    /// let mut text = StringText::new("  Мама, мыла раму!");
    /// let words = content_navigator(UnitKind::Word);
    /// let segments = words.units(&mut text).collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(segments.len(), 3);
    /// assert_eq!(text.substring_segment(segments[0])?, "Мама");
    /// # Ok::<(), udar::errors::UdarError>(())
    /// ```
    pub fn units<'a>(&'a self, text: &'a mut dyn Text) -> Units<'a> {
        Units {
            cursor: self.cursor(),
            text,
        }
    }
}

impl UnitNavigator for SuperNavigator {
    fn next(&self, text: &mut dyn Text, offset: isize) -> Result<Segment> {
        let len = text_len(text)?;
        if offset >= len - 1 {
            return Ok(Segment::INVALID);
        }
        let sep1 = self.base.next(text, offset)?;
        if sep1.is_invalid() {
            return Ok(Segment::INVALID);
        }
        let start = sep1.end_offset();
        let sep2 = self.base.next(text, start)?;
        let end = if sep2.is_invalid() {
            len
        } else {
            self.content_end(sep2)
        };
        if end - start <= 0 {
            return Ok(Segment::INVALID);
        }
        Ok(Segment::new(start, end - start))
    }

    fn prev(&self, text: &mut dyn Text, offset: isize) -> Result<Segment> {
        if offset <= 0 {
            return Ok(Segment::INVALID);
        }
        let sep1 = self.base.prev(text, offset)?;
        if sep1.offset() == -1 {
            return Ok(Segment::INVALID);
        }
        let sep2 = self.base.prev(text, sep1.offset())?;
        let begin = if sep2.offset() == -1 {
            0
        } else {
            sep2.end_offset()
        };
        let end = self.content_end(sep1);
        if end - begin <= 0 {
            return Ok(Segment::INVALID);
        }
        Ok(Segment::new(begin, end - begin))
    }
}

/// テキスト先頭から単位を順に返すカーソル。
///
/// テキストを借用しないため、同じテキスト上で複数のカーソルを交互に進められます。
pub struct UnitCursor<'a> {
    nav: &'a SuperNavigator,
    /// Delimiter closing the last returned unit. `None` before the first step.
    delimiter: Option<Segment>,
    finished: bool,
}

impl UnitCursor<'_> {
    /// 次の空でない単位を返します。テキストの終わりに達した場合は`None`を返します。
    ///
    /// # エラー
    ///
    /// テキストの読み込みに失敗した場合にエラーを返します。
    pub fn advance(&mut self, text: &mut dyn Text) -> Result<Option<Segment>> {
        if self.finished {
            return Ok(None);
        }
        let len = text_len(text)?;
        let mut sep1 = match self.delimiter {
            Some(delimiter) => delimiter,
            None => self.nav.base.next(text, -1)?,
        };
        loop {
            let start = sep1.end_offset();
            if sep1.is_invalid() || start >= len {
                self.finished = true;
                return Ok(None);
            }
            let sep2 = self.nav.base.next(text, start)?;
            let end = if sep2.is_invalid() {
                len
            } else {
                self.nav.content_end(sep2)
            };
            if sep2.is_invalid() || sep2.end_offset() <= start {
                self.finished = true;
            } else {
                self.delimiter = Some(sep2);
            }
            if end > start {
                return Ok(Some(Segment::new(start, end - start)));
            }
            if self.finished {
                return Ok(None);
            }
            sep1 = sep2;
        }
    }
}

/// [`SuperNavigator::units`]が返すイテレーター
pub struct Units<'a> {
    cursor: UnitCursor<'a>,
    text: &'a mut dyn Text,
}

impl Iterator for Units<'_> {
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.advance(&mut *self.text) {
            Ok(segment) => segment.map(Ok),
            Err(e) => {
                self.cursor.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::StringText;
    use crate::text::navigation::{
        LineNavigator, SentenceNavigator, UnitKind, WordNavigator, content_navigator,
    };

    fn texts(nav: &SuperNavigator, s: &str) -> Vec<String> {
        let mut text = StringText::new(s);
        let segments: Vec<Segment> = nav.units(&mut text).collect::<Result<_>>().unwrap();
        segments
            .into_iter()
            .map(|seg| text.substring_segment(seg).unwrap())
            .collect()
    }

    #[test]
    fn test_words() {
        let nav = SuperNavigator::new(WordNavigator, ContentMode::ExcludeDelimiter);
        let mut text = StringText::new("WORD1 WORD2");
        assert_eq!(nav.next(&mut text, -1).unwrap(), Segment::new(0, 5));
        assert_eq!(nav.next(&mut text, 0).unwrap(), Segment::new(6, 5));
        assert!(nav.next(&mut text, 6).unwrap().is_invalid());
        assert_eq!(nav.prev(&mut text, 11).unwrap(), Segment::new(0, 5));
        assert!(nav.prev(&mut text, 0).unwrap().is_invalid());
    }

    #[test]
    fn test_sentences() {
        let nav = SuperNavigator::new(SentenceNavigator::new(), ContentMode::IncludeDelimiter);
        let mut text = StringText::new("I. Came here.");
        assert_eq!(nav.next(&mut text, -1).unwrap(), Segment::new(0, 13));
        assert_eq!(nav.prev(&mut text, 13).unwrap(), Segment::new(0, 13));
    }

    #[test]
    fn test_leading_delimiter_stops_next() {
        let nav = content_navigator(UnitKind::Word);
        let mut text = StringText::new("  слово");
        assert!(nav.next(&mut text, -1).unwrap().is_invalid());
        assert_eq!(texts(&nav, "  слово"), vec!["слово"]);
    }

    #[test]
    fn test_units() {
        let words = content_navigator(UnitKind::Word);
        assert_eq!(
            texts(&words, "Он сказал: «Да!» 42"),
            vec!["Он", "сказал", "Да", "42"]
        );
        assert!(texts(&words, "").is_empty());
        assert!(texts(&words, " ,. ").is_empty());

        let lines = SuperNavigator::new(LineNavigator, ContentMode::ExcludeDelimiter);
        assert_eq!(texts(&lines, "A\n\nB\r\nC"), vec!["A", "B", "C"]);

        let sentences = content_navigator(UnitKind::Sentence);
        assert_eq!(
            texts(&sentences, "Раз. Два! Три"),
            vec!["Раз. ", "Два! ", "Три"]
        );
    }

    #[test]
    fn test_interleaved_cursors() {
        let words = content_navigator(UnitKind::Word);
        let sentences = content_navigator(UnitKind::Sentence);
        let mut text = StringText::new("Раз два. Три.");
        let mut w = words.cursor();
        let mut s = sentences.cursor();
        assert_eq!(s.advance(&mut text).unwrap(), Some(Segment::new(0, 9)));
        assert_eq!(w.advance(&mut text).unwrap(), Some(Segment::new(0, 3)));
        assert_eq!(w.advance(&mut text).unwrap(), Some(Segment::new(4, 3)));
        assert_eq!(w.advance(&mut text).unwrap(), Some(Segment::new(9, 3)));
        assert_eq!(s.advance(&mut text).unwrap(), Some(Segment::new(9, 4)));
        assert_eq!(w.advance(&mut text).unwrap(), None);
        assert_eq!(s.advance(&mut text).unwrap(), None);
    }
}
