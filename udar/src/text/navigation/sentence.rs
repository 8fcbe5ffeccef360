use crate::errors::Result;
use crate::text::Segment;
use crate::text::Text;
use crate::text::navigation::{UnitNavigator, char_at, text_len};

const SEPARATORS: [char; 8] = ['.', '!', '?', '…', '⁉', '⁈', '‼', '⁇'];

/// 1回の走査で調べる文字数の既定値
pub const DEFAULT_SENTENCE_WINDOW: usize = 3000;

#[inline(always)]
fn is_separator(c: char) -> bool {
    SEPARATORS.contains(&c)
}

/// 文の区切りを探すナビゲーター。
///
/// 区切りは文末の句読点の並びと、それに続く句読点や空白です。
/// 句読点の直前の語がちょうど1文字の場合（略語のイニシャルなど）は文末とみなしません。
/// ただし、その1文字がテキストの先頭にあり、区切りがテキストの末尾まで続く場合は文末とします。
///
/// 走査は1回につき`window`文字までに制限され、範囲内に区切りが無ければ
/// 範囲の境界に長さ1の区切りを合成します。
#[derive(Debug, Clone, Copy)]
pub struct SentenceNavigator {
    window: usize,
}

impl Default for SentenceNavigator {
    fn default() -> Self {
        Self {
            window: DEFAULT_SENTENCE_WINDOW,
        }
    }
}

impl SentenceNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 走査範囲の文字数を設定します。0は1として扱われます。
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    #[inline(always)]
    pub fn window(&self) -> usize {
        self.window
    }

    /// 句読点`pos`の直前にある、文字と数字からなる語の先頭位置を返します。
    fn token_start(text: &mut dyn Text, pos: isize) -> Result<isize> {
        let mut start = pos;
        while start > 0 && char_at(text, start - 1)?.is_alphanumeric() {
            start -= 1;
        }
        Ok(start)
    }

    /// `from`から句読点と空白を読み飛ばした位置を返します。
    fn tail_end(text: &mut dyn Text, from: isize, len: isize) -> Result<isize> {
        let mut end = from;
        while end < len {
            let c = char_at(text, end)?;
            if !is_separator(c) && !c.is_whitespace() {
                break;
            }
            end += 1;
        }
        Ok(end)
    }
}

impl UnitNavigator for SentenceNavigator {
    fn next(&self, text: &mut dyn Text, offset: isize) -> Result<Segment> {
        let len = text_len(text)?;
        if offset == -1 {
            return Ok(Segment::START);
        }
        if offset < -1 || offset >= len - 1 {
            return Ok(Segment::INVALID);
        }
        let window = isize::try_from(self.window)?;
        let limit = len.min(offset.saturating_add(window));

        let mut cur = offset;
        while cur < limit {
            let start = usize::try_from(cur)?;
            let count = usize::try_from(limit - cur)?;
            let Some(pos) = text.index_of_any(&SEPARATORS, start, count)? else {
                break;
            };
            let pos = isize::try_from(pos)?;
            let token_start = Self::token_start(text, pos)?;
            let end = Self::tail_end(text, pos + 1, len)?;
            if pos - token_start != 1 || (token_start == 0 && end == len) {
                return Ok(Segment::new(pos, end - pos));
            }
            cur = pos + 1;
        }

        if limit < len {
            return Ok(Segment::new(limit, 1));
        }
        Ok(Segment::INVALID)
    }

    fn prev(&self, text: &mut dyn Text, offset: isize) -> Result<Segment> {
        if offset <= 0 {
            return Ok(Segment::INVALID);
        }
        let len = text_len(text)?;
        let offset = offset.min(len);
        let window = isize::try_from(self.window)?;
        let low = (offset - window).max(0);

        let mut cur = offset - 1;
        while cur >= low {
            let start = usize::try_from(cur)?;
            let count = usize::try_from(cur - low + 1)?;
            let Some(pos) = text.last_index_of_any(&SEPARATORS, start, count)? else {
                break;
            };
            // back to the first mark of the run, e.g. "?!"
            let mut pos = isize::try_from(pos)?;
            while pos > low && is_separator(char_at(text, pos - 1)?) {
                pos -= 1;
            }
            let token_start = Self::token_start(text, pos)?;
            let end = Self::tail_end(text, pos + 1, len)?;
            if pos - token_start != 1 || (token_start == 0 && end == len) {
                return Ok(Segment::new(pos, end - pos));
            }
            cur = pos - 1;
        }

        if low == 0 {
            return Ok(Segment::START);
        }
        Ok(Segment::new(low - 1, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::StringText;
    use crate::text::navigation::{UnitKind, content_navigator};

    #[test]
    fn test_initial_is_not_a_sentence_end() {
        let mut text = StringText::new("I. Came here.");
        let nav = SentenceNavigator::new();
        assert_eq!(nav.next(&mut text, 0).unwrap(), Segment::new(12, 1));
        assert_eq!(nav.prev(&mut text, 13).unwrap(), Segment::new(12, 1));
        assert_eq!(nav.prev(&mut text, 12).unwrap(), Segment::START);
    }

    #[test]
    fn test_single_letter_text() {
        let mut text = StringText::new("Я. ");
        let nav = SentenceNavigator::new();
        assert_eq!(nav.next(&mut text, 0).unwrap(), Segment::new(1, 2));
    }

    #[test]
    fn test_single_letter_text_backward() {
        let mut text = StringText::new("Я.");
        let nav = SentenceNavigator::new();
        assert_eq!(nav.next(&mut text, 0).unwrap(), Segment::new(1, 1));
        assert_eq!(nav.prev(&mut text, 2).unwrap(), Segment::new(1, 1));

        let content = content_navigator(UnitKind::Sentence);
        let forward = content.next(&mut text, -1).unwrap();
        assert_eq!(forward, Segment::new(0, 2));
        assert_eq!(content.prev(&mut text, 2).unwrap(), forward);
    }

    #[test]
    fn test_run_of_marks() {
        let mut text = StringText::new("Что?! Да.");
        let nav = SentenceNavigator::new();
        assert_eq!(nav.next(&mut text, 0).unwrap(), Segment::new(3, 3));
        assert_eq!(nav.prev(&mut text, 8).unwrap(), Segment::new(3, 3));
        assert_eq!(nav.next(&mut text, 6).unwrap(), Segment::new(8, 1));
        assert!(nav.next(&mut text, 8).unwrap().is_invalid());
    }

    #[test]
    fn test_forced_break() {
        let mut text = StringText::new("abcdefghij. k");
        let nav = SentenceNavigator::with_window(4);
        assert_eq!(nav.next(&mut text, 0).unwrap(), Segment::new(4, 1));
        assert_eq!(nav.next(&mut text, 8).unwrap(), Segment::new(10, 2));
        assert_eq!(nav.prev(&mut text, 8).unwrap(), Segment::new(3, 1));
        assert_eq!(nav.prev(&mut text, 3).unwrap(), Segment::START);
    }
}
