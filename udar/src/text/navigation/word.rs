use crate::errors::Result;
use crate::text::Segment;
use crate::text::Text;
use crate::text::navigation::{UnitNavigator, char_at, text_len};

#[inline(always)]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// 単語の区切りを探すナビゲーター。
///
/// 単語の文字はUnicodeの文字と数字です。
///
/// 前方と後方で区切りの定義が異なります。`next`は単語の後ろに続く単語以外の文字の並びを、
/// `prev`は空白文字の並びだけを区切りとして返します。
/// したがって`prev`では句読点が直前の単語の一部として扱われます。
#[derive(Debug, Clone, Copy, Default)]
pub struct WordNavigator;

impl UnitNavigator for WordNavigator {
    fn next(&self, text: &mut dyn Text, offset: isize) -> Result<Segment> {
        let len = text_len(text)?;
        if offset == -1 {
            return Ok(Segment::START);
        }
        if offset < -1 || offset >= len - 1 {
            return Ok(Segment::INVALID);
        }

        // word_1   word2
        // ^     ^  ^
        // offset begin end
        let mut begin = offset;
        while begin < len && is_word_char(char_at(text, begin)?) {
            begin += 1;
        }
        if begin >= len {
            return Ok(Segment::INVALID);
        }
        let mut end = begin + 1;
        while end < len && !is_word_char(char_at(text, end)?) {
            end += 1;
        }
        Ok(Segment::new(begin, end - begin))
    }

    fn prev(&self, text: &mut dyn Text, offset: isize) -> Result<Segment> {
        if offset <= 0 {
            return Ok(Segment::INVALID);
        }
        // The cursor may sit one past the last char.
        let offset = offset.min(text_len(text)?);

        // word1   word2
        //     ^  ^  ^
        // begin end offset
        let mut end = offset - 1;
        while end >= 0 && !char_at(text, end)?.is_whitespace() {
            end -= 1;
        }
        if end < 0 {
            return Ok(Segment::INVALID);
        }
        let mut begin = end - 1;
        while begin >= 0 && char_at(text, begin)?.is_whitespace() {
            begin -= 1;
        }
        begin += 1;
        Ok(Segment::new(begin, end - begin + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::StringText;

    #[test]
    fn test_next() {
        let mut text = StringText::new("раз, два  три");
        assert_eq!(WordNavigator.next(&mut text, -1).unwrap(), Segment::START);
        assert_eq!(WordNavigator.next(&mut text, 0).unwrap(), Segment::new(3, 2));
        assert_eq!(WordNavigator.next(&mut text, 5).unwrap(), Segment::new(8, 2));
        assert!(WordNavigator.next(&mut text, 10).unwrap().is_invalid());
        assert!(WordNavigator.next(&mut text, 12).unwrap().is_invalid());
    }

    #[test]
    fn test_prev_whitespace_only() {
        let mut text = StringText::new("раз, два  три");
        // the comma belongs to the word before the space
        assert_eq!(WordNavigator.prev(&mut text, 13).unwrap(), Segment::new(8, 2));
        assert_eq!(WordNavigator.prev(&mut text, 8).unwrap(), Segment::new(4, 1));
        assert!(WordNavigator.prev(&mut text, 4).unwrap().is_invalid());
        assert!(WordNavigator.prev(&mut text, 0).unwrap().is_invalid());
    }
}
