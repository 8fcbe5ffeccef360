use crate::errors::Result;
use crate::text::Segment;
use crate::text::Text;
use crate::text::navigation::{UnitNavigator, char_at, text_len};

const NEWLINE: [char; 2] = ['\r', '\n'];

/// 行の区切り（`\r`、`\n`、または`\r\n`）を探すナビゲーター
#[derive(Debug, Clone, Copy, Default)]
pub struct LineNavigator;

impl UnitNavigator for LineNavigator {
    /// 最終行では[`Segment::INVALID`]を返します。
    fn next(&self, text: &mut dyn Text, offset: isize) -> Result<Segment> {
        let len = text_len(text)?;
        if offset == -1 {
            return Ok(Segment::START);
        }
        if offset < -1 || offset >= len - 1 {
            return Ok(Segment::INVALID);
        }
        let start = usize::try_from(offset)?;
        let Some(pos) = text.index_of_any(&NEWLINE, start, text.len() - start)? else {
            return Ok(Segment::INVALID);
        };
        let pos = isize::try_from(pos)?;
        if char_at(text, pos)? == '\r' && pos + 1 < len && char_at(text, pos + 1)? == '\n' {
            return Ok(Segment::new(pos, 2));
        }
        Ok(Segment::new(pos, 1))
    }

    /// 最初の行では[`Segment::INVALID`]を返します。
    fn prev(&self, text: &mut dyn Text, offset: isize) -> Result<Segment> {
        if offset <= 0 {
            return Ok(Segment::INVALID);
        }
        let offset = offset.min(text_len(text)?);
        let count = usize::try_from(offset)?;
        let Some(pos) = text.last_index_of_any(&NEWLINE, count - 1, count)? else {
            return Ok(Segment::INVALID);
        };
        let pos = isize::try_from(pos)?;
        if char_at(text, pos)? == '\n' && pos >= 1 && char_at(text, pos - 1)? == '\r' {
            return Ok(Segment::new(pos - 1, 2));
        }
        Ok(Segment::new(pos, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::StringText;

    #[test]
    fn test_crlf() {
        let mut text = StringText::new("AB\r\nCD");
        assert_eq!(LineNavigator.next(&mut text, 0).unwrap(), Segment::new(2, 2));
        assert_eq!(LineNavigator.prev(&mut text, 6).unwrap(), Segment::new(2, 2));
    }

    #[test]
    fn test_single_delimiters() {
        let mut text = StringText::new("A\rB\nC");
        assert_eq!(LineNavigator.next(&mut text, 0).unwrap(), Segment::new(1, 1));
        assert_eq!(LineNavigator.next(&mut text, 2).unwrap(), Segment::new(3, 1));
        assert_eq!(LineNavigator.prev(&mut text, 5).unwrap(), Segment::new(3, 1));
        assert_eq!(LineNavigator.prev(&mut text, 3).unwrap(), Segment::new(1, 1));
    }

    #[test]
    fn test_boundaries() {
        let mut text = StringText::new("AB\nCD");
        assert_eq!(LineNavigator.next(&mut text, -1).unwrap(), Segment::START);
        assert!(LineNavigator.next(&mut text, 3).unwrap().is_invalid());
        assert!(LineNavigator.next(&mut text, 4).unwrap().is_invalid());
        assert!(LineNavigator.prev(&mut text, 0).unwrap().is_invalid());
        assert!(LineNavigator.prev(&mut text, 2).unwrap().is_invalid());
        assert_eq!(LineNavigator.prev(&mut text, 100).unwrap(), Segment::new(2, 1));
    }
}
