//! テキスト上の区間

use std::fmt;
use std::ops::Range;

/// テキスト上の`(offset, length)`の組。
///
/// ナビゲーターは「見つからない」を[`Segment::INVALID`]で、
/// テキスト先頭より前の位置を[`Segment::START`]で表すため、オフセットは符号付きです。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    offset: isize,
    length: isize,
}

impl Segment {
    /// 区間が存在しないことを表す番兵。
    pub const INVALID: Self = Self {
        offset: -1,
        length: -1,
    };

    /// テキスト先頭より前の区切りを表すマーカー。終了オフセットは0です。
    pub const START: Self = Self {
        offset: -1,
        length: 1,
    };

    #[inline(always)]
    pub const fn new(offset: isize, length: isize) -> Self {
        Self { offset, length }
    }

    #[inline(always)]
    pub const fn offset(&self) -> isize {
        self.offset
    }

    #[inline(always)]
    pub const fn length(&self) -> isize {
        self.length
    }

    /// `offset + length`を返します。
    #[inline(always)]
    pub const fn end_offset(&self) -> isize {
        self.offset + self.length
    }

    #[inline(always)]
    pub const fn is_invalid(&self) -> bool {
        self.offset == -1 && self.length == -1
    }

    /// 2つの区間の重なりを返します。重ならない場合は[`Segment::INVALID`]を返します。
    ///
    /// 接しているだけの区間は長さ0の重なりになります。
    pub fn overlap(&self, other: &Self) -> Self {
        let start = self.offset.max(other.offset);
        let end = self.end_offset().min(other.end_offset());
        if end < start {
            Self::INVALID
        } else {
            Self::new(start, end - start)
        }
    }

    /// `[offset, offset + length)`がこの区間に収まるかどうかを返します。
    ///
    /// `contains(offset, 0)`は終端を含む判定、`contains(offset, 1)`は終端を含まない判定になります。
    #[inline(always)]
    pub const fn contains(&self, offset: isize, length: isize) -> bool {
        self.offset <= offset && offset + length <= self.end_offset()
    }

    /// 別の区間がこの区間に完全に含まれるかどうかを返します。
    #[inline(always)]
    pub const fn contains_segment(&self, other: &Self) -> bool {
        self.contains(other.offset, other.length)
    }

    /// 文字位置の範囲に変換します。
    ///
    /// オフセットまたは長さが負の場合は`None`を返します。
    pub fn range(&self) -> Option<Range<usize>> {
        let start = usize::try_from(self.offset).ok()?;
        let len = usize::try_from(self.length).ok()?;
        Some(start..start.checked_add(len)?)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Offset={}, Length={}]", self.offset, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Segment::new(2, 5);
        assert_eq!(a.overlap(&Segment::new(4, 10)), Segment::new(4, 3));
        assert_eq!(a.overlap(&Segment::new(7, 1)), Segment::new(7, 0));
        assert!(a.overlap(&Segment::new(8, 1)).is_invalid());
    }

    #[test]
    fn test_contains() {
        let a = Segment::new(2, 3);
        assert!(a.contains(2, 3));
        assert!(a.contains(5, 0));
        assert!(!a.contains(5, 1));
        assert!(a.contains_segment(&Segment::new(3, 1)));
        assert!(!a.contains_segment(&Segment::new(1, 2)));
    }

    #[test]
    fn test_range() {
        assert_eq!(Segment::new(2, 3).range(), Some(2..5));
        assert_eq!(Segment::INVALID.range(), None);
        assert_eq!(Segment::START.range(), None);
        assert_eq!(Segment::START.end_offset(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Segment::new(1, 2).to_string(), "[Offset=1, Length=2]");
    }
}
