//! テキストの単位（行、単語、文）の区切りを探すナビゲーター。
//!
//! 基本のナビゲーターは単位そのものではなく**区切り**を返します。
//! 単位の内容を得るには[`SuperNavigator`]で包むか、[`content_navigator`]を使用します。
//!
//! オフセット`-1`は「テキスト先頭より前」を表す有効な位置で、
//! `next(text, -1)`は先頭マーカー[`Segment::START`]を返します。
//!
//! # 例
//!
//! ```
//! use udar::text::StringText;
//! use udar::text::navigation::{UnitKind, UnitNavigator, content_navigator};
//!
//! let mut text = StringText::new("WORD1 WORD2");
//! let nav = content_navigator(UnitKind::Word);
//! let first = nav.next(&mut text, -1)?;
//! assert_eq!((first.offset(), first.length()), (0, 5));
//! # Ok::<(), udar::errors::UdarError>(())
//! ```
mod line;
mod sentence;
mod super_nav;
mod word;

use crate::errors::Result;
use crate::text::{Segment, Text};

pub use crate::text::navigation::line::LineNavigator;
pub use crate::text::navigation::sentence::{DEFAULT_SENTENCE_WINDOW, SentenceNavigator};
pub use crate::text::navigation::super_nav::{ContentMode, SuperNavigator, UnitCursor, Units};
pub use crate::text::navigation::word::WordNavigator;

/// 単位の区切りを前後に探すナビゲーター
pub trait UnitNavigator: Send + Sync {
    /// `offset`より後ろにある次の区切りを返します。無ければ[`Segment::INVALID`]を返します。
    ///
    /// # エラー
    ///
    /// テキストの読み込みに失敗した場合にエラーを返します。
    fn next(&self, text: &mut dyn Text, offset: isize) -> Result<Segment>;

    /// `offset`より前にある直前の区切りを返します。無ければ[`Segment::INVALID`]を返します。
    ///
    /// # エラー
    ///
    /// テキストの読み込みに失敗した場合にエラーを返します。
    fn prev(&self, text: &mut dyn Text, offset: isize) -> Result<Segment>;
}

/// ナビゲーションの単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Word,
    Line,
    Sentence,
}

/// 単位の内容を返すナビゲーターを作成します。
///
/// 文は区切りの句読点を含み（[`ContentMode::IncludeDelimiter`]）、
/// 単語と行は区切りを含みません。
pub fn content_navigator(kind: UnitKind) -> SuperNavigator {
    match kind {
        UnitKind::Word => SuperNavigator::new(WordNavigator, ContentMode::ExcludeDelimiter),
        UnitKind::Line => SuperNavigator::new(LineNavigator, ContentMode::ExcludeDelimiter),
        UnitKind::Sentence => SuperNavigator::new(
            SentenceNavigator::default(),
            ContentMode::IncludeDelimiter,
        ),
    }
}

#[inline]
pub(crate) fn text_len(text: &dyn Text) -> Result<isize> {
    Ok(isize::try_from(text.len())?)
}

/// `offset`が0以上であることを前提に、`char_at`を符号付きオフセットで呼び出します。
#[inline]
pub(crate) fn char_at(text: &mut dyn Text, offset: isize) -> Result<char> {
    text.char_at(usize::try_from(offset)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::StringText;

    #[test]
    fn test_content_navigators() {
        let mut text = StringText::new("Раз два.\nТри!");
        let words = content_navigator(UnitKind::Word);
        let lines = content_navigator(UnitKind::Line);
        let sentences = content_navigator(UnitKind::Sentence);

        assert_eq!(words.next(&mut text, -1).unwrap(), Segment::new(0, 3));
        assert_eq!(lines.next(&mut text, -1).unwrap(), Segment::new(0, 8));
        assert_eq!(sentences.next(&mut text, -1).unwrap(), Segment::new(0, 9));
    }
}
