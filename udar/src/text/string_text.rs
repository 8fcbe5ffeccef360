//! メモリ上の文字列による[`Text`]の実装

use crate::errors::{Result, UdarError};
use crate::text::{
    Comparison, Text, TextReader, check_backward, check_forward, find_char, find_str, rfind_char,
    rfind_str,
};

/// 文字列全体をメモリ上に持つテキスト
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringText {
    chars: Vec<char>,
}

impl StringText {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    #[inline(always)]
    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }
}

impl From<&str> for StringText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for StringText {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl Text for StringText {
    #[inline(always)]
    fn len(&self) -> usize {
        self.chars.len()
    }

    fn char_at(&mut self, offset: usize) -> Result<char> {
        self.chars
            .get(offset)
            .copied()
            .ok_or_else(|| UdarError::out_of_range("text", offset, self.chars.len(), "char_at"))
    }

    fn substring(&mut self, offset: usize, length: usize) -> Result<String> {
        check_forward(self.chars.len(), offset, length)?;
        Ok(self.chars[offset..offset + length].iter().collect())
    }

    fn index_of(&mut self, c: char, start: usize, count: usize) -> Result<Option<usize>> {
        check_forward(self.chars.len(), start, count)?;
        Ok(find_char(&self.chars, start, count, |x| x == c))
    }

    fn index_of_any(
        &mut self,
        any_of: &[char],
        start: usize,
        count: usize,
    ) -> Result<Option<usize>> {
        check_forward(self.chars.len(), start, count)?;
        Ok(find_char(&self.chars, start, count, |x| any_of.contains(&x)))
    }

    fn index_of_str(
        &mut self,
        needle: &str,
        start: usize,
        count: usize,
        comparison: Comparison,
    ) -> Result<Option<usize>> {
        check_forward(self.chars.len(), start, count)?;
        let needle: Vec<char> = needle.chars().collect();
        Ok(find_str(&self.chars, start, count, &needle, comparison))
    }

    fn last_index_of(&mut self, c: char, start: usize, count: usize) -> Result<Option<usize>> {
        check_backward(self.chars.len(), start, count)?;
        Ok(rfind_char(&self.chars, start, count, |x| x == c))
    }

    fn last_index_of_any(
        &mut self,
        any_of: &[char],
        start: usize,
        count: usize,
    ) -> Result<Option<usize>> {
        check_backward(self.chars.len(), start, count)?;
        Ok(rfind_char(&self.chars, start, count, |x| any_of.contains(&x)))
    }

    fn last_index_of_str(
        &mut self,
        needle: &str,
        start: usize,
        count: usize,
        comparison: Comparison,
    ) -> Result<Option<usize>> {
        check_backward(self.chars.len(), start, count)?;
        let needle: Vec<char> = needle.chars().collect();
        Ok(rfind_str(&self.chars, start, count, &needle, comparison))
    }

    fn create_reader(&mut self) -> TextReader<'_> {
        TextReader::new(self)
    }
}
