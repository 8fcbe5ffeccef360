//! 索引構築のためのビルダー
//!
//! このモジュールは、辞書ソースの語形から [`FormIndex`] を構築するためのビルダーを提供します。
//! 語形は綴りごとに1つの解釈集合へまとめられ、綴りの辞書順にオートマトンへ挿入されます。

use std::collections::BTreeMap;

use crate::dictionary::index::automaton::AutomatonBuilder;
use crate::dictionary::index::payload::{Interpretation, PayloadsBuilder};
use crate::dictionary::index::{FormIndex, normalize};
use crate::dictionary::source::{MrdSource, WordForm};
use crate::errors::Result;

/// 語形から [`FormIndex`] を構築するビルダー
#[derive(Default)]
pub struct FormIndexBuilder {
    map: BTreeMap<String, Interpretation>,
    num_forms: usize,
}

impl FormIndexBuilder {
    /// 新しいビルダーを作成します。
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// 辞書ソースのすべての語形から [`FormIndex`] を構築します。
    ///
    /// # エラー
    ///
    /// 語形の展開、またはペイロードの符号化に失敗した場合にエラーを返します。
    pub fn from_source(source: &MrdSource) -> Result<FormIndex> {
        let mut b = Self::new();
        for form in source.all_forms() {
            b.add_form(&form?);
        }
        b.build()
    }

    /// 綴りにアクセント位置とアンコード序数の組を追加します。
    ///
    /// 綴りは大文字に正規化されます。
    pub fn add(&mut self, spelling: &str, accent: u8, ancode_ordinal: u32) {
        self.map
            .entry(normalize(spelling))
            .or_default()
            .add(accent, ancode_ordinal);
        self.num_forms += 1;
    }

    /// 語形を追加します。
    #[inline(always)]
    pub fn add_form(&mut self, form: &WordForm<'_>) {
        self.add(&form.surface(), form.accent(), form.ancode_ordinal());
    }

    /// 追加された異なる綴りの数を返します。
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// [`FormIndex`] を構築します。
    ///
    /// # エラー
    ///
    /// 解釈集合がペイロードの上限を超える場合に[`UdarError::Capacity`](crate::errors::UdarError::Capacity)を返します。
    pub fn build(self) -> Result<FormIndex> {
        log::info!(
            "[udar] building index from {} forms ({} spellings)",
            self.num_forms,
            self.map.len()
        );
        let mut automaton = AutomatonBuilder::new();
        let mut payloads = PayloadsBuilder::new();
        for (spelling, interp) in &self.map {
            let offset = payloads.push(interp)?;
            automaton.insert(spelling, offset)?;
        }
        log::debug!(
            "[udar] {} distinct interpretation sets",
            payloads.num_distinct()
        );
        Ok(FormIndex::new(automaton.finish()?, payloads.build()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_spellings() {
        let mut b = FormIndexBuilder::new();
        b.add("замок", 1, 0);
        b.add("ЗАМОК", 1, 1);
        b.add("Замок", 0, 0);
        b.add("ЗАМОК", 0, 2);
        b.add("ЗАМОК", 0, 2);
        assert_eq!(b.len(), 1);
        let index = b.build().unwrap();

        let interp = index.get("ЗАМОК").unwrap().unwrap();
        assert_eq!(interp.len(), 2);
        assert_eq!(interp.ordinals(1), Some(&[0, 1][..]));
        assert_eq!(interp.ordinals(0), Some(&[0, 2][..]));
        assert!(index.get("замок").unwrap().is_none());
    }

    #[test]
    fn test_capacity_error() {
        let mut b = FormIndexBuilder::new();
        b.add("ДОМ", 0, 70000);
        assert!(b.build().is_err());
    }
}
