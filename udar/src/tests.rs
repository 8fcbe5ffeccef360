//! udarのテストモジュール群
//!
//! 辞書ソースから索引ファイルまでの流れ、オートマトン、
//! テキストの走査（ページ単位の読み込みとナビゲーター）を検証します。

mod automaton;
mod navigation;

pub(crate) const GRAMTAB: &str = include_str!("./tests/resources/gramtab.tab");
pub(crate) const MORPHS_MRD: &str = include_str!("./tests/resources/morphs.mrd");
