//! # udar
//!
//! udarは、屈折の多い言語の語形からアクセント位置を引くための辞書と、
//! 任意のテキストにアクセントを注釈付けするための走査エンジンです。
//!
//! ## 概要
//!
//! MRD形式の辞書ソースを展開したすべての語形を、綴りから
//! （アクセント位置、アンコード序数）の組の集合への最小DAWGに格納します。
//! 索引はrkyvでシリアライズされ、メモリマップによりゼロコピーで読み込まれます。
//!
//! ## 主な機能
//!
//! - **辞書ソースの解析**: グラムタブとMRDファイルの読み込み、語形の展開
//! - **最小DAWG索引**: 接尾辞を共有するオートマトンと解釈集合のバイナリ符号化
//! - **ゼロコピー読み込み**: rkyvとmemmap2による高速な索引の読み込み
//! - **テキストの走査**: メモリ上またはページ単位のテキストと、行、単語、文のナビゲーター
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use udar::{Analyzer, Dictionary, Gramtab, MrdSource};
//! use udar::text::StringText;
//!
//! let gramtab_txt = "// nouns\nаа A С мр,ед,им\nаб A С мр,ед,рд\n";
//! let mrd = "1\n%ОК*аа%КА*аб\n1\n0;1\n0\n0\n1\nЗАМ 0 0 0 - -\n";
//!
//! let mut gramtab = Gramtab::from_reader(gramtab_txt.as_bytes())?;
//! let source = MrdSource::from_reader(mrd.as_bytes(), &mut gramtab)?;
//! let analyzer = Analyzer::new(Dictionary::from_source(&source)?);
//!
//! let interp = analyzer.lookup("замка")?.unwrap();
//! assert_eq!(interp.ordinals(1), Some(&[1][..]));
//!
//! let mut text = StringText::new("Нет замка.");
//! let report = analyzer.report(&mut text)?;
//! assert_eq!(report.not_found, vec!["Нет"]);
//! assert_eq!(report.single_accent, vec!["за<мка"]);
//! # Ok(())
//! # }
//! ```

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// アクセント位置の補助関数
pub mod accent;

/// 単語の検索とテキストの注釈付け
pub mod analyzer;

/// 辞書ソース、索引、索引ファイル
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// アンコードの表
pub mod gramtab;

/// ランダムアクセス可能なテキストとナビゲーター
pub mod text;

/// 内部ユーティリティ関数
pub mod utils;

#[cfg(test)]
mod tests;

// Re-exports
pub use analyzer::{AccentClass, AccentReport, Analyzer, IndexStats, WordAnnotation};
pub use dictionary::{Dictionary, FormIndexBuilder, Interpretation, MrdSource, WordForm};
pub use gramtab::Gramtab;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
