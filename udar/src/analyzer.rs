//! 索引を使ったアクセントの検索とテキストの注釈付け。
//!
//! # 主要な構造体
//!
//! - [`Analyzer`]: 単語の検索、アクセントの分類、テキストの注釈付けを行う
//! - [`AccentReport`]: 注釈付けの結果を単語の種類ごとに集める
//!
//! # 例
//!
//! ```
//! use udar::{AccentClass, Analyzer, Dictionary, FormIndexBuilder};
//!
//! let mut builder = FormIndexBuilder::new();
//! builder.add("замок", 1, 0);
//! builder.add("замок", 0, 0);
//! builder.add("мама", 1, 1);
//! let analyzer = Analyzer::new(Dictionary::from_index(builder.build()?));
//!
//! let interp = analyzer.lookup("Мама")?.unwrap();
//! assert_eq!(AccentClass::of(&interp), AccentClass::Unambiguous(1));
//! let interp = analyzer.lookup("ЗАМОК")?.unwrap();
//! assert_eq!(AccentClass::of(&interp), AccentClass::Homonymous(vec![0, 1]));
//! assert!(analyzer.lookup("кот")?.is_none());
//! # Ok::<(), udar::errors::UdarError>(())
//! ```
pub mod stats;

use std::sync::Arc;

use crate::accent::{ACCENT_UNDEFINED, set_accent};
use crate::dictionary::Dictionary;
use crate::dictionary::index::payload::Interpretation;
use crate::errors::Result;
use crate::gramtab::Gramtab;
use crate::text::Text;
use crate::text::navigation::{UnitKind, content_navigator};
use crate::text::segment::Segment;

pub use crate::analyzer::stats::IndexStats;

/// 解釈集合のアクセントの分類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccentClass {
    /// アクセント位置が1つに決まる。
    Unambiguous(u8),
    /// アクセント位置が未定（255）のみ。
    Undetermined,
    /// 解釈によってアクセント位置が異なる。位置は昇順。
    Homonymous(Vec<u8>),
}

impl AccentClass {
    /// 解釈集合を分類します。空の集合は[`AccentClass::Undetermined`]になります。
    pub fn of(interp: &Interpretation) -> Self {
        let mut accents: Vec<u8> = interp.accents().collect();
        match accents.as_slice() {
            [] => Self::Undetermined,
            [ACCENT_UNDEFINED] => Self::Undetermined,
            [accent] => Self::Unambiguous(*accent),
            _ => {
                accents.sort_unstable();
                Self::Homonymous(accents)
            }
        }
    }
}

/// テキスト中の1単語に対する注釈
#[derive(Debug, Clone)]
pub struct WordAnnotation {
    /// テキスト上の綴り
    pub word: String,
    pub segment: Segment,
    /// 単語を含む文。文が見つからない場合は`None`。
    pub sentence: Option<Segment>,
    /// 検索結果。辞書に無い場合は`None`。
    pub outcome: Option<Interpretation>,
}

impl WordAnnotation {
    /// 検索結果のアクセントの分類を返します。
    pub fn accent_class(&self) -> Option<AccentClass> {
        self.outcome.as_ref().map(AccentClass::of)
    }
}

/// 注釈付けの結果を単語の種類ごとに集めたもの
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccentReport {
    /// 辞書に無い単語
    pub not_found: Vec<String>,
    /// アクセント位置が1つの単語（アクセント記号付き）
    pub single_accent: Vec<String>,
    /// 複数のアクセント位置を持つ単語
    pub many_accents: Vec<String>,
}

impl AccentReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注釈を1つ記録します。
    pub fn record(&mut self, annotation: &WordAnnotation) {
        let Some(interp) = &annotation.outcome else {
            self.not_found.push(annotation.word.clone());
            return;
        };
        let mut accents = interp.accents();
        match (accents.next(), accents.next()) {
            (Some(accent), None) => self
                .single_accent
                .push(set_accent(&annotation.word, accent)),
            _ => self.many_accents.push(annotation.word.clone()),
        }
    }

    /// 記録した単語の総数を返します。
    pub fn len(&self) -> usize {
        self.not_found.len() + self.single_accent.len() + self.many_accents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 索引を使って単語のアクセントを調べるアナライザー。
///
/// 辞書は`Arc`で保持されるため、アナライザーの複製やスレッド間での共有は安価です。
#[derive(Clone)]
pub struct Analyzer {
    dict: Arc<Dictionary>,
}

impl Analyzer {
    /// 辞書の所有権を受け取ってアナライザーを作成します。
    pub fn new(dict: Dictionary) -> Self {
        Self {
            dict: Arc::new(dict),
        }
    }

    /// 共有された辞書からアナライザーを作成します。
    pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Self {
        Self { dict }
    }

    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// 単語を大文字に正規化して検索します。
    ///
    /// # 戻り値
    ///
    /// 解釈集合。辞書に無い場合は`None`。
    ///
    /// # エラー
    ///
    /// 索引のペイロードが破損している場合にエラーを返します。
    #[inline(always)]
    pub fn lookup(&self, word: &str) -> Result<Option<Interpretation>> {
        self.dict.lookup(word)
    }

    /// 単語を検索してアクセントを分類します。辞書に無い場合は`None`を返します。
    ///
    /// # エラー
    ///
    /// 索引のペイロードが破損している場合にエラーを返します。
    pub fn classify(&self, word: &str) -> Result<Option<AccentClass>> {
        Ok(self.lookup(word)?.as_ref().map(AccentClass::of))
    }

    /// 解釈集合のアンコード序数を`"<品詞> <文法素>"`の文字列に変換します。
    ///
    /// # 戻り値
    ///
    /// アクセント位置と、その位置の解釈の説明の組のリスト。
    ///
    /// # エラー
    ///
    /// 序数がグラムタブに無い場合に[`UdarError::OutOfRange`](crate::errors::UdarError::OutOfRange)を返します。
    pub fn describe(
        &self,
        interp: &Interpretation,
        gramtab: &Gramtab,
    ) -> Result<Vec<(u8, Vec<String>)>> {
        interp
            .iter()
            .map(|(accent, ordinals)| {
                let descriptions = ordinals
                    .iter()
                    .map(|&ordinal| gramtab.describe_ordinal(ordinal))
                    .collect::<Result<Vec<_>>>()?;
                Ok((accent, descriptions))
            })
            .collect()
    }

    /// テキストの単語を順に検索し、注釈を`sink`に渡します。
    ///
    /// 単語と文は[`content_navigator`]の単位で、空の単位は読み飛ばされます。
    ///
    /// # エラー
    ///
    /// テキストの読み込み、または検索に失敗した場合にエラーを返します。
    pub fn annotate<F>(&self, text: &mut dyn Text, mut sink: F) -> Result<()>
    where
        F: FnMut(WordAnnotation),
    {
        let words = content_navigator(UnitKind::Word);
        let sentences = content_navigator(UnitKind::Sentence);
        let mut word_cursor = words.cursor();
        let mut sentence_cursor = sentences.cursor();

        let mut sentence = sentence_cursor.advance(text)?;
        let mut num_words = 0usize;
        while let Some(segment) = word_cursor.advance(text)? {
            while let Some(current) = sentence
                && current.end_offset() <= segment.offset()
            {
                sentence = sentence_cursor.advance(text)?;
            }
            let word = text.substring_segment(segment)?;
            let outcome = self.lookup(&word)?;
            num_words += 1;
            sink(WordAnnotation {
                word,
                segment,
                sentence,
                outcome,
            });
        }
        log::debug!("[udar] annotated {} words", num_words);
        Ok(())
    }

    /// テキストを注釈付けして[`AccentReport`]にまとめます。
    ///
    /// # エラー
    ///
    /// [`Analyzer::annotate`]と同じです。
    pub fn report(&self, text: &mut dyn Text) -> Result<AccentReport> {
        let mut report = AccentReport::new();
        self.annotate(text, |annotation| report.record(&annotation))?;
        Ok(report)
    }

    /// 索引のすべての綴りについてアクセントの統計情報を計算します。
    ///
    /// # エラー
    ///
    /// 索引のペイロードが破損している場合にエラーを返します。
    pub fn stats(&self) -> Result<IndexStats> {
        IndexStats::from_index(self.dict.index())
    }
}
