//! 辞書ソースの統計情報

use std::collections::BTreeMap;

use crate::accent::{ACCENT_UNDEFINED, count_vowels};
use crate::dictionary::source::MrdSource;
use crate::errors::Result;

/// モデルとレンマに関する統計情報
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceStats {
    pub num_flexion_models: usize,
    pub num_accent_models: usize,
    pub num_sessions: usize,
    pub num_prefix_sets: usize,
    pub num_lemmas: usize,
    pub num_lemmas_with_prefix_set: usize,

    /// 屈折モデルあたりの要素数の最小値（モデルが無い場合は0）
    pub min_forms_per_model: usize,
    /// 屈折モデルあたりの要素数の最大値（モデルが無い場合は0）
    pub max_forms_per_model: usize,
    /// 屈折モデルあたりの要素数の平均値（モデルが無い場合は0）
    pub avg_forms_per_model: f64,

    /// すべての位置が未定のアクセントモデルの数
    pub accent_models_all_undefined: usize,
    /// 未定の位置を1つ以上含むアクセントモデルの数
    pub accent_models_any_undefined: usize,
    /// 未定の位置を含まないアクセントモデルの数
    pub accent_models_none_undefined: usize,

    /// 接頭辞付きの要素を含む屈折モデルの数
    pub flexion_models_with_any_prefix: usize,
    /// すべての要素が接頭辞付きの屈折モデルの数
    pub flexion_models_with_all_prefix: usize,
}

/// 展開された語形に関する統計情報
///
/// 同じ綴りの語形も別々に数えます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStats {
    pub num_forms: usize,
    /// 母音の数ごとの語形数
    pub vowel_histogram: BTreeMap<usize, usize>,
    /// 母音が1つ以下でアクセント位置が自明な語形の数
    pub forms_with_at_most_one_vowel: usize,
    pub forms_with_many_vowels: usize,
    /// 母音が2つ以上あり、アクセント位置が未定の語形の数
    pub forms_with_many_vowels_undefined: usize,
    /// 屈折の接頭辞を持つ語形の数
    pub forms_with_prefix: usize,
}

impl MrdSource {
    /// モデルとレンマの統計情報を計算します。
    pub fn stats(&self) -> SourceStats {
        let sizes = || self.flexion_models.iter().map(|m| m.flexions().len());
        let total: usize = sizes().sum();
        let avg_forms_per_model = if self.flexion_models.is_empty() {
            0.0
        } else {
            total as f64 / self.flexion_models.len() as f64
        };
        SourceStats {
            num_flexion_models: self.flexion_models.len(),
            num_accent_models: self.accent_models.len(),
            num_sessions: self.sessions.len(),
            num_prefix_sets: self.prefix_sets.len(),
            num_lemmas: self.lemmas.len(),
            num_lemmas_with_prefix_set: self
                .lemmas
                .iter()
                .filter(|l| l.prefix_set().is_some())
                .count(),
            min_forms_per_model: sizes().min().unwrap_or(0),
            max_forms_per_model: sizes().max().unwrap_or(0),
            avg_forms_per_model,
            accent_models_all_undefined: self
                .accent_models
                .iter()
                .filter(|m| m.all_undefined())
                .count(),
            accent_models_any_undefined: self
                .accent_models
                .iter()
                .filter(|m| m.any_undefined())
                .count(),
            accent_models_none_undefined: self
                .accent_models
                .iter()
                .filter(|m| !m.any_undefined())
                .count(),
            flexion_models_with_any_prefix: self
                .flexion_models
                .iter()
                .filter(|m| m.has_any_prefix())
                .count(),
            flexion_models_with_all_prefix: self
                .flexion_models
                .iter()
                .filter(|m| m.has_all_prefix())
                .count(),
        }
    }

    /// すべての語形を展開して統計情報を計算します。
    ///
    /// # エラー
    ///
    /// 語形の展開に失敗した場合にエラーを返します。
    pub fn form_stats(&self) -> Result<FormStats> {
        let mut stats = FormStats::default();
        for form in self.all_forms() {
            let form = form?;
            let vowels = count_vowels(&form.surface());
            stats.num_forms += 1;
            *stats.vowel_histogram.entry(vowels).or_default() += 1;
            if vowels <= 1 {
                stats.forms_with_at_most_one_vowel += 1;
            } else {
                stats.forms_with_many_vowels += 1;
                if form.accent() == ACCENT_UNDEFINED {
                    stats.forms_with_many_vowels_undefined += 1;
                }
            }
            if !form.flexion().prefix().trim().is_empty() {
                stats.forms_with_prefix += 1;
            }
        }
        Ok(stats)
    }
}
