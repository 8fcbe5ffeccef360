//! 辞書ソースのモデル
//!
//! 屈折モデル・アクセントモデル・セッション・接頭辞集合・レンマの各レコードと、
//! それらを組み合わせて得られる語形を定義します。
//! レコード間の参照はすべて各配列内の位置で表されます。

use crate::accent::ACCENT_UNDEFINED;

/// 屈折モデルの1要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flexion {
    pub(crate) suffix: String,
    pub(crate) prefix: String,
    pub(crate) ancode: String,
    pub(crate) ancode_ordinal: u32,
}

impl Flexion {
    /// 語尾を返します。
    #[inline(always)]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// 屈折に付随する接頭辞を返します。無い場合は空文字列です。
    #[inline(always)]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// アンコードを返します。
    #[inline(always)]
    pub fn ancode(&self) -> &str {
        &self.ancode
    }

    /// グラムタブ上のアンコード序数を返します。
    #[inline(always)]
    pub const fn ancode_ordinal(&self) -> u32 {
        self.ancode_ordinal
    }
}

/// 屈折モデル
///
/// 要素の順序は、同じレンマに対応するアクセントモデルの要素と位置で対応します。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexionModel {
    pub(crate) flexions: Vec<Flexion>,
}

impl FlexionModel {
    #[inline(always)]
    pub fn flexions(&self) -> &[Flexion] {
        &self.flexions
    }

    /// いずれかの要素が接頭辞を持つかどうかを返します。
    pub fn has_any_prefix(&self) -> bool {
        self.flexions.iter().any(|f| !f.prefix.trim().is_empty())
    }

    /// すべての要素が接頭辞を持つかどうかを返します。空のモデルでは`true`です。
    pub fn has_all_prefix(&self) -> bool {
        self.flexions.iter().all(|f| !f.prefix.trim().is_empty())
    }
}

/// アクセントモデル
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccentModel {
    pub(crate) accents: Vec<u8>,
}

impl AccentModel {
    /// 語末から数えた母音の番号を、屈折モデルの要素順に返します。
    #[inline(always)]
    pub fn accents(&self) -> &[u8] {
        &self.accents
    }

    pub fn all_undefined(&self) -> bool {
        self.accents.iter().all(|&a| a == ACCENT_UNDEFINED)
    }

    pub fn any_undefined(&self) -> bool {
        self.accents.iter().any(|&a| a == ACCENT_UNDEFINED)
    }
}

/// 編集セッション
///
/// 日時は解釈せず、ファイル上の文字列のまま保持します。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub(crate) user: String,
    pub(crate) start: String,
    pub(crate) end: String,
}

impl Session {
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// 接頭辞集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixSet {
    pub(crate) prefixes: Vec<String>,
}

impl PrefixSet {
    #[inline(always)]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

/// レンマ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lemma {
    pub(crate) base: String,
    pub(crate) flexion_model: usize,
    pub(crate) accent_model: usize,
    pub(crate) session: usize,
    pub(crate) type_ancode: Option<(String, u32)>,
    pub(crate) prefix_set: Option<usize>,
}

impl Lemma {
    /// 語幹を返します。
    #[inline(always)]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// 屈折モデルの位置を返します。
    #[inline(always)]
    pub const fn flexion_model(&self) -> usize {
        self.flexion_model
    }

    /// アクセントモデルの位置を返します。
    #[inline(always)]
    pub const fn accent_model(&self) -> usize {
        self.accent_model
    }

    /// セッションの位置を返します。
    #[inline(always)]
    pub const fn session(&self) -> usize {
        self.session
    }

    /// レンマ全体に付くアンコードを返します。
    pub fn type_ancode(&self) -> Option<&str> {
        self.type_ancode.as_ref().map(|(code, _)| code.as_str())
    }

    /// レンマ全体に付くアンコードの序数を返します。
    pub fn type_ancode_ordinal(&self) -> Option<u32> {
        self.type_ancode.as_ref().map(|&(_, ordinal)| ordinal)
    }

    /// 接頭辞集合の位置を返します。
    #[inline(always)]
    pub const fn prefix_set(&self) -> Option<usize> {
        self.prefix_set
    }
}

/// 展開された語形
///
/// 表層形は`接頭辞 + 屈折の接頭辞 + 語幹 + 語尾`です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordForm<'a> {
    pub(crate) lemma: &'a Lemma,
    pub(crate) flexion: &'a Flexion,
    pub(crate) prefix: &'a str,
    pub(crate) accent: u8,
}

impl<'a> WordForm<'a> {
    /// 表層形を返します。
    pub fn surface(&self) -> String {
        let mut s = String::with_capacity(
            self.prefix.len()
                + self.flexion.prefix.len()
                + self.lemma.base.len()
                + self.flexion.suffix.len(),
        );
        s.push_str(self.prefix);
        s.push_str(&self.flexion.prefix);
        s.push_str(&self.lemma.base);
        s.push_str(&self.flexion.suffix);
        s
    }

    #[inline(always)]
    pub const fn lemma(&self) -> &'a Lemma {
        self.lemma
    }

    #[inline(always)]
    pub const fn flexion(&self) -> &'a Flexion {
        self.flexion
    }

    /// 接頭辞集合から付加された接頭辞を返します。付加されていない場合は空文字列です。
    #[inline(always)]
    pub const fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// アクセント位置を返します。
    #[inline(always)]
    pub const fn accent(&self) -> u8 {
        self.accent
    }

    #[inline(always)]
    pub fn ancode(&self) -> &'a str {
        self.flexion.ancode()
    }

    #[inline(always)]
    pub const fn ancode_ordinal(&self) -> u32 {
        self.flexion.ancode_ordinal
    }
}

impl std::fmt::Display for WordForm<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.prefix, self.flexion.prefix, self.lemma.base, self.flexion.suffix
        )
    }
}
