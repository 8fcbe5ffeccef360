//! 綴りから解釈集合を引く索引
//!
//! 索引は[`Automaton`]と[`Payloads`]の組です。
//! オートマトンの値はペイロードブロブ内のオフセットです。

pub mod automaton;
pub mod payload;

use rkyv::{Archive, Deserialize, Serialize};

use crate::dictionary::index::automaton::{ArchivedAutomaton, Automaton};
use crate::dictionary::index::payload::{ArchivedPayloads, Interpretation, Payloads};
use crate::errors::Result;

/// 綴りを索引のキーの形に正規化します。
#[inline(always)]
pub fn normalize(word: &str) -> String {
    word.to_uppercase()
}

/// 綴りから解釈集合への索引
#[derive(Archive, Serialize, Deserialize)]
pub struct FormIndex {
    automaton: Automaton,
    payloads: Payloads,
}

impl FormIndex {
    pub(crate) const fn new(automaton: Automaton, payloads: Payloads) -> Self {
        Self {
            automaton,
            payloads,
        }
    }

    /// 正規化済みの綴りに対応する解釈集合を返します。
    ///
    /// # エラー
    ///
    /// ペイロードが破損している場合にエラーを返します。
    pub fn get(&self, key: &str) -> Result<Option<Interpretation>> {
        self.automaton
            .get(key)
            .map(|offset| self.payloads.get(offset))
            .transpose()
    }

    #[inline(always)]
    pub const fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    #[inline(always)]
    pub const fn payloads(&self) -> &Payloads {
        &self.payloads
    }
}

impl ArchivedFormIndex {
    /// 正規化済みの綴りに対応する解釈集合を返します（アーカイブ版）。
    pub fn get(&self, key: &str) -> Result<Option<Interpretation>> {
        self.automaton
            .get(key)
            .map(|offset| self.payloads.get(offset))
            .transpose()
    }

    #[inline(always)]
    pub const fn automaton(&self) -> &ArchivedAutomaton {
        &self.automaton
    }

    #[inline(always)]
    pub const fn payloads(&self) -> &ArchivedPayloads {
        &self.payloads
    }
}

/// 索引への参照（アーカイブ版または所有版）
///
/// アーカイブ版と所有版の両方に対して統一的なインターフェースを提供します。
#[derive(Clone, Copy)]
pub enum FormIndexRef<'a> {
    Archived(&'a ArchivedFormIndex),
    Owned(&'a FormIndex),
}

impl<'a> FormIndexRef<'a> {
    /// 正規化済みの綴りに対応する解釈集合を返します。
    pub fn get(&self, key: &str) -> Result<Option<Interpretation>> {
        match self {
            Self::Archived(index) => index.get(key),
            Self::Owned(index) => index.get(key),
        }
    }

    /// 入力の先頭から遷移できる最長の文字数を返します。
    pub fn common_prefix_len(&self, input: &str) -> usize {
        match self {
            Self::Archived(index) => index.automaton.common_prefix_len(input),
            Self::Owned(index) => index.automaton.common_prefix_len(input),
        }
    }

    /// 接頭辞で始まる綴りと解釈集合の組を辞書順に返します。
    pub fn predictive_iter(
        self,
        prefix: &str,
    ) -> Box<dyn Iterator<Item = Result<(String, Interpretation)>> + 'a> {
        match self {
            Self::Archived(index) => Box::new(
                index
                    .automaton
                    .predictive_iter(prefix)
                    .map(move |(key, offset)| Ok((key, index.payloads.get(offset)?))),
            ),
            Self::Owned(index) => Box::new(
                index
                    .automaton
                    .predictive_iter(prefix)
                    .map(move |(key, offset)| Ok((key, index.payloads.get(offset)?))),
            ),
        }
    }

    /// すべての綴りと解釈集合の組を辞書順に返します。
    pub fn iter(self) -> Box<dyn Iterator<Item = Result<(String, Interpretation)>> + 'a> {
        self.predictive_iter("")
    }

    /// 綴りの数を返します。
    pub fn len(&self) -> usize {
        match self {
            Self::Archived(index) => index.automaton.len(),
            Self::Owned(index) => index.automaton.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// オートマトンの状態数を返します。
    pub fn num_states(&self) -> usize {
        match self {
            Self::Archived(index) => index.automaton.num_states(),
            Self::Owned(index) => index.automaton.num_states(),
        }
    }

    /// ペイロードブロブのバイト数を返します。
    pub fn num_payload_bytes(&self) -> usize {
        match self {
            Self::Archived(index) => index.payloads.num_bytes(),
            Self::Owned(index) => index.payloads.num_bytes(),
        }
    }
}
