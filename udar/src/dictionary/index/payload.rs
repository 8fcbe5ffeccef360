//! 解釈集合のペイロード
//!
//! このモジュールは、綴りごとの解釈集合（アクセント位置からアンコード序数の集合への対応）と、
//! そのバイナリ表現を管理します。
//!
//! # バイナリ表現
//!
//! ```text
//! count:1B
//! count回の繰り返し: accent:1B, listLen:1B, (ordinal:2B little-endian) x listLen
//! ```

use hashbrown::HashMap;
use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::{Result, UdarError};

const MAX_COUNT: usize = u8::MAX as usize;
const MAX_ORDINAL: u32 = u16::MAX as u32;

/// 1つの綴りに対する解釈集合
///
/// アクセント位置ごとにアンコード序数のリストを保持します。
/// アクセント位置は最初に追加された順に並び、同じ序数は二度追加されません。
/// 比較は集合として行われ、順序は考慮されません。
#[derive(Debug, Clone, Default)]
pub struct Interpretation {
    entries: Vec<(u8, Vec<u32>)>,
}

impl Interpretation {
    /// 空の解釈集合を作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// アクセント位置とアンコード序数の組を追加します。
    ///
    /// 既に同じ組が含まれている場合は何もしません。
    pub fn add(&mut self, accent: u8, ordinal: u32) {
        if let Some((_, ordinals)) = self.entries.iter_mut().find(|(a, _)| *a == accent) {
            if !ordinals.contains(&ordinal) {
                ordinals.push(ordinal);
            }
        } else {
            self.entries.push((accent, vec![ordinal]));
        }
    }

    /// 別の解釈集合の内容をすべて追加します。
    pub fn merge(&mut self, other: &Self) {
        for (accent, ordinals) in other.iter() {
            for &ordinal in ordinals {
                self.add(accent, ordinal);
            }
        }
    }

    /// アクセント位置の数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 解釈集合が空かどうかを返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 追加順にアクセント位置を返すイテレータを取得します。
    pub fn accents(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.iter().map(|(a, _)| *a)
    }

    /// アクセント位置に対応するアンコード序数のリストを返します。
    pub fn ordinals(&self, accent: u8) -> Option<&[u32]> {
        self.entries
            .iter()
            .find(|(a, _)| *a == accent)
            .map(|(_, ordinals)| ordinals.as_slice())
    }

    /// アクセント位置が含まれているかどうかを返します。
    pub fn contains_accent(&self, accent: u8) -> bool {
        self.entries.iter().any(|(a, _)| *a == accent)
    }

    /// `(アクセント位置, アンコード序数のリスト)`の組を返すイテレータを取得します。
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u32])> + '_ {
        self.entries.iter().map(|(a, o)| (*a, o.as_slice()))
    }

    /// バイナリ表現をバッファの末尾に書き込みます。
    ///
    /// # エラー
    ///
    /// 以下の場合に[`UdarError::Capacity`]を返し、バッファは変更されません。
    ///
    /// - アクセント位置の数が255を超える場合
    /// - 1つのアクセント位置の序数リストが255要素を超える場合
    /// - 序数が16ビットに収まらない場合
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        if self.entries.len() > MAX_COUNT {
            return Err(UdarError::capacity(
                "number of accents",
                self.entries.len(),
                MAX_COUNT,
            ));
        }
        for (_, ordinals) in &self.entries {
            if ordinals.len() > MAX_COUNT {
                return Err(UdarError::capacity(
                    "number of ancodes per accent",
                    ordinals.len(),
                    MAX_COUNT,
                ));
            }
            if let Some(&ordinal) = ordinals.iter().find(|&&o| o > MAX_ORDINAL) {
                return Err(UdarError::capacity(
                    "ancode ordinal",
                    usize::try_from(ordinal)?,
                    usize::try_from(MAX_ORDINAL)?,
                ));
            }
        }

        buf.push(u8::try_from(self.entries.len())?);
        for (accent, ordinals) in &self.entries {
            buf.push(*accent);
            buf.push(u8::try_from(ordinals.len())?);
            for &ordinal in ordinals {
                buf.extend_from_slice(&u16::try_from(ordinal)?.to_le_bytes());
            }
        }
        Ok(())
    }

    /// バイナリ表現を先頭から読み取ります。
    ///
    /// # 戻り値
    ///
    /// 読み取った解釈集合と、消費したバイト数の組。
    ///
    /// # エラー
    ///
    /// 入力がバイナリ表現の途中で終わっている場合に[`UdarError::InvalidFormat`]を返します。
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut rdr = ByteReader { bytes, pos: 0 };
        let count = rdr.u8()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let accent = rdr.u8()?;
            let len = rdr.u8()?;
            let mut ordinals = Vec::with_capacity(usize::from(len));
            for _ in 0..len {
                ordinals.push(u32::from(rdr.u16()?));
            }
            entries.push((accent, ordinals));
        }
        Ok((Self { entries }, rdr.pos))
    }
}

impl PartialEq for Interpretation {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(accent, ordinals)| {
                other.ordinals(accent).is_some_and(|theirs| {
                    ordinals.len() == theirs.len() && ordinals.iter().all(|o| theirs.contains(o))
                })
            })
    }
}

impl Eq for Interpretation {}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl ByteReader<'_> {
    #[inline(always)]
    fn u8(&mut self) -> Result<u8> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| UdarError::invalid_format("payload", "unexpected end of payload"))?;
        self.pos += 1;
        Ok(b)
    }

    #[inline(always)]
    fn u16(&mut self) -> Result<u16> {
        let lo = self.u8()?;
        let hi = self.u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}

/// 符号化された解釈集合を連結して保持するブロブ
#[derive(Archive, Serialize, Deserialize, Default)]
pub struct Payloads {
    data: Vec<u8>,
}

impl Payloads {
    /// オフセット位置の解釈集合を取得します。
    #[inline(always)]
    pub fn get(&self, offset: u32) -> Result<Interpretation> {
        decode_at(&self.data, offset)
    }

    /// ブロブのバイト数を返します。
    #[inline(always)]
    pub fn num_bytes(&self) -> usize {
        self.data.len()
    }
}

impl ArchivedPayloads {
    /// オフセット位置の解釈集合を取得します（アーカイブ版）。
    #[inline(always)]
    pub fn get(&self, offset: u32) -> Result<Interpretation> {
        decode_at(self.data.as_slice(), offset)
    }

    /// ブロブのバイト数を返します（アーカイブ版）。
    #[inline(always)]
    pub fn num_bytes(&self) -> usize {
        self.data.len()
    }
}

fn decode_at(data: &[u8], offset: u32) -> Result<Interpretation> {
    let i = usize::try_from(offset)?;
    let bytes = data
        .get(i..)
        .ok_or_else(|| UdarError::out_of_range("payload offset", i, data.len(), ""))?;
    Interpretation::decode(bytes).map(|(interp, _)| interp)
}

/// ペイロードブロブを構築するビルダー
///
/// 同じバイト列に符号化される解釈集合は一度だけ格納され、同じオフセットを共有します。
#[derive(Default)]
pub struct PayloadsBuilder {
    data: Vec<u8>,
    interned: HashMap<Vec<u8>, u32>,
}

impl PayloadsBuilder {
    /// 新しいビルダーを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 解釈集合を追加し、そのオフセットを返します。
    ///
    /// # エラー
    ///
    /// 符号化に失敗した場合、またはブロブが4GiBを超える場合にエラーを返します。
    pub fn push(&mut self, interp: &Interpretation) -> Result<u32> {
        let mut encoded = vec![];
        interp.encode(&mut encoded)?;
        if let Some(&offset) = self.interned.get(&encoded) {
            return Ok(offset);
        }
        let offset = u32::try_from(self.data.len())?;
        self.data.extend_from_slice(&encoded);
        self.interned.insert(encoded, offset);
        Ok(offset)
    }

    /// 格納されている異なる解釈集合の数を返します。
    pub fn num_distinct(&self) -> usize {
        self.interned.len()
    }

    /// ペイロードブロブを構築します。
    #[allow(clippy::missing_const_for_fn)]
    pub fn build(self) -> Payloads {
        Payloads { data: self.data }
    }
}
