//! アンコード表（グラムタブ）
//!
//! このモジュールは、アンコード（品詞と文法素の組を表す短いコード）から
//! 品詞タグと文法素文字列への対応表を提供します。
//!
//! # ファイル形式
//!
//! 各行は空白区切りのフィールドで構成されます。`//`で始まる行と空行は無視されます。
//!
//! ```text
//! // <code> <ignored> <pos> [<grammemes>]
//! аа A С мр,ед,им
//! аб A С мр,ед,рд
//! ```
//!
//! 序数はファイル内の出現順に0から密に割り当てられ、表の生存期間中は変化しません。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hashbrown::HashMap;

use crate::errors::{Result, UdarError};
use crate::utils::FromU32;

const COMMENT_MARKER: &str = "//";

/// アンコード表の1エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncodeEntry {
    code: String,
    part_of_speech: String,
    grammemes: String,
    ordinal: u32,
    frequency: u64,
}

impl AncodeEntry {
    /// アンコード文字列を返します。
    #[inline(always)]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 品詞タグを返します。
    #[inline(always)]
    pub fn part_of_speech(&self) -> &str {
        &self.part_of_speech
    }

    /// 文法素文字列を返します。文法素フィールドが無い場合は空文字列です。
    #[inline(always)]
    pub fn grammemes(&self) -> &str {
        &self.grammemes
    }

    /// ファイル内の出現順に割り当てられた序数を返します。
    #[inline(always)]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// 辞書読み込み中に数えられた使用頻度を返します。
    #[inline(always)]
    pub const fn frequency(&self) -> u64 {
        self.frequency
    }

    /// `"<品詞> <文法素>"`形式の説明文字列を返します。
    pub fn describe(&self) -> String {
        if self.grammemes.is_empty() {
            self.part_of_speech.clone()
        } else {
            format!("{} {}", self.part_of_speech, self.grammemes)
        }
    }
}

/// アンコード表
///
/// アンコード文字列と序数の両方から[`AncodeEntry`]を引くことができます。
/// 使用頻度カウンタは辞書ソースの読み込み中にのみ`&mut self`経由で更新されます。
#[derive(Debug, Default, Clone)]
pub struct Gramtab {
    entries: Vec<AncodeEntry>,
    index: HashMap<String, u32>,
}

impl Gramtab {
    /// リーダーからアンコード表を読み込みます。
    ///
    /// # 引数
    ///
    /// * `rdr` - グラムタブファイルのリーダー
    ///
    /// # エラー
    ///
    /// 以下の場合に[`UdarError`]を返します。
    ///
    /// - コメントでも空行でもない行のフィールド数が3未満の場合
    /// - 同じアンコードが二度定義されている場合
    /// - 入力がUTF-8として不正な場合
    pub fn from_reader<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut buf = vec![];
        rdr.read_to_end(&mut buf)?;
        let text = std::str::from_utf8(&buf)
            .map_err(|e| UdarError::invalid_format("gramtab", e.to_string()))?;

        let mut gramtab = Self::default();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                let msg = format!(
                    "line {}: a record must have three fields at least, {:?}",
                    i + 1,
                    line
                );
                return Err(UdarError::invalid_format("gramtab", msg));
            }
            gramtab.push(fields[0], fields[2], fields.get(3).copied().unwrap_or(""), i + 1)?;
        }

        log::debug!("[udar] loaded {} ancodes", gramtab.len());
        Ok(gramtab)
    }

    /// ファイルパスからアンコード表を読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合、または[`Gramtab::from_reader`]が失敗する場合にエラーを返します。
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::from_reader(File::open(path)?)
    }

    fn push(&mut self, code: &str, pos: &str, grammemes: &str, line_no: usize) -> Result<()> {
        if self.index.contains_key(code) {
            let msg = format!("line {}: duplicate ancode {:?}", line_no, code);
            return Err(UdarError::invalid_format("gramtab", msg));
        }
        let ordinal = u32::try_from(self.entries.len())?;
        self.index.insert(code.to_string(), ordinal);
        self.entries.push(AncodeEntry {
            code: code.to_string(),
            part_of_speech: pos.to_string(),
            grammemes: grammemes.to_string(),
            ordinal,
            frequency: 0,
        });
        Ok(())
    }

    /// 登録されているアンコードの数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 表が空かどうかを返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// アンコードからエントリを引きます。未登録の場合は`None`を返します。
    #[inline(always)]
    pub fn lookup(&self, code: &str) -> Option<&AncodeEntry> {
        self.index
            .get(code)
            .map(|&ordinal| &self.entries[usize::from_u32(ordinal)])
    }

    /// 序数からエントリを引きます。
    ///
    /// # エラー
    ///
    /// 序数が範囲外の場合に[`UdarError::OutOfRange`]を返します。
    pub fn lookup_by_ordinal(&self, ordinal: u32) -> Result<&AncodeEntry> {
        let i = usize::from_u32(ordinal);
        self.entries
            .get(i)
            .ok_or_else(|| UdarError::out_of_range("ancode ordinal", i, self.entries.len(), ""))
    }

    /// アンコードの序数を返します。
    ///
    /// # エラー
    ///
    /// 未登録のアンコードの場合に[`UdarError::NotFound`]を返します。
    pub fn ordinal(&self, code: &str) -> Result<u32> {
        self.index
            .get(code)
            .copied()
            .ok_or_else(|| UdarError::not_found("ancode", code))
    }

    /// アンコードの使用頻度を1増やします。
    ///
    /// # エラー
    ///
    /// 未登録のアンコードの場合に[`UdarError::NotFound`]を返します。
    pub fn increment_frequency(&mut self, code: &str) -> Result<()> {
        let ordinal = self.ordinal(code)?;
        self.entries[usize::from_u32(ordinal)].frequency += 1;
        Ok(())
    }

    /// アンコードを序数に解決し、同時に使用頻度を数えます。
    pub(crate) fn register(&mut self, code: &str) -> Result<u32> {
        let ordinal = self.ordinal(code)?;
        self.increment_frequency(code)?;
        Ok(ordinal)
    }

    /// アンコードの使用頻度を返します。未登録の場合は`None`を返します。
    pub fn frequency(&self, code: &str) -> Option<u64> {
        self.lookup(code).map(AncodeEntry::frequency)
    }

    /// `"<品詞> <文法素>"`形式の説明文字列を返します。未登録の場合は`None`を返します。
    pub fn describe(&self, code: &str) -> Option<String> {
        self.lookup(code).map(AncodeEntry::describe)
    }

    /// 序数から`"<品詞> <文法素>"`形式の説明文字列を返します。
    ///
    /// # エラー
    ///
    /// 序数が範囲外の場合に[`UdarError::OutOfRange`]を返します。
    pub fn describe_ordinal(&self, ordinal: u32) -> Result<String> {
        self.lookup_by_ordinal(ordinal).map(AncodeEntry::describe)
    }

    /// 序数順にすべてのエントリを返すイテレータを取得します。
    pub fn iter(&self) -> impl Iterator<Item = &AncodeEntry> + '_ {
        self.entries.iter()
    }
}
