//! アクセント辞書モジュール。
//!
//! このモジュールは、語形の索引の構築、保存、読み込みを行います。
//! 主な機能として以下を提供します:
//!
//! - MRD形式の辞書ソースからの索引構築
//! - ゼロコピーデシリアライゼーションによる高速な索引アクセス
//! - メモリマップドファイルによる効率的なメモリ使用
//!
//! # 索引の読み込み方法
//!
//! - [`Dictionary::from_path`]: ファイルパスから索引を読み込む(推奨)
//! - [`Dictionary::read`]: リーダーから索引を読み込む
//! - [`Dictionary::load_or_build`]: 索引ファイルが無ければ辞書ソースから構築して保存する
//!
//! # 索引のビルド
//!
//! [`FormIndexBuilder`]を使用して、辞書ソースの語形から索引を構築できます。
pub mod builder;
pub mod index;
pub mod source;

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use rkyv::rancor::Error;
use rkyv::util::AlignedVec;
use rkyv::{
    access, api::serialize_using, ser::allocator::Arena, ser::sharing::Share,
    ser::writer::IoWriter, ser::Serializer, util::with_arena,
};

use crate::dictionary::index::{ArchivedFormIndex, FormIndex, FormIndexRef};
use crate::errors::{Result, UdarError};
use crate::gramtab::Gramtab;

pub use crate::dictionary::builder::FormIndexBuilder;
pub use crate::dictionary::index::payload::Interpretation;
pub use crate::dictionary::source::{MrdSource, WordForm};

/// udarの索引ファイルを識別するマジックバイト。
///
/// この定数のバージョンは索引フォーマットのバージョンを示しており、
/// クレートのセマンティックバージョンからは切り離されています。
pub const MODEL_MAGIC: &[u8] = b"UdarFormIndex 0.1\n";

const MODEL_MAGIC_LEN: usize = MODEL_MAGIC.len();
const RKYV_ALIGNMENT: usize = 16;
const PADDING_LEN: usize = (RKYV_ALIGNMENT - (MODEL_MAGIC_LEN % RKYV_ALIGNMENT)) % RKYV_ALIGNMENT;
const DATA_START: usize = MODEL_MAGIC_LEN + PADDING_LEN;

/// メモリバッファ(mmapまたはヒープ)を所有し、アーカイブされた索引へのアクセスを提供するラッパー。
enum DictBuffer {
    Mmap(Mmap),
    Aligned(AlignedVec<16>),
}

impl DictBuffer {
    /// アーカイブ本体のバイト列を返します。
    fn data_bytes(&self) -> &[u8] {
        match self {
            Self::Mmap(mmap) => mmap.get(DATA_START..).unwrap_or_default(),
            Self::Aligned(bytes) => bytes.as_slice(),
        }
    }
}

/// 読み取り専用の索引。
///
/// 2つのバリアントがあります:
/// - `Archived`: メモリマップまたはアライメント済みバッファから直接アクセスされる索引
/// - `Owned`: ヒープ上に所有される索引(構築直後など)
///
/// 構築または読み込みの後は変更されないため、`Arc`で共有して複数スレッドから参照できます。
pub enum Dictionary {
    Archived(ArchivedDictionary),
    Owned { index: Arc<FormIndex> },
}

/// アーカイブ形式の索引。
///
/// メモリバッファとアーカイブされた索引データへの参照を保持します。
pub struct ArchivedDictionary {
    _buffer: DictBuffer,
    data: &'static ArchivedFormIndex,
}

impl Deref for ArchivedDictionary {
    type Target = ArchivedFormIndex;
    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl FormIndex {
    /// 索引データを`rkyv`フォーマットを使用してライターにシリアライズします。
    ///
    /// 出力は[`Dictionary::from_path`]と[`Dictionary::read`]が期待する形式です。
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - 基礎となる`writer`への書き込みに失敗した場合(例: I/Oエラー)。
    /// - `rkyv`シリアライゼーションプロセスでエラーが発生した場合。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(MODEL_MAGIC)?;

        let padding_bytes = vec![0xFF; PADDING_LEN];
        wtr.write_all(&padding_bytes)?;

        with_arena(|arena: &mut Arena| {
            let writer = IoWriter::new(&mut wtr);
            let mut serializer = Serializer::new(writer, arena.acquire(), Share::new());
            serialize_using::<_, rkyv::rancor::Error>(self, &mut serializer)
        })
        .map_err(|e| {
            UdarError::invalid_state("rkyv serialization failed".to_string(), e.to_string())
        })?;

        Ok(())
    }
}

impl Dictionary {
    /// 構築済みの索引から辞書を作成します。
    pub fn from_index(index: FormIndex) -> Self {
        Self::Owned {
            index: Arc::new(index),
        }
    }

    /// 辞書ソースのすべての語形から索引を構築します。
    ///
    /// # エラー
    ///
    /// 語形の展開、またはペイロードの符号化に失敗した場合にエラーを返します。
    pub fn from_source(source: &MrdSource) -> Result<Self> {
        FormIndexBuilder::from_source(source).map(Self::from_index)
    }

    /// 索引への参照を返します。
    #[inline(always)]
    pub fn index(&self) -> FormIndexRef<'_> {
        match self {
            Self::Archived(archived) => FormIndexRef::Archived(archived.data),
            Self::Owned { index } => FormIndexRef::Owned(index),
        }
    }

    /// 綴りに対応する解釈集合を返します。
    ///
    /// 綴りは大文字に正規化してから検索されます。見つからない場合は`None`を返します。
    ///
    /// # エラー
    ///
    /// 索引のペイロードが破損している場合にエラーを返します。
    pub fn lookup(&self, word: &str) -> Result<Option<Interpretation>> {
        self.index().get(&index::normalize(word))
    }

    /// 索引を`rkyv`フォーマットでライターにシリアライズします。
    ///
    /// アーカイブ版の場合は、読み込んだアーカイブをそのまま書き出します。
    ///
    /// # エラー
    ///
    /// 書き込みまたはシリアライゼーションに失敗した場合にエラーを返します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        match self {
            Self::Owned { index } => index.write(wtr),
            Self::Archived(archived) => {
                wtr.write_all(MODEL_MAGIC)?;
                wtr.write_all(&[0xFF; PADDING_LEN])?;
                wtr.write_all(archived._buffer.data_bytes())?;
                Ok(())
            }
        }
    }

    /// すべてのデータをヒープバッファに読み込むことで、リーダーから索引を作成します。
    ///
    /// ファイルパスが利用できない場合(例: メモリ内バッファからの読み込み)のフォールバックです。
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - データを読み込めない場合。
    /// - マジックナンバーが一致しない場合。
    /// - アーカイブの検証に失敗した場合。
    pub fn read<R: Read>(mut rdr: R) -> Result<Self> {
        let mut magic = [0; MODEL_MAGIC_LEN];
        rdr.read_exact(&mut magic)?;

        if magic != MODEL_MAGIC {
            return Err(UdarError::invalid_argument(
                "rdr",
                "The magic number of the input index mismatches.",
            ));
        }

        let mut padding_buf = vec![0; PADDING_LEN];
        rdr.read_exact(&mut padding_buf)?;

        let mut buffer = Vec::new();
        rdr.read_to_end(&mut buffer)?;

        let mut aligned_bytes = AlignedVec::with_capacity(buffer.len());
        aligned_bytes.extend_from_slice(&buffer);

        let archived = access::<ArchivedFormIndex, Error>(&aligned_bytes).map_err(|e| {
            UdarError::invalid_state(
                "rkyv validation failed. The index file may be corrupted or incompatible."
                    .to_string(),
                e.to_string(),
            )
        })?;

        // SAFETY: AlignedVec ensures correct alignment for ArchivedFormIndex,
        // and the buffer is owned by the returned value.
        let data: &'static ArchivedFormIndex = unsafe { &*(archived as *const _) };

        Ok(Self::Archived(ArchivedDictionary {
            _buffer: DictBuffer::Aligned(aligned_bytes),
            data,
        }))
    }

    /// メモリマッピングを使用してファイルパスから索引を作成します。
    ///
    /// 索引ファイルをメモリにマップし、その場で検証してゼロコピーでアクセスします。
    /// マップされた領域のアライメントが合わない場合は、アライメント済みバッファにコピーします。
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - ファイルを開けない、または読み込めない場合（[`UdarError::Io`]）。
    /// - ファイルが破損している、またはマジックナンバーが一致しない場合。
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut magic = [0u8; MODEL_MAGIC_LEN];
        file.read_exact(&mut magic)?;

        if magic != MODEL_MAGIC {
            return Err(UdarError::invalid_argument(
                "path",
                "The magic number of the input index mismatches.",
            ));
        }

        // SAFETY: the mapping is read-only and owned by the returned value.
        let mmap = unsafe { Mmap::map(&file)? };

        let Some(data_bytes) = mmap.get(DATA_START..) else {
            return Err(UdarError::invalid_argument(
                "path",
                "Index file too small or corrupted.",
            ));
        };

        match access::<ArchivedFormIndex, Error>(data_bytes) {
            Ok(archived) => {
                log::debug!("[udar] mapped index {:?} in place", path);
                let data: &'static ArchivedFormIndex = unsafe { &*(archived as *const _) };
                Ok(Self::Archived(ArchivedDictionary {
                    _buffer: DictBuffer::Mmap(mmap),
                    data,
                }))
            }
            Err(_) => {
                let mut aligned_bytes = AlignedVec::with_capacity(data_bytes.len());
                aligned_bytes.extend_from_slice(data_bytes);

                let archived =
                    access::<ArchivedFormIndex, Error>(&aligned_bytes).map_err(|e| {
                        UdarError::invalid_state(
                            "rkyv validation failed. The index file may be corrupted or incompatible."
                                .to_string(),
                            e.to_string(),
                        )
                    })?;

                let data: &'static ArchivedFormIndex = unsafe { &*(archived as *const _) };
                Ok(Self::Archived(ArchivedDictionary {
                    _buffer: DictBuffer::Aligned(aligned_bytes),
                    data,
                }))
            }
        }
    }

    /// 索引ファイルがあれば読み込み、無ければ辞書ソースから構築して保存します。
    ///
    /// 構築した索引は同じディレクトリの一時ファイルに書き込んでから
    /// `index_path`へ移動されるため、書き込み途中の索引ファイルが残ることはありません。
    /// グラムタブの使用頻度は、辞書ソースを読み込んだ場合にのみ数えられます。
    ///
    /// # 引数
    ///
    /// * `index_path` - 索引ファイルのパス
    /// * `mrd_path` - MRD形式の辞書ソースのパス
    /// * `gramtab` - アンコードを解決するグラムタブ
    ///
    /// # エラー
    ///
    /// 読み込み、構築、書き込みのいずれかに失敗した場合にエラーを返します。
    pub fn load_or_build<P, Q>(index_path: P, mrd_path: Q, gramtab: &mut Gramtab) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let index_path = index_path.as_ref();
        if index_path.exists() {
            log::info!("[udar] loading index {:?}", index_path);
            return Self::from_path(index_path);
        }

        log::info!(
            "[udar] index {:?} not found, building from {:?}",
            index_path,
            mrd_path.as_ref()
        );
        let source = MrdSource::from_path(mrd_path, gramtab)?;
        let index = FormIndexBuilder::from_source(&source)?;

        let dir = match index_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut wtr = BufWriter::new(tmp.as_file_mut());
            index.write(&mut wtr)?;
            wtr.flush()?;
        }
        tmp.persist(index_path)?;

        Ok(Self::from_index(index))
    }
}
