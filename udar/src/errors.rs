//! エラー型の定義
//!
//! このモジュールは、udarライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt::{self, Debug};

/// udar専用のResult型
///
/// エラー型としてデフォルトで[`UdarError`]を使用します。
pub type Result<T, E = UdarError> = std::result::Result<T, E>;

/// udarのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 辞書ファイルの解析は最初のエラーで中断され、部分的な辞書は返されません。
/// 辞書引きで単語が見つからないことはエラーではなく、`None`で表現されます。
#[derive(Debug, thiserror::Error)]
pub enum UdarError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// 辞書ソースやグラムタブのセクション見出し・レコードが不正な場合に発生します。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 範囲外参照エラー
    ///
    /// モデル・セッション・接頭辞集合・ペイロードへの参照や、
    /// テキストのオフセットが範囲外の場合に発生します。
    #[error(transparent)]
    OutOfRange(OutOfRangeError),

    /// 未登録キーエラー
    ///
    /// グラムタブに登録されていないアンコードを参照した場合に発生します。
    #[error(transparent)]
    NotFound(NotFoundError),

    /// 容量超過エラー
    ///
    /// ペイロードのバイナリ表現の上限を超えた場合に発生します。
    #[error(transparent)]
    Capacity(CapacityError),

    /// 無効な操作エラー
    ///
    /// ページサイズより長い文字列をページングテキストで検索した場合などに発生します。
    #[error(transparent)]
    InvalidOperation(InvalidOperationError),

    /// 無効な状態エラー
    ///
    /// [`InvalidStateError`]のエラーバリアント。
    #[error(transparent)]
    InvalidState(InvalidStateError),

    /// 整数変換エラー
    ///
    /// [`TryFromIntError`](std::num::TryFromIntError)のエラーバリアント。
    #[error(transparent)]
    TryFromInt(std::num::TryFromIntError),

    /// 整数パースエラー
    ///
    /// [`ParseIntError`](std::num::ParseIntError)のエラーバリアント。
    #[error(transparent)]
    ParseInt(std::num::ParseIntError),

    /// UTF-8エンコーディングエラー
    ///
    /// [`std::str::Utf8Error`]のエラーバリアント。
    #[error(transparent)]
    Utf8(std::str::Utf8Error),

    /// I/Oエラー
    ///
    /// [`std::io::Error`](std::io::Error)のエラーバリアント。
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// rkyvシリアライゼーションエラー
    ///
    /// [`rkyv::rancor::Error`](rkyv::rancor::Error)のエラーバリアント。
    #[error(transparent)]
    Rkyv(#[from] rkyv::rancor::Error),

    /// 一時ファイルの永続化エラー
    ///
    /// [`tempfile::PersistError`](tempfile::PersistError)のエラーバリアント。
    #[error(transparent)]
    PathPersist(#[from] tempfile::PersistError),
}

impl UdarError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名（ファイル名やセクション名）
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    /// 範囲外参照エラーを生成します
    ///
    /// # 引数
    ///
    /// * `what` - 参照先の名前
    /// * `index` - 参照されたインデックス
    /// * `len` - 参照先の要素数
    /// * `context` - どこで参照されたか（例: 問題のあるレンマ）
    pub(crate) fn out_of_range<S>(what: &'static str, index: usize, len: usize, context: S) -> Self
    where
        S: Into<String>,
    {
        Self::OutOfRange(OutOfRangeError {
            what,
            index,
            len,
            context: context.into(),
        })
    }

    /// 未登録キーエラーを生成します
    ///
    /// # 引数
    ///
    /// * `what` - 検索対象の名前
    /// * `key` - 見つからなかったキー
    pub(crate) fn not_found<S>(what: &'static str, key: S) -> Self
    where
        S: Into<String>,
    {
        Self::NotFound(NotFoundError {
            what,
            key: key.into(),
        })
    }

    /// 容量超過エラーを生成します
    ///
    /// # 引数
    ///
    /// * `what` - 上限を超えた項目
    /// * `value` - 実際の値
    /// * `limit` - 許容される最大値
    pub(crate) fn capacity(what: &'static str, value: usize, limit: usize) -> Self {
        Self::Capacity(CapacityError { what, value, limit })
    }

    /// 無効な操作エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_operation<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidOperation(InvalidOperationError { msg: msg.into() })
    }

    /// 無効な状態エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    /// * `cause` - エラーの原因
    pub(crate) fn invalid_state<S, M>(msg: S, cause: M) -> Self
    where
        S: Into<String>,
        M: Into<String>,
    {
        Self::InvalidState(InvalidStateError {
            msg: msg.into(),
            cause: cause.into(),
        })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 位置による参照が範囲外の場合に使用されるエラー
#[derive(Debug)]
pub struct OutOfRangeError {
    /// 参照先の名前
    pub(crate) what: &'static str,

    /// 参照されたインデックス
    pub(crate) index: usize,

    /// 参照先の要素数
    pub(crate) len: usize,

    /// 参照元の説明
    pub(crate) context: String,
}

impl OutOfRangeError {
    /// 参照されたインデックスを返します。
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "OutOfRangeError: {} index {} is out of range (len {})",
            self.what, self.index, self.len
        )?;
        if !self.context.is_empty() {
            write!(f, ": {}", self.context)?;
        }
        Ok(())
    }
}

impl Error for OutOfRangeError {}

/// キーが登録されていない場合に使用されるエラー
#[derive(Debug)]
pub struct NotFoundError {
    /// 検索対象の名前
    pub(crate) what: &'static str,

    /// 見つからなかったキー
    pub(crate) key: String,
}

impl NotFoundError {
    /// 見つからなかったキーを返します。
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NotFoundError: {}: {:?}", self.what, self.key)
    }
}

impl Error for NotFoundError {}

/// バイナリ表現の上限を超えた場合に使用されるエラー
#[derive(Debug)]
pub struct CapacityError {
    /// 上限を超えた項目
    pub(crate) what: &'static str,

    /// 実際の値
    pub(crate) value: usize,

    /// 許容される最大値
    pub(crate) limit: usize,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CapacityError: {} is {}, but at most {} is allowed",
            self.what, self.value, self.limit
        )
    }
}

impl Error for CapacityError {}

/// 操作が許可されない場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidOperationError {
    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidOperationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidOperationError: {}", self.msg)
    }
}

impl Error for InvalidOperationError {}

/// 状態が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidStateError {
    /// エラーメッセージ
    pub(crate) msg: String,

    /// エラーの根本原因
    pub(crate) cause: String,
}

impl fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidStateError: {}: {}", self.msg, self.cause)
    }
}

impl Error for InvalidStateError {}

impl From<std::num::TryFromIntError> for UdarError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}

impl From<std::num::ParseIntError> for UdarError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseInt(error)
    }
}

impl From<std::str::Utf8Error> for UdarError {
    fn from(error: std::str::Utf8Error) -> Self {
        Self::Utf8(error)
    }
}
