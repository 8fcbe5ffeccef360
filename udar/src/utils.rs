//! ユーティリティ関数と型変換トレイトを提供するモジュール
//!
//! - `FromU32`: u32からの型変換トレイト
//! - 区切り文字付きフィールドの分割

/// u32から他の型への変換を提供するトレイト
///
/// 標準ライブラリのFromトレイトとは異なり、特定の最適化や
/// プラットフォーム固有の仮定を行うことができます。
pub trait FromU32 {
    /// u32値から実装型を生成する
    ///
    /// # 引数
    ///
    /// * `src` - 変換元のu32値
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    /// u32値をusizeに変換する
    ///
    /// ポインタ幅が32ビットまたは64ビットであることが保証されているため、
    /// この変換は常に成功します。
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}

/// 区切り文字でフィールドを分割し、空のフィールドを取り除く
///
/// # 例
///
/// ```
/// # use udar::utils::split_fields;
/// assert_eq!(split_fields("a,,b,", ','), vec!["a", "b"]);
/// ```
pub fn split_fields(row: &str, sep: char) -> Vec<&str> {
    row.split(sep).filter(|f| !f.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields() {
        assert_eq!(&["ый", "ого"], split_fields("ый%ого", '%').as_slice());
    }

    #[test]
    fn test_split_fields_drops_empty() {
        assert_eq!(&["ый", "ого"], split_fields("%ый%%ого%", '%').as_slice());
        assert!(split_fields("", '%').is_empty());
    }
}
