//! アクセント位置の補助関数
//!
//! アクセント位置は語末から数えた母音の番号で表されます。
//! `0`は最後の母音、`1`はその前の母音を指し、[`ACCENT_UNDEFINED`]は位置が未定であることを示します。

/// アクセント位置が未定であることを示す値
pub const ACCENT_UNDEFINED: u8 = 255;

/// [`set_accent`]が挿入するアクセント記号
pub const ACCENT_MARK: &str = "<";

const VOWELS: &str = "АОУЭИЫЯЕЁЮаоуэиыяеёюAOUEIaouei";

/// 文字が母音かどうかを返します。
#[inline(always)]
pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

/// 単語に含まれる母音の数を返します。
pub fn count_vowels(word: &str) -> usize {
    word.chars().filter(|&c| is_vowel(c)).count()
}

/// アクセント位置に対応する母音の文字インデックスを返します。
///
/// # 引数
///
/// * `word` - 対象の単語
/// * `accent` - 語末から数えた母音の番号
///
/// # 戻り値
///
/// 母音の文字単位のインデックス。`accent`が[`ACCENT_UNDEFINED`]の場合や、
/// 単語の母音数を超える場合は`None`。
pub fn last_vowel_index(word: &str, accent: u8) -> Option<usize> {
    if accent == ACCENT_UNDEFINED {
        return None;
    }
    let chars: Vec<char> = word.chars().collect();
    chars
        .iter()
        .enumerate()
        .rev()
        .filter(|&(_, &c)| is_vowel(c))
        .nth(usize::from(accent))
        .map(|(i, _)| i)
}

/// アクセント位置の母音の直後に[`ACCENT_MARK`]を挿入した文字列を返します。
///
/// 位置を決められない場合は単語をそのまま返します。
///
/// # 例
///
/// ```
/// use udar::accent::set_accent;
///
/// assert_eq!(set_accent("МАМА", 0), "МАМА<");
/// assert_eq!(set_accent("МАМА", 1), "МА<МА");
/// assert_eq!(set_accent("МАМА", 255), "МАМА");
/// ```
pub fn set_accent(word: &str, accent: u8) -> String {
    set_accent_with(word, accent, ACCENT_MARK)
}

/// 任意のアクセント記号を用いて[`set_accent`]と同じ処理を行います。
pub fn set_accent_with(word: &str, accent: u8, mark: &str) -> String {
    let Some(idx) = last_vowel_index(word, accent) else {
        return word.to_string();
    };
    let mut result = String::with_capacity(word.len() + mark.len());
    for (i, c) in word.chars().enumerate() {
        result.push(c);
        if i == idx {
            result.push_str(mark);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_vowels() {
        assert_eq!(count_vowels("СТОЛ"), 1);
        assert_eq!(count_vowels("молоко"), 3);
        assert_eq!(count_vowels("ВСТР"), 0);
        assert_eq!(count_vowels("radio"), 3);
    }

    #[test]
    fn test_last_vowel_index() {
        assert_eq!(last_vowel_index("МОЛОКО", 0), Some(5));
        assert_eq!(last_vowel_index("МОЛОКО", 2), Some(1));
        assert_eq!(last_vowel_index("МОЛОКО", 3), None);
        assert_eq!(last_vowel_index("МОЛОКО", ACCENT_UNDEFINED), None);
    }

    #[test]
    fn test_set_accent_first_char() {
        assert_eq!(set_accent("ОКНО", 1), "О<КНО");
    }

    #[test]
    fn test_set_accent() {
        assert_eq!(set_accent("ДОРОГА", 0), "ДОРОГА<");
        assert_eq!(set_accent("ДОРОГА", 1), "ДОРО<ГА");
        assert_eq!(set_accent("ДОРОГА", 2), "ДО<РОГА");
    }

    #[test]
    fn test_set_accent_unchanged() {
        assert_eq!(set_accent("ДОРОГА", ACCENT_UNDEFINED), "ДОРОГА");
        assert_eq!(set_accent("ДОРОГА", 3), "ДОРОГА");
        assert_eq!(set_accent("", 0), "");
    }

    #[test]
    fn test_set_accent_with() {
        assert_eq!(set_accent_with("ВОДА", 0, "\u{301}"), "ВОДА\u{301}");
    }
}
