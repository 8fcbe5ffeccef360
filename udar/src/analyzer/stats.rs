//! 索引のアクセントに関する統計情報

use crate::accent::{ACCENT_UNDEFINED, count_vowels};
use crate::dictionary::index::FormIndexRef;
use crate::errors::Result;

/// 3つ以上のアクセント位置を持ち、未定（255）を含まない綴り
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManyAccentSpelling {
    pub spelling: String,
    pub vowels: usize,
    /// アクセント位置（索引に格納された順）
    pub accents: Vec<u8>,
}

/// 索引のすべての綴りについてのアクセントの統計情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub num_spellings: usize,
    /// アクセント位置が未定のみで、母音が1つ以下の綴りの数
    pub undetermined_at_most_one_vowel: usize,
    pub undetermined_many_vowels: usize,
    /// アクセント位置が1つに決まり、母音が1つ以下の綴りの数
    pub single_at_most_one_vowel: usize,
    pub single_many_vowels: usize,
    pub two_accents: usize,
    /// 3つ以上のアクセント位置を持つ綴りの数
    pub many_accents: usize,
    /// 3つ以上のアクセント位置を持ち、未定を含まない綴り
    pub many_accents_defined: Vec<ManyAccentSpelling>,
}

impl IndexStats {
    /// 索引のすべての綴りを走査して統計情報を計算します。
    ///
    /// # エラー
    ///
    /// 索引のペイロードが破損している場合にエラーを返します。
    pub fn from_index(index: FormIndexRef<'_>) -> Result<Self> {
        let mut stats = Self::default();
        for entry in index.iter() {
            let (spelling, interp) = entry?;
            let vowels = count_vowels(&spelling);
            let accents: Vec<u8> = interp.accents().collect();
            stats.num_spellings += 1;
            match accents.as_slice() {
                [ACCENT_UNDEFINED] if vowels <= 1 => stats.undetermined_at_most_one_vowel += 1,
                [ACCENT_UNDEFINED] => stats.undetermined_many_vowels += 1,
                [_] if vowels <= 1 => stats.single_at_most_one_vowel += 1,
                [_] => stats.single_many_vowels += 1,
                [_, _] => stats.two_accents += 1,
                _ => {
                    stats.many_accents += 1;
                    if !accents.contains(&ACCENT_UNDEFINED) {
                        stats.many_accents_defined.push(ManyAccentSpelling {
                            spelling,
                            vowels,
                            accents,
                        });
                    }
                }
            }
        }
        log::debug!("[udar] index stats over {} spellings", stats.num_spellings);
        Ok(stats)
    }

    /// アクセント位置が未定のみの綴りの数を返します。
    pub fn undetermined(&self) -> usize {
        self.undetermined_at_most_one_vowel + self.undetermined_many_vowels
    }

    /// アクセント位置が1つに決まる綴りの数を返します。
    pub fn single(&self) -> usize {
        self.single_at_most_one_vowel + self.single_many_vowels
    }
}

#[cfg(test)]
mod tests {
    use crate::Dictionary;
    use crate::dictionary::FormIndexBuilder;

    use super::*;

    #[test]
    fn test_index_stats() {
        let mut b = FormIndexBuilder::new();
        b.add("И", 255, 0);
        b.add("МАМА", 255, 0);
        b.add("ДОМ", 0, 1);
        b.add("РАМА", 1, 1);
        b.add("ЗАМОК", 0, 1);
        b.add("ЗАМОК", 1, 2);
        b.add("ПАРОХОД", 0, 1);
        b.add("ПАРОХОД", 1, 1);
        b.add("ПАРОХОД", 2, 1);
        b.add("МОЛОКО", 0, 1);
        b.add("МОЛОКО", 1, 1);
        b.add("МОЛОКО", 255, 1);
        let dict = Dictionary::from_index(b.build().unwrap());
        let stats = IndexStats::from_index(dict.index()).unwrap();

        assert_eq!(stats.num_spellings, 7);
        assert_eq!(stats.undetermined_at_most_one_vowel, 1);
        assert_eq!(stats.undetermined_many_vowels, 1);
        assert_eq!(stats.undetermined(), 2);
        assert_eq!(stats.single_at_most_one_vowel, 1);
        assert_eq!(stats.single_many_vowels, 1);
        assert_eq!(stats.single(), 2);
        assert_eq!(stats.two_accents, 1);
        assert_eq!(stats.many_accents, 2);
        assert_eq!(
            stats.many_accents_defined,
            vec![ManyAccentSpelling {
                spelling: "ПАРОХОД".to_string(),
                vowels: 3,
                accents: vec![0, 1, 2],
            }]
        );
    }
}
