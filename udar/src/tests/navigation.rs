use std::io::Cursor;

use proptest::prelude::*;

use crate::errors::Result;
use crate::text::navigation::{
    ContentMode, LineNavigator, SentenceNavigator, SuperNavigator, UnitKind, UnitNavigator,
    WordNavigator, content_navigator,
};
use crate::text::{PagedText, PagedTextOptions, Segment, StringText, Text};

fn paged(s: &str, page_size: usize) -> PagedText<Cursor<Vec<u8>>> {
    let options = PagedTextOptions::new().page_size(page_size).max_pages(2);
    PagedText::new(Cursor::new(s.as_bytes().to_vec()), options).unwrap()
}

fn units(nav: &SuperNavigator, text: &mut dyn Text) -> Result<Vec<String>> {
    let segments = nav.units(&mut *text).collect::<Result<Vec<_>>>()?;
    segments
        .into_iter()
        .map(|s| text.substring_segment(s))
        .collect()
}

/// Maximal runs of letters and digits.
fn alnum_runs(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

const TEXT: &str = "[аБz1 .,!?\n\r-]{0,40}";

proptest! {
    #[test]
    fn base_navigators_agree_across_texts(s in TEXT, page_size in 1usize..7) {
        let navs: [Box<dyn UnitNavigator>; 3] = [
            Box::new(LineNavigator),
            Box::new(WordNavigator),
            Box::new(SentenceNavigator::with_window(5)),
        ];
        let mut expected = StringText::new(&s);
        let mut text = paged(&s, page_size);
        let len = isize::try_from(expected.len()).unwrap();
        for nav in &navs {
            for offset in -1..=len + 1 {
                prop_assert_eq!(
                    nav.next(&mut text, offset).ok(),
                    nav.next(&mut expected, offset).ok()
                );
                prop_assert_eq!(
                    nav.prev(&mut text, offset).ok(),
                    nav.prev(&mut expected, offset).ok()
                );
            }
        }
    }

    #[test]
    fn units_agree_across_texts(s in TEXT, page_size in 1usize..7) {
        for kind in [UnitKind::Word, UnitKind::Line, UnitKind::Sentence] {
            let nav = content_navigator(kind);
            let mut expected = StringText::new(&s);
            let mut text = paged(&s, page_size);
            prop_assert_eq!(units(&nav, &mut text).unwrap(), units(&nav, &mut expected).unwrap());
        }
    }

    #[test]
    fn word_units_are_alnum_runs(s in TEXT) {
        let nav = content_navigator(UnitKind::Word);
        let mut text = StringText::new(&s);
        prop_assert_eq!(units(&nav, &mut text).unwrap(), alnum_runs(&s));
    }

    #[test]
    fn units_are_ordered_and_disjoint(s in TEXT) {
        let len = isize::try_from(s.chars().count()).unwrap();
        for kind in [UnitKind::Word, UnitKind::Line, UnitKind::Sentence] {
            let nav = content_navigator(kind);
            let mut text = StringText::new(&s);
            let segments = nav.units(&mut text).collect::<Result<Vec<Segment>>>().unwrap();
            let mut last_end = 0;
            for seg in segments {
                prop_assert!(seg.length() > 0);
                prop_assert!(seg.offset() >= last_end);
                prop_assert!(seg.end_offset() <= len);
                last_end = seg.end_offset();
            }
        }
    }
}

#[test]
fn test_lines_over_paged_text() {
    let nav = content_navigator(UnitKind::Line);
    let mut text = paged("один\r\nдва\nтри", 3);
    assert_eq!(units(&nav, &mut text).unwrap(), vec!["один", "два", "три"]);
}

#[test]
fn test_sentences_over_paged_text() {
    let nav = content_navigator(UnitKind::Sentence);
    let mut text = paged("Мама мыла раму. А. С. Пушкин писал! Что?", 4);
    assert_eq!(
        units(&nav, &mut text).unwrap(),
        vec!["Мама мыла раму. ", "А. С. Пушкин писал! ", "Что?"]
    );
}

#[test]
fn test_forced_sentence_breaks() {
    let nav = SuperNavigator::new(SentenceNavigator::with_window(4), ContentMode::IncludeDelimiter);
    let mut text = StringText::new("абвгдежзик");
    assert_eq!(units(&nav, &mut text).unwrap(), vec!["абвгд", "ежзик"]);
    let mut text = paged("абвгдежзик", 3);
    assert_eq!(units(&nav, &mut text).unwrap(), vec!["абвгд", "ежзик"]);
}
