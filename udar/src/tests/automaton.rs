use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use crate::dictionary::index::automaton::{Automaton, AutomatonBuilder};

fn build(map: &BTreeMap<String, u32>) -> Automaton {
    let mut b = AutomatonBuilder::new();
    for (k, &v) in map {
        b.insert(k, v).unwrap();
    }
    b.finish().unwrap()
}

fn num_trie_nodes(map: &BTreeMap<String, u32>) -> usize {
    let mut prefixes = BTreeSet::new();
    for key in map.keys() {
        let chars: Vec<char> = key.chars().collect();
        for i in 0..=chars.len() {
            prefixes.insert(chars[..i].iter().collect::<String>());
        }
    }
    prefixes.len().max(1)
}

fn keys() -> impl Strategy<Value = BTreeMap<String, u32>> {
    prop::collection::btree_map("[АБВО]{0,6}", 0u32..4, 0..40)
}

proptest! {
    #[test]
    fn matches_btree_map(map in keys(), probes in prop::collection::vec("[АБВОГ]{0,7}", 0..20)) {
        let a = build(&map);
        prop_assert_eq!(a.len(), map.len());
        prop_assert_eq!(
            a.iter().collect::<Vec<_>>(),
            map.iter().map(|(k, &v)| (k.clone(), v)).collect::<Vec<_>>()
        );
        for probe in map.keys().chain(probes.iter()) {
            prop_assert_eq!(a.get(probe), map.get(probe).copied());
        }
    }

    #[test]
    fn predictive_matches_range(map in keys(), prefix in "[АБВО]{0,3}") {
        let a = build(&map);
        let expected: Vec<(String, u32)> = map
            .iter()
            .filter(|(k, _)| k.starts_with(prefix.as_str()))
            .map(|(k, &v)| (k.clone(), v))
            .collect();
        prop_assert_eq!(a.predictive_iter(&prefix).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn common_prefix_len_is_longest_path(map in keys(), input in "[АБВОГ]{0,8}") {
        let a = build(&map);
        let chars: Vec<char> = input.chars().collect();
        let expected = (0..=chars.len())
            .rev()
            .find(|&n| {
                let head: String = chars[..n].iter().collect();
                n == 0 || map.keys().any(|k| k.starts_with(head.as_str()))
            })
            .unwrap_or(0);
        prop_assert_eq!(a.common_prefix_len(&input), expected);

        let hits: Vec<(usize, u32)> = a.common_prefix_iter(&input).collect();
        for (n, v) in hits {
            let head: String = chars[..n].iter().collect();
            prop_assert_eq!(map.get(&head).copied(), Some(v));
        }
    }

    #[test]
    fn never_larger_than_trie(map in keys()) {
        let a = build(&map);
        prop_assert!(a.num_states() <= num_trie_nodes(&map));
    }
}

#[test]
fn test_shared_suffixes_are_merged() {
    let mut map = BTreeMap::new();
    for stem in ["ЗАМ", "МАМ", "РАМ", "ДАМ"] {
        for ending in ["А", "Ы", "Е", "У", "ОЙ"] {
            map.insert(format!("{stem}{ending}"), 1);
        }
    }
    let a = build(&map);
    assert!(a.num_states() < num_trie_nodes(&map) / 2);
    assert_eq!(a.get("ДАМОЙ"), Some(1));
}

#[test]
fn test_archived_automaton() {
    let mut map = BTreeMap::new();
    map.insert("ДОМ".to_string(), 0);
    map.insert("ДОМА".to_string(), 1);
    map.insert("ДЫМ".to_string(), 2);
    let a = build(&map);

    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&a).unwrap();
    let archived =
        rkyv::access::<rkyv::Archived<Automaton>, rkyv::rancor::Error>(&bytes).unwrap();
    assert_eq!(archived.get("ДОМА"), Some(1));
    assert_eq!(archived.get("ДО"), None);
    assert_eq!(archived.common_prefix_len("ДОМИК"), 3);
    assert_eq!(
        archived.iter().collect::<Vec<_>>(),
        a.iter().collect::<Vec<_>>()
    );
}
