//! Property tests for group numbering
//!
//! Patterns are generated from a small item vocabulary together with the
//! output a simple numbering model predicts for them.

use std::collections::HashMap;

use lowex::{Origin, transpile};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Item {
    Literal(char),
    Group(char),
    Named(u8, char),
    Atomic(char),
    Possessive(char),
    BackAbsolute(u32),
    BackRelative(u32),
    BackNamed(u8),
}

fn item() -> impl Strategy<Value = Item> {
    let letter = prop::char::range('a', 'e');
    prop_oneof![
        letter.clone().prop_map(Item::Literal),
        letter.clone().prop_map(Item::Group),
        (0u8..3, letter.clone()).prop_map(|(n, c)| Item::Named(n, c)),
        letter.clone().prop_map(Item::Atomic),
        letter.prop_map(Item::Possessive),
        (1u32..5).prop_map(Item::BackAbsolute),
        (1u32..5).prop_map(Item::BackRelative),
        (0u8..3).prop_map(Item::BackNamed),
    ]
}

/// Numbering model: returns the origin pattern and the expected output
fn model(items: &[Item]) -> (String, String, u32) {
    let mut pattern = String::new();
    let mut expected = String::new();
    let mut count = 0u32;
    let mut originals: Vec<u32> = Vec::new();
    let mut names: HashMap<u8, u32> = HashMap::new();

    for item in items {
        match item {
            Item::Literal(c) => {
                pattern.push(*c);
                expected.push(*c);
            }
            Item::Group(c) => {
                count += 1;
                originals.push(count);
                pattern.push_str(&format!("({})", c));
                expected.push_str(&format!("({})", c));
            }
            Item::Named(n, c) => {
                count += 1;
                originals.push(count);
                names.insert(*n, count);
                pattern.push_str(&format!("(?<n{}>{})", n, c));
                expected.push_str(&format!("({})", c));
            }
            Item::Atomic(c) => {
                count += 1;
                pattern.push_str(&format!("(?>{})", c));
                expected.push_str(&format!("(?=({}))\\{}(?:)", c, count));
            }
            Item::Possessive(c) => {
                count += 1;
                pattern.push_str(&format!("{}++", c));
                expected.push_str(&format!("(?=({}+))\\{}(?:)", c, count));
            }
            Item::BackAbsolute(k) => {
                if let Some(ordinal) = originals.get(*k as usize - 1) {
                    pattern.push_str(&format!("\\k<{}>", k));
                    expected.push_str(&format!("\\{}", ordinal));
                }
            }
            Item::BackRelative(k) => {
                let k = *k as usize;
                if k <= originals.len() {
                    pattern.push_str(&format!("\\k<-{}>", k));
                    expected.push_str(&format!("\\{}", originals[originals.len() - k]));
                }
            }
            Item::BackNamed(n) => {
                if let Some(ordinal) = names.get(n) {
                    pattern.push_str(&format!("\\k<n{}>", n));
                    expected.push_str(&format!("\\{}", ordinal));
                }
            }
        }
    }
    (pattern, expected, count)
}

proptest! {
    #[test]
    fn test_numbering_matches_model(items in prop::collection::vec(item(), 0..16)) {
        let (pattern, expected, count) = model(&items);
        let result = transpile(&pattern).unwrap();
        prop_assert_eq!(&result.pattern, &expected);
        prop_assert_eq!(result.groups.len() as u32, count);
        prop_assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_ordinals_are_dense_and_sources_ordered(items in prop::collection::vec(item(), 0..16)) {
        let (pattern, _, _) = model(&items);
        let result = transpile(&pattern).unwrap();

        let mut next_source = 1;
        for (i, group) in result.groups.iter().enumerate() {
            prop_assert_eq!(group.ordinal, i as u32 + 1);
            match group.origin {
                Origin::Original => {
                    prop_assert_eq!(group.source_index, Some(next_source));
                    next_source += 1;
                }
                Origin::Synthetic => prop_assert_eq!(group.source_index, None),
            }
        }
    }

    #[test]
    fn test_conversion_is_deterministic(items in prop::collection::vec(item(), 0..16)) {
        let (pattern, _, _) = model(&items);
        prop_assert_eq!(transpile(&pattern).unwrap(), transpile(&pattern).unwrap());
    }
}
