use std::collections::BTreeSet;

use p2_config::{Config, ConfigSequence, Key, Value};
use proptest::prelude::*;

// Segments chosen so that many keys share string prefixes without being
// hierarchical descendants of each other.
const SEGMENTS: &[&str] = &["a", "ab", "abc", "abcd", "abc!", "abc-", "b", "z"];

fn key_strategy() -> impl Strategy<Value = Key> {
    prop::collection::vec(prop::sample::select(SEGMENTS), 1..=3)
        .prop_map(|segments| Key::new(segments.join(":")))
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0..3_i64).prop_map(|i| Value::text(format!("v{i}"))),
        (0..3_i64).prop_map(Value::Int),
    ]
}

fn config_strategy() -> impl Strategy<Value = Config> {
    prop::collection::vec((key_strategy(), value_strategy()), 0..12)
        .prop_map(|items| items.into_iter().collect())
}

fn steps_strategy() -> impl Strategy<Value = Vec<Config>> {
    prop::collection::vec(config_strategy(), 0..6)
}

#[test]
fn test_adversarial_prefix_keys_are_not_descendants() {
    let config = Config::new()
        .with(Key::new("abc"), "self")
        .with(Key::new("abc!"), "bang")
        .with(Key::new("abc-"), "dash")
        .with(Key::new("abc:x"), "child")
        .with(Key::new("abcd"), "sibling")
        .with(Key::new("abcd:x"), "cousin");
    let keys: Vec<_> = config
        .get_all(&Key::new("abc"))
        .keys()
        .map(|k| k.to_string())
        .collect();
    assert_eq!(keys, vec!["abc", "abc:x"]);
}

proptest! {
    #[test]
    fn prop_compact_then_complete_round_trips(raw in steps_strategy()) {
        let complete = ConfigSequence::from_deltas(raw).complete_view().to_vec();
        let seq = ConfigSequence::from_complete(complete.clone());
        let compact = seq.compact_view().to_vec();
        let rebuilt = ConfigSequence::from_deltas(compact);
        prop_assert_eq!(rebuilt.complete_view(), complete.as_slice());
    }

    #[test]
    fn prop_compact_view_is_minimal(raw in steps_strategy()) {
        let seq = ConfigSequence::from_steps(raw);
        let complete = seq.complete_view().to_vec();
        for (i, delta) in seq.compact_view().iter().enumerate().skip(1) {
            for (key, value) in delta.entries() {
                prop_assert_ne!(complete[i - 1].get(key), Some(value));
            }
        }
    }

    #[test]
    fn prop_get_all_matches_brute_force(config in config_strategy(), parent in key_strategy()) {
        let expected: Config = config
            .entries()
            .filter(|(k, _)| parent.is_parent_of(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        prop_assert_eq!(config.get_all(&parent), expected);
    }

    #[test]
    fn prop_remove_all_is_complement_of_get_all(config in config_strategy(), parent in key_strategy()) {
        let mut removed = config.clone();
        removed.remove_all(&parent);
        let mut merged = removed.clone();
        merged.put_all(&config.get_all(&parent));
        prop_assert_eq!(merged, config.clone());
        prop_assert!(removed.keys().all(|k| !parent.is_parent_of(k)));
    }

    #[test]
    fn prop_retain_all_is_idempotent(config in config_strategy(), parent in key_strategy()) {
        let mut once = config.clone();
        once.retain_all(&parent);
        let mut twice = once.clone();
        twice.retain_all(&parent);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_matches_is_subset(config in config_strategy(), template in config_strategy()) {
        let subset = template.entries().all(|(k, v)| config.get(k) == Some(v));
        prop_assert_eq!(config.matches(&template), subset);
        prop_assert!(config.matches(&Config::new()));
        prop_assert!(config.matches(&config));
    }

    #[test]
    fn prop_retained_items_are_matched(config in config_strategy(), template in config_strategy()) {
        let mut common = config.clone();
        common.retain_items(&template);
        prop_assert!(config.matches(&common));
        prop_assert!(template.matches(&common));
    }

    #[test]
    fn prop_iterated_keys_match_brute_force(raw in steps_strategy()) {
        let seq = ConfigSequence::from_steps(raw);
        let complete = seq.complete_view();
        let mut iterated = BTreeSet::new();
        if let Some(first) = complete.first() {
            for step in &complete[1..] {
                for (k, v) in step.entries() {
                    if first.get(k) != Some(v) {
                        iterated.insert(k.clone());
                    }
                }
            }
        }
        prop_assert_eq!(seq.iterated_keys(), iterated.clone());

        let fixed: BTreeSet<Key> = complete
            .first()
            .map(|first| first.keys().filter(|k| !iterated.contains(*k)).cloned().collect())
            .unwrap_or_default();
        prop_assert_eq!(seq.static_keys(), fixed);
    }

    #[test]
    fn prop_incremental_add_step_matches_rebuild(raw in steps_strategy(), extra in config_strategy()) {
        let mut seq = ConfigSequence::from_steps(raw.clone());
        let _ = seq.compact_view();
        let _ = seq.complete_view();
        seq.add_step(extra.clone());

        let mut all = raw;
        all.push(extra);
        let rebuilt = ConfigSequence::from_steps(all);
        prop_assert_eq!(seq.complete_view(), rebuilt.complete_view());
        prop_assert_eq!(seq.compact_view(), rebuilt.compact_view());
    }

    #[test]
    fn prop_pairs_round_trip_text(items in prop::collection::vec((key_strategy(), "[a-z0-9]{0,6}"), 0..10)) {
        let config: Config = items
            .into_iter()
            .map(|(k, v)| (k, Value::Text(v)))
            .collect();
        let restored = Config::from_pairs(config.to_pairs()).unwrap();
        prop_assert_eq!(restored, config);
    }
}
