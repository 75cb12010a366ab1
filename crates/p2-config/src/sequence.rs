//! Step-by-step configuration sequences
//!
//! A [`ConfigSequence`] is an ordered list of steps where each step is the
//! full instrument state at that point. Only the raw per-step changes are
//! stored; two views are derived on demand and cached:
//!
//! - **compact**: step `i > 0` holds only the items whose value differs from
//!   the resolved value at step `i - 1`
//! - **complete**: step `i` holds every item set at or before step `i`
//!
//! Appending to a sequence whose compact form and complete cache are both
//! current updates the cache in place. Any other structural change drops the
//! caches and they are rebuilt on next access.
//!
//! Step indices out of range are caller bugs and panic. "No such step" in a
//! search returns `None`.

use std::collections::{BTreeSet, HashSet};

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{Config, ImmutableConfig};
use crate::key::Key;
use crate::value::Value;

/// Ordered list of configuration steps with cached compact/complete views
///
/// Not `Sync`: reads fill caches through `&self`, so concurrent use must be
/// synchronized by the owner.
#[derive(Debug, Clone)]
pub struct ConfigSequence {
    /// Raw per-step changes, each merged onto the state before it
    deltas: Vec<Config>,
    /// Whether `deltas` is already minimal
    deltas_compact: bool,
    /// Minimal deltas, only populated while `deltas` is not minimal
    compact: OnceCell<Vec<Config>>,
    /// Fully resolved steps
    complete: OnceCell<Vec<Config>>,
}

impl Default for ConfigSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSequence {
    /// Empty sequence
    #[must_use]
    pub fn new() -> Self {
        Self {
            deltas: Vec::new(),
            deltas_compact: true,
            compact: OnceCell::new(),
            complete: OnceCell::new(),
        }
    }

    /// Sequence from raw steps
    ///
    /// Each step only needs to mention what it changes, though complete
    /// steps are equally valid input: both describe the same sequence.
    #[must_use]
    pub fn from_steps(steps: Vec<Config>) -> Self {
        let deltas_compact = steps.len() <= 1;
        Self {
            deltas: steps,
            deltas_compact,
            compact: OnceCell::new(),
            complete: OnceCell::new(),
        }
    }

    /// Sequence from fully resolved steps
    #[inline]
    #[must_use]
    pub fn from_complete(steps: Vec<Config>) -> Self {
        Self::from_steps(steps)
    }

    /// Sequence from per-step changes
    #[inline]
    #[must_use]
    pub fn from_deltas(deltas: Vec<Config>) -> Self {
        Self::from_steps(deltas)
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// Whether the sequence has no steps
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Remove every step
    pub fn clear(&mut self) {
        self.deltas.clear();
        self.deltas_compact = true;
        self.compact.take();
        self.complete.take();
    }

    /// Fully resolved steps
    pub fn complete_view(&self) -> &[Config] {
        self.complete.get_or_init(|| {
            tracing::trace!(steps = self.deltas.len(), "resolving complete sequence view");
            complete_of(&self.deltas)
        })
    }

    /// Minimal per-step changes
    pub fn compact_view(&self) -> &[Config] {
        if self.deltas_compact {
            return &self.deltas;
        }
        self.compact.get_or_init(|| {
            tracing::trace!(steps = self.deltas.len(), "compacting sequence");
            compact_of(&self.deltas)
        })
    }

    /// Resolved state at `step`
    ///
    /// # Panics
    /// Panics if `step` is out of range.
    #[must_use]
    pub fn step(&self, step: usize) -> &Config {
        self.check_index(step);
        &self.complete_view()[step]
    }

    /// Minimal change introduced at `step`
    ///
    /// # Panics
    /// Panics if `step` is out of range.
    #[must_use]
    pub fn compact_step(&self, step: usize) -> &Config {
        self.check_index(step);
        &self.compact_view()[step]
    }

    /// Resolved value of `key` at `step`
    ///
    /// # Panics
    /// Panics if `step` is out of range.
    #[must_use]
    pub fn item_value(&self, step: usize, key: &Key) -> Option<&Value> {
        self.step(step).get(key)
    }

    /// Resolved value of `key` at every step
    #[must_use]
    pub fn item_values_at_each_step(&self, key: &Key) -> Vec<Option<&Value>> {
        self.complete_view().iter().map(|c| c.get(key)).collect()
    }

    /// Distinct resolved values of `key`, in order of first appearance
    ///
    /// `None` is included when the key is absent at some step.
    #[must_use]
    pub fn distinct_item_values(&self, key: &Key) -> Vec<Option<&Value>> {
        let mut seen = HashSet::new();
        self.complete_view()
            .iter()
            .map(|c| c.get(key))
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Keys whose value changes after the first step, including late additions
    #[must_use]
    pub fn iterated_keys(&self) -> BTreeSet<Key> {
        let compact = self.compact_view();
        let Some((first, rest)) = compact.split_first() else {
            return BTreeSet::new();
        };
        rest.iter()
            .flat_map(Config::entries)
            .filter(|(k, v)| first.get(k) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Keys of the first step whose value never changes
    #[must_use]
    pub fn static_keys(&self) -> BTreeSet<Key> {
        let Some(first) = self.compact_view().first() else {
            return BTreeSet::new();
        };
        let iterated = self.iterated_keys();
        first
            .keys()
            .filter(|k| !iterated.contains(*k))
            .cloned()
            .collect()
    }

    /// Index of the first resolved step that contains every item of `template`
    #[must_use]
    pub fn index_matching(&self, template: &Config) -> Option<usize> {
        self.complete_view().iter().position(|c| c.matches(template))
    }

    /// First resolved step that contains every item of `template`
    #[must_use]
    pub fn first_match(&self, template: &Config) -> Option<&Config> {
        self.index_matching(template).map(|i| &self.complete_view()[i])
    }

    /// New sequence of the resolved steps accepted by `predicate`
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&Config) -> bool,
    {
        let kept = self
            .complete_view()
            .iter()
            .filter(|c| predicate(c))
            .cloned()
            .collect();
        Self::from_complete(kept)
    }

    /// New sequence of the resolved steps in `from..to`
    ///
    /// # Panics
    /// Panics if the range is out of bounds or reversed.
    #[must_use]
    pub fn sub_sequence(&self, from: usize, to: usize) -> Self {
        assert!(
            from <= to && to <= self.len(),
            "sub-sequence {from}..{to} out of range for sequence of {} steps",
            self.len()
        );
        Self::from_complete(self.complete_view()[from..to].to_vec())
    }

    /// Resolved steps, in order
    pub fn iter(&self) -> std::slice::Iter<'_, Config> {
        self.complete_view().iter()
    }

    /// Minimal per-step changes, in order
    pub fn compact_iter(&self) -> std::slice::Iter<'_, Config> {
        self.compact_view().iter()
    }

    /// Resolved steps as shareable read-only handles
    #[must_use]
    pub fn snapshot(&self) -> Vec<ImmutableConfig> {
        self.complete_view()
            .iter()
            .cloned()
            .map(ImmutableConfig::new)
            .collect()
    }

    /// Append a step
    ///
    /// `config` only needs the items that change; everything else is
    /// inherited from the previous step.
    pub fn add_step(&mut self, config: Config) {
        self.adopt_cached_compact();

        match (self.deltas_compact, self.complete.get_mut()) {
            (true, Some(complete)) => {
                let mut delta = config;
                let resolved = match complete.last() {
                    Some(last) => {
                        delta.remove_items(last);
                        let mut resolved = last.clone();
                        resolved.put_all(&delta);
                        resolved
                    }
                    None => delta.clone(),
                };
                complete.push(resolved);
                self.deltas.push(delta);
            }
            _ => {
                self.deltas.push(config);
                self.deltas_compact = self.deltas.len() == 1;
                self.invalidate();
            }
        }
    }

    /// Insert a step of changes before `step`
    ///
    /// Inserting at `len()` appends.
    ///
    /// # Panics
    /// Panics if `step > len()`.
    pub fn insert_step(&mut self, step: usize, config: Config) {
        assert!(
            step <= self.len(),
            "insert position {step} out of range for sequence of {} steps",
            self.len()
        );
        if step == self.len() {
            self.add_step(config);
            return;
        }
        self.make_compact();
        self.deltas.insert(step, config);
        self.deltas_compact = false;
        self.invalidate();
    }

    /// Replace the changes made at `step`
    ///
    /// Items first introduced at `step` and absent from `config` disappear;
    /// inherited items keep their earlier value.
    ///
    /// # Panics
    /// Panics if `step` is out of range.
    pub fn set_step(&mut self, step: usize, config: Config) {
        self.check_index(step);
        self.make_compact();
        self.deltas[step] = config;
        self.deltas_compact = self.deltas.len() == 1;
        self.invalidate();
    }

    /// Remove a step; later steps inherit from the one before it
    ///
    /// # Panics
    /// Panics if `step` is out of range.
    pub fn remove_step(&mut self, step: usize) {
        self.check_index(step);
        self.make_compact();
        self.deltas.remove(step);
        if step == self.deltas.len() {
            if let Some(complete) = self.complete.get_mut() {
                complete.pop();
            }
        } else {
            self.deltas_compact = self.deltas.len() <= 1;
            self.invalidate();
        }
    }

    fn check_index(&self, step: usize) {
        assert!(
            step < self.len(),
            "step {step} out of range for sequence of {} steps",
            self.len()
        );
    }

    fn invalidate(&mut self) {
        self.compact.take();
        self.complete.take();
    }

    /// Switch storage to an already computed compact form, if there is one
    fn adopt_cached_compact(&mut self) {
        if !self.deltas_compact {
            if let Some(compact) = self.compact.take() {
                self.deltas = compact;
                self.deltas_compact = true;
            }
        }
    }

    /// Ensure `deltas` is minimal so edits do not depend on how it was built
    fn make_compact(&mut self) {
        self.adopt_cached_compact();
        if !self.deltas_compact {
            self.deltas = compact_of(&self.deltas);
            self.deltas_compact = true;
        }
    }
}

/// Reduce raw steps to minimal deltas
fn compact_of(steps: &[Config]) -> Vec<Config> {
    let mut resolved = Config::new();
    steps
        .iter()
        .map(|step| {
            let mut delta = step.clone();
            delta.remove_items(&resolved);
            resolved.put_all(step);
            delta
        })
        .collect()
}

/// Resolve raw steps into full per-step state
fn complete_of(steps: &[Config]) -> Vec<Config> {
    let mut resolved = Config::new();
    steps
        .iter()
        .map(|step| {
            resolved.put_all(step);
            resolved.clone()
        })
        .collect()
}

impl PartialEq for ConfigSequence {
    fn eq(&self, other: &Self) -> bool {
        self.complete_view() == other.complete_view()
    }
}

impl Eq for ConfigSequence {}

impl<'a> IntoIterator for &'a ConfigSequence {
    type Item = &'a Config;
    type IntoIter = std::slice::Iter<'a, Config>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Config> for ConfigSequence {
    fn from_iter<I: IntoIterator<Item = Config>>(iter: I) -> Self {
        Self::from_steps(iter.into_iter().collect())
    }
}

impl Serialize for ConfigSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.compact_view().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Config>::deserialize(deserializer).map(Self::from_deltas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn k(path: &str) -> Key {
        Key::new(path)
    }

    fn cfg(items: &[(&str, &str)]) -> Config {
        items
            .iter()
            .map(|(key, value)| (k(key), Value::text(*value)))
            .collect()
    }

    fn step0() -> Config {
        cfg(&[("ocs:nochange", "nochange"), ("ocs:change", "change0")])
    }

    fn step1() -> Config {
        cfg(&[("ocs:change", "change1"), ("ocs:new1", "new1")])
    }

    fn step2() -> Config {
        cfg(&[
            ("ocs:nochange", "nochange"),
            ("ocs:change", "change2"),
            ("ocs:new2", "new2"),
        ])
    }

    fn seq() -> ConfigSequence {
        ConfigSequence::from_steps(vec![step0(), step1(), step2()])
    }

    fn resolved1() -> Config {
        cfg(&[
            ("ocs:nochange", "nochange"),
            ("ocs:change", "change1"),
            ("ocs:new1", "new1"),
        ])
    }

    fn resolved2() -> Config {
        cfg(&[
            ("ocs:nochange", "nochange"),
            ("ocs:change", "change2"),
            ("ocs:new1", "new1"),
            ("ocs:new2", "new2"),
        ])
    }

    #[test]
    fn complete_view_resolves_inheritance() {
        assert!(ConfigSequence::new().complete_view().is_empty());
        let seq = seq();
        assert_eq!(seq.complete_view(), &[step0(), resolved1(), resolved2()]);
    }

    #[test]
    fn compact_view_drops_unchanged_items() {
        assert!(ConfigSequence::new().compact_view().is_empty());
        let seq = seq();
        assert_eq!(
            seq.compact_view(),
            &[
                step0(),
                step1(),
                cfg(&[("ocs:change", "change2"), ("ocs:new2", "new2")]),
            ]
        );
    }

    #[test]
    fn compact_and_complete_agree() {
        let from_complete = ConfigSequence::from_complete(vec![step0(), resolved1(), resolved2()]);
        assert_eq!(from_complete.compact_view(), seq().compact_view());
        let from_deltas = ConfigSequence::from_deltas(from_complete.compact_view().to_vec());
        assert_eq!(from_deltas.complete_view(), from_complete.complete_view());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn step_out_of_range_panics() {
        let _ = ConfigSequence::new().step(0);
    }

    #[test]
    fn item_values() {
        let seq = seq();
        assert_eq!(seq.item_value(0, &k("ocs:new1")), None);
        assert_eq!(seq.item_value(2, &k("ocs:new2")), Some(&Value::text("new2")));
        assert_eq!(
            seq.item_values_at_each_step(&k("ocs:new1")),
            vec![None, Some(&Value::text("new1")), Some(&Value::text("new1"))]
        );
    }

    #[test]
    fn distinct_values_include_absence() {
        assert!(ConfigSequence::new().distinct_item_values(&k("ocs:nochange")).is_empty());
        let seq = seq();
        assert_eq!(
            seq.distinct_item_values(&k("ocs:nochange")),
            vec![Some(&Value::text("nochange"))]
        );
        assert_eq!(seq.distinct_item_values(&k("ocs:change")).len(), 3);
        assert_eq!(
            seq.distinct_item_values(&k("ocs:new2")),
            vec![None, Some(&Value::text("new2"))]
        );
    }

    #[test]
    fn iterated_and_static_keys() {
        assert!(ConfigSequence::new().iterated_keys().is_empty());
        let seq = seq();
        let iterated: Vec<_> = seq.iterated_keys().into_iter().map(String::from).collect();
        assert_eq!(iterated, vec!["ocs:change", "ocs:new1", "ocs:new2"]);
        let fixed: Vec<_> = seq.static_keys().into_iter().map(String::from).collect();
        assert_eq!(fixed, vec!["ocs:nochange"]);
    }

    #[test]
    fn first_match_searches_resolved_steps() {
        assert!(ConfigSequence::new().first_match(&Config::new()).is_none());
        let seq = seq();
        assert_eq!(seq.first_match(&Config::new()), Some(&step0()));
        assert_eq!(
            seq.first_match(&cfg(&[("ocs:nochange", "nochange")])),
            Some(&step0())
        );
        assert!(seq.first_match(&cfg(&[("ocs:nochange", "unknown val")])).is_none());
        let mut template = step0();
        template.put(k("test"), "test");
        assert!(seq.first_match(&template).is_none());
        assert_eq!(
            seq.index_matching(&cfg(&[("ocs:nochange", "nochange"), ("ocs:new2", "new2")])),
            Some(2)
        );
    }

    #[test]
    fn add_step_appends_changes() {
        let mut empty = ConfigSequence::new();
        let test1 = cfg(&[("test1", "test1")]);
        empty.add_step(test1.clone());
        assert_eq!(empty.len(), 1);
        assert_eq!(empty.step(0), &test1);

        let mut seq = seq();
        seq.add_step(test1.clone());
        let mut expected = resolved2();
        expected.put(k("test1"), "test1");
        assert_eq!(seq.step(3), &expected);

        assert_eq!(seq.compact_step(3), &test1);

        // complete and compact are both current here, so this appends in place
        let both = cfg(&[("test1", "test1"), ("test2", "test2")]);
        seq.add_step(both);
        expected.put(k("test2"), "test2");
        assert_eq!(seq.step(4), &expected);
        assert_eq!(seq.compact_step(4), &cfg(&[("test2", "test2")]));
    }

    #[test]
    fn add_step_incremental_matches_rebuild() {
        let mut seq = seq();
        let _ = seq.complete_view();
        let _ = seq.compact_view();
        seq.add_step(cfg(&[("ocs:change", "change2"), ("ocs:extra", "x")]));
        let rebuilt = ConfigSequence::from_steps(seq.compact_view().to_vec());
        assert_eq!(seq.complete_view(), rebuilt.complete_view());
        assert_eq!(seq.compact_step(3), &cfg(&[("ocs:extra", "x")]));
    }

    #[test]
    fn insert_step_at_interior_positions() {
        let mut seq = seq();
        seq.insert_step(0, cfg(&[("config0", "config0")]));
        seq.insert_step(2, cfg(&[("config2", "config2")]));
        seq.insert_step(4, cfg(&[("config4", "config4")]));
        seq.insert_step(6, cfg(&[("config6", "config6")]));
        assert_eq!(seq.len(), 7);

        assert_eq!(seq.step(0), &cfg(&[("config0", "config0")]));
        let mut expected = step0();
        expected.put(k("config0"), "config0");
        assert_eq!(seq.step(1), &expected);
        expected.put(k("config2"), "config2");
        assert_eq!(seq.step(2), &expected);
        expected.put_all(&step1());
        assert_eq!(seq.step(3), &expected);
        expected.put(k("config4"), "config4");
        assert_eq!(seq.step(4), &expected);
        expected.put_all(&step2());
        assert_eq!(seq.step(5), &expected);
        expected.put(k("config6"), "config6");
        assert_eq!(seq.step(6), &expected);
    }

    #[test]
    fn remove_step_reinherits() {
        let mut seq = seq();
        seq.remove_step(0);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.step(0), &step1());
        seq.remove_step(1);
        seq.remove_step(0);
        assert!(seq.is_empty());
    }

    #[test]
    fn remove_last_step_keeps_cache_consistent() {
        let mut seq = seq();
        let _ = seq.complete_view();
        seq.remove_step(2);
        assert_eq!(seq.complete_view(), &[step0(), resolved1()]);
        seq.add_step(step2());
        assert_eq!(seq.step(2), &resolved2());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn remove_step_out_of_range_panics() {
        ConfigSequence::new().remove_step(0);
    }

    #[test]
    fn set_step_replaces_changes() {
        let mut seq = seq();
        let conf = cfg(&[("ocs:change", "changex"), ("test", "test")]);
        seq.set_step(0, conf.clone());
        assert_eq!(seq.step(0), &conf);
        assert_eq!(
            seq.step(1),
            &cfg(&[
                ("ocs:change", "change1"),
                ("test", "test"),
                ("ocs:new1", "new1"),
            ])
        );

        // an emptied step inherits everything
        seq.set_step(1, Config::new());
        assert_eq!(seq.step(1), &conf);
    }

    #[test]
    fn sub_sequence_copies_range() {
        let seq = seq();
        assert!(seq.sub_sequence(0, 0).is_empty());
        let first = seq.sub_sequence(0, 1);
        assert_eq!(first.len(), 1);
        assert_eq!(first.step(0), &step0());
        assert_eq!(seq.sub_sequence(0, seq.len()), seq);
    }

    #[test]
    fn filter_builds_fresh_sequence() {
        let seq = seq();
        let filtered = seq.filter(|c| c.contains(&k("ocs:new1")));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.compact_step(0), &resolved1());
        assert_eq!(
            filtered.compact_step(1),
            &cfg(&[("ocs:change", "change2"), ("ocs:new2", "new2")])
        );
    }

    #[test]
    fn iterators_walk_each_view() {
        let seq = seq();
        assert_eq!(seq.iter().count(), 3);
        let compact_sizes: Vec<_> = seq.compact_iter().map(Config::len).collect();
        assert_eq!(compact_sizes, vec![2, 2, 2]);
        let snapshot = seq.snapshot();
        assert_eq!(*snapshot[2], resolved2());
    }

    #[test]
    fn clear_empties() {
        let mut seq = seq();
        assert!(!seq.is_empty());
        seq.clear();
        assert!(seq.is_empty());
        assert!(seq.complete_view().is_empty());
    }

    #[test]
    fn serde_uses_compact_form() {
        let seq = seq();
        let json = serde_json::to_value(&seq).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(3));
        let back: ConfigSequence = serde_json::from_value(json).unwrap();
        assert_eq!(back, seq);
    }
}
