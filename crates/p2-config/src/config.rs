//! Sorted key/value configuration
//!
//! [`Config`] maps [`Key`]s to [`Value`]s in path order. Subtree queries are
//! bounded range scans over the sorted map: the parent itself plus the
//! half-open range `[parent:, parent;)`, which holds exactly the strict
//! descendants. Keys that merely share a string prefix (`abcd`, `abc!`)
//! fall outside both.
//!
//! [`ImmutableConfig`] is the read-only handle given out once a step has
//! been published.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::ops::{Bound, Deref};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::value::{ConfigSymbol, SymbolError, Value};

/// One persisted item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Item key
    pub key: Key,
    /// Item value
    pub value: Value,
}

/// Mapping from [`Key`] to [`Value`], iterated in key order
///
/// Equality and hashing cover the item set only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<ConfigEntry>", into = "Vec<ConfigEntry>")]
pub struct Config {
    items: BTreeMap<Key, Value>,
}

impl Config {
    /// Empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (key path, text) pairs
    ///
    /// Every value becomes [`Value::Text`]; later duplicates win.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidKey`] for a malformed path.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::new();
        for (path, value) in pairs {
            let key = path
                .as_ref()
                .parse::<Key>()
                .map_err(|source| ConfigError::InvalidKey {
                    path: path.as_ref().to_string(),
                    source,
                })?;
            config.items.insert(key, Value::Text(value.into()));
        }
        Ok(config)
    }

    /// Persist as ordered (key path, value string) pairs
    ///
    /// Only text values are guaranteed to come back unchanged through
    /// [`Config::from_pairs`].
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every item
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether an item is stored under exactly this key
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.items.contains_key(key)
    }

    /// Value stored under `key`
    #[inline]
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.items.get(key)
    }

    /// Decode an enumerated value stored under `key`
    ///
    /// # Errors
    /// Returns [`SymbolError`] when the stored name is not a constant of `T`.
    pub fn symbol<T: ConfigSymbol>(&self, key: &Key) -> Result<Option<T>, SymbolError> {
        match self.items.get(key) {
            Some(value) => value.decode_symbol(),
            None => Ok(None),
        }
    }

    /// Store a value, returning the one it replaced
    #[inline]
    pub fn put(&mut self, key: Key, value: impl Into<Value>) -> Option<Value> {
        self.items.insert(key, value.into())
    }

    /// Chainable [`Config::put`]
    #[inline]
    #[must_use]
    pub fn with(mut self, key: Key, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }

    /// Copy every item of `other` into this config, overwriting clashes
    pub fn put_all(&mut self, other: &Self) {
        for (k, v) in &other.items {
            self.items.insert(k.clone(), v.clone());
        }
    }

    /// Remove the item stored under exactly `key`
    ///
    /// Descendants are left alone.
    #[inline]
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        self.items.remove(key)
    }

    /// All items, in key order
    #[inline]
    pub fn entries(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.items.iter()
    }

    /// Items in the subtree rooted at `parent`, in key order
    pub fn entries_under<'a>(&'a self, parent: &Key) -> impl Iterator<Item = (&'a Key, &'a Value)> {
        let (lower, upper) = parent.descendant_bounds();
        let own = self.items.get_key_value(parent);
        let descendants = self.items.range::<str, _>((
            Bound::Included(lower.as_str()),
            Bound::Excluded(upper.as_str()),
        ));
        own.into_iter().chain(descendants)
    }

    /// All keys, in order
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.items.keys()
    }

    /// Keys in the subtree rooted at `parent`
    pub fn keys_under<'a>(&'a self, parent: &Key) -> impl Iterator<Item = &'a Key> {
        self.entries_under(parent).map(|(k, _)| k)
    }

    /// Copy of the subtree rooted at `parent`
    ///
    /// Empty when nothing lies under `parent`.
    #[must_use]
    pub fn get_all(&self, parent: &Key) -> Self {
        let items = self
            .entries_under(parent)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { items }
    }

    /// Union of the subtrees rooted at each of `parents`
    #[must_use]
    pub fn get_all_of(&self, parents: &[Key]) -> Self {
        let mut result = Self::new();
        for parent in parents {
            for (k, v) in self.entries_under(parent) {
                result.items.insert(k.clone(), v.clone());
            }
        }
        result
    }

    /// Drop the subtree rooted at `parent`
    pub fn remove_all(&mut self, parent: &Key) {
        let doomed: Vec<Key> = self.keys_under(parent).cloned().collect();
        for key in &doomed {
            self.items.remove(key);
        }
    }

    /// Drop the subtrees rooted at each of `parents`
    pub fn remove_all_of(&mut self, parents: &[Key]) {
        for parent in parents {
            self.remove_all(parent);
        }
    }

    /// Keep only the subtree rooted at `parent`
    pub fn retain_all(&mut self, parent: &Key) {
        *self = self.get_all(parent);
    }

    /// Keep only the subtrees rooted at each of `parents`
    pub fn retain_all_of(&mut self, parents: &[Key]) {
        *self = self.get_all_of(parents);
    }

    /// Remove every item whose key and value both appear in `other`
    pub fn remove_items(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.items.retain(|k, v| other.items.get(k) != Some(v));
    }

    /// Keep only the items whose key and value both appear in `other`
    pub fn retain_items(&mut self, other: &Self) {
        self.items.retain(|k, v| other.items.get(k) == Some(v));
    }

    /// Subset test: every item of `template` is present here with an equal value
    ///
    /// The empty config matches everything.
    #[must_use]
    pub fn matches(&self, template: &Self) -> bool {
        template.len() <= self.len()
            && template
                .items
                .iter()
                .all(|(k, v)| self.items.get(k) == Some(v))
    }

    /// Partition the items by a derived grouping key
    pub fn group_by<G, F>(&self, mut f: F) -> BTreeMap<G, Vec<ConfigEntry>>
    where
        G: Ord,
        F: FnMut(&Key, &Value) -> G,
    {
        let mut groups: BTreeMap<G, Vec<ConfigEntry>> = BTreeMap::new();
        for (k, v) in &self.items {
            groups.entry(f(k, v)).or_default().push(ConfigEntry {
                key: k.clone(),
                value: v.clone(),
            });
        }
        groups
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

impl From<Vec<ConfigEntry>> for Config {
    fn from(entries: Vec<ConfigEntry>) -> Self {
        entries.into_iter().map(|e| (e.key, e.value)).collect()
    }
}

impl From<Config> for Vec<ConfigEntry> {
    fn from(config: Config) -> Self {
        config
            .items
            .into_iter()
            .map(|(key, value)| ConfigEntry { key, value })
            .collect()
    }
}

impl FromIterator<(Key, Value)> for Config {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Key, Value)> for Config {
    fn extend<I: IntoIterator<Item = (Key, Value)>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Config {
    type Item = (&'a Key, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Anything that can hand out a [`Config`] to read
pub trait ConfigSource {
    /// Borrow the underlying configuration
    fn as_config(&self) -> &Config;

    /// Whether this source is already a read-only view
    fn is_read_only(&self) -> bool {
        false
    }
}

impl ConfigSource for Config {
    fn as_config(&self) -> &Config {
        self
    }
}

/// Fallible mutation shared by writable and read-only configs
///
/// [`Config`] always succeeds. [`ImmutableConfig`] always refuses with
/// [`ConfigError::ReadOnly`].
pub trait ConfigMut {
    /// See [`Config::put`]
    ///
    /// # Errors
    /// [`ConfigError::ReadOnly`] on a read-only view.
    fn try_put(&mut self, key: Key, value: Value) -> Result<Option<Value>, ConfigError>;

    /// See [`Config::put_all`]
    ///
    /// # Errors
    /// [`ConfigError::ReadOnly`] on a read-only view.
    fn try_put_all(&mut self, other: &Config) -> Result<(), ConfigError>;

    /// See [`Config::remove`]
    ///
    /// # Errors
    /// [`ConfigError::ReadOnly`] on a read-only view.
    fn try_remove(&mut self, key: &Key) -> Result<Option<Value>, ConfigError>;

    /// See [`Config::remove_all`]
    ///
    /// # Errors
    /// [`ConfigError::ReadOnly`] on a read-only view.
    fn try_remove_all(&mut self, parent: &Key) -> Result<(), ConfigError>;

    /// See [`Config::retain_all`]
    ///
    /// # Errors
    /// [`ConfigError::ReadOnly`] on a read-only view.
    fn try_retain_all(&mut self, parent: &Key) -> Result<(), ConfigError>;

    /// See [`Config::remove_items`]
    ///
    /// # Errors
    /// [`ConfigError::ReadOnly`] on a read-only view.
    fn try_remove_items(&mut self, other: &Config) -> Result<(), ConfigError>;

    /// See [`Config::retain_items`]
    ///
    /// # Errors
    /// [`ConfigError::ReadOnly`] on a read-only view.
    fn try_retain_items(&mut self, other: &Config) -> Result<(), ConfigError>;

    /// See [`Config::clear`]
    ///
    /// # Errors
    /// [`ConfigError::ReadOnly`] on a read-only view.
    fn try_clear(&mut self) -> Result<(), ConfigError>;
}

impl ConfigMut for Config {
    fn try_put(&mut self, key: Key, value: Value) -> Result<Option<Value>, ConfigError> {
        Ok(self.put(key, value))
    }

    fn try_put_all(&mut self, other: &Config) -> Result<(), ConfigError> {
        self.put_all(other);
        Ok(())
    }

    fn try_remove(&mut self, key: &Key) -> Result<Option<Value>, ConfigError> {
        Ok(self.remove(key))
    }

    fn try_remove_all(&mut self, parent: &Key) -> Result<(), ConfigError> {
        self.remove_all(parent);
        Ok(())
    }

    fn try_retain_all(&mut self, parent: &Key) -> Result<(), ConfigError> {
        self.retain_all(parent);
        Ok(())
    }

    fn try_remove_items(&mut self, other: &Config) -> Result<(), ConfigError> {
        self.remove_items(other);
        Ok(())
    }

    fn try_retain_items(&mut self, other: &Config) -> Result<(), ConfigError> {
        self.retain_items(other);
        Ok(())
    }

    fn try_clear(&mut self) -> Result<(), ConfigError> {
        self.clear();
        Ok(())
    }
}

/// Shared read-only configuration
///
/// Reads go through `Deref<Target = Config>`; every [`ConfigMut`] method
/// fails. Cloning shares the underlying snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImmutableConfig(Arc<Config>);

impl ImmutableConfig {
    /// Freeze an owned config without copying it
    #[inline]
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self(Arc::new(config))
    }

    /// Wrap a readable source in a read-only view
    ///
    /// # Errors
    /// Returns [`ConfigError::AlreadyImmutable`] if `source` is itself a
    /// read-only view.
    pub fn wrap<S: ConfigSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        if source.is_read_only() {
            return Err(ConfigError::AlreadyImmutable);
        }
        Ok(Self::new(source.as_config().clone()))
    }

    /// Writable copy of the frozen items
    #[inline]
    #[must_use]
    pub fn to_mutable(&self) -> Config {
        (*self.0).clone()
    }
}

impl Deref for ImmutableConfig {
    type Target = Config;

    fn deref(&self) -> &Config {
        &self.0
    }
}

impl ConfigSource for ImmutableConfig {
    fn as_config(&self) -> &Config {
        &self.0
    }

    fn is_read_only(&self) -> bool {
        true
    }
}

impl ConfigMut for ImmutableConfig {
    fn try_put(&mut self, _key: Key, _value: Value) -> Result<Option<Value>, ConfigError> {
        Err(ConfigError::ReadOnly)
    }

    fn try_put_all(&mut self, _other: &Config) -> Result<(), ConfigError> {
        Err(ConfigError::ReadOnly)
    }

    fn try_remove(&mut self, _key: &Key) -> Result<Option<Value>, ConfigError> {
        Err(ConfigError::ReadOnly)
    }

    fn try_remove_all(&mut self, _parent: &Key) -> Result<(), ConfigError> {
        Err(ConfigError::ReadOnly)
    }

    fn try_retain_all(&mut self, _parent: &Key) -> Result<(), ConfigError> {
        Err(ConfigError::ReadOnly)
    }

    fn try_remove_items(&mut self, _other: &Config) -> Result<(), ConfigError> {
        Err(ConfigError::ReadOnly)
    }

    fn try_retain_items(&mut self, _other: &Config) -> Result<(), ConfigError> {
        Err(ConfigError::ReadOnly)
    }

    fn try_clear(&mut self) -> Result<(), ConfigError> {
        Err(ConfigError::ReadOnly)
    }
}

impl From<Config> for ImmutableConfig {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}

/// Errors raised by configuration operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Mutation attempted through a read-only view
    #[error("configuration is read-only")]
    ReadOnly,

    /// Attempt to wrap a view that is already read-only
    #[error("configuration is already immutable")]
    AlreadyImmutable,

    /// Persisted key path could not be parsed
    #[error("invalid key path '{path}': {source}")]
    InvalidKey {
        /// Offending path
        path: String,
        /// Parse failure
        #[source]
        source: crate::key::KeyError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn k(path: &str) -> Key {
        Key::new(path)
    }

    fn family() -> Config {
        Config::new()
            .with(k("parent1:child1"), "11")
            .with(k("parent1:child2"), "12")
            .with(k("parent1:child1:grandchild1"), "111")
            .with(k("parent2:child1"), "21")
            .with(k("parent2:child2"), "22")
            .with(k("parent2:child3"), "23")
    }

    fn values<'a>(it: impl Iterator<Item = (&'a Key, &'a Value)>) -> Vec<String> {
        it.map(|(_, v)| v.to_string()).collect()
    }

    fn subconfig(source: &Config, keys: &[&str]) -> Config {
        let mut out = Config::new();
        for path in keys {
            let key = k(path);
            if let Some(v) = source.get(&key) {
                out.put(key, v.clone());
            }
        }
        out
    }

    #[test]
    fn empty_config_operations() {
        let mut config = Config::new();
        let test = k("test");
        assert!(!config.contains(&test));
        assert!(config.is_empty());
        assert_eq!(config.entries_under(&test).count(), 0);
        assert!(config.get(&test).is_none());
        assert_eq!(config.get_all(&test), Config::new());
        assert!(config.remove(&test).is_none());

        config.remove_all(&test);
        config.retain_all(&test);
        config.retain_items(&Config::new());
        assert_eq!(config, Config::new());

        assert!(config.matches(&Config::new()));
        let one = Config::new().with(test, "val");
        assert!(!config.matches(&one));
        assert!(one.matches(&config));
    }

    #[test]
    fn entries_in_key_order() {
        let config = family();
        assert_eq!(
            values(config.entries()),
            vec!["11", "111", "12", "21", "22", "23"]
        );
        assert_eq!(
            values(config.entries_under(&k("parent1"))),
            vec!["11", "111", "12"]
        );
        assert_eq!(
            values(config.entries_under(&k("parent1:child1"))),
            vec!["11", "111"]
        );
        assert_eq!(
            values(config.entries_under(&k("parent1:child1:grandchild1"))),
            vec!["111"]
        );
        assert!(config.entries_under(&k("test")).next().is_none());
    }

    #[test]
    fn keys_under_parent() {
        let config = family();
        let keys: Vec<_> = config.keys_under(&k("parent2")).map(Key::as_str).collect();
        assert_eq!(keys, vec!["parent2:child1", "parent2:child2", "parent2:child3"]);
    }

    #[test]
    fn get_item_value() {
        let config = family();
        assert!(config.get(&k("parent1")).is_none());
        assert_eq!(config.get(&k("parent1:child1")), Some(&Value::text("11")));
    }

    #[test]
    fn get_all_single_parent() {
        let config = family();
        assert_eq!(
            config.get_all(&k("parent1")),
            subconfig(&config, &["parent1:child1", "parent1:child1:grandchild1", "parent1:child2"])
        );
        assert_eq!(config.get_all(&k("test")), Config::new());
    }

    #[test]
    fn get_all_of_parents() {
        let config = family();
        assert_eq!(config.get_all_of(&[k("parent1"), k("parent2")]), config);
        assert_eq!(
            config.get_all_of(&[k("parent1:child1"), k("parent2:child2")]),
            subconfig(&config, &["parent1:child1", "parent1:child1:grandchild1", "parent2:child2"])
        );
    }

    #[test]
    fn get_all_ignores_prefix_siblings() {
        let config = Config::new()
            .with(k("abc"), "self")
            .with(k("abc!"), "bang")
            .with(k("abc:d"), "child")
            .with(k("abcd"), "sibling");
        let sub = config.get_all(&k("abc"));
        assert_eq!(values(sub.entries()), vec!["self", "child"]);
    }

    #[test]
    fn put_all_overwrites() {
        let mut config = family();
        let mut update = Config::new();
        update.put(k("parent1:child1"), "11-new");
        update.put(k("testkey1"), "testvalue1");
        config.put_all(&update);
        assert_eq!(config.get(&k("parent1:child1")), Some(&Value::text("11-new")));
        assert_eq!(config.get(&k("testkey1")), Some(&Value::text("testvalue1")));
        assert_eq!(config.len(), 7);
    }

    #[test]
    fn remove_leaves_descendants() {
        let mut config = family();
        assert_eq!(config.remove(&k("parent1:child1")), Some(Value::text("11")));
        assert_eq!(
            config.get(&k("parent1:child1:grandchild1")),
            Some(&Value::text("111"))
        );
    }

    #[test]
    fn remove_all_subtree() {
        let mut config = family();
        config.remove_all(&k("test"));
        assert_eq!(config.len(), 6);
        config.remove_all(&k("parent1:child1"));
        assert_eq!(config.len(), 4);
        assert_eq!(config.get(&k("parent1:child2")), Some(&Value::text("12")));
        config.remove_all_of(&[k("parent1"), k("parent2")]);
        assert!(config.is_empty());
    }

    #[test]
    fn remove_items_by_key_and_value() {
        let mut config = family();
        config.remove_items(&Config::new().with(k("testkey"), "testvalue"));
        assert_eq!(config.len(), 6);

        // same key, different value: kept
        config.remove_items(&Config::new().with(k("parent2:child2"), "other"));
        assert_eq!(config.len(), 6);

        config.remove_items(&subconfig(&family(), &["parent2:child2"]));
        assert!(config.get(&k("parent2:child2")).is_none());

        let copy = config.clone();
        config.remove_items(&copy);
        assert!(config.is_empty());
    }

    #[test]
    fn retain_all_subtree() {
        let mut test = family();
        test.retain_all(&k("test"));
        assert!(test.is_empty());

        let mut config = family();
        config.retain_all(&k("parent2"));
        assert_eq!(config.len(), 3);
        assert!(config.get(&k("parent1:child1")).is_none());

        let mut config = family();
        config.retain_all_of(&[k("parent1:child1"), k("parent2:child3")]);
        assert_eq!(values(config.entries()), vec!["11", "111", "23"]);
    }

    #[test]
    fn retain_items_by_key_and_value() {
        let mut config = family();
        let template = Config::new()
            .with(k("parent1:child2"), "12")
            .with(k("parent2:child1"), "changed");
        config.retain_items(&template);
        assert_eq!(config, Config::new().with(k("parent1:child2"), "12"));
    }

    #[test]
    fn matches_subset() {
        let config = family();
        assert!(config.matches(&config));
        assert!(config.matches(&subconfig(&config, &["parent2:child3"])));
        assert!(!config.matches(&Config::new().with(k("parent2:child3"), "x")));
        assert!(!subconfig(&config, &["parent2:child3"]).matches(&config));
    }

    #[test]
    fn group_by_top_segment() {
        let groups = family().group_by(|key, _| key.segments().next().map(str::to_string));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&Some("parent1".to_string())].len(), 3);
    }

    #[test]
    fn equality_is_structural() {
        let mut a = Config::new();
        a.put(k("x:b"), 2_i64);
        a.put(k("x:a"), 1_i64);
        let b: Config = [(k("x:a"), Value::Int(1)), (k("x:b"), Value::Int(2))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn pairs_round_trip_text() {
        let config = family();
        let pairs = config.to_pairs();
        assert_eq!(pairs[0], ("parent1:child1".to_string(), "11".to_string()));
        assert_eq!(Config::from_pairs(pairs).unwrap(), config);
    }

    #[test]
    fn pairs_reject_bad_key() {
        let err = Config::from_pairs([("a::b", "x")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { .. }));
    }

    #[test]
    fn display_lists_items() {
        let config = Config::new().with(k("a"), 1_i64).with(k("b"), "x");
        assert_eq!(config.to_string(), "{a=1, b=x}");
    }

    #[test]
    fn serde_as_entry_list() {
        let config = Config::new()
            .with(k("instrument:filter"), Value::Symbol("g_G0301".into()))
            .with(k("observe:exposureTime"), 30.0);
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn immutable_rejects_mutation() {
        let mut frozen = ImmutableConfig::new(family());
        assert_eq!(frozen.len(), 6);
        assert_eq!(frozen.get(&k("parent2:child3")), Some(&Value::text("23")));
        assert_eq!(frozen.try_put(k("x"), Value::Int(1)), Err(ConfigError::ReadOnly));
        assert_eq!(frozen.try_remove(&k("parent2:child3")), Err(ConfigError::ReadOnly));
        assert_eq!(frozen.try_retain_all(&k("parent1")), Err(ConfigError::ReadOnly));
        assert_eq!(frozen.try_clear(), Err(ConfigError::ReadOnly));
        assert_eq!(frozen.len(), 6);
    }

    #[test]
    fn immutable_wrap_twice_fails() {
        let config = family();
        let frozen = ImmutableConfig::wrap(&config).unwrap();
        assert_eq!(*frozen, config);
        assert_eq!(
            ImmutableConfig::wrap(&frozen).unwrap_err(),
            ConfigError::AlreadyImmutable
        );
    }

    #[test]
    fn mutable_config_through_trait() {
        let mut config = family();
        let target: &mut dyn ConfigMut = &mut config;
        assert_eq!(target.try_put(k("z"), Value::Bool(true)), Ok(None));
        target.try_remove_all(&k("parent1")).unwrap();
        assert_eq!(config.len(), 4);
    }
}
