//! Hierarchical configuration keys
//!
//! Provides [`Key`], a colon-segmented path such as `instrument:filter`.

use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between key segments
pub const SEPARATOR: char = ':';

/// Segment that matches any other segment in [`Key::matches`]
pub const WILDCARD: &str = "*";

/// The code point immediately after [`SEPARATOR`].
///
/// Every descendant of `p` sorts in `[p:, p;)`.
const SEPARATOR_SUCCESSOR: char = ';';

/// Path identifying one configuration attribute
///
/// Keys order and hash by their full path string, so a sorted map of keys
/// keeps each subtree contiguous.
///
/// # Examples
/// - `instrument:filter` has parent `instrument` and name `filter`
/// - `telescope:*` matches `telescope:p` and `telescope:q`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Create a key from a full path string
    ///
    /// # Panics
    /// Panics if the path is empty or has an empty segment. Use
    /// [`str::parse`] for input that is not known to be well formed.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        match Self::try_from(path) {
            Ok(key) => key,
            Err(err) => panic!("invalid configuration key: {err}"),
        }
    }

    /// Append a segment, returning the child key
    ///
    /// # Panics
    /// Panics if `name` is empty or contains the separator.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        assert!(
            !name.is_empty() && !name.contains(SEPARATOR),
            "invalid child segment {name:?} for key {self}"
        );
        let mut path = String::with_capacity(self.0.len() + 1 + name.len());
        path.push_str(&self.0);
        path.push(SEPARATOR);
        path.push_str(name);
        Self(path)
    }

    /// Full path string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parent key, or `None` for a single-segment key
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind(SEPARATOR).map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Last segment
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.matches(SEPARATOR).count() + 1
    }

    /// Segment-wise comparison where `*` on either side matches anything
    ///
    /// Keys of different depth never match.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        if self.depth() != other.depth() {
            return false;
        }
        self.segments()
            .zip(other.segments())
            .all(|(a, b)| a == b || a == WILDCARD || b == WILDCARD)
    }

    /// Whether `other` is this key or lies in its subtree
    ///
    /// # Examples
    /// - `abc` is parent of `abc` and `abc:d`
    /// - `abc` is NOT parent of `abcd` or `abc!`
    #[inline]
    #[must_use]
    pub fn is_parent_of(&self, other: &Self) -> bool {
        match other.0.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }

    /// Half-open string range `[self:, self;)` covering every strict descendant
    #[must_use]
    pub(crate) fn descendant_bounds(&self) -> (String, String) {
        let mut lower = String::with_capacity(self.0.len() + 1);
        lower.push_str(&self.0);
        let mut upper = lower.clone();
        lower.push(SEPARATOR);
        upper.push(SEPARATOR_SUCCESSOR);
        (lower, upper)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl TryFrom<String> for Key {
    type Error = KeyError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        if path.is_empty() {
            return Err(KeyError::EmptyPath);
        }
        if path.split(SEPARATOR).any(str::is_empty) {
            return Err(KeyError::EmptySegment(path));
        }
        Ok(Self(path))
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

/// Errors raised when parsing a key path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Path string was empty
    #[error("key path is empty")]
    EmptyPath,

    /// Path contains an empty segment
    #[error("key path '{0}' contains an empty segment")]
    EmptySegment(String),
}
