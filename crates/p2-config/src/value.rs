//! Typed attribute payloads
//!
//! Every item in a [`Config`](crate::Config) carries a [`Value`]. Enumerated
//! instrument settings travel as [`Value::Symbol`] and are decoded through
//! the [`ConfigSymbol`] trait.

use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Attribute value stored under a key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Free text, the only variant guaranteed to survive string persistence
    Text(String),
    /// Integral number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Flag
    Bool(bool),
    /// Canonical name of an enumerated constant
    Symbol(String),
    /// Nested configuration
    Nested(Box<Config>),
}

impl Value {
    /// Text value
    #[inline]
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Symbol value for an enumerated constant
    #[inline]
    #[must_use]
    pub fn symbol<T: ConfigSymbol>(constant: T) -> Self {
        Self::Symbol(constant.symbol_name().to_string())
    }

    /// Borrow as text
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view; integral text and whole floats are accepted
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Numeric view
    ///
    /// Accepts floats, integers and numeric text, since exposure times and
    /// offsets reach the sequence in any of those forms.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Flag view
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Symbol name; text is accepted because persisted symbols come back as text
    #[inline]
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow a nested configuration
    #[inline]
    #[must_use]
    pub fn as_nested(&self) -> Option<&Config> {
        match self {
            Self::Nested(c) => Some(c),
            _ => None,
        }
    }

    /// Decode into an enumerated type
    ///
    /// `Ok(None)` means the value is not symbolic at all; an unrecognised
    /// name is an error.
    ///
    /// # Errors
    /// Returns [`SymbolError::Unknown`] if the name is not a constant of `T`.
    pub fn decode_symbol<T: ConfigSymbol>(&self) -> Result<Option<T>, SymbolError> {
        let Some(name) = self.as_symbol() else {
            return Ok(None);
        };
        T::from_symbol(name)
            .map(Some)
            .ok_or_else(|| SymbolError::Unknown {
                type_name: T::TYPE_NAME,
                name: name.to_string(),
            })
    }

    fn float_bits(f: f64) -> u64 {
        if f == 0.0 {
            0.0f64.to_bits()
        } else if f.is_nan() {
            f64::NAN.to_bits()
        } else {
            f.to_bits()
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) | (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => Self::float_bits(*a) == Self::float_bits(*b),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Nested(a), Self::Nested(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Text(s) | Self::Symbol(s) => s.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => Self::float_bits(*f).hash(state),
            Self::Bool(b) => b.hash(state),
            Self::Nested(c) => c.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Symbol(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Nested(c) => write!(f, "{c}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Config> for Value {
    fn from(c: Config) -> Self {
        Self::Nested(Box::new(c))
    }
}

/// Enumerated type that round-trips through [`Value::Symbol`]
pub trait ConfigSymbol: Sized + Copy {
    /// Name of the enumeration, used in error messages
    const TYPE_NAME: &'static str;

    /// Canonical constant name
    fn symbol_name(self) -> &'static str;

    /// Parse a canonical constant name
    fn from_symbol(name: &str) -> Option<Self>;
}

/// Errors decoding enumerated values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    /// Name is not a constant of the requested enumeration
    #[error("'{name}' is not a known {type_name}")]
    Unknown {
        /// Enumeration name
        type_name: &'static str,
        /// Offending constant name
        name: String,
    },
}
