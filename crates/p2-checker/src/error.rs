//! Error types for the checker
//!
//! Observation problems are never errors; they are reported as
//! [`Problem`](crate::Problem)s. These errors cover input the checker
//! cannot interpret at all.

use p2_config::{Key, SymbolError};

/// Checker error type
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// Settings file could not be parsed
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Setting parsed but holds an unusable value
    #[error("setting '{name}' out of range: {reason}")]
    InvalidSetting {
        /// Setting name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Observation carries no instrument the checker knows
    #[error("observation has no supported instrument")]
    MissingInstrument,

    /// A step holds a symbol that is not a known constant
    #[error("step {step}, {key}: {source}")]
    UnknownSymbol {
        /// Step index
        step: usize,
        /// Offending item
        key: Key,
        /// Decoding failure
        #[source]
        source: SymbolError,
    },
}

/// Result alias for checker operations
pub type Result<T> = std::result::Result<T, CheckerError>;
