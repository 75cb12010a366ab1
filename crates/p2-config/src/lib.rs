//! P2 Configuration Model
//!
//! Hierarchical keyed configuration and sparse per-step sequences.
//!
//! # Core Concepts
//!
//! - [`Key`]: colon-segmented attribute path (`instrument:filter`)
//! - [`Value`]: typed attribute payload
//! - [`Config`]: sorted key/value map with range-based subtree queries
//! - [`ImmutableConfig`]: shared read-only view of a config
//! - [`ConfigSequence`]: ordered steps with cached compact and complete views
//!
//! # Example
//!
//! ```rust
//! use p2_config::{Config, ConfigSequence, Key};
//!
//! let filter = Key::new("instrument:filter");
//! let exposure = Key::new("observe:exposureTime");
//!
//! let mut seq = ConfigSequence::new();
//! seq.add_step(Config::new().with(filter.clone(), "g_G0301").with(exposure.clone(), 30.0));
//! seq.add_step(Config::new().with(filter.clone(), "r_G0303"));
//!
//! // The second step inherits the exposure time
//! assert_eq!(seq.step(1).get(&exposure), seq.step(0).get(&exposure));
//! assert!(seq.iterated_keys().contains(&filter));
//! ```

#![warn(unreachable_pub)]

mod config;
mod key;
mod sequence;
mod value;

pub use config::{Config, ConfigEntry, ConfigError, ConfigMut, ConfigSource, ImmutableConfig};
pub use key::{Key, KeyError, SEPARATOR, WILDCARD};
pub use sequence::ConfigSequence;
pub use value::{ConfigSymbol, SymbolError, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
