//! P2 Checker - observation sequence validation
//!
//! Walks the resolved steps of an observation and reports configuration
//! problems as data: every finding is a [`Problem`] with a stable code and a
//! severity. Input the model cannot represent, such as a detector constant
//! that does not exist, aborts the check with a [`CheckerError`] instead.
//!
//! # Core Concepts
//!
//! - [`Matcher`]: named predicate deciding whether a step rule applies
//! - [`ConfigRule`]: one step check, optionally updating per-pass state
//! - [`SequenceRule`]: drives a rule list over every step, each rule reporting at most once
//! - [`CompositeRule`]: concatenates the reports of whole-observation rules
//! - [`gmos::GmosRule`]: the GMOS rule set
//!
//! # Example
//!
//! ```rust
//! use p2_checker::gmos::{keys, Binning, DetectorManufacturer, GmosInstrument, Site};
//! use p2_checker::{check, Observation, Severity};
//! use p2_config::{Config, ConfigSequence};
//!
//! let seq = ConfigSequence::from_deltas(vec![
//!     Config::new().with(keys::Y_BINNING.clone(), Binning::Two).with(keys::DTA_X_OFFSET.clone(), 4_i64),
//!     Config::new().with(keys::DTA_X_OFFSET.clone(), 3_i64),
//! ]);
//! let obs = Observation::new(seq).with_gmos(GmosInstrument::new(Site::North, DetectorManufacturer::E2V));
//!
//! let report = check(&obs)?;
//! let dta = report.iter().find(|p| p.code() == "GmosRule_DTA_X_Y_BINNING_RULE").unwrap();
//! assert_eq!(dta.severity(), Severity::Warning);
//! assert_eq!(dta.step(), Some(1));
//! # Ok::<(), p2_checker::CheckerError>(())
//! ```

#![warn(unreachable_pub)]

mod composite;
mod error;
mod observation;
mod problem;
mod rule;
mod sequence_rule;
mod settings;
mod step;
mod symbol;

pub mod gmos;

pub use composite::CompositeRule;
pub use error::{CheckerError, Result};
pub use observation::{ImageQuality, Instrument, Observation, SiteQuality, SkyBackground};
pub use problem::{NodeRef, Problem, ProblemReport, Severity};
pub use rule::{CheckFn, ConfigRule, Matcher, PassState, Rule};
pub use sequence_rule::SequenceRule;
pub use settings::CheckSettings;
pub use step::{keys, ObsClass, ObserveType, StepContext};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check `observation` with the rule set for its instrument and default settings
///
/// Observations without an instrument component produce an empty report.
///
/// # Errors
/// Returns [`CheckerError::UnknownSymbol`] when a step holds an enumerated
/// constant the model does not define.
pub fn check(observation: &Observation) -> Result<ProblemReport> {
    check_with_settings(observation, CheckSettings::default())
}

/// Check `observation` with the given thresholds
///
/// # Errors
/// Same as [`check`].
pub fn check_with_settings(observation: &Observation, settings: CheckSettings) -> Result<ProblemReport> {
    match observation.instrument {
        Some(Instrument::Gmos(_)) => gmos::GmosRule::new().with_settings(settings).try_check(observation),
        None => Ok(ProblemReport::new()),
    }
}
