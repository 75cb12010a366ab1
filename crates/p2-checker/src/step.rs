//! Per-step view handed to rules
//!
//! [`StepContext`] bundles one resolved step with its index, the owning
//! observation and the active settings, and offers typed accessors for the
//! items every instrument shares (observe class, exposure, offsets).

use once_cell::sync::Lazy;
use p2_config::{Config, ConfigSymbol, Key, Value};
use tracing::warn;

use crate::gmos::GmosInstrument;
use crate::observation::Observation;
use crate::problem::{NodeRef, Problem};
use crate::settings::CheckSettings;
use crate::symbol::symbol_enum;

/// Keys of items shared by all instruments
pub mod keys {
    use super::{Key, Lazy};

    /// `observe:class`
    pub static OBS_CLASS: Lazy<Key> = Lazy::new(|| Key::new("observe:class"));
    /// `observe:observeType`
    pub static OBSERVE_TYPE: Lazy<Key> = Lazy::new(|| Key::new("observe:observeType"));
    /// `observe:exposureTime`
    pub static EXPOSURE_TIME: Lazy<Key> = Lazy::new(|| Key::new("observe:exposureTime"));
    /// `observe:repeatCount`
    pub static REPEAT_COUNT: Lazy<Key> = Lazy::new(|| Key::new("observe:repeatCount"));
    /// `telescope:p`
    pub static P_OFFSET: Lazy<Key> = Lazy::new(|| Key::new("telescope:p"));
    /// `telescope:q`
    pub static Q_OFFSET: Lazy<Key> = Lazy::new(|| Key::new("telescope:q"));
}

symbol_enum! {
    /// Observation class, which decides the charging and checking policy
    pub enum ObsClass as "observation class" {
        /// Science data
        Science => "science",
        /// Nighttime calibration charged to the program
        ProgramCal => "progCal",
        /// Nighttime calibration charged to the partner
        PartnerCal => "partnerCal",
        /// Acquisition
        Acquisition => "acq",
        /// Acquisition calibration
        AcquisitionCal => "acqCal",
        /// Daytime calibration
        DayCal => "dayCal",
    }
}

symbol_enum! {
    /// What an observe step records
    pub enum ObserveType as "observe type" {
        /// On-sky science frame
        Object => "OBJECT",
        /// Dark frame
        Dark => "DARK",
        /// Flat field
        Flat => "FLAT",
        /// Arc lamp
        Arc => "ARC",
        /// Bias frame
        Bias => "BIAS",
    }
}

/// One resolved step as seen by a rule
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    config: &'a Config,
    step: usize,
    observation: &'a Observation,
    settings: &'a CheckSettings,
}

impl<'a> StepContext<'a> {
    /// Create a context for `config`, the resolved step at index `step`
    #[inline]
    #[must_use]
    pub fn new(
        config: &'a Config,
        step: usize,
        observation: &'a Observation,
        settings: &'a CheckSettings,
    ) -> Self {
        Self {
            config,
            step,
            observation,
            settings,
        }
    }

    /// Resolved step configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Step index
    #[inline]
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Owning observation
    #[inline]
    #[must_use]
    pub fn observation(&self) -> &'a Observation {
        self.observation
    }

    /// Active thresholds
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &'a CheckSettings {
        self.settings
    }

    /// GMOS component of the owning observation
    #[inline]
    #[must_use]
    pub fn gmos(&self) -> Option<&'a GmosInstrument> {
        self.observation.gmos()
    }

    /// Raw item value
    #[inline]
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&'a Value> {
        self.config.get(key)
    }

    /// Decode an enumerated item
    ///
    /// An unknown constant is logged and treated as absent; strict callers
    /// validate the sequence up front.
    #[must_use]
    pub fn symbol<T: ConfigSymbol>(&self, key: &Key) -> Option<T> {
        match self.config.symbol::<T>(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(step = self.step, key = %key, error = %err, "ignoring unknown symbol");
                None
            }
        }
    }

    /// Numeric item
    #[inline]
    #[must_use]
    pub fn f64(&self, key: &Key) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Integral item
    #[inline]
    #[must_use]
    pub fn i64(&self, key: &Key) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Flag item; `YES`/`NO` symbols are accepted alongside booleans
    #[must_use]
    pub fn flag(&self, key: &Key) -> Option<bool> {
        let value = self.get(key)?;
        value.as_bool().or_else(|| match value.as_symbol()? {
            "YES" | "TRUE" | "true" => Some(true),
            "NO" | "FALSE" | "false" => Some(false),
            _ => None,
        })
    }

    /// Observation class of this step
    #[inline]
    #[must_use]
    pub fn obs_class(&self) -> Option<ObsClass> {
        self.symbol(&keys::OBS_CLASS)
    }

    /// Observe type of this step
    #[inline]
    #[must_use]
    pub fn observe_type(&self) -> Option<ObserveType> {
        self.symbol(&keys::OBSERVE_TYPE)
    }

    /// Exposure time of the observe, in seconds
    #[inline]
    #[must_use]
    pub fn exposure_time(&self) -> Option<f64> {
        self.f64(&keys::EXPOSURE_TIME)
    }

    /// Repeat count of the observe
    #[inline]
    #[must_use]
    pub fn repeat_count(&self) -> Option<i64> {
        self.i64(&keys::REPEAT_COUNT)
    }

    /// Telescope p offset in arcsec
    #[inline]
    #[must_use]
    pub fn p_offset(&self) -> Option<f64> {
        self.f64(&keys::P_OFFSET)
    }

    /// Telescope q offset in arcsec
    #[inline]
    #[must_use]
    pub fn q_offset(&self) -> Option<f64> {
        self.f64(&keys::Q_OFFSET)
    }

    /// Node for a problem found at this step
    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeRef {
        NodeRef::for_step(self.step)
    }

    /// Node for a problem whose placement depends on the observe type
    ///
    /// Darks and flats are always sequence iterations, so their problems
    /// point at the sequence even on the first step.
    #[must_use]
    pub fn observe_node(&self) -> NodeRef {
        match self.observe_type() {
            Some(ObserveType::Dark | ObserveType::Flat) => NodeRef::Sequence,
            _ => self.node(),
        }
    }

    /// Warning at this step
    #[inline]
    #[must_use]
    pub fn warning(&self, code: impl Into<String>, message: impl Into<String>) -> Problem {
        Problem::warning(code, message, self.node()).at_step(self.step)
    }

    /// Error at this step
    #[inline]
    #[must_use]
    pub fn error(&self, code: impl Into<String>, message: impl Into<String>) -> Problem {
        Problem::error(code, message, self.node()).at_step(self.step)
    }
}
