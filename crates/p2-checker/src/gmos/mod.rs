//! GMOS rule set
//!
//! [`GmosRule`] checks an observation made with GMOS-N or GMOS-S. It runs
//! the step rules from [`config_rules`] through a [`SequenceRule`], then the
//! whole-sequence ROI rule, then the spatial dither check that needs the
//! full pass.
//!
//! # Example
//!
//! ```rust
//! use p2_checker::gmos::{keys, AmpGain, DetectorManufacturer, GmosInstrument, GmosRule, Site};
//! use p2_checker::{Observation, Rule};
//! use p2_config::{Config, ConfigSequence};
//!
//! let step = Config::new()
//!     .with(keys::GAIN.clone(), AmpGain::Low)
//!     .with(keys::DTA_X_OFFSET.clone(), 3_i64)
//!     .with(keys::Y_BINNING.clone(), "TWO");
//! let obs = Observation::new(ConfigSequence::from_complete(vec![step]))
//!     .with_gmos(GmosInstrument::new(Site::South, DetectorManufacturer::Hamamatsu));
//!
//! let report = GmosRule::new().check(&obs);
//! assert!(report.codes().contains(&"GmosRule_DTA_X_Y_BINNING_RULE"));
//! ```

mod dither;
mod exposure;
mod instrument;
mod matchers;
mod mdf;
mod roi;
mod science;
mod spectroscopy;
mod step;
mod types;

use p2_config::{Config, ConfigSymbol, Key};
use tracing::{debug, info};

use crate::composite::CompositeRule;
use crate::error::{CheckerError, Result};
use crate::observation::Observation;
use crate::problem::ProblemReport;
use crate::rule::{ConfigRule, PassState, Rule};
use crate::sequence_rule::SequenceRule;
use crate::settings::CheckSettings;
use crate::step::{keys as common, ObsClass, ObserveType};

pub use dither::{GmosPassState, SPATIAL_DITHER_IMAGING_RULE};
pub use exposure::{
    exposure_limit, FILTER_MAX_EXPOSURE_TIME_RULE, INTEGER_EXPOSURE_TIME_RULE, MAX_EXPOSURE_TIME_RULE,
    NON_ZERO_EXPOSURE_TIME_RULE,
};
pub use instrument::{GmosInstrument, NodAndShuffle, OffsetPos, RoiDescription};
pub use mdf::{MDF_MASK_NAME_ERROR_RULE, MDF_MASK_NAME_WARNING_RULE};
pub use matchers::{IMAGING, N_S_SPECTROSCOPY, N_S_SPECTROSCOPY_SCIENCE_DAYCAL, SCIENCE_DAYCAL, SPECTROSCOPY};
pub use roi::{
    UnusedCustomRoiRule, CUSTOM_ROI_NOT_DECLARED_RULE, MAX_ROI_RULE, ROI_INVALID_RULE, ROI_OVERLAP_RULE,
};
pub use science::{
    ACQUISITION_RULE, B600_G5303_RULE, BAD_AMP_COUNT_RULE, BINNING_RULE, CCD_BIN_AND_ALTAIR_IMAGING_RULE,
    CCD_BIN_AND_IQ_IMAGING_RULE, CHECK_3_AMP_MODE, DISPERSER_AND_MIRROR_RULE, DTA_X_RULE, GAIN_READMODE_RULE,
    GAIN_SCIENCE_RULE, GRATING_NO_SLIT_SCIENCE_RULE, N_S_NO_SLIT_OR_GRATING_SCIENCE_RULE, READMODE_SCIENCE_RULE,
    SPECTROSCOPIC_ELEMENT_IN_FPU_SCIENCE_RULE,
};
pub use spectroscopy::{
    second_order_limit, DISPERSER_WAVELENGTH_SPECTROSCOPIC_RULE, EOFFSET_N_S_SPECTROSCOPY_RULE,
    EXP_SPECTROSCOPIC_RULE, IFU_2_SLIT_AND_FILTER_SPECTROSCOPIC_RULE, IFU_LEFT_SLIT_SPECTROSCOPIC_RULE,
    IFU_NO_SPATIAL_BINNING_RULE, NOD_DISTANCE_N_S_SPECTROSCOPY_RULE, NS_SLIT_SPECTROSCOPY_RULE,
    N_S_CYCLES_N_S_SPECTROSCOPY_RULE, N_S_FPU_SPECTROSCOPIC_RULE, SHUFFLE_DISTANCE_N_S_SPECTROSCOPY_RULE,
    NO_P_OFFSETS_WITH_SLIT_SPECTROSCOPY_RULE, WAVELENGTH_SPECTROSCOPIC_RULE,
    Y_BINNING_AND_SHUFFLE_DISTANCE_SPECTROSCOPY_RULE,
};
pub use step::keys;
pub use types::{
    AmpCount, AmpGain, AmpReadMode, Binning, BuiltinRoi, DetectorManufacturer, Disperser, Filter, Fpu, FpuMode,
    Site,
};

/// Step rule sharing the GMOS pass state
pub type GmosConfigRule = ConfigRule<GmosPassState>;

/// The GMOS step rules in evaluation order
#[must_use]
pub fn config_rules() -> Vec<GmosConfigRule> {
    vec![
        DISPERSER_AND_MIRROR_RULE,
        BAD_AMP_COUNT_RULE,
        CHECK_3_AMP_MODE,
        ACQUISITION_RULE,
        GAIN_SCIENCE_RULE,
        READMODE_SCIENCE_RULE,
        GAIN_READMODE_RULE,
        BINNING_RULE,
        SPATIAL_DITHER_IMAGING_RULE,
        CCD_BIN_AND_IQ_IMAGING_RULE,
        CCD_BIN_AND_ALTAIR_IMAGING_RULE,
        GRATING_NO_SLIT_SCIENCE_RULE,
        B600_G5303_RULE,
        SPECTROSCOPIC_ELEMENT_IN_FPU_SCIENCE_RULE,
        N_S_NO_SLIT_OR_GRATING_SCIENCE_RULE,
        EXP_SPECTROSCOPIC_RULE,
        IFU_LEFT_SLIT_SPECTROSCOPIC_RULE,
        IFU_2_SLIT_AND_FILTER_SPECTROSCOPIC_RULE,
        WAVELENGTH_SPECTROSCOPIC_RULE,
        DISPERSER_WAVELENGTH_SPECTROSCOPIC_RULE,
        N_S_FPU_SPECTROSCOPIC_RULE,
        NOD_DISTANCE_N_S_SPECTROSCOPY_RULE,
        SHUFFLE_DISTANCE_N_S_SPECTROSCOPY_RULE,
        N_S_CYCLES_N_S_SPECTROSCOPY_RULE,
        EOFFSET_N_S_SPECTROSCOPY_RULE,
        NS_SLIT_SPECTROSCOPY_RULE,
        Y_BINNING_AND_SHUFFLE_DISTANCE_SPECTROSCOPY_RULE,
        MAX_EXPOSURE_TIME_RULE,
        FILTER_MAX_EXPOSURE_TIME_RULE,
        INTEGER_EXPOSURE_TIME_RULE,
        NON_ZERO_EXPOSURE_TIME_RULE,
        MAX_ROI_RULE,
        ROI_OVERLAP_RULE,
        ROI_INVALID_RULE,
        CUSTOM_ROI_NOT_DECLARED_RULE,
        IFU_NO_SPATIAL_BINNING_RULE,
        NO_P_OFFSETS_WITH_SLIT_SPECTROSCOPY_RULE,
        MDF_MASK_NAME_ERROR_RULE,
        MDF_MASK_NAME_WARNING_RULE,
        DTA_X_RULE,
    ]
}

/// Complete checker for GMOS observations
#[derive(Debug)]
pub struct GmosRule {
    sequence: SequenceRule<GmosPassState>,
    whole: CompositeRule,
}

impl GmosRule {
    /// Rule set with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            sequence: SequenceRule::from_rules("gmos_sequence", config_rules()),
            whole: CompositeRule::new("gmos_observation").with_rule(UnusedCustomRoiRule),
        }
    }

    /// With thresholds
    #[must_use]
    pub fn with_settings(mut self, settings: CheckSettings) -> Self {
        self.sequence = self.sequence.with_settings(settings);
        self
    }

    /// Active thresholds
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &CheckSettings {
        self.sequence.settings()
    }

    /// Check after validating the observation
    ///
    /// [`Rule::check`] treats an unknown symbol as absent and returns an
    /// empty report for non-GMOS observations. This variant refuses both;
    /// the crate-level [`check`](crate::check) goes through it.
    ///
    /// # Errors
    /// Returns [`CheckerError::MissingInstrument`] without a GMOS component
    /// and [`CheckerError::UnknownSymbol`] for the first step item holding a
    /// constant that is not recognized.
    pub fn try_check(&self, observation: &Observation) -> Result<ProblemReport> {
        if observation.gmos().is_none() {
            return Err(CheckerError::MissingInstrument);
        }
        for (step, config) in observation.sequence.iter().enumerate() {
            validate_symbols(config, step)?;
        }
        Ok(self.check(observation))
    }
}

impl Default for GmosRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for GmosRule {
    fn name(&self) -> &'static str {
        "gmos"
    }

    fn check(&self, observation: &Observation) -> ProblemReport {
        if observation.gmos().is_none() {
            debug!("observation has no GMOS component, skipping");
            return ProblemReport::new();
        }
        let (mut report, state) = self.sequence.run(observation);
        report.extend(self.whole.check(observation));
        state.finish(observation, &mut report);

        info!(
            steps = observation.sequence.len(),
            errors = report.errors().count(),
            warnings = report.warnings().count(),
            "gmos check complete"
        );
        report
    }
}

fn strict<T: ConfigSymbol>(config: &Config, step: usize, key: &Key) -> Result<()> {
    config
        .symbol::<T>(key)
        .map(drop)
        .map_err(|source| CheckerError::UnknownSymbol {
            step,
            key: key.clone(),
            source,
        })
}

fn validate_symbols(config: &Config, step: usize) -> Result<()> {
    strict::<ObsClass>(config, step, &common::OBS_CLASS)?;
    strict::<ObserveType>(config, step, &common::OBSERVE_TYPE)?;
    strict::<Fpu>(config, step, &keys::FPU)?;
    strict::<FpuMode>(config, step, &keys::FPU_MODE)?;
    strict::<Disperser>(config, step, &keys::DISPERSER)?;
    strict::<Filter>(config, step, &keys::FILTER)?;
    strict::<DetectorManufacturer>(config, step, &keys::DETECTOR)?;
    strict::<AmpGain>(config, step, &keys::GAIN)?;
    strict::<AmpReadMode>(config, step, &keys::READ_MODE)?;
    strict::<AmpCount>(config, step, &keys::AMP_COUNT)?;
    strict::<Binning>(config, step, &keys::X_BINNING)?;
    strict::<Binning>(config, step, &keys::Y_BINNING)?;
    strict::<BuiltinRoi>(config, step, &keys::BUILTIN_ROI)
}
