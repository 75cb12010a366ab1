//! Observation model consumed by the checker
//!
//! An [`Observation`] bundles the resolved step sequence with the static
//! instrument component and the requested site conditions. It is plain data
//! so callers can build it in code or load it from JSON/YAML.

use p2_config::ConfigSequence;
use serde::{Deserialize, Serialize};

use crate::gmos::GmosInstrument;
use crate::symbol::symbol_enum;

symbol_enum! {
    /// Sky background percentile bucket
    pub enum SkyBackground as "sky background" {
        /// Darkest 20%
        Percent20 => "PERCENT_20",
        /// Darkest 50%
        Percent50 => "PERCENT_50",
        /// Darkest 80%
        Percent80 => "PERCENT_80",
        /// Any background
        Any => "ANY",
    }
}

symbol_enum! {
    /// Image quality percentile bucket
    pub enum ImageQuality as "image quality" {
        /// Best 20%
        Percent20 => "PERCENT_20",
        /// Best 70%
        Percent70 => "PERCENT_70",
        /// Best 85%
        Percent85 => "PERCENT_85",
        /// Any image quality
        Any => "ANY",
    }
}

/// Requested observing conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteQuality {
    /// Sky background constraint
    pub sky_background: SkyBackground,
    /// Image quality constraint
    pub image_quality: ImageQuality,
}

impl SiteQuality {
    /// Create site quality constraints
    #[inline]
    #[must_use]
    pub fn new(sky_background: SkyBackground, image_quality: ImageQuality) -> Self {
        Self {
            sky_background,
            image_quality,
        }
    }
}

impl Default for SiteQuality {
    fn default() -> Self {
        Self::new(SkyBackground::Any, ImageQuality::Any)
    }
}

/// Static instrument component of an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Instrument {
    /// GMOS North or South
    Gmos(GmosInstrument),
}

/// One observation: its sequence plus the context rules need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Resolved step sequence
    pub sequence: ConfigSequence,
    /// Static instrument component, if any
    #[serde(default)]
    pub instrument: Option<Instrument>,
    /// Site quality component, if any
    #[serde(default)]
    pub site_quality: Option<SiteQuality>,
    /// Whether the observation uses the Altair adaptive optics system
    #[serde(default)]
    pub has_altair: bool,
    /// Owning program, such as `GN-2014A-Q-1`
    #[serde(default)]
    pub program_id: Option<String>,
}

impl Observation {
    /// Observation over `sequence` with no other components
    #[must_use]
    pub fn new(sequence: ConfigSequence) -> Self {
        Self {
            sequence,
            instrument: None,
            site_quality: None,
            has_altair: false,
            program_id: None,
        }
    }

    /// With instrument component
    #[inline]
    #[must_use]
    pub fn with_instrument(mut self, instrument: Instrument) -> Self {
        self.instrument = Some(instrument);
        self
    }

    /// With GMOS instrument component
    #[inline]
    #[must_use]
    pub fn with_gmos(self, gmos: GmosInstrument) -> Self {
        self.with_instrument(Instrument::Gmos(gmos))
    }

    /// With site quality component
    #[inline]
    #[must_use]
    pub fn with_site_quality(mut self, site_quality: SiteQuality) -> Self {
        self.site_quality = Some(site_quality);
        self
    }

    /// With Altair flag
    #[inline]
    #[must_use]
    pub fn with_altair(mut self, has_altair: bool) -> Self {
        self.has_altair = has_altair;
        self
    }

    /// With owning program
    #[inline]
    #[must_use]
    pub fn with_program_id(mut self, program_id: impl Into<String>) -> Self {
        self.program_id = Some(program_id.into());
        self
    }

    /// GMOS component, if that is the instrument
    #[inline]
    #[must_use]
    pub fn gmos(&self) -> Option<&GmosInstrument> {
        match &self.instrument {
            Some(Instrument::Gmos(gmos)) => Some(gmos),
            None => None,
        }
    }
}
