//! Checker thresholds
//!
//! Thresholds that are policy rather than instrument physics live here so a
//! site can tune them without touching rule code.

use serde::{Deserialize, Serialize};

use crate::error::{CheckerError, Result};

/// Tunable thresholds passed to every rule through its step context
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckSettings {
    /// Fraction of the background exposure limit above which a warning is raised
    pub exposure_warning_fraction: f64,
    /// Spectroscopic exposures longer than this (seconds) are flagged
    pub spectroscopic_exposure_warning_secs: f64,
    /// Imaging exposures longer than this (seconds) call for spatial dithers
    pub dither_exposure_secs: f64,
}

impl CheckSettings {
    /// Default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With exposure warning fraction
    #[inline]
    #[must_use]
    pub fn with_exposure_warning_fraction(mut self, fraction: f64) -> Self {
        self.exposure_warning_fraction = fraction;
        self
    }

    /// With spectroscopic exposure warning threshold
    #[inline]
    #[must_use]
    pub fn with_spectroscopic_exposure_warning_secs(mut self, secs: f64) -> Self {
        self.spectroscopic_exposure_warning_secs = secs;
        self
    }

    /// With dither exposure threshold
    #[inline]
    #[must_use]
    pub fn with_dither_exposure_secs(mut self, secs: f64) -> Self {
        self.dither_exposure_secs = secs;
        self
    }

    /// Parse settings from TOML; missing fields take their defaults
    ///
    /// # Errors
    /// Returns [`CheckerError::Settings`] on malformed TOML or unknown
    /// fields, and [`CheckerError::InvalidSetting`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use p2_checker::CheckSettings;
    ///
    /// let settings = CheckSettings::from_toml_str("exposure_warning_fraction = 0.5").unwrap();
    /// assert_eq!(settings.exposure_warning_fraction, 0.5);
    /// assert_eq!(settings.dither_exposure_secs, 300.0);
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every threshold is usable
    ///
    /// # Errors
    /// Returns [`CheckerError::InvalidSetting`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !(self.exposure_warning_fraction > 0.0 && self.exposure_warning_fraction <= 1.0) {
            return Err(CheckerError::InvalidSetting {
                name: "exposure_warning_fraction",
                reason: format!("{} is not in (0, 1]", self.exposure_warning_fraction),
            });
        }
        for (name, value) in [
            (
                "spectroscopic_exposure_warning_secs",
                self.spectroscopic_exposure_warning_secs,
            ),
            ("dither_exposure_secs", self.dither_exposure_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CheckerError::InvalidSetting {
                    name,
                    reason: format!("{value} is not a non-negative number of seconds"),
                });
            }
        }
        Ok(())
    }

    /// Warning fraction as a whole percentage, for messages
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn exposure_warning_percent(&self) -> i64 {
        (self.exposure_warning_fraction * 100.0).round() as i64
    }
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            exposure_warning_fraction: 0.6,
            spectroscopic_exposure_warning_secs: 3600.0,
            dither_exposure_secs: 300.0,
        }
    }
}
