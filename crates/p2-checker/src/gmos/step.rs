//! GMOS item keys and typed step accessors

use once_cell::sync::Lazy;
use p2_config::Key;

use super::instrument::NodAndShuffle;
use super::types::{
    AmpCount, AmpGain, AmpReadMode, Binning, BuiltinRoi, DetectorManufacturer, Disperser, Filter,
    Fpu, FpuMode,
};
use crate::step::StepContext;

/// Keys of GMOS instrument items
pub mod keys {
    use super::{Key, Lazy};

    /// `instrument:fpu`
    pub static FPU: Lazy<Key> = Lazy::new(|| Key::new("instrument:fpu"));
    /// `instrument:fpuMode`
    pub static FPU_MODE: Lazy<Key> = Lazy::new(|| Key::new("instrument:fpuMode"));
    /// `instrument:disperser`
    pub static DISPERSER: Lazy<Key> = Lazy::new(|| Key::new("instrument:disperser"));
    /// `instrument:filter`
    pub static FILTER: Lazy<Key> = Lazy::new(|| Key::new("instrument:filter"));
    /// `instrument:detectorManufacturer`
    pub static DETECTOR: Lazy<Key> = Lazy::new(|| Key::new("instrument:detectorManufacturer"));
    /// `instrument:gainChoice`
    pub static GAIN: Lazy<Key> = Lazy::new(|| Key::new("instrument:gainChoice"));
    /// `instrument:ampReadMode`
    pub static READ_MODE: Lazy<Key> = Lazy::new(|| Key::new("instrument:ampReadMode"));
    /// `instrument:ampCount`
    pub static AMP_COUNT: Lazy<Key> = Lazy::new(|| Key::new("instrument:ampCount"));
    /// `instrument:ccdXBinning`
    pub static X_BINNING: Lazy<Key> = Lazy::new(|| Key::new("instrument:ccdXBinning"));
    /// `instrument:ccdYBinning`
    pub static Y_BINNING: Lazy<Key> = Lazy::new(|| Key::new("instrument:ccdYBinning"));
    /// `instrument:disperserLambda`, central wavelength in nm
    pub static DISPERSER_LAMBDA: Lazy<Key> = Lazy::new(|| Key::new("instrument:disperserLambda"));
    /// `instrument:isMosPreimaging`
    pub static MOS_PREIMAGING: Lazy<Key> = Lazy::new(|| Key::new("instrument:isMosPreimaging"));
    /// `instrument:builtinROI`
    pub static BUILTIN_ROI: Lazy<Key> = Lazy::new(|| Key::new("instrument:builtinROI"));
    /// `instrument:fpuCustomMask`, MDF name of a custom mask
    pub static FPU_CUSTOM_MASK: Lazy<Key> = Lazy::new(|| Key::new("instrument:fpuCustomMask"));
    /// `instrument:dtaXOffset`
    pub static DTA_X_OFFSET: Lazy<Key> = Lazy::new(|| Key::new("instrument:dtaXOffset"));
}

/// GMOS views of a step
pub(crate) trait GmosStep {
    fn disperser(&self) -> Option<Disperser>;
    fn filter(&self) -> Option<Filter>;
    fn gain(&self) -> Option<AmpGain>;
    fn read_mode(&self) -> Option<AmpReadMode>;
    fn amp_count(&self) -> Option<AmpCount>;
    fn x_binning(&self) -> Option<Binning>;
    fn y_binning(&self) -> Option<Binning>;
    fn fpu_mode(&self) -> Option<FpuMode>;

    /// Detector from the step, else from the static component
    fn detector(&self) -> Option<DetectorManufacturer>;

    /// Read-out region from the step, else from the static component
    fn builtin_roi(&self) -> Option<BuiltinRoi>;

    /// FPU in the beam; a custom-mask mode reads as [`Fpu::CustomMask`]
    fn fpu(&self) -> Option<Fpu>;

    /// Whether a slit, mask or IFU is selected
    fn is_spec_fpu_selected(&self) -> bool;

    /// Nod-and-shuffle settings, when enabled
    fn nod_and_shuffle(&self) -> Option<&NodAndShuffle>;

    /// Exposure time charged for this step, including N&S cycles
    fn charged_exposure(&self) -> Option<f64>;
}

impl GmosStep for StepContext<'_> {
    fn disperser(&self) -> Option<Disperser> {
        self.symbol(&keys::DISPERSER)
    }

    fn filter(&self) -> Option<Filter> {
        self.symbol(&keys::FILTER)
    }

    fn gain(&self) -> Option<AmpGain> {
        self.symbol(&keys::GAIN)
    }

    fn read_mode(&self) -> Option<AmpReadMode> {
        self.symbol(&keys::READ_MODE)
    }

    fn amp_count(&self) -> Option<AmpCount> {
        self.symbol(&keys::AMP_COUNT)
    }

    fn x_binning(&self) -> Option<Binning> {
        self.symbol(&keys::X_BINNING)
    }

    fn y_binning(&self) -> Option<Binning> {
        self.symbol(&keys::Y_BINNING)
    }

    fn fpu_mode(&self) -> Option<FpuMode> {
        self.symbol(&keys::FPU_MODE)
    }

    fn detector(&self) -> Option<DetectorManufacturer> {
        self.symbol(&keys::DETECTOR)
            .or_else(|| self.gmos().map(|gmos| gmos.detector))
    }

    fn builtin_roi(&self) -> Option<BuiltinRoi> {
        self.symbol(&keys::BUILTIN_ROI)
            .or_else(|| self.gmos().map(|gmos| gmos.builtin_roi))
    }

    fn fpu(&self) -> Option<Fpu> {
        match self.fpu_mode() {
            Some(FpuMode::CustomMask) => Some(Fpu::CustomMask),
            _ => self.symbol(&keys::FPU),
        }
    }

    fn is_spec_fpu_selected(&self) -> bool {
        match self.fpu_mode() {
            Some(FpuMode::CustomMask) => true,
            Some(FpuMode::Builtin) => self.fpu().is_some_and(|fpu| !fpu.is_imaging()),
            None => false,
        }
    }

    fn nod_and_shuffle(&self) -> Option<&NodAndShuffle> {
        self.gmos()
            .map(|gmos| &gmos.nod_and_shuffle)
            .filter(|ns| ns.enabled)
    }

    fn charged_exposure(&self) -> Option<f64> {
        let exposure = self.exposure_time()?;
        Some(match self.nod_and_shuffle() {
            Some(ns) => ns.total_exposure(exposure),
            None => exposure,
        })
    }
}
