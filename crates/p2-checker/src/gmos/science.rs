//! Detector set-up and general science rules

use super::matchers::IMAGING;
use super::step::{keys, GmosStep};
use super::types::{AmpCount, AmpGain, AmpReadMode, Binning, DetectorManufacturer, Disperser, Site};
use super::{GmosConfigRule, GmosPassState};
use crate::observation::ImageQuality;
use crate::problem::{NodeRef, Problem};
use crate::rule::Matcher;
use crate::step::{ObsClass, StepContext};

type State = GmosPassState;

fn disperser_and_mirror(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let (disperser, filter) = (ctx.disperser()?, ctx.filter()?);
    (disperser.is_mirror() && filter.is_none()).then(|| {
        ctx.warning(
            "GmosRule_DISPERSER_AND_MIRROR_RULE",
            "Mirror must be used with a filter, or select a grating and a filter is optional",
        )
    })
}

/// A mirror needs a filter
pub const DISPERSER_AND_MIRROR_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_DISPERSER_AND_MIRROR_RULE", Matcher::ALWAYS, disperser_and_mirror);

fn bad_amp_count(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let (detector, count) = (ctx.detector()?, ctx.amp_count()?);
    if detector.supports(count) {
        return None;
    }
    let message = format!(
        "Amp count {} is not compatible with the {} CCD",
        count.display_name(),
        detector.display_name()
    );
    Some(Problem::error("GmosRule_BAD_AMP_COUNT_RULE", message, NodeRef::Sequence).at_step(ctx.step()))
}

/// Amp count must be one the CCD supports
pub const BAD_AMP_COUNT_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_BAD_AMP_COUNT_RULE", Matcher::ALWAYS, bad_amp_count);

fn e2v_amp_mode(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let site = ctx.gmos()?.site;
    if ctx.detector()? != DetectorManufacturer::E2V {
        return None;
    }
    let count = ctx.amp_count()?;
    match site {
        Site::North if count != AmpCount::Six => Some(ctx.error(
            "GmosRule_CHECK_3_AMP_MODE",
            "The E2V detectors must use 6 amp mode",
        )),
        Site::South if count != AmpCount::Three => Some(ctx.error(
            "GmosRule_CHECK_6_AMP_MODE",
            "The E2V detectors must use 3 amp mode",
        )),
        _ => None,
    }
}

/// E2V read-out uses six amps at GMOS-N and three at GMOS-S
pub const CHECK_3_AMP_MODE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_CHECK_3_AMP_MODE", Matcher::ALWAYS, e2v_amp_mode);

fn acquisition(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    if !matches!(ctx.obs_class(), Some(ObsClass::Acquisition | ObsClass::AcquisitionCal)) {
        return None;
    }
    ctx.disperser().filter(|d| !d.is_mirror()).map(|_| {
        ctx.warning(
            "GmosRule_ACQUISITION_RULE",
            "Acquisition observation should not contain grating",
        )
    })
}

/// Acquisitions image through the mirror
pub const ACQUISITION_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_ACQUISITION_RULE", Matcher::ALWAYS, acquisition);

fn is_hamamatsu(ctx: &StepContext<'_>) -> bool {
    ctx.detector() == Some(DetectorManufacturer::Hamamatsu)
}

fn gain_science(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (!is_hamamatsu(ctx) && ctx.gain() != Some(AmpGain::Low)).then(|| {
        ctx.warning(
            "GmosRule_GAIN_SCIENCE_RULE",
            "Low gain is recommended for science observations",
        )
    })
}

/// Science on E2V should use low gain
pub const GAIN_SCIENCE_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_GAIN_SCIENCE_RULE", Matcher::SCIENCE, gain_science);

fn read_mode_science(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (!is_hamamatsu(ctx) && ctx.read_mode() == Some(AmpReadMode::Fast)).then(|| {
        ctx.warning(
            "GmosRule_READMODE_SCIENCE_RULE",
            "Slow read-out is recommended for science observations",
        )
    })
}

/// Science on E2V should read out slowly
pub const READMODE_SCIENCE_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_READMODE_SCIENCE_RULE", Matcher::SCIENCE, read_mode_science);

fn gain_read_mode(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (ctx.read_mode() == Some(AmpReadMode::Slow) && ctx.gain() == Some(AmpGain::High)).then(|| {
        ctx.warning(
            "GmosRule_GAIN_READMODE_RULE",
            "Slow readout and high gain is not recommended.",
        )
    })
}

/// Slow read-out with high gain is discouraged
pub const GAIN_READMODE_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_GAIN_READMODE_RULE", Matcher::ALWAYS, gain_read_mode);

fn imaging_binning(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    const IMAGING_MSG: &str = "For imaging, binning is limited to 1x1, 2x2 or 4x4.";
    const PREIMAGING_MSG: &str = "For MOS pre-imaging, binning is limited to 1x1 or 2x2.";

    let x = ctx.x_binning();
    let preimaging = ctx.flag(&keys::MOS_PREIMAGING).unwrap_or(false);
    let problem = |code: &'static str, message: &'static str| {
        Problem::error(code, message, ctx.observe_node()).at_step(ctx.step())
    };

    if x != ctx.y_binning() {
        return Some(if preimaging {
            problem("GmosRule_PREIMAGING_MSG", PREIMAGING_MSG)
        } else {
            problem("GmosRule_IMAGING_MSG", IMAGING_MSG)
        });
    }
    (preimaging && x == Some(Binning::Four)).then(|| problem("GmosRule_PREIMAGING_MSG", PREIMAGING_MSG))
}

/// Imaging binning must be square, and at most 2x2 for MOS pre-imaging
pub const BINNING_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_BINNING_RULE", IMAGING, imaging_binning);

fn unbinned(ctx: &StepContext<'_>) -> bool {
    ctx.x_binning() == Some(Binning::One) && ctx.y_binning() == Some(Binning::One)
}

fn ccd_bin_and_iq(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let quality = ctx.observation().site_quality?;
    (unbinned(ctx) && quality.image_quality != ImageQuality::Percent20 && !ctx.observation().has_altair)
        .then(|| {
            ctx.warning(
                "GmosRule_CCD_BIN_AND_IQ_IMAGING_RULE",
                "1x1 binning is usually only necessary in IQ=20",
            )
        })
}

/// Unbinned imaging only pays off in the best seeing
pub const CCD_BIN_AND_IQ_IMAGING_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_CCD_BIN_AND_IQ_IMAGING_RULE", IMAGING, ccd_bin_and_iq);

fn ccd_bin_and_altair(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (ctx.observation().has_altair && !unbinned(ctx)).then(|| {
        ctx.warning(
            "GmosRule_CCD_BIN_AND_ALTAIR_IMAGING_RULE",
            "Altair observations should use 1x1 binning.",
        )
    })
}

/// Adaptive optics imaging should not bin
pub const CCD_BIN_AND_ALTAIR_IMAGING_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_CCD_BIN_AND_ALTAIR_IMAGING_RULE", IMAGING, ccd_bin_and_altair);

fn grating_no_slit(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let grating = ctx.disperser().is_some_and(|d| !d.is_mirror());
    let imaging = ctx.fpu().is_some_and(|fpu| fpu.is_imaging());
    (grating && imaging).then(|| {
        ctx.warning(
            "GmosRule_GRATING_NO_SLIT_SCIENCE_RULE",
            "A grating is defined but not a slit, mask or IFU",
        )
    })
}

/// A grating needs something in the focal plane
pub const GRATING_NO_SLIT_SCIENCE_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_GRATING_NO_SLIT_SCIENCE_RULE", Matcher::SCIENCE, grating_no_slit);

fn superseded_b600(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (ctx.disperser() == Some(Disperser::B600_G5303)).then(|| {
        ctx.warning(
            "GmosRule_B600_G5303_RULE",
            "The B600_G5303 grating has been superseded by the B600_G5307.",
        )
    })
}

/// The old GMOS-N B600 grating is retired
pub const B600_G5303_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_B600_G5303_RULE", Matcher::SCIENCE, superseded_b600);

fn spec_element_without_grating(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let disperser = ctx.disperser()?;
    (disperser.is_mirror() && ctx.is_spec_fpu_selected()).then(|| {
        ctx.warning(
            "GmosRule_SPECTROSCOPIC_ELEMENT_IN_FPU_SCIENCE_RULE",
            "A slit, mask or IFU is defined, but no grating is selected",
        )
    })
}

/// A slit, mask or IFU needs a grating
pub const SPECTROSCOPIC_ELEMENT_IN_FPU_SCIENCE_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_SPECTROSCOPIC_ELEMENT_IN_FPU_SCIENCE_RULE",
    Matcher::SCIENCE,
    spec_element_without_grating,
);

fn ns_without_slit_or_grating(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let disperser = ctx.disperser()?;
    ctx.nod_and_shuffle()?;
    (disperser.is_mirror() && !ctx.is_spec_fpu_selected()).then(|| {
        ctx.warning(
            "GmosRule_N_S_NO_SLIT_OR_GRATING_SCIENCE_RULE",
            "Nod and Shuffle science observations require a grating and a spectroscopic element in the fpu",
        )
    })
}

/// Nod and shuffle is a spectroscopic mode
pub const N_S_NO_SLIT_OR_GRATING_SCIENCE_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_N_S_NO_SLIT_OR_GRATING_SCIENCE_RULE",
    Matcher::SCIENCE,
    ns_without_slit_or_grating,
);

fn dta_x_binning(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let offset = ctx.i64(&keys::DTA_X_OFFSET)?;
    let binning = i64::from(ctx.y_binning()?.value());
    (offset % binning != 0).then(|| {
        ctx.warning(
            "GmosRule_DTA_X_Y_BINNING_RULE",
            "The DTA-X offset must be a multiple of the y binning",
        )
    })
}

/// Detector translation must move by whole binned rows
pub const DTA_X_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_DTA_X_Y_BINNING_RULE", Matcher::ALWAYS, dta_x_binning);
