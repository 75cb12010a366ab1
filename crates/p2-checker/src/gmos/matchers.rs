//! Step selectors for the GMOS rule set

use super::step::GmosStep;
use crate::rule::Matcher;
use crate::step::{ObsClass, StepContext};

/// Science or daytime calibration steps
pub const SCIENCE_DAYCAL: Matcher = Matcher::new("gmos_science_daycal", is_science_or_daycal);

/// Science imaging: mirror in the beam and no FPU
pub const IMAGING: Matcher = Matcher::new("gmos_imaging", is_imaging);

/// Science spectroscopy: a grating plus a slit, mask or IFU
pub const SPECTROSCOPY: Matcher = Matcher::new("gmos_spectroscopy", is_spectroscopy);

/// Science spectroscopy with nod and shuffle enabled
pub const N_S_SPECTROSCOPY: Matcher = Matcher::new("gmos_ns_spectroscopy", is_ns_spectroscopy);

/// Nod-and-shuffle spectroscopy, including daytime calibrations
pub const N_S_SPECTROSCOPY_SCIENCE_DAYCAL: Matcher =
    Matcher::new("gmos_ns_spectroscopy_science_daycal", is_ns_spectroscopy_or_daycal);

fn is_science_or_daycal(ctx: &StepContext<'_>) -> bool {
    matches!(ctx.obs_class(), Some(ObsClass::Science | ObsClass::DayCal))
}

fn is_imaging(ctx: &StepContext<'_>) -> bool {
    Matcher::SCIENCE.matches(ctx)
        && ctx.disperser().is_some_and(|d| d.is_mirror())
        && ctx.fpu().is_some_and(|fpu| fpu.is_imaging())
}

fn has_grating_and_slit(ctx: &StepContext<'_>) -> bool {
    ctx.is_spec_fpu_selected() && ctx.disperser().is_some_and(|d| !d.is_mirror())
}

fn is_spectroscopy(ctx: &StepContext<'_>) -> bool {
    Matcher::SCIENCE.matches(ctx) && has_grating_and_slit(ctx)
}

fn is_ns_spectroscopy(ctx: &StepContext<'_>) -> bool {
    is_spectroscopy(ctx) && ctx.nod_and_shuffle().is_some()
}

fn is_ns_spectroscopy_or_daycal(ctx: &StepContext<'_>) -> bool {
    is_science_or_daycal(ctx) && has_grating_and_slit(ctx) && ctx.nod_and_shuffle().is_some()
}
