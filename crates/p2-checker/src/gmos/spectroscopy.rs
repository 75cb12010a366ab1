//! Spectroscopy and nod-and-shuffle rules

use super::matchers::{N_S_SPECTROSCOPY, N_S_SPECTROSCOPY_SCIENCE_DAYCAL, SPECTROSCOPY};
use super::step::{keys, GmosStep};
use super::types::{Binning, Disperser, Fpu, FpuMode, Site};
use super::{GmosConfigRule, GmosPassState};
use crate::problem::Problem;
use crate::rule::Matcher;
use crate::step::StepContext;

type State = GmosPassState;

fn long_spectroscopic_exposure(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let exposure = ctx.exposure_time()?;
    (exposure > ctx.settings().spectroscopic_exposure_warning_secs).then(|| {
        Problem::warning(
            "GmosRule_EXP_SPECTROSCOPIC_RULE",
            "It is usually best to keep spectroscopic exposure times less than one hour",
            ctx.observe_node(),
        )
        .at_step(ctx.step())
    })
}

/// Long spectroscopic exposures collect too many cosmic rays
pub const EXP_SPECTROSCOPIC_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_EXP_SPECTROSCOPIC_RULE", SPECTROSCOPY, long_spectroscopic_exposure);

fn ifu_left_slit(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (ctx.fpu() == Some(Fpu::Ifu2)).then(|| {
        ctx.warning(
            "GmosRule_IFU_LEFT_SLIT_SPECTROSCOPIC_RULE",
            "In IFU one slit mode it is recommended to use the red slit",
        )
    })
}

/// Single-slit IFU work should use the red slit
pub const IFU_LEFT_SLIT_SPECTROSCOPIC_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_IFU_LEFT_SLIT_SPECTROSCOPIC_RULE", SPECTROSCOPY, ifu_left_slit);

fn ifu_two_slit_without_filter(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (ctx.filter()?.is_none() && ctx.fpu() == Some(Fpu::Ifu1)).then(|| {
        ctx.warning(
            "GmosRule_IFU_2_SLIT_AND_FILTER_SPECTROSCOPIC_RULE",
            "In IFU 2-slit mode, it is recommended to use a filter to prevent spectral overlap",
        )
    })
}

/// Two-slit IFU spectra overlap without a filter
pub const IFU_2_SLIT_AND_FILTER_SPECTROSCOPIC_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_IFU_2_SLIT_AND_FILTER_SPECTROSCOPIC_RULE",
    SPECTROSCOPY,
    ifu_two_slit_without_filter,
);

fn central_wavelength(ctx: &StepContext<'_>) -> Option<f64> {
    ctx.f64(&keys::DISPERSER_LAMBDA)
}

fn wavelength_range(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let lambda = central_wavelength(ctx)?;
    (!(450.0..=900.0).contains(&lambda)).then(|| {
        ctx.warning(
            "GmosRule_WAVELENGTH_SPECTROSCOPIC_RULE",
            "The central wavelength is likely too blue or too red",
        )
    })
}

/// Central wavelength outside 450-900 nm
pub const WAVELENGTH_SPECTROSCOPIC_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_WAVELENGTH_SPECTROSCOPIC_RULE", SPECTROSCOPY, wavelength_range);

/// Central wavelength (nm) above which a red grating overlaps its second order
#[must_use]
pub fn second_order_limit(disperser: Disperser) -> Option<f64> {
    match disperser {
        Disperser::R400_G5305 | Disperser::R400_G5325 => Some(710.0),
        Disperser::R831_G5302 | Disperser::R831_G5322 => Some(815.0),
        Disperser::R600_G5304 | Disperser::R600_G5324 => Some(775.0),
        _ => None,
    }
}

fn second_order_overlap(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    if !ctx.filter()?.is_none() {
        return None;
    }
    let disperser = ctx.disperser()?;
    let overlaps = match disperser {
        Disperser::R150_G5306 | Disperser::R150_G5326 => true,
        _ => second_order_limit(disperser)
            .zip(central_wavelength(ctx))
            .is_some_and(|(limit, lambda)| lambda > limit),
    };
    overlaps.then(|| {
        ctx.warning(
            "GmosRule_DisperserWavelengthChecker",
            "For the selected central wavelength and disperser it is recommended to use a blocking filter to avoid second order overlap",
        )
    })
}

/// Red gratings without a blocking filter
pub const DISPERSER_WAVELENGTH_SPECTROSCOPIC_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_DisperserWavelengthChecker",
    SPECTROSCOPY,
    second_order_overlap,
);

fn ns_fpu(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    if ctx.fpu().is_some_and(Fpu::is_ns) {
        return None;
    }
    let message = match ctx.gmos()?.site {
        Site::South => "For Nod and Shuffle, either a Nod and Shuffle slit, or a mask or the IFU must be selected",
        Site::North => "For Nod and Shuffle, either a Nod and Shuffle slit or a mask must be selected",
    };
    Some(ctx.warning("GmosRule_N_S_FPU_SPECTROSCOPIC_RULE", message))
}

/// Nod and shuffle needs an N&S focal plane unit
pub const N_S_FPU_SPECTROSCOPIC_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_N_S_FPU_SPECTROSCOPIC_RULE", N_S_SPECTROSCOPY, ns_fpu);

#[allow(clippy::float_cmp)]
fn nod_distance(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let ns = ctx.nod_and_shuffle()?;
    let missing = ns.positions.len() < 2 || ns.square_nod_distances().any(|d| d == 0.0);
    missing.then(|| {
        ctx.error(
            "GmosRule_NOD_DISTANCE_N_S_SPECTROSCOPY_RULE",
            "For Nod and Shuffle a nod distance must be set",
        )
    })
}

/// Nod positions must differ
pub const NOD_DISTANCE_N_S_SPECTROSCOPY_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_NOD_DISTANCE_N_S_SPECTROSCOPY_RULE", N_S_SPECTROSCOPY, nod_distance);

fn shuffle_distance(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (ctx.nod_and_shuffle()?.detector_rows == 0).then(|| {
        ctx.error(
            "GmosRule_SHUFFLE_DISTANCE_N_S_SPECTROSCOPY_RULE",
            "For Nod and Shuffle a shuffle distance must be set",
        )
    })
}

/// Shuffle distance must be set, calibrations included
pub const SHUFFLE_DISTANCE_N_S_SPECTROSCOPY_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_SHUFFLE_DISTANCE_N_S_SPECTROSCOPY_RULE",
    N_S_SPECTROSCOPY_SCIENCE_DAYCAL,
    shuffle_distance,
);

fn ns_cycles(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (ctx.nod_and_shuffle()?.cycles == 0).then(|| {
        ctx.warning(
            "GmosRule_N_S_CYCLES_N_S_SPECTROSCOPY_RULE",
            "For Nod and Shuffle > 0 cycles must be set",
        )
    })
}

/// At least one nod cycle
pub const N_S_CYCLES_N_S_SPECTROSCOPY_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_N_S_CYCLES_N_S_SPECTROSCOPY_RULE", N_S_SPECTROSCOPY, ns_cycles);

fn electronic_offset_distance(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    const MAX_NOD_DISTANCE: f64 = 2.0;
    let ns = ctx.nod_and_shuffle()?;
    let too_far = ns.electronic_offsetting
        && ns
            .square_nod_distances()
            .any(|d| d > MAX_NOD_DISTANCE * MAX_NOD_DISTANCE);
    too_far.then(|| {
        ctx.warning(
            "GmosRule_EOFFSET_N_S_SPECTROSCOPY_RULE",
            "To use electronic offsetting the Nod Distance must be <= 2",
        )
    })
}

/// Electronic offsetting only reaches 2 arcsec
pub const EOFFSET_N_S_SPECTROSCOPY_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_EOFFSET_N_S_SPECTROSCOPY_RULE",
    N_S_SPECTROSCOPY,
    electronic_offset_distance,
);

fn ns_slit_shuffle(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let ns = ctx.nod_and_shuffle()?;
    if !ctx.fpu().is_some_and(Fpu::is_ns_slit) {
        return None;
    }
    let rows = ctx.detector()?.shuffle_offset_pixels();
    (ns.detector_rows != rows).then(|| {
        ctx.warning(
            "GmosRule_NS_SLIT_SPECTROSCOPY_RULE",
            format!("For long slit Nod and Shuffle the shuffle distance must be {rows}"),
        )
    })
}

/// N&S slits need the detector's standard shuffle
pub const NS_SLIT_SPECTROSCOPY_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_NS_SLIT_SPECTROSCOPY_RULE", N_S_SPECTROSCOPY, ns_slit_shuffle);

fn y_binning_and_shuffle(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let rows = ctx.nod_and_shuffle()?.detector_rows;
    let binning = ctx.y_binning()?.value();
    (rows % binning != 0).then(|| {
        ctx.error(
            "GmosRule_Y_BINNING_AND_SHUFFLE_DISTANCE_SPECTROSCOPY_RULE",
            "The shuffle distance must be a multiple of the CCD Y binning",
        )
    })
}

/// Shuffle must move whole binned rows
pub const Y_BINNING_AND_SHUFFLE_DISTANCE_SPECTROSCOPY_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_Y_BINNING_AND_SHUFFLE_DISTANCE_SPECTROSCOPY_RULE",
    N_S_SPECTROSCOPY,
    y_binning_and_shuffle,
);

fn ifu_spatial_binning(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let ifu = ctx.fpu().is_some_and(Fpu::is_ifu);
    let grating = ctx.disperser().is_some_and(|d| !d.is_mirror());
    let binned = ctx.y_binning().is_some_and(|b| b != Binning::One);
    (ifu && grating && binned).then(|| {
        ctx.warning(
            "GmosRule_IFU_NO_SPATIAL_BINNING_RULE",
            "IFU observations generally should not be binned in the spatial direction (y)",
        )
    })
}

/// IFU spectra should not be binned along the slit
pub const IFU_NO_SPATIAL_BINNING_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_IFU_NO_SPATIAL_BINNING_RULE", Matcher::ALWAYS, ifu_spatial_binning);

fn is_slit(ctx: &StepContext<'_>) -> bool {
    ctx.fpu_mode() == Some(FpuMode::CustomMask)
        || ctx.fpu().is_some_and(|fpu| fpu.is_spectroscopic() || fpu.is_ns_slit())
}

#[allow(clippy::float_cmp)]
fn p_offset_with_slit(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let p = ctx.p_offset()?;
    (p != 0.0 && is_slit(ctx)).then(|| {
        ctx.warning(
            "GmosRule_NO_P_OFFSETS_WITH_SLIT_SPECTROSCOPY_RULE",
            "P-offsets will move the slit off of the target",
        )
    })
}

/// Offsets along p take a long slit or mask off the target
pub const NO_P_OFFSETS_WITH_SLIT_SPECTROSCOPY_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_NO_P_OFFSETS_WITH_SLIT_SPECTROSCOPY_RULE",
    Matcher::SCIENCE,
    p_offset_with_slit,
);
