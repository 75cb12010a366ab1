//! Exposure time rules
//!
//! Includes the background saturation table: for each detector, filter and
//! sky background bucket, the unbinned low-gain exposure at which the sky
//! fills the wells. The two detector families do not share one convention:
//! the Hamamatsu g-band BG50 cell is a doubled 50% full-well time, every
//! other cell is a saturation time.

use super::matchers::IMAGING;
use super::step::GmosStep;
use super::types::{AmpGain, Binning, DetectorManufacturer, Filter};
use super::{GmosConfigRule, GmosPassState};
use crate::observation::SkyBackground;
use crate::problem::Problem;
use crate::rule::Matcher;
use crate::step::{ObserveType, StepContext};

type State = GmosPassState;

fn h(hours: f64) -> f64 {
    hours * 3600.0
}

fn m(minutes: f64) -> f64 {
    minutes * 60.0
}

/// Per-bucket limits in [`SkyBackground`] order: 20, 50, 80, any
type Row = [f64; 4];

fn e2v_row(filter: Filter) -> Option<Row> {
    use Filter::{
        g_G0301, g_G0325, i_G0302, i_G0327, r_G0303, r_G0326, u_G0332, z_G0304, z_G0328, Y_G0323,
        Z_G0322,
    };
    Some(match filter {
        g_G0301 | g_G0325 => [h(4.35), h(1.83), m(32.5), m(4.5)],
        r_G0303 => [h(1.83), h(1.02), m(25.0), m(4.3)],
        i_G0302 => [h(1.05), m(41.0), m(22.3), m(5.5)],
        z_G0304 => [m(12.3), m(12.0), m(11.5), m(8.7)],
        Z_G0322 => [m(35.0), m(31.1), m(25.8), m(13.3)],
        Y_G0323 => [m(52.6), m(52.7), m(52.8), m(52.8)],
        u_G0332 => [h(48.6), h(21.1), h(5.78), m(45.0)],
        r_G0326 => [h(2.56), h(1.43), m(34.0), m(5.9)],
        i_G0327 => [h(2.13), h(1.37), m(43.6), m(10.4)],
        z_G0328 => [h(1.06), h(1.0), m(55.0), m(35.8)],
        _ => return None,
    })
}

// GMOS-N filters only; the g-band BG50 cell is twice the 50% full-well time.
fn hamamatsu_row(filter: Filter) -> Option<Row> {
    use Filter::{g_G0301, i_G0302, r_G0303, z_G0304, Y_G0323, Z_G0322};
    Some(match filter {
        g_G0301 => [h(4.35), 2.0 * h(1.39), m(32.5), m(4.5)],
        r_G0303 => [h(1.83), h(1.02), m(25.0), m(4.3)],
        i_G0302 => [h(1.05), m(41.0), m(22.3), m(5.5)],
        z_G0304 => [m(12.3), m(12.0), m(11.5), m(8.7)],
        Z_G0322 => [m(35.0), m(31.1), m(25.8), m(13.3)],
        // no sky background dependence in the near-IR
        Y_G0323 => [m(52.6), m(52.7), m(52.8), m(52.8)],
        _ => return None,
    })
}

/// Exposure (seconds) at which the sky background saturates the detector
///
/// Only low gain is tabulated; other gains and untabulated filters have no
/// limit. Binning divides the limit by the binned pixel area.
///
/// # Examples
///
/// ```rust
/// use p2_checker::gmos::{exposure_limit, AmpGain, Binning, DetectorManufacturer, Filter};
/// use p2_checker::SkyBackground;
///
/// let limit = exposure_limit(
///     DetectorManufacturer::E2V,
///     Filter::r_G0303,
///     AmpGain::Low,
///     SkyBackground::Percent80,
///     Binning::Two,
/// );
/// assert_eq!(limit, Some(25.0 * 60.0 / 4.0));
/// ```
#[must_use]
pub fn exposure_limit(
    detector: DetectorManufacturer,
    filter: Filter,
    gain: AmpGain,
    background: SkyBackground,
    binning: Binning,
) -> Option<f64> {
    if gain != AmpGain::Low {
        return None;
    }
    let row = match detector {
        DetectorManufacturer::E2V => e2v_row(filter),
        DetectorManufacturer::Hamamatsu => hamamatsu_row(filter),
    }?;
    let base = match background {
        SkyBackground::Percent20 => row[0],
        SkyBackground::Percent50 => row[1],
        SkyBackground::Percent80 => row[2],
        SkyBackground::Any => row[3],
    };
    let factor = f64::from(binning.value());
    Some(base / (factor * factor))
}

fn max_exposure(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let limit = ctx.detector()?.max_exposure_secs();
    (ctx.charged_exposure()? > limit).then(|| {
        ctx.warning(
            "GmosRule_MAX_EXPOSURE_TIME_RULE",
            "Exposure time exceeds recommended maximum for the GMOS instruments due to excessive contamination of the image due to cosmic rays",
        )
    })
}

/// Cosmic ray limit on single exposures
pub const MAX_EXPOSURE_TIME_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_MAX_EXPOSURE_TIME_RULE", Matcher::ALWAYS, max_exposure);

fn filter_max_exposure(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let background = ctx.observation().site_quality?.sky_background;
    let limit = exposure_limit(
        ctx.detector()?,
        ctx.filter()?,
        ctx.gain()?,
        background,
        ctx.x_binning().unwrap_or(Binning::One),
    )?;
    let exposure = ctx.charged_exposure()?;
    let settings = ctx.settings();

    if exposure > limit {
        Some(ctx.error(
            "GmosRule_E_FILTER_MAX_EXPOSURE_TIME_RULE",
            "The exposure time may cause the background to saturate for the configuration and conditions",
        ))
    } else if exposure > limit * settings.exposure_warning_fraction {
        Some(ctx.warning(
            "GmosRule_W_FILTER_MAX_EXPOSURE_TIME_RULE",
            format!(
                "The exposure time will cause the background to exceed {}% full well for the configuration and conditions",
                settings.exposure_warning_percent()
            ),
        ))
    } else {
        None
    }
}

/// Sky background must not saturate an imaging exposure
pub const FILTER_MAX_EXPOSURE_TIME_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_FILTER_MAX_EXPOSURE_TIME_RULE", IMAGING, filter_max_exposure);

#[allow(clippy::float_cmp)]
fn integer_exposure(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (ctx.charged_exposure()?.fract() != 0.0).then(|| {
        ctx.error(
            "GmosRule_INTEGER_EXPOSURE_TIME_RULE",
            "The GMOS DC does not support fractional exposure times",
        )
    })
}

/// The data controller truncates fractional seconds
pub const INTEGER_EXPOSURE_TIME_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_INTEGER_EXPOSURE_TIME_RULE", Matcher::ALWAYS, integer_exposure);

fn non_zero_exposure(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    if ctx.observe_type() == Some(ObserveType::Bias) {
        return None;
    }
    (ctx.charged_exposure()? <= 0.0).then(|| {
        ctx.error(
            "GmosRule_NON_ZERO_EXPOSURE_TIME_RULE",
            "Exposure time must be greater than 0",
        )
    })
}

/// Everything but a bias needs a positive exposure
pub const NON_ZERO_EXPOSURE_TIME_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_NON_ZERO_EXPOSURE_TIME_RULE", Matcher::ALWAYS, non_zero_exposure);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_low_gain_is_limited() {
        let args = (DetectorManufacturer::E2V, Filter::g_G0301, SkyBackground::Any, Binning::One);
        assert_eq!(exposure_limit(args.0, args.1, AmpGain::Low, args.2, args.3), Some(270.0));
        assert_eq!(exposure_limit(args.0, args.1, AmpGain::High, args.2, args.3), None);
    }

    #[test]
    fn binning_divides_by_area() {
        let limit = |binning| {
            exposure_limit(
                DetectorManufacturer::E2V,
                Filter::z_G0304,
                AmpGain::Low,
                SkyBackground::Percent50,
                binning,
            )
        };
        assert_eq!(limit(Binning::One), Some(720.0));
        assert_eq!(limit(Binning::Two), Some(180.0));
        assert_eq!(limit(Binning::Four), Some(45.0));
    }

    #[test]
    fn hamamatsu_g_band_bg50_is_doubled() {
        let limit = |detector, filter, sb| {
            exposure_limit(detector, filter, AmpGain::Low, sb, Binning::One).unwrap()
        };
        let ham = DetectorManufacturer::Hamamatsu;
        assert!((limit(ham, Filter::g_G0301, SkyBackground::Percent50) - 10_008.0).abs() < 1e-6);
        for sb in [SkyBackground::Percent20, SkyBackground::Percent80, SkyBackground::Any] {
            assert_eq!(
                limit(ham, Filter::g_G0301, sb),
                limit(DetectorManufacturer::E2V, Filter::g_G0301, sb)
            );
        }
        assert!((limit(ham, Filter::Y_G0323, SkyBackground::Percent20) - 3156.0).abs() < 1e-6);
        assert!((limit(ham, Filter::Y_G0323, SkyBackground::Any) - 3168.0).abs() < 1e-6);
    }

    #[test]
    fn untabulated_filters_have_no_limit() {
        assert_eq!(
            exposure_limit(
                DetectorManufacturer::Hamamatsu,
                Filter::u_G0332,
                AmpGain::Low,
                SkyBackground::Any,
                Binning::One
            ),
            None
        );
        assert_eq!(
            exposure_limit(
                DetectorManufacturer::E2V,
                Filter::Ha_G0310,
                AmpGain::Low,
                SkyBackground::Any,
                Binning::One
            ),
            None
        );
    }
}
