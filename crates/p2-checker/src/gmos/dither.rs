//! Spatial dither bookkeeping for science imaging
//!
//! Whether an imaging sequence dithers can only be decided after the last
//! step, so the step rule here only records what it sees and the pass
//! state reports at the end.

use super::matchers::IMAGING;
use super::step::GmosStep;
use super::types::Filter;
use super::GmosConfigRule;
use crate::observation::Observation;
use crate::problem::{NodeRef, Problem, ProblemReport};
use crate::rule::PassState;
use crate::step::{ObserveType, StepContext};

/// Offsets closer than this (arcsec) count as the same position
const OFFSET_TOLERANCE: f64 = 1e-5;

const CODE: &str = "GmosRule_GmosSpatialDitherState";
const MESSAGE: &str =
    "Imaging observations usually benefit from spatial dithers, consider including an offset iterator";

/// State shared by the GMOS step rules during one pass
#[derive(Debug, Clone, Default)]
pub struct GmosPassState {
    p: f64,
    q: f64,
    found_two_positions: bool,
    rule_in_effect: bool,
    found_multiple_exposures_per_filter: bool,
    found_long_exposure: bool,
    filter: Option<Filter>,
    exposure_count: i64,
}

impl GmosPassState {
    /// Whether a dither warning is due
    ///
    /// Only science imaging sequences that never moved the telescope and
    /// either repeat a filter or expose for long are flagged.
    #[must_use]
    pub fn needs_dither_warning(&self) -> bool {
        self.rule_in_effect
            && !self.found_two_positions
            && (self.found_multiple_exposures_per_filter || self.found_long_exposure)
    }

    fn record(&mut self, ctx: &StepContext<'_>) {
        if !self.found_long_exposure
            && ctx
                .exposure_time()
                .is_some_and(|exp| exp > ctx.settings().dither_exposure_secs)
        {
            self.found_long_exposure = true;
        }

        if !self.found_multiple_exposures_per_filter {
            let filter = ctx.filter();
            if filter != self.filter {
                self.filter = filter;
                self.exposure_count = 0;
            }
            if ctx.observe_type() == Some(ObserveType::Object) {
                self.exposure_count += match ctx.repeat_count() {
                    Some(repeat) if repeat > 1 => repeat,
                    _ => 1,
                };
            }
            if self.exposure_count > 1 {
                self.found_multiple_exposures_per_filter = true;
            }
        }

        if self.found_two_positions {
            return;
        }
        self.rule_in_effect = true;

        let p = ctx.p_offset().unwrap_or(0.0);
        let q = ctx.q_offset().unwrap_or(0.0);
        if ctx.step() == 0 {
            self.p = p;
            self.q = q;
        } else if (p - self.p).abs() > OFFSET_TOLERANCE || (q - self.q).abs() > OFFSET_TOLERANCE {
            self.found_two_positions = true;
        }
    }
}

impl PassState for GmosPassState {
    fn finish(self, _observation: &Observation, report: &mut ProblemReport) {
        if self.needs_dither_warning() {
            report.add_warning(CODE, MESSAGE, NodeRef::Sequence);
        }
    }
}

fn track_dither(ctx: &StepContext<'_>, state: &mut GmosPassState) -> Option<Problem> {
    state.record(ctx);
    None
}

/// Records offsets and exposures of imaging steps; never reports directly
pub const SPATIAL_DITHER_IMAGING_RULE: GmosConfigRule =
    GmosConfigRule::new(CODE, IMAGING, track_dither);
