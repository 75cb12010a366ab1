//! Custom region-of-interest rules
//!
//! Custom ROIs live on the static instrument component while the read-out
//! mode that selects them can be iterated, so the declared/used checks look
//! at both.

use super::step::GmosStep;
use super::types::{BuiltinRoi, DetectorManufacturer};
use super::{GmosConfigRule, GmosPassState};
use crate::observation::Observation;
use crate::problem::{Problem, ProblemReport};
use crate::rule::{Matcher, Rule};
use crate::settings::CheckSettings;
use crate::step::StepContext;

type State = GmosPassState;

fn too_many_rois(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let gmos = ctx.gmos()?;
    let detector = ctx.detector()?;
    if gmos.custom_rois.len() <= detector.max_rois() {
        return None;
    }
    let (code, message) = match detector {
        DetectorManufacturer::E2V => (
            "GmosRule_E2V_MAX_ROI_RULE",
            "E2V CCDs support up to 4 custom ROIs",
        ),
        DetectorManufacturer::Hamamatsu => (
            "GmosRule_HAMAMATSU_MAX_ROI_RULE",
            "Hamamatsu CCDs support up to 5 custom ROIs",
        ),
    };
    Some(ctx.error(code, message))
}

/// Each detector reads out a limited number of custom ROIs
pub const MAX_ROI_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_MAX_ROI_RULE", Matcher::ALWAYS, too_many_rois);

fn overlapping_rois(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let gmos = ctx.gmos()?;
    let overlaps = match gmos.detector {
        DetectorManufacturer::E2V => gmos.rois_overlap_rows(),
        DetectorManufacturer::Hamamatsu => gmos.rois_overlap_pixels(),
    };
    overlaps.then(|| ctx.error("GmosRule_ROI_OVERLAP_RULE", "The custom ROIs must not overlap"))
}

/// E2V ROIs may not share rows; Hamamatsu ROIs may not share pixels
pub const ROI_OVERLAP_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_ROI_OVERLAP_RULE", Matcher::ALWAYS, overlapping_rois);

fn invalid_rois(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    (!ctx.gmos()?.rois_valid())
        .then(|| ctx.error("GmosRule_ROI_INVALID_RULE", "One or several custom ROIs are invalid"))
}

/// Changing the detector can leave ROIs off the new chip
pub const ROI_INVALID_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_ROI_INVALID_RULE", Matcher::ALWAYS, invalid_rois);

fn custom_roi_not_declared(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    let gmos = ctx.gmos()?;
    (ctx.builtin_roi() == Some(BuiltinRoi::Custom) && gmos.custom_rois.is_empty()).then(|| {
        ctx.error(
            "GmosRule_CUSTOM_ROI_NOT_DECLARED_RULE",
            "Custom ROIs are not declared but are used in a step",
        )
    })
}

/// A custom read-out mode needs at least one ROI
pub const CUSTOM_ROI_NOT_DECLARED_RULE: GmosConfigRule = GmosConfigRule::new(
    "GmosRule_CUSTOM_ROI_NOT_DECLARED_RULE",
    Matcher::ALWAYS,
    custom_roi_not_declared,
);

/// Warns when custom ROIs are declared but no step reads them out
///
/// Unlike the per-step rules this looks at the whole sequence: it only
/// reports when every step ignores the ROIs, and then only once, against
/// the last step.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnusedCustomRoiRule;

impl UnusedCustomRoiRule {
    const CODE: &'static str = "GmosRule_CUSTOM_ROI_NOT_DECLARED";
    const MESSAGE: &'static str = "Custom ROIs are declared but not used in any step";

    fn offends(ctx: &StepContext<'_>) -> bool {
        ctx.gmos().is_some_and(|gmos| !gmos.custom_rois.is_empty())
            && ctx.builtin_roi() != Some(BuiltinRoi::Custom)
    }
}

impl Rule for UnusedCustomRoiRule {
    fn name(&self) -> &'static str {
        "gmos_unused_custom_roi"
    }

    fn check(&self, observation: &Observation) -> ProblemReport {
        let settings = CheckSettings::default();
        let mut last = None;
        for (step, config) in observation.sequence.iter().enumerate() {
            let ctx = StepContext::new(config, step, observation, &settings);
            if !Self::offends(&ctx) {
                return ProblemReport::new();
            }
            last = Some(ctx.warning(Self::CODE, Self::MESSAGE));
        }
        last.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmos::step::keys;
    use crate::gmos::{GmosInstrument, RoiDescription, Site};
    use crate::problem::{NodeRef, Severity};
    use crate::sequence_rule::SequenceRule;
    use p2_config::{Config, ConfigSequence};

    fn observation(gmos: GmosInstrument, steps: usize) -> Observation {
        Observation::new(ConfigSequence::from_complete(vec![Config::new(); steps])).with_gmos(gmos)
    }

    fn run(rule: GmosConfigRule, obs: &Observation) -> ProblemReport {
        SequenceRule::new("roi").with_rule(rule).check(obs)
    }

    fn with_rois(detector: DetectorManufacturer, count: i32) -> GmosInstrument {
        (0..count).fold(GmosInstrument::new(Site::North, detector), |gmos, i| {
            gmos.with_custom_roi(RoiDescription::new(1, 1 + i * 100, 100, 50))
        })
    }

    #[test]
    fn max_roi_count_per_detector() {
        let e2v = run(MAX_ROI_RULE, &observation(with_rois(DetectorManufacturer::E2V, 5), 2));
        assert_eq!(e2v.codes(), vec!["GmosRule_E2V_MAX_ROI_RULE"]);
        assert_eq!(e2v.problems()[0].message(), "E2V CCDs support up to 4 custom ROIs");

        let ham = run(MAX_ROI_RULE, &observation(with_rois(DetectorManufacturer::Hamamatsu, 5), 2));
        assert!(ham.is_empty());
    }

    #[test]
    fn overlap_depends_on_detector() {
        // Same rows, different columns.
        let rois = |detector| {
            GmosInstrument::new(Site::South, detector)
                .with_custom_roi(RoiDescription::new(1, 1, 100, 100))
                .with_custom_roi(RoiDescription::new(500, 50, 100, 100))
        };
        let e2v = run(ROI_OVERLAP_RULE, &observation(rois(DetectorManufacturer::E2V), 1));
        assert_eq!(e2v.codes(), vec!["GmosRule_ROI_OVERLAP_RULE"]);
        let ham = run(ROI_OVERLAP_RULE, &observation(rois(DetectorManufacturer::Hamamatsu), 1));
        assert!(ham.is_empty());
    }

    #[test]
    fn invalid_roi_reported_once() {
        let gmos = GmosInstrument::new(Site::North, DetectorManufacturer::Hamamatsu)
            .with_custom_roi(RoiDescription::new(1, 4500, 10, 10));
        let report = run(ROI_INVALID_RULE, &observation(gmos, 3));
        assert_eq!(report.len(), 1);
        assert_eq!(report.problems()[0].severity(), Severity::Error);
    }

    #[test]
    fn custom_mode_without_rois_is_an_error() {
        let gmos = GmosInstrument::new(Site::North, DetectorManufacturer::Hamamatsu)
            .with_builtin_roi(BuiltinRoi::Custom);
        let report = run(CUSTOM_ROI_NOT_DECLARED_RULE, &observation(gmos, 3));
        assert_eq!(report.codes(), vec!["GmosRule_CUSTOM_ROI_NOT_DECLARED_RULE"]);
        assert_eq!(report.problems()[0].node(), NodeRef::Instrument);
    }

    #[test]
    fn unused_rois_warn_on_last_step_only() {
        let gmos = with_rois(DetectorManufacturer::Hamamatsu, 1);
        let report = UnusedCustomRoiRule.check(&observation(gmos, 3));
        assert_eq!(report.len(), 1);
        let problem = &report.problems()[0];
        assert_eq!(problem.severity(), Severity::Warning);
        assert_eq!(problem.step(), Some(2));
        assert_eq!(problem.node(), NodeRef::Sequence);
    }

    #[test]
    fn one_custom_step_silences_unused_warning() {
        let gmos = with_rois(DetectorManufacturer::Hamamatsu, 1);
        let steps = vec![
            Config::new(),
            Config::new().with(keys::BUILTIN_ROI.clone(), BuiltinRoi::Custom),
            Config::new().with(keys::BUILTIN_ROI.clone(), BuiltinRoi::FullFrame),
        ];
        let obs = Observation::new(ConfigSequence::from_complete(steps)).with_gmos(gmos);
        assert!(UnusedCustomRoiRule.check(&obs).is_empty());
    }

    #[test]
    fn unused_rule_ignores_empty_sequence() {
        let gmos = with_rois(DetectorManufacturer::E2V, 1);
        assert!(UnusedCustomRoiRule.check(&observation(gmos, 0)).is_empty());
    }
}
