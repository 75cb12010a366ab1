use std::collections::BTreeSet;

use p2_checker::gmos::{
    exposure_limit, keys as gmos, AmpGain, Binning, DetectorManufacturer, Filter, GmosPassState, Site, DTA_X_RULE,
    FILTER_MAX_EXPOSURE_TIME_RULE,
};
use p2_checker::{check, Rule, SequenceRule, Severity, SkyBackground};
use p2_test_utils::{gmos_observation, imaging_step, science_step, with_background, with_exposure};
use proptest::prelude::*;

const FILTERS: &[Filter] = &[
    Filter::g_G0301,
    Filter::r_G0303,
    Filter::i_G0302,
    Filter::z_G0304,
    Filter::Z_G0322,
    Filter::Y_G0323,
];

const BACKGROUNDS: &[SkyBackground] = &[
    SkyBackground::Percent20,
    SkyBackground::Percent50,
    SkyBackground::Percent80,
    SkyBackground::Any,
];

fn isolated(rule: p2_checker::gmos::GmosConfigRule) -> SequenceRule<GmosPassState> {
    SequenceRule::new("isolated").with_rule(rule)
}

proptest! {
    #[test]
    fn prop_filter_limit_classification(
        filter in prop::sample::select(FILTERS),
        background in prop::sample::select(BACKGROUNDS),
        percent in (1_u32..200).prop_filter("boundary", |p| *p != 60 && *p != 100),
    ) {
        let limit = exposure_limit(
            DetectorManufacturer::Hamamatsu,
            filter,
            AmpGain::Low,
            background,
            Binning::Two,
        )
        .unwrap();
        let exposure = limit * f64::from(percent) / 100.0;
        let obs = gmos_observation(
            Site::North,
            DetectorManufacturer::Hamamatsu,
            vec![with_exposure(imaging_step(filter), exposure)],
        );
        let report = isolated(FILTER_MAX_EXPOSURE_TIME_RULE).check(&with_background(obs, background));

        let expected = if percent > 100 {
            Some(Severity::Error)
        } else if percent > 60 {
            Some(Severity::Warning)
        } else {
            None
        };
        prop_assert_eq!(report.problems().first().map(|p| p.severity()), expected);
    }

    #[test]
    fn prop_dta_x_warns_on_misaligned_offsets(offset in -100_i64..100) {
        let step = science_step()
            .with(gmos::Y_BINNING.clone(), Binning::Two)
            .with(gmos::DTA_X_OFFSET.clone(), offset);
        let obs = gmos_observation(Site::South, DetectorManufacturer::Hamamatsu, vec![step]);
        let report = isolated(DTA_X_RULE).check(&obs);
        prop_assert_eq!(report.len(), usize::from(offset % 2 != 0));
    }

    #[test]
    fn prop_each_code_reported_once(
        exposures in prop::collection::vec(0_u32..5000, 1..8),
        filters in prop::collection::vec(prop::sample::select(FILTERS), 1..8),
    ) {
        let steps = exposures
            .iter()
            .zip(filters.iter().cycle())
            .map(|(exp, filter)| with_exposure(imaging_step(*filter), f64::from(*exp)))
            .collect();
        let obs = gmos_observation(Site::North, DetectorManufacturer::E2V, steps);
        let report = check(&obs).unwrap();

        let codes = report.codes();
        let unique: BTreeSet<_> = codes.iter().collect();
        prop_assert_eq!(unique.len(), codes.len());
    }
}
