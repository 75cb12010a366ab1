//! Testing utilities for the P2 workspace
//!
//! Step builders and observation fixtures shared by the integration tests.

#![allow(missing_docs)]

use p2_checker::gmos::{
    keys as gmos, AmpCount, AmpGain, AmpReadMode, Binning, DetectorManufacturer, Disperser, Filter, Fpu,
    FpuMode, GmosInstrument, Site,
};
use p2_checker::{keys, ImageQuality, ObsClass, Observation, ObserveType, ProblemReport, Severity, SiteQuality, SkyBackground};
use p2_config::{Config, ConfigSequence};

/// Science object step with slow low-gain read-out and 2x2 binning
pub fn science_step() -> Config {
    Config::new()
        .with(keys::OBS_CLASS.clone(), ObsClass::Science)
        .with(keys::OBSERVE_TYPE.clone(), ObserveType::Object)
        .with(keys::EXPOSURE_TIME.clone(), 60.0)
        .with(gmos::GAIN.clone(), AmpGain::Low)
        .with(gmos::READ_MODE.clone(), AmpReadMode::Slow)
        .with(gmos::X_BINNING.clone(), Binning::Two)
        .with(gmos::Y_BINNING.clone(), Binning::Two)
}

/// Science imaging through `filter`
pub fn imaging_step(filter: Filter) -> Config {
    science_step()
        .with(gmos::DISPERSER.clone(), Disperser::Mirror)
        .with(gmos::FPU_MODE.clone(), FpuMode::Builtin)
        .with(gmos::FPU.clone(), Fpu::None)
        .with(gmos::FILTER.clone(), filter)
}

/// Science long-slit spectroscopy at 600 nm
pub fn longslit_step(disperser: Disperser) -> Config {
    science_step()
        .with(gmos::DISPERSER.clone(), disperser)
        .with(gmos::FPU_MODE.clone(), FpuMode::Builtin)
        .with(gmos::FPU.clone(), Fpu::Longslit2)
        .with(gmos::FILTER.clone(), Filter::GG455_G0305)
        .with(gmos::DISPERSER_LAMBDA.clone(), 600.0)
}

/// `step` with its exposure time replaced
pub fn with_exposure(step: Config, seconds: f64) -> Config {
    step.with(keys::EXPOSURE_TIME.clone(), seconds)
}

/// Amp count the detector expects at `site`
pub fn default_amp_count(site: Site, detector: DetectorManufacturer) -> AmpCount {
    match (detector, site) {
        (DetectorManufacturer::E2V, Site::North) => AmpCount::Six,
        (DetectorManufacturer::E2V, Site::South) => AmpCount::Three,
        (DetectorManufacturer::Hamamatsu, _) => AmpCount::Twelve,
    }
}

/// GMOS observation over complete `steps`
pub fn gmos_observation(site: Site, detector: DetectorManufacturer, steps: Vec<Config>) -> Observation {
    gmos_observation_with(GmosInstrument::new(site, detector), steps)
}

/// Observation over complete `steps` with the given GMOS component
pub fn gmos_observation_with(gmos: GmosInstrument, steps: Vec<Config>) -> Observation {
    let amps = default_amp_count(gmos.site, gmos.detector);
    let steps = steps
        .into_iter()
        .map(|step| {
            if step.contains(&gmos::AMP_COUNT) {
                step
            } else {
                step.with(gmos::AMP_COUNT.clone(), amps)
            }
        })
        .collect();
    Observation::new(ConfigSequence::from_complete(steps))
        .with_gmos(gmos)
        .with_site_quality(SiteQuality::new(SkyBackground::Any, ImageQuality::Percent20))
}

/// `obs` with its sky background constraint replaced
pub fn with_background(obs: Observation, background: SkyBackground) -> Observation {
    let quality = obs.site_quality.unwrap_or_default();
    obs.with_site_quality(SiteQuality::new(background, quality.image_quality))
}

/// Problems in `report` carrying `code`
pub fn problems_with_code<'a>(report: &'a ProblemReport, code: &str) -> Vec<&'a p2_checker::Problem> {
    report.iter().filter(|p| p.code() == code).collect()
}

/// Assert `report` holds exactly one problem with `code`, of the given severity
pub fn assert_single(report: &ProblemReport, code: &str, severity: Severity) {
    let found = problems_with_code(report, code);
    assert_eq!(found.len(), 1, "expected one {code} in {:?}", report.codes());
    assert_eq!(found[0].severity(), severity, "{code}");
}

/// Assert `report` holds no problem with `code`
pub fn assert_absent(report: &ProblemReport, code: &str) {
    assert!(
        problems_with_code(report, code).is_empty(),
        "unexpected {code} in {:?}",
        report.codes()
    );
}
