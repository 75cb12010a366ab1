use std::fs;

use p2_checker::{check_with_settings, CheckerError, Severity};
use p2_cli::{load_observation, load_settings, render_report_json, render_sequence_json, CliError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const OBSERVATION_JSON: &str = r#"{
    "sequence": [
        [
            {"key": "observe:class", "value": {"type": "symbol", "value": "science"}},
            {"key": "observe:exposureTime", "value": {"type": "float", "value": 1000.0}},
            {"key": "instrument:disperser", "value": {"type": "symbol", "value": "R400_G5305"}},
            {"key": "instrument:fpuMode", "value": {"type": "symbol", "value": "BUILTIN"}},
            {"key": "instrument:fpu", "value": {"type": "symbol", "value": "LONGSLIT_2"}},
            {"key": "instrument:ccdYBinning", "value": {"type": "symbol", "value": "TWO"}},
            {"key": "instrument:dtaXOffset", "value": {"type": "int", "value": 3}}
        ],
        [
            {"key": "observe:exposureTime", "value": {"type": "float", "value": 1200.0}}
        ]
    ],
    "instrument": {"type": "gmos", "site": "SOUTH", "detector": "HAMAMATSU"}
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_check_json_observation_with_settings() {
    let dir = TempDir::new().unwrap();
    let obs = load_observation(&write(&dir, "obs.json", OBSERVATION_JSON)).unwrap();
    let settings = load_settings(&write(&dir, "p2.toml", "spectroscopic_exposure_warning_secs = 900.0\n")).unwrap();

    let report = check_with_settings(&obs, settings).unwrap();
    let codes = report.codes();
    assert!(codes.contains(&"GmosRule_EXP_SPECTROSCOPIC_RULE"), "{codes:?}");
    assert!(codes.contains(&"GmosRule_DTA_X_Y_BINNING_RULE"), "{codes:?}");

    let json: serde_json::Value = serde_json::from_str(&render_report_json(&report).unwrap()).unwrap();
    let first = &json.as_array().unwrap()[0];
    assert!(first.get("code").is_some());
    assert!(report.iter().all(|p| matches!(p.severity(), Severity::Error | Severity::Warning)));
}

#[test]
fn test_sequence_json_views() {
    let dir = TempDir::new().unwrap();
    let obs = load_observation(&write(&dir, "obs.json", OBSERVATION_JSON)).unwrap();

    let complete: serde_json::Value =
        serde_json::from_str(&render_sequence_json(&obs.sequence, false).unwrap()).unwrap();
    let compact: serde_json::Value =
        serde_json::from_str(&render_sequence_json(&obs.sequence, true).unwrap()).unwrap();

    assert_eq!(complete[1]["items"].as_array().unwrap().len(), 7);
    assert_eq!(
        compact[1]["items"],
        serde_json::json!([["observe:exposureTime", "1200"]])
    );
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let err = load_observation(&write(&dir, "obs.txt", OBSERVATION_JSON)).unwrap_err();
    assert!(matches!(err, CliError::UnsupportedFormat(_)));
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");
    let err = load_observation(&missing).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_bad_settings_rejected() {
    let dir = TempDir::new().unwrap();
    let err = load_settings(&write(&dir, "p2.toml", "exposure_warning_fraction = 2.0\n")).unwrap_err();
    assert!(matches!(
        err,
        CliError::Checker(CheckerError::InvalidSetting { name: "exposure_warning_fraction", .. })
    ));
}

#[test]
fn test_unknown_detector_constant_rejected() {
    let dir = TempDir::new().unwrap();
    let json = OBSERVATION_JSON.replace(
        r#"{"key": "observe:exposureTime", "value": {"type": "float", "value": 1200.0}}"#,
        r#"{"key": "instrument:detectorManufacturer", "value": {"type": "symbol", "value": "BOGUS"}}"#,
    );
    let obs = load_observation(&write(&dir, "obs.json", &json)).unwrap();
    let err = check_with_settings(&obs, p2_checker::CheckSettings::default()).unwrap_err();
    assert!(matches!(err, CheckerError::UnknownSymbol { step: 1, .. }), "{err}");
}
