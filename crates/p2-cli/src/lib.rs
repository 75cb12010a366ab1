//! Loading and rendering for the `p2check` binary
//!
//! Observations are read from JSON or YAML (chosen by file extension),
//! settings from TOML. Reports render as plain text or JSON.

#![warn(unreachable_pub)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use p2_checker::{CheckSettings, CheckerError, NodeRef, Observation, ProblemReport};
use p2_config::ConfigSequence;
use serde::Serialize;
use tracing::debug;

/// Errors raised while reading inputs or writing output
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Input file could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File extension names no supported format
    #[error("unsupported observation format for {0}; expected .json, .yaml or .yml")]
    UnsupportedFormat(PathBuf),

    /// JSON input or output failed
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML input failed
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Settings were rejected
    #[error(transparent)]
    Checker(#[from] CheckerError),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Serialization format of an observation file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl InputFormat {
    /// Format implied by the extension of `path`
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse an observation from `source`
///
/// # Errors
/// Returns the parser error for malformed input.
pub fn parse_observation(source: &str, format: InputFormat) -> Result<Observation> {
    Ok(match format {
        InputFormat::Json => serde_json::from_str(source)?,
        InputFormat::Yaml => serde_yaml::from_str(source)?,
    })
}

/// Load an observation file
///
/// # Errors
/// Returns [`CliError::UnsupportedFormat`] for unknown extensions, and read
/// or parse errors otherwise.
pub fn load_observation(path: &Path) -> Result<Observation> {
    let format = InputFormat::from_path(path).ok_or_else(|| CliError::UnsupportedFormat(path.to_path_buf()))?;
    let observation = parse_observation(&read(path)?, format)?;
    debug!(path = %path.display(), steps = observation.sequence.len(), "observation loaded");
    Ok(observation)
}

/// Load checker settings from a TOML file
///
/// # Errors
/// Returns read errors and [`CheckerError`]s for bad settings.
pub fn load_settings(path: &Path) -> Result<CheckSettings> {
    let settings = CheckSettings::from_toml_str(&read(path)?)?;
    debug!(path = %path.display(), ?settings, "settings loaded");
    Ok(settings)
}

fn node_label(node: NodeRef) -> &'static str {
    match node {
        NodeRef::Instrument => "instrument",
        NodeRef::Sequence => "sequence",
        NodeRef::Observation => "observation",
    }
}

/// Render a report as one line per problem plus a summary
#[must_use]
pub fn render_report_text(report: &ProblemReport) -> String {
    let mut out = String::new();
    for problem in report {
        let step = problem.step().map(|s| format!(" step {s}")).unwrap_or_default();
        let _ = writeln!(
            out,
            "{problem} [{code}] ({node}{step})",
            code = problem.code(),
            node = node_label(problem.node()),
        );
    }
    let _ = writeln!(
        out,
        "{} error(s), {} warning(s)",
        report.errors().count(),
        report.warnings().count()
    );
    out
}

/// Render a report as pretty JSON
///
/// # Errors
/// Returns [`CliError::Json`] if serialization fails.
pub fn render_report_json(report: &ProblemReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[derive(Serialize)]
struct StepPairs {
    step: usize,
    items: Vec<(String, String)>,
}

fn step_pairs(sequence: &ConfigSequence, compact: bool) -> Vec<StepPairs> {
    let steps = if compact {
        sequence.compact_view()
    } else {
        sequence.complete_view()
    };
    steps
        .iter()
        .enumerate()
        .map(|(step, config)| StepPairs {
            step,
            items: config.to_pairs(),
        })
        .collect()
}

/// Render the steps of a sequence, complete or compact, as text
#[must_use]
pub fn render_sequence_text(sequence: &ConfigSequence, compact: bool) -> String {
    let mut out = String::new();
    for step in step_pairs(sequence, compact) {
        let _ = writeln!(out, "step {}:", step.step);
        for (key, value) in step.items {
            let _ = writeln!(out, "  {key} = {value}");
        }
    }
    out
}

/// Render the steps of a sequence as pretty JSON
///
/// # Errors
/// Returns [`CliError::Json`] if serialization fails.
pub fn render_sequence_json(sequence: &ConfigSequence, compact: bool) -> Result<String> {
    Ok(serde_json::to_string_pretty(&step_pairs(sequence, compact))?)
}
