//! Diagnostics produced by a checking pass
//!
//! A [`Problem`] is plain output: rules build one, the driver appends it to
//! a [`ProblemReport`], and nothing mutates it afterwards.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// How serious a problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks the observation
    Error,
    /// Advisory only
    Warning,
}

impl Severity {
    /// Human label used in rendered reports
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Program node a problem is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRef {
    /// Static instrument component
    Instrument,
    /// Sequence component
    Sequence,
    /// Observation as a whole
    Observation,
}

impl NodeRef {
    /// Node for a problem found at `step`
    ///
    /// The first step mirrors the static instrument component, so problems
    /// there point at the instrument; later steps come from the sequence.
    #[inline]
    #[must_use]
    pub fn for_step(step: usize) -> Self {
        if step == 0 {
            Self::Instrument
        } else {
            Self::Sequence
        }
    }
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    severity: Severity,
    code: String,
    message: String,
    node: NodeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    step: Option<usize>,
}

impl Problem {
    /// Create a problem
    #[must_use]
    pub fn new(
        severity: Severity,
        code: impl Into<String>,
        message: impl Into<String>,
        node: NodeRef,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            node,
            step: None,
        }
    }

    /// Error-level problem
    #[inline]
    #[must_use]
    pub fn error(code: impl Into<String>, message: impl Into<String>, node: NodeRef) -> Self {
        Self::new(Severity::Error, code, message, node)
    }

    /// Warning-level problem
    #[inline]
    #[must_use]
    pub fn warning(code: impl Into<String>, message: impl Into<String>, node: NodeRef) -> Self {
        Self::new(Severity::Warning, code, message, node)
    }

    /// Record the step the problem was found at
    #[inline]
    #[must_use]
    pub fn at_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    /// Severity
    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Stable identifier, used for lookup and suppression by the UI
    #[inline]
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human readable message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attributed node
    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeRef {
        self.node
    }

    /// Step index, when the problem came from a single step
    #[inline]
    #[must_use]
    pub fn step(&self) -> Option<usize> {
        self.step
    }

    /// Whether this is an error
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.severity.label(), self.message)
    }
}

/// Ordered collection of problems from one or more rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemReport {
    problems: Vec<Problem>,
}

impl ProblemReport {
    /// Empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a problem
    #[inline]
    pub fn append(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    /// Append every problem of another report, keeping its order
    #[inline]
    pub fn extend(&mut self, other: ProblemReport) {
        self.problems.extend(other.problems);
    }

    /// Append an error attributed to `node`
    pub fn add_error(&mut self, code: impl Into<String>, message: impl Into<String>, node: NodeRef) {
        self.append(Problem::error(code, message, node));
    }

    /// Append a warning attributed to `node`
    pub fn add_warning(&mut self, code: impl Into<String>, message: impl Into<String>, node: NodeRef) {
        self.append(Problem::warning(code, message, node));
    }

    /// All problems in insertion order
    #[inline]
    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Error-level problems in insertion order
    pub fn errors(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(|p| p.severity == Severity::Error)
    }

    /// Warning-level problems in insertion order
    pub fn warnings(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(|p| p.severity == Severity::Warning)
    }

    /// Whether any problem is an error
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.problems.iter().any(Problem::is_error)
    }

    /// Number of problems
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Whether the report is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Problem codes in insertion order
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.problems.iter().map(Problem::code).collect()
    }

    /// Iterate problems
    pub fn iter(&self) -> std::slice::Iter<'_, Problem> {
        self.problems.iter()
    }
}

impl From<Vec<Problem>> for ProblemReport {
    fn from(problems: Vec<Problem>) -> Self {
        Self { problems }
    }
}

impl FromIterator<Problem> for ProblemReport {
    fn from_iter<I: IntoIterator<Item = Problem>>(iter: I) -> Self {
        Self {
            problems: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ProblemReport {
    type Item = Problem;
    type IntoIter = std::vec::IntoIter<Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.problems.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProblemReport {
    type Item = &'a Problem;
    type IntoIter = std::slice::Iter<'a, Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.problems.iter()
    }
}
