//! Rule aggregation

use tracing::trace;

use crate::observation::Observation;
use crate::problem::ProblemReport;
use crate::rule::Rule;

/// Runs every member rule and concatenates their reports in member order
#[derive(Debug, Default)]
pub struct CompositeRule {
    name: &'static str,
    rules: Vec<Box<dyn Rule>>,
}

impl CompositeRule {
    /// Empty composite
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    /// With one more member
    #[must_use]
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.push(rule);
        self
    }

    /// Add a member at the end
    pub fn push(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Number of members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no members
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Rule for CompositeRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, observation: &Observation) -> ProblemReport {
        let mut report = ProblemReport::new();
        for rule in &self.rules {
            let found = rule.check(observation);
            trace!(composite = self.name, rule = rule.name(), problems = found.len(), "member checked");
            report.extend(found);
        }
        report
    }
}
