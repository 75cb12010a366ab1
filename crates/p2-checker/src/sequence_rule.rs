//! Step-by-step driver for [`ConfigRule`] sets

use std::fmt::{self, Debug, Formatter};

use smallvec::SmallVec;
use tracing::debug;

use crate::observation::Observation;
use crate::problem::ProblemReport;
use crate::rule::{ConfigRule, PassState, Rule};
use crate::settings::CheckSettings;
use crate::step::StepContext;

/// Runs an ordered list of step rules over every resolved step
///
/// Within a step, rules run in registration order and each matcher is
/// evaluated at most once. A rule that reports a problem is retired for the
/// rest of the pass, so each rule contributes at most one problem.
///
/// # Examples
///
/// ```rust
/// use p2_checker::{ConfigRule, Matcher, Observation, Problem, Rule, SequenceRule, StepContext};
/// use p2_config::{Config, ConfigSequence};
///
/// fn no_exposure(ctx: &StepContext<'_>, _: &mut ()) -> Option<Problem> {
///     ctx.exposure_time().is_none().then(|| ctx.error("NO_EXP", "Exposure time is missing"))
/// }
///
/// let rule = SequenceRule::new("demo").with_rule(ConfigRule::new("NO_EXP", Matcher::ALWAYS, no_exposure));
/// let seq = ConfigSequence::from_deltas(vec![Config::new(), Config::new()]);
/// let report = rule.check(&Observation::new(seq));
/// assert_eq!(report.len(), 1);
/// ```
pub struct SequenceRule<S> {
    name: &'static str,
    rules: Vec<ConfigRule<S>>,
    settings: CheckSettings,
}

impl<S> Clone for SequenceRule<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            rules: self.rules.clone(),
            settings: self.settings,
        }
    }
}

impl<S> Debug for SequenceRule<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceRule")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<S: PassState> SequenceRule<S> {
    /// Empty driver with default settings
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
            settings: CheckSettings::default(),
        }
    }

    /// Driver over `rules`
    #[must_use]
    pub fn from_rules(name: &'static str, rules: Vec<ConfigRule<S>>) -> Self {
        Self {
            rules,
            ..Self::new(name)
        }
    }

    /// With one more rule at the end
    #[inline]
    #[must_use]
    pub fn with_rule(mut self, rule: ConfigRule<S>) -> Self {
        self.rules.push(rule);
        self
    }

    /// With thresholds
    #[inline]
    #[must_use]
    pub fn with_settings(mut self, settings: CheckSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registered rules in order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[ConfigRule<S>] {
        &self.rules
    }

    /// Active thresholds
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &CheckSettings {
        &self.settings
    }

    /// Walk the sequence, returning the step problems and the final state
    ///
    /// [`PassState::finish`] is not called; [`Rule::check`] does that.
    pub fn run(&self, observation: &Observation) -> (ProblemReport, S) {
        let mut report = ProblemReport::new();
        let mut state = S::default();
        let mut retired = vec![false; self.rules.len()];

        for (step, config) in observation.sequence.complete_view().iter().enumerate() {
            let ctx = StepContext::new(config, step, observation, &self.settings);
            let mut matched: SmallVec<[(&'static str, bool); 8]> = SmallVec::new();

            for (rule, done) in self.rules.iter().zip(retired.iter_mut()) {
                if *done {
                    continue;
                }
                let matcher = rule.matcher();
                let applies = match matched.iter().find(|(name, _)| *name == matcher.name()) {
                    Some(&(_, cached)) => cached,
                    None => {
                        let result = matcher.matches(&ctx);
                        matched.push((matcher.name(), result));
                        result
                    }
                };
                if !applies {
                    continue;
                }
                if let Some(problem) = rule.check(&ctx, &mut state) {
                    debug!(rule = rule.code(), step, severity = %problem.severity(), "rule reported");
                    report.append(problem);
                    *done = true;
                }
            }
        }
        (report, state)
    }
}

impl<S> Rule for SequenceRule<S>
where
    S: PassState + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, observation: &Observation) -> ProblemReport {
        let (mut report, state) = self.run(observation);
        state.finish(observation, &mut report);
        report
    }
}
