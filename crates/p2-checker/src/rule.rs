//! Rule building blocks
//!
//! A [`Matcher`] decides whether a step is in scope, a [`ConfigRule`] pairs a
//! matcher with a per-step check, and [`Rule`] is what the outside world
//! runs against a whole observation.

use std::fmt::{self, Debug, Formatter};

use crate::observation::Observation;
use crate::problem::{Problem, ProblemReport};
use crate::step::{ObsClass, StepContext};

/// Named predicate selecting the steps a rule applies to
///
/// Matchers are compared by name when the driver caches their results
/// within a step, so two matchers with the same name must agree.
#[derive(Clone, Copy)]
pub struct Matcher {
    name: &'static str,
    predicate: fn(&StepContext<'_>) -> bool,
}

impl Matcher {
    /// Matches every step
    pub const ALWAYS: Self = Self::new("always", always);

    /// Matches science steps
    pub const SCIENCE: Self = Self::new("science", is_science);

    /// Matches science and nighttime calibration steps
    pub const SCIENCE_NIGHTTIME_CAL: Self =
        Self::new("science_nighttime_cal", is_science_or_nighttime_cal);

    /// Create a matcher
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, predicate: fn(&StepContext<'_>) -> bool) -> Self {
        Self { name, predicate }
    }

    /// Cache key of this matcher
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluate against one step
    #[inline]
    #[must_use]
    pub fn matches(&self, ctx: &StepContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

impl Debug for Matcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Matcher").field(&self.name).finish()
    }
}

fn always(_: &StepContext<'_>) -> bool {
    true
}

fn is_science(ctx: &StepContext<'_>) -> bool {
    ctx.obs_class() == Some(ObsClass::Science)
}

fn is_science_or_nighttime_cal(ctx: &StepContext<'_>) -> bool {
    matches!(
        ctx.obs_class(),
        Some(ObsClass::Science | ObsClass::ProgramCal | ObsClass::PartnerCal)
    )
}

/// Per-step check function
///
/// The second argument is state shared by every rule of one pass.
pub type CheckFn<S> = fn(&StepContext<'_>, &mut S) -> Option<Problem>;

/// One step-level rule: a matcher plus a check
///
/// Rules are `const` so rule sets can be declared as tables and single
/// rules can be run on their own.
pub struct ConfigRule<S> {
    code: &'static str,
    matcher: Matcher,
    check: CheckFn<S>,
}

impl<S> ConfigRule<S> {
    /// Create a rule
    #[inline]
    #[must_use]
    pub const fn new(code: &'static str, matcher: Matcher, check: CheckFn<S>) -> Self {
        Self {
            code,
            matcher,
            check,
        }
    }

    /// Identifying code of this rule
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Matcher selecting the steps this rule sees
    #[inline]
    #[must_use]
    pub fn matcher(&self) -> Matcher {
        self.matcher
    }

    /// Run the check on a step already known to match
    #[inline]
    pub fn check(&self, ctx: &StepContext<'_>, state: &mut S) -> Option<Problem> {
        (self.check)(ctx, state)
    }
}

impl<S> Clone for ConfigRule<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ConfigRule<S> {}

impl<S> Debug for ConfigRule<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRule")
            .field("code", &self.code)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// State threaded through one sequence pass
///
/// A fresh value is created per check; `finish` runs after the last step and
/// may add whole-sequence findings.
pub trait PassState: Default {
    /// Called once after every step has been visited
    fn finish(self, _observation: &Observation, _report: &mut ProblemReport) {}
}

impl PassState for () {}

/// Anything that can check an observation
pub trait Rule: Send + Sync + Debug {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Check `observation`, returning every problem found
    fn check(&self, observation: &Observation) -> ProblemReport;
}

impl<R: Rule + ?Sized> Rule for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn check(&self, observation: &Observation) -> ProblemReport {
        (**self).check(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CheckSettings;
    use crate::step::keys;
    use p2_config::{Config, ConfigSequence};

    fn with_class(class: &str, f: impl FnOnce(&StepContext<'_>)) {
        let config = Config::new().with(keys::OBS_CLASS.clone(), class);
        let obs = Observation::new(ConfigSequence::new());
        let settings = CheckSettings::default();
        f(&StepContext::new(&config, 0, &obs, &settings));
    }

    #[test]
    fn standard_matchers() {
        with_class("science", |ctx| {
            assert!(Matcher::ALWAYS.matches(ctx));
            assert!(Matcher::SCIENCE.matches(ctx));
            assert!(Matcher::SCIENCE_NIGHTTIME_CAL.matches(ctx));
        });
        with_class("partnerCal", |ctx| {
            assert!(!Matcher::SCIENCE.matches(ctx));
            assert!(Matcher::SCIENCE_NIGHTTIME_CAL.matches(ctx));
        });
        with_class("dayCal", |ctx| {
            assert!(Matcher::ALWAYS.matches(ctx));
            assert!(!Matcher::SCIENCE_NIGHTTIME_CAL.matches(ctx));
        });
    }

    #[test]
    fn config_rule_runs_its_check() {
        fn count(ctx: &StepContext<'_>, seen: &mut usize) -> Option<Problem> {
            *seen += 1;
            Some(ctx.warning("COUNT", "counted"))
        }
        const RULE: ConfigRule<usize> = ConfigRule::new("COUNT", Matcher::ALWAYS, count);

        with_class("science", |ctx| {
            let mut seen = 0;
            let problem = RULE.check(ctx, &mut seen);
            assert_eq!(seen, 1);
            assert_eq!(problem.map(|p| p.code().to_owned()), Some("COUNT".to_owned()));
        });
        assert_eq!(RULE.code(), "COUNT");
        assert_eq!(RULE.matcher().name(), "always");
        assert!(format!("{RULE:?}").contains("COUNT"));
    }
}
