//! Custom mask definition file names
//!
//! A custom mask is identified by its MDF name, which encodes the owning
//! program and a mask number: `GN2014AQ001-02` is mask 2 of `GN-2014A-Q-1`.
//! Missing names are errors; names that break the pattern or belong to
//! another program are warnings.

use once_cell::sync::Lazy;
use p2_config::Value;
use regex::Regex;

use super::step::{keys, GmosStep};
use super::types::FpuMode;
use super::{GmosConfigRule, GmosPassState};
use crate::problem::{Problem, Severity};
use crate::rule::Matcher;
use crate::step::StepContext;

type State = GmosPassState;

static MASK_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^G([NS])(\d{4}[AB])(Q|C|DD|FT|LP|SV)(\d{3})-(\d{2})$").ok());

static PROGRAM_ID: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^G([NS])-(\d{4}[AB])-(Q|C|DD|FT|LP|SV)-(\d+)$").ok());

/// Program fields shared by program ids and MDF names
#[derive(Debug, PartialEq, Eq)]
struct ProgramRef<'a> {
    site: &'a str,
    semester: &'a str,
    kind: &'a str,
    number: u32,
}

fn program_ref<'a>(pattern: Option<&Regex>, text: &'a str) -> Option<ProgramRef<'a>> {
    let caps = pattern?.captures(text)?;
    let field = |i| caps.get(i).map(|m| m.as_str());
    Some(ProgramRef {
        site: field(1)?,
        semester: field(2)?,
        kind: field(3)?,
        number: field(4)?.parse().ok()?,
    })
}

fn mask_name_problem(ctx: &StepContext<'_>) -> Option<Problem> {
    if ctx.fpu_mode() != Some(FpuMode::CustomMask) {
        return None;
    }
    let name = ctx
        .get(&keys::FPU_CUSTOM_MASK)
        .and_then(Value::as_symbol)
        .map_or("", str::trim);
    if name.is_empty() {
        return Some(ctx.error(
            "GmosRule_MDF_MASK_NAME_MISSING",
            "A custom mask is selected but no MDF file name is given",
        ));
    }
    let Some(mask) = program_ref(Option::as_ref(&MASK_NAME), name) else {
        return Some(ctx.warning(
            "GmosRule_MDF_MASK_NAME_FORMAT",
            format!("Custom mask MDF name '{name}' does not follow the GN2014AQ001-01 pattern"),
        ));
    };
    let program_id = ctx.observation().program_id.as_deref()?;
    let program = program_ref(Option::as_ref(&PROGRAM_ID), program_id.trim())?;
    (mask != program).then(|| {
        ctx.warning(
            "GmosRule_MDF_MASK_NAME_PROGRAM",
            format!("Custom mask MDF name '{name}' does not belong to program {program_id}"),
        )
    })
}

fn mask_name_error(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    mask_name_problem(ctx).filter(|p| p.severity() == Severity::Error)
}

fn mask_name_warning(ctx: &StepContext<'_>, _: &mut State) -> Option<Problem> {
    mask_name_problem(ctx).filter(|p| p.severity() == Severity::Warning)
}

/// A custom mask needs an MDF name
pub const MDF_MASK_NAME_ERROR_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_MDF_MASK_NAME_ERROR_RULE", Matcher::ALWAYS, mask_name_error);

/// The MDF name should be well formed and match the program
pub const MDF_MASK_NAME_WARNING_RULE: GmosConfigRule =
    GmosConfigRule::new("GmosRule_MDF_MASK_NAME_WARNING_RULE", Matcher::ALWAYS, mask_name_warning);
