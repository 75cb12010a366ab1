//! `p2check`: command line front end for the observation checker

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use p2_checker::gmos::GmosRule;
use p2_checker::{check_with_settings, CheckSettings, Rule};
use p2_cli::{
    load_observation, load_settings, render_report_json, render_report_text, render_sequence_json,
    render_sequence_text,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn observation_arg() -> Arg {
    Arg::new("observation")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Observation file (.json, .yaml or .yml)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn cli() -> Command {
    Command::new("p2check")
        .version(p2_checker::VERSION)
        .about("Check Phase II observation sequences")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level unless RUST_LOG is set"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("check")
                .about("Run the instrument rules and print the problem report")
                .arg(observation_arg())
                .arg(
                    Arg::new("settings")
                        .long("settings")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML file with checker thresholds"),
                )
                .arg(
                    Arg::new("lenient")
                        .long("lenient")
                        .action(ArgAction::SetTrue)
                        .help("Treat unknown constants as absent instead of failing"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("sequence")
                .about("Print the resolved steps of an observation")
                .arg(observation_arg())
                .arg(
                    Arg::new("compact")
                        .long("compact")
                        .action(ArgAction::SetTrue)
                        .help("Print only the items that change at each step"),
                )
                .arg(json_arg()),
        )
}

fn init_tracing(matches: &ArgMatches) {
    let default = if matches.get_flag("verbose") { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if matches.get_flag("log-json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_check(args: &ArgMatches) -> Result<ExitCode> {
    let Some(path) = args.get_one::<PathBuf>("observation") else {
        anyhow::bail!("missing observation path");
    };
    let observation = load_observation(path).with_context(|| format!("loading {}", path.display()))?;
    let settings = match args.get_one::<PathBuf>("settings") {
        Some(file) => load_settings(file).with_context(|| format!("loading {}", file.display()))?,
        None => CheckSettings::default(),
    };

    let report = if args.get_flag("lenient") {
        GmosRule::new().with_settings(settings).check(&observation)
    } else {
        check_with_settings(&observation, settings).context("observation rejected")?
    };
    info!(problems = report.len(), errors = report.has_errors(), "check finished");

    if args.get_flag("json") {
        println!("{}", render_report_json(&report)?);
    } else {
        print!("{}", render_report_text(&report));
    }
    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_sequence(args: &ArgMatches) -> Result<ExitCode> {
    let Some(path) = args.get_one::<PathBuf>("observation") else {
        anyhow::bail!("missing observation path");
    };
    let observation = load_observation(path).with_context(|| format!("loading {}", path.display()))?;
    let compact = args.get_flag("compact");

    if args.get_flag("json") {
        println!("{}", render_sequence_json(&observation.sequence, compact)?);
    } else {
        print!("{}", render_sequence_text(&observation.sequence, compact));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let matches = cli().get_matches();
    init_tracing(&matches);

    match matches.subcommand() {
        Some(("check", args)) => run_check(args),
        Some(("sequence", args)) => run_sequence(args),
        _ => Ok(ExitCode::FAILURE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["p2check", "check", "obs.json", "--json", "-v"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "check");
        assert!(args.get_flag("json"));
        assert!(!args.get_flag("lenient"));
    }
}
