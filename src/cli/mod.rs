//! CLI argument parsing for fleetplan.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default path of the stack configuration.
pub const DEFAULT_CONFIG_PATH: &str = "fleetplan.yaml";

/// Default path of the synthesized plan.
pub const DEFAULT_PLAN_PATH: &str = "fleetplan.out/plan.json";

/// Fleetplan: synthesize agent fleets into dependency-ordered, least-privilege
/// resource specifications.
///
/// A stack config declares agents, their model profiles, and the action groups
/// (handler plus interface contract) each agent may call. `synth` turns it
/// into a validated plan for the provisioning platform.
#[derive(Parser, Debug)]
#[command(name = "fleetplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for fleetplan.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a template stack configuration.
    ///
    /// Never overwrites an existing file.
    Init(ConfigArgs),

    /// Synthesize the stack and write the plan.
    ///
    /// Runs the full assembly, validates the graph, writes the plan as JSON
    /// and appends one audit event.
    Synth(SynthArgs),

    /// Synthesize and validate the stack without writing anything.
    Check(ConfigArgs),

    /// Show what a parsing strategy code selects.
    Strategy(StrategyArgs),
}

/// Location of the stack configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to the stack configuration.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Arguments for the `synth` command.
#[derive(Args, Debug)]
pub struct SynthArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Where to write the plan.
    #[arg(short, long, default_value = DEFAULT_PLAN_PATH)]
    pub out: PathBuf,

    /// Audit log to append to; defaults to `events.ndjson` next to the plan.
    #[arg(long)]
    pub events: Option<PathBuf>,
}

/// Arguments for the `strategy` command.
#[derive(Args, Debug)]
pub struct StrategyArgs {
    /// Strategy code, e.g. FOUNDATION_MODEL.
    pub code: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init_default_config() {
        let cli = Cli::try_parse_from(["fleetplan", "init"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn parse_synth_defaults() {
        let cli = Cli::try_parse_from(["fleetplan", "synth"]).unwrap();
        if let Command::Synth(args) = cli.command {
            assert_eq!(args.config.config, PathBuf::from(DEFAULT_CONFIG_PATH));
            assert_eq!(args.out, PathBuf::from(DEFAULT_PLAN_PATH));
            assert!(args.events.is_none());
        } else {
            panic!("Expected Synth command");
        }
    }

    #[test]
    fn parse_synth_full() {
        let cli = Cli::try_parse_from([
            "fleetplan",
            "synth",
            "--config",
            "stacks/chatbot.yaml",
            "--out",
            "build/plan.json",
            "--events",
            "build/events.ndjson",
        ])
        .unwrap();
        if let Command::Synth(args) = cli.command {
            assert_eq!(args.config.config, PathBuf::from("stacks/chatbot.yaml"));
            assert_eq!(args.out, PathBuf::from("build/plan.json"));
            assert_eq!(args.events, Some(PathBuf::from("build/events.ndjson")));
        } else {
            panic!("Expected Synth command");
        }
    }

    #[test]
    fn parse_check_with_config() {
        let cli = Cli::try_parse_from(["fleetplan", "check", "-c", "x.yaml"]).unwrap();
        assert!(
            matches!(cli.command, Command::Check(ref a) if a.config == PathBuf::from("x.yaml"))
        );
    }

    #[test]
    fn parse_strategy_code() {
        let cli = Cli::try_parse_from(["fleetplan", "strategy", "DATA_AUTOMATION"]).unwrap();
        if let Command::Strategy(args) = cli.command {
            assert_eq!(args.code, "DATA_AUTOMATION");
        } else {
            panic!("Expected Strategy command");
        }
    }

    #[test]
    fn parse_verbose_is_global_and_counts() {
        let cli = Cli::try_parse_from(["fleetplan", "check", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["fleetplan", "-v", "strategy", "DEFAULT"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn parse_strategy_requires_code() {
        assert!(Cli::try_parse_from(["fleetplan", "strategy"]).is_err());
    }
}
