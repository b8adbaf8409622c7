//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no I/O happens here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// invitecheck -- HTTP API test harness for the wedding-invitation backend.
///
/// Use `invitecheck <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "invitecheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to an invitecheck.toml file (default: built-in defaults + env overrides).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenario suites against the target backend.
    Run(RunArgs),

    /// List suites and their scenarios.
    List(ListArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run scenario suites.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Suite to run (repeatable; `all` = every suite). Defaults to `[run] suites`.
    #[arg(short, long = "suite")]
    pub suites: Vec<String>,

    /// Only run scenarios whose name contains this text.
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Override `[target] base_url`.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Leave created resources on the target.
    #[arg(long)]
    pub no_cleanup: bool,
}

// ---- list ----

/// List suites and scenario names.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only list this suite.
    #[arg(short, long)]
    pub suite: Option<String>,
}

// ---- config ----

/// Manage invitecheck configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only one section (general, target, admin, run, expectations).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn run_without_flags_uses_config_defaults() {
        let cli = Cli::try_parse_from(["invitecheck", "run"]).expect("parse succeeded");
        assert!(cli.config.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.suites.is_empty());
                assert!(args.filter.is_none());
                assert!(!args.no_cleanup);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn run_accepts_repeated_suites_and_overrides() {
        let cli = Cli::try_parse_from([
            "invitecheck",
            "run",
            "--suite",
            "templates",
            "-s",
            "audit-logs",
            "--filter",
            "422",
            "--base-url",
            "https://staging.example.com/api",
            "--no-cleanup",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.suites, vec!["templates", "audit-logs"]);
                assert_eq!(args.filter.as_deref(), Some("422"));
                assert_eq!(
                    args.base_url.as_deref(),
                    Some("https://staging.example.com/api")
                );
                assert!(args.no_cleanup);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "invitecheck",
            "list",
            "--output",
            "json",
            "--config",
            "ci.toml",
            "--log-level",
            "debug",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn config_show_section() {
        let cli = Cli::try_parse_from(["invitecheck", "config", "show", "--section", "target"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(ConfigArgs {
                action: ConfigAction::Show { section },
            }) => assert_eq!(section.as_deref(), Some("target")),
            _ => panic!("expected config show"),
        }
    }

    #[test]
    fn invalid_output_format_is_rejected() {
        assert!(Cli::try_parse_from(["invitecheck", "--output", "yaml", "list"]).is_err());
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["invitecheck"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
