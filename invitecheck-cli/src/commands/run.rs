//! `invitecheck run` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use tracing::{info, warn};

use invitecheck_core::config::HarnessConfig;
use invitecheck_core::metrics;
use invitecheck_core::report::Summary;
use invitecheck_core::runner::ScenarioRunner;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Renders the report first, then turns a halted or failing run into an
/// error so the process exit code reflects the outcome.
pub async fn execute(
    args: RunArgs,
    config: HarnessConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run_suites(args, config).await?;
    writer.render(&report)?;
    outcome(&report.summary)
}

/// Apply the command-line overrides, build the registry and run it.
pub async fn run_suites(args: RunArgs, mut config: HarnessConfig) -> Result<RunReport, CliError> {
    if let Some(base_url) = args.base_url {
        config.target.base_url = base_url;
    }
    if args.no_cleanup {
        config.run.cleanup = false;
    }
    if !args.suites.is_empty() {
        config.run.suites = args.suites;
    }
    config.validate()?;

    let registry = invitecheck_scenarios::build(&config.run.suites)?;
    metrics::describe_all();

    let base_url = config.target.base_url.clone();
    let suites = config.run.suites.clone();
    let mut runner = ScenarioRunner::new(config)?;
    if let Some(filter) = &args.filter {
        if !registry.names().iter().any(|n| n.contains(filter.as_str())) {
            warn!(filter = %filter, "filter matches no scenario");
        }
        runner = runner.with_filter(filter.clone());
    }

    info!(base_url = %base_url, suites = ?suites, "running suites");
    let summary = runner.run(&registry).await;

    Ok(RunReport {
        base_url,
        suites,
        filter: args.filter,
        summary,
    })
}

/// Map a finished run to the command result.
pub fn outcome(summary: &Summary) -> Result<(), CliError> {
    if summary.halted {
        let reason = summary.halted_by().map_or_else(
            || "admin login failed".to_owned(),
            |r| format!("{}: {}", r.name, r.message),
        );
        return Err(CliError::Auth(reason));
    }
    if summary.failed > 0 {
        return Err(CliError::ScenariosFailed {
            failed: summary.failed,
            total: summary.total,
        });
    }
    Ok(())
}

/// Result of one `run` invocation.
#[derive(Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub suites: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub summary: Summary,
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "invitecheck run".bold())?;
        writeln!(w, "  Target: {}", self.base_url)?;
        writeln!(w, "  Suites: {}", self.suites.join(", "))?;
        if let Some(filter) = &self.filter {
            writeln!(w, "  Filter: {filter}")?;
        }
        writeln!(w)?;

        for result in &self.summary.results {
            if result.passed {
                writeln!(
                    w,
                    "  {} {} ({} ms)",
                    "PASS".green(),
                    result.name,
                    result.duration_ms
                )?;
            } else {
                writeln!(w, "  {} {}: {}", "FAIL".red(), result.name, result.message)?;
            }
        }

        writeln!(w)?;
        write!(w, "{}", self.summary.report())?;
        Ok(())
    }
}
