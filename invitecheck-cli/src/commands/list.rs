//! `invitecheck list` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use invitecheck_core::runner::LOGIN_SCENARIO;
use invitecheck_scenarios::{SUITES, suite};

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `list` command.
pub fn execute(args: ListArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let report = list_suites(args.suite.as_deref())?;
    writer.render(&report)
}

/// Collect suite and scenario names, optionally for one suite only.
pub fn list_suites(only: Option<&str>) -> Result<ListReport, CliError> {
    let names: Vec<&str> = match only {
        Some(name) => vec![name],
        None => SUITES.to_vec(),
    };

    let mut suites = Vec::with_capacity(names.len());
    for name in names {
        let scenarios = suite(name)?
            .iter()
            .map(|s| s.name().to_owned())
            .collect();
        suites.push(SuiteListing {
            name: name.to_owned(),
            scenarios,
        });
    }

    Ok(ListReport {
        login: LOGIN_SCENARIO.to_owned(),
        suites,
    })
}

/// Suites in run order.
#[derive(Serialize)]
pub struct ListReport {
    /// Always runs first.
    pub login: String,
    pub suites: Vec<SuiteListing>,
}

#[derive(Serialize)]
pub struct SuiteListing {
    pub name: String,
    pub scenarios: Vec<String>,
}

impl ListReport {
    pub fn scenario_count(&self) -> usize {
        self.suites.iter().map(|s| s.scenarios.len()).sum()
    }
}

impl Render for ListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{} (always first)", self.login.dimmed())?;
        for listing in &self.suites {
            writeln!(w)?;
            writeln!(
                w,
                "{} ({} scenarios)",
                listing.name.bold(),
                listing.scenarios.len()
            )?;
            for scenario in &listing.scenarios {
                writeln!(w, "  {scenario}")?;
            }
        }
        writeln!(w)?;
        writeln!(
            w,
            "{} suites, {} scenarios",
            self.suites.len(),
            self.scenario_count()
        )?;
        Ok(())
    }
}
