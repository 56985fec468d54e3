//! `tix group`: show or change the remembered grouping dimension.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use tix_core::config::EffectiveConfig;
use tix_core::error::{ErrorCode, TixError};
use tix_core::model::GroupingDimension;

use super::{open_prefs, prefs_location};

#[derive(Args, Debug, Default)]
pub struct GroupArgs {
    /// New grouping dimension: status, user, or priority. Omit to show
    /// the current one.
    pub dimension: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub grouping: GroupingDimension,
    pub changed: bool,
    pub store: String,
}

/// Execute `tix group`.
///
/// # Errors
///
/// Returns a coded [`CliError`] for an unknown dimension name, or a
/// [`TixError`] if the new choice cannot be written.
pub fn run_group(args: &GroupArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let prefs = open_prefs(config);

    let report = match args.dimension.as_deref() {
        None => GroupReport {
            grouping: prefs.load(),
            changed: false,
            store: prefs_location(config),
        },
        Some(raw) => {
            let dimension: GroupingDimension = raw
                .parse::<GroupingDimension>()
                .map_err(|err| CliError::with_code(err.to_string(), ErrorCode::InvalidEnumValue))?;
            let changed = prefs.load() != dimension;
            prefs.try_save(dimension).map_err(TixError::from)?;
            GroupReport {
                grouping: dimension,
                changed,
                store: prefs_location(config),
            }
        }
    };

    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &GroupReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", report.grouping)
}

fn render_pretty(report: &GroupReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Grouping")?;
    pretty_kv(w, "Dimension", report.grouping.as_str())?;
    if report.changed {
        pretty_kv(w, "Status", "updated")?;
    }
    pretty_kv(w, "Stored in", &report.store)
}
