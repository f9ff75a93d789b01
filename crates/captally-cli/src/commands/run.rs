// Rust guideline compliant 2026-10-17

//! Implementation of the `captally run` command.
//!
//! Folds new revisions of the source file into the aggregate, compacts aged
//! buckets, and writes the aggregate back.

use crate::repo::RepoContext;
use anyhow::Result;
use captally_core::{FoldOutcome, RunReport};
use chrono::Utc;
use std::fmt::Write;

/// Runs one aggregation pass.
///
/// # Arguments
///
/// * `ctx` - Repository context
/// * `dry_run` - Whether to skip writing the aggregate
/// * `json` - Whether to print the run report as JSON
///
/// # Errors
///
/// Returns an error if:
/// - The aggregate file exists but is malformed
/// - The repository history cannot be listed
/// - The aggregate cannot be written
pub fn execute(ctx: &RepoContext, dry_run: bool, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let history = ctx.open_history()?;
    let settings = ctx.run_settings(dry_run)?;

    let report = captally_core::run(&store, &history, &settings, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

/// Renders a run report for terminal output.
#[must_use]
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();

    if report.revisions.is_empty() {
        out.push_str("No new revisions to process.\n");
    } else {
        let _ = writeln!(out, "Processing revisions: {}", report.revisions.len());
        for line in &report.revisions {
            let _ = writeln!(out, "  {}  {}", short_id(&line.revision), describe(line.outcome));
        }
    }

    if report.compacted > 0 {
        let _ = writeln!(
            out,
            "Compacted buckets: {} (older than {})",
            report.compacted,
            report.cutoff.as_deref().unwrap_or("-")
        );
    }

    let _ = writeln!(
        out,
        "Aggregation complete. Last revision: {}",
        report.last_commit.as_deref().unwrap_or("none")
    );
    if !report.saved {
        out.push_str("Dry run: aggregate not written.\n");
    }
    out
}

fn short_id(revision: &str) -> &str {
    revision.get(..10).unwrap_or(revision)
}

fn describe(outcome: FoldOutcome) -> String {
    match outcome {
        FoldOutcome::Empty => "empty content, skipped".to_string(),
        FoldOutcome::Unreadable => "unreadable, skipped".to_string(),
        FoldOutcome::Unparseable => "invalid JSON, data skipped".to_string(),
        FoldOutcome::Folded {
            appended,
            skipped,
            rejected,
        } => {
            let mut text = format!("{appended} appended");
            if skipped > 0 {
                let _ = write!(text, ", {skipped} skipped");
            }
            if rejected > 0 {
                let _ = write!(text, ", {rejected} dropped (day already compacted)");
            }
            text
        }
    }
}
