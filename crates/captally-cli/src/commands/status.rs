// Rust guideline compliant 2026-10-17

//! Implementation of the `captally status` command.
//!
//! Shows the cursor, aggregate size, and how many revisions are waiting to be
//! folded, without changing anything.

use crate::repo::RepoContext;
use anyhow::Result;
use captally_core::RevisionLog;
use serde::Serialize;
use std::path::PathBuf;

/// Snapshot of the aggregate and its pending work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Resolved aggregate file path.
    pub aggregate_path: PathBuf,
    /// Tracked source path inside the repository.
    pub source_path: PathBuf,
    /// Last folded revision.
    pub last_commit: Option<String>,
    /// Number of entities.
    pub entities: usize,
    /// Buckets still holding raw entries.
    pub raw_buckets: usize,
    /// Buckets reduced to summaries.
    pub compacted_buckets: usize,
    /// Revisions the next run would fold.
    pub pending_revisions: usize,
    /// Configured retention window.
    pub retention_days: u32,
    /// Configured bucketing offset.
    pub utc_offset_hours: i32,
}

/// Gathers status for a repository.
///
/// # Errors
///
/// Returns an error if the aggregate is malformed or history cannot be listed.
pub fn collect(ctx: &RepoContext) -> Result<StatusReport> {
    let state = ctx.open_store()?.load()?;
    let history = ctx.open_history()?;
    let pending = history.revisions_since(state.last_commit())?;
    let (raw_buckets, compacted_buckets) = state.bucket_counts();
    let config = ctx.config();

    Ok(StatusReport {
        aggregate_path: ctx.aggregate_path(),
        source_path: config.source_path.clone(),
        last_commit: state.metadata.last_commit.clone(),
        entities: state.entity_count(),
        raw_buckets,
        compacted_buckets,
        pending_revisions: pending.len(),
        retention_days: config.retention_days,
        utc_offset_hours: config.utc_offset_hours,
    })
}

/// Prints repository status.
///
/// # Errors
///
/// See [`collect`].
pub fn execute(ctx: &RepoContext, json: bool) -> Result<()> {
    let status = collect(ctx)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Aggregate:         {}", status.aggregate_path.display());
    println!("Source:            {}", status.source_path.display());
    println!(
        "Last revision:     {}",
        status.last_commit.as_deref().unwrap_or("none")
    );
    println!("Entities:          {}", status.entities);
    println!(
        "Buckets:           {} raw, {} compacted",
        status.raw_buckets, status.compacted_buckets
    );
    println!(
        "Retention:         {} days at UTC{:+}",
        status.retention_days, status.utc_offset_hours
    );
    println!("Pending revisions: {}", status.pending_revisions);
    Ok(())
}
