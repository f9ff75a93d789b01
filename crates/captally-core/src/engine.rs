// Rust guideline compliant 2026-10-17

//! Aggregation and retention engine.
//!
//! A run folds every new revision of the source file into the aggregate, in
//! history order, then compacts buckets that have aged out of the retention
//! window. All mutation happens on one owned [`AggregateState`].

use crate::calendar::{civil_date, cutoff_date};
use crate::{
    AggregateState, AggregateStore, Bucket, Config, Result, RevisionLog, SourceEntry, Summary,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Result of folding one revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FoldOutcome {
    /// Snapshot was blank; nothing changed, cursor untouched.
    Empty,
    /// Snapshot could not be read from the history; nothing changed.
    Unreadable,
    /// Snapshot was not a JSON array; data skipped, cursor advanced.
    Unparseable,
    /// Snapshot folded; cursor advanced.
    Folded {
        /// Entries appended to raw buckets.
        appended: usize,
        /// Entries without a usable timestamp, or not JSON objects.
        skipped: usize,
        /// Entries whose (name, date) bucket was already compacted.
        rejected: usize,
    },
}

impl FoldOutcome {
    /// Returns true if the outcome moved the cursor to its revision.
    #[must_use]
    pub fn advanced_cursor(&self) -> bool {
        matches!(self, FoldOutcome::Unparseable | FoldOutcome::Folded { .. })
    }
}

/// Per-revision line of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionReport {
    /// Revision identifier.
    pub revision: String,
    /// What folding it did.
    pub outcome: FoldOutcome,
}

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Days kept raw before compaction.
    pub retention_days: u32,
    /// Offset dates are bucketed in.
    pub offset: FixedOffset,
    /// Skip persisting the result.
    pub dry_run: bool,
}

impl RunSettings {
    /// Builds run settings from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured offset is out of range.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            retention_days: config.retention_days,
            offset: config.offset()?,
            dry_run: false,
        })
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Cursor before the run.
    pub previous_commit: Option<String>,
    /// Cursor after the run.
    pub last_commit: Option<String>,
    /// Outcome of each new revision, oldest first.
    pub revisions: Vec<RevisionReport>,
    /// Retention cutoff date used, if any.
    pub cutoff: Option<String>,
    /// Buckets compacted by this run.
    pub compacted: usize,
    /// Whether the aggregate was written.
    pub saved: bool,
}

enum Placement {
    Appended,
    Skipped,
    Rejected,
}

/// Folds one revision of the source file into the aggregate.
///
/// Blank snapshots leave the state untouched, cursor included. Snapshots that
/// are not a JSON array contribute no data, but the cursor still moves to the
/// revision. Otherwise each entry with a timestamp is appended to the raw
/// bucket of its (name, date), and the cursor moves to the revision.
///
/// # Arguments
///
/// * `log` - Revision history of the source file
/// * `revision` - Revision to fold
/// * `state` - Aggregate to fold into
/// * `offset` - Offset dates are bucketed in
///
/// # Errors
///
/// Returns an error only if the snapshot cannot be read from `log`.
pub fn fold_revision(
    log: &dyn RevisionLog,
    revision: &str,
    state: &mut AggregateState,
    offset: FixedOffset,
) -> Result<FoldOutcome> {
    let content = log.content_at(revision)?;
    if content.trim().is_empty() {
        warn!(revision, "Empty content for revision, skipping");
        return Ok(FoldOutcome::Empty);
    }

    let values: Vec<Value> = match serde_json::from_str(&content) {
        Ok(values) => values,
        Err(err) => {
            warn!(revision, error = %err, "Error processing revision");
            state.metadata.last_commit = Some(revision.to_string());
            return Ok(FoldOutcome::Unparseable);
        }
    };

    let (mut appended, mut skipped, mut rejected) = (0, 0, 0);
    for value in values {
        let Value::Object(fields) = value else {
            debug!(revision, "Skipping non-object entry");
            skipped += 1;
            continue;
        };
        match place_entry(state, SourceEntry::new(fields), offset, revision) {
            Placement::Appended => appended += 1,
            Placement::Skipped => skipped += 1,
            Placement::Rejected => rejected += 1,
        }
    }

    state.metadata.last_commit = Some(revision.to_string());
    debug!(revision, appended, skipped, rejected, "Folded revision");

    Ok(FoldOutcome::Folded {
        appended,
        skipped,
        rejected,
    })
}

fn place_entry(
    state: &mut AggregateState,
    entry: SourceEntry,
    offset: FixedOffset,
    revision: &str,
) -> Placement {
    let Some(millis) = entry.timestamp_millis() else {
        return Placement::Skipped;
    };
    let Some(date) = civil_date(millis, offset) else {
        debug!(revision, millis, "Timestamp outside calendar range, skipping entry");
        return Placement::Skipped;
    };
    let name = entry.name();

    let dates = state.data.entry(name.clone()).or_default();
    match dates.entry(date.clone()).or_default() {
        Bucket::Raw(entries) => {
            entries.push(entry);
            Placement::Appended
        }
        // Summaries are final; late entries for a compacted day are dropped.
        Bucket::Compacted(_) => {
            warn!(
                revision,
                name = %name,
                date = %date,
                "Bucket already compacted, dropping entry"
            );
            Placement::Rejected
        }
    }
}

/// Folds revisions in order, each seeing the effects of the ones before it.
///
/// A revision whose snapshot cannot be read is logged and reported as
/// [`FoldOutcome::Unreadable`]; later revisions are still folded.
pub fn fold_revisions(
    log: &dyn RevisionLog,
    revisions: &[String],
    state: &mut AggregateState,
    offset: FixedOffset,
) -> Vec<RevisionReport> {
    let mut reports = Vec::with_capacity(revisions.len());

    for revision in revisions {
        let outcome = match fold_revision(log, revision, state, offset) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(revision = %revision, error = %err, "Could not read revision, skipping");
                FoldOutcome::Unreadable
            }
        };
        reports.push(RevisionReport {
            revision: revision.clone(),
            outcome,
        });
    }

    reports
}

/// Compacts every raw bucket dated strictly before `cutoff`.
///
/// Dates compare as strings, which is date order for `YYYY-MM-DD`. Compacted
/// buckets and buckets on or after the cutoff are left alone.
///
/// # Returns
///
/// The number of buckets compacted.
pub fn compact_before(state: &mut AggregateState, cutoff: &str) -> usize {
    let mut compacted = 0;

    for dates in state.data.values_mut() {
        for (date, bucket) in dates.iter_mut() {
            if date.as_str() >= cutoff {
                continue;
            }
            if let Bucket::Raw(entries) = bucket {
                let summary = Summary::from_entries(entries);
                *bucket = Bucket::Compacted(summary);
                compacted += 1;
            }
        }
    }

    compacted
}

/// Applies the retention window relative to `now`.
///
/// # Arguments
///
/// * `state` - Aggregate to compact
/// * `retention_days` - Days kept raw
/// * `now` - Current instant
/// * `offset` - Offset "today" is taken in
///
/// # Returns
///
/// The cutoff date used (if representable) and the number of buckets compacted.
pub fn apply_retention(
    state: &mut AggregateState,
    retention_days: u32,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> (Option<String>, usize) {
    let Some(cutoff) = cutoff_date(now, offset, retention_days) else {
        return (None, 0);
    };
    let compacted = compact_before(state, &cutoff);
    (Some(cutoff), compacted)
}

/// Runs the full pipeline: load, fold new revisions, compact, save.
///
/// # Arguments
///
/// * `store` - Aggregate file accessor
/// * `log` - Revision history of the source file
/// * `settings` - Retention, offset and dry-run settings
/// * `now` - Instant the retention window is measured from
///
/// # Errors
///
/// Returns an error if:
/// - The aggregate file exists but is malformed
/// - The revision history cannot be listed
/// - The aggregate cannot be written
pub fn run(
    store: &AggregateStore,
    log: &dyn RevisionLog,
    settings: &RunSettings,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    let mut state = store.load()?;
    let previous_commit = state.metadata.last_commit.clone();

    let revisions = log.revisions_since(previous_commit.as_deref())?;
    if revisions.is_empty() {
        info!("No new revisions to process");
    } else {
        info!(count = revisions.len(), "Processing revisions");
    }

    let reports = fold_revisions(log, &revisions, &mut state, settings.offset);
    let (cutoff, compacted) =
        apply_retention(&mut state, settings.retention_days, now, settings.offset);
    if compacted > 0 {
        info!(
            compacted,
            cutoff = cutoff.as_deref().unwrap_or_default(),
            "Compacted aged buckets"
        );
    }

    if settings.dry_run {
        info!("Dry run, aggregate not written");
    } else {
        store.save(&state)?;
    }
    info!(
        last_commit = state.last_commit().unwrap_or_default(),
        "Aggregation complete"
    );

    Ok(RunReport {
        previous_commit,
        last_commit: state.metadata.last_commit,
        revisions: reports,
        cutoff,
        compacted,
        saved: !settings.dry_run,
    })
}
