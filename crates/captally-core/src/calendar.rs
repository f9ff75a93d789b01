// Rust guideline compliant 2026-10-17

//! Fixed-offset calendar helpers.
//!
//! Entries are bucketed by the civil date they fall on in a fixed UTC offset,
//! independent of the host timezone and of any live clock.

use crate::{Error, Result};
use chrono::{DateTime, Days, FixedOffset, Utc};

/// Format of bucket dates. Zero-padded, so string order is date order.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const SECONDS_PER_HOUR: i32 = 3600;

/// Builds a fixed UTC offset from a whole number of hours.
///
/// # Errors
///
/// Returns an error if the offset is not strictly within one day of UTC.
pub fn fixed_offset(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| Error::InvalidConfig(format!("UTC offset out of range: {hours} hours")))
}

/// Converts epoch milliseconds to the `YYYY-MM-DD` date at the given offset.
///
/// # Arguments
///
/// * `millis` - Milliseconds since the Unix epoch (negative values allowed)
/// * `offset` - The fixed offset the civil date is taken in
///
/// # Returns
///
/// The formatted date, or `None` if the instant is outside the supported range.
#[must_use]
pub fn civil_date(millis: i64, offset: FixedOffset) -> Option<String> {
    let instant = DateTime::<Utc>::from_timestamp_millis(millis)?;
    Some(instant.with_timezone(&offset).format(DATE_FORMAT).to_string())
}

/// Computes the retention cutoff date.
///
/// The cutoff is today's civil date at `offset`, minus `retention_days` days.
/// Buckets dated strictly before it are eligible for compaction.
///
/// # Returns
///
/// The formatted cutoff date, or `None` if it would precede the earliest
/// representable date (in which case nothing is old enough to compact).
#[must_use]
pub fn cutoff_date(now: DateTime<Utc>, offset: FixedOffset, retention_days: u32) -> Option<String> {
    let today = now.with_timezone(&offset).date_naive();
    let cutoff = today.checked_sub_days(Days::new(u64::from(retention_days)))?;
    Some(cutoff.format(DATE_FORMAT).to_string())
}
