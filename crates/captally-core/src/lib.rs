// Rust guideline compliant 2026-10-17

//! Captally Core Library
//!
//! This crate provides the foundational components for Captally, the incremental
//! capacity aggregator:
//! - Data models (SourceEntry, Bucket, AggregateState)
//! - Aggregate storage (pretty JSON read/write, atomic replace)
//! - Revision log abstraction (trait plus in-memory implementation)
//! - Calendar helpers (fixed-offset civil dates, retention cutoff)
//! - Aggregation and retention engine
//! - Configuration and error types

pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod models;
pub mod storage;

pub use calendar::{civil_date, cutoff_date, fixed_offset};
pub use config::Config;
pub use engine::{
    apply_retention, compact_before, fold_revision, fold_revisions, run, FoldOutcome,
    RevisionReport, RunReport, RunSettings,
};
pub use error::{Error, Result};
pub use history::{MemoryRevisionLog, RevisionLog};
pub use models::{AggregateState, Bucket, Metadata, SourceEntry, Summary};
pub use storage::AggregateStore;
