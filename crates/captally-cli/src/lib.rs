// Rust guideline compliant 2026-10-17

//! Captally CLI library.
//!
//! This library exposes the CLI modules for use in tests and external code.

pub mod commands;
pub mod git;
pub mod logging;
pub mod repo;

pub use git::GitRevisionLog;
pub use repo::RepoContext;
