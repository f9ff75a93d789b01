// Rust guideline compliant 2026-10-17

//! Command implementations for the Captally CLI.

pub mod run;
pub mod status;
