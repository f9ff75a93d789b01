// Rust guideline compliant 2026-10-17

//! Storage module for the aggregate file.
//!
//! The aggregate is a single pretty-printed JSON document. It is read once at
//! the start of a run and fully rewritten once at the end.

use crate::{AggregateState, Error, Result};
use std::path::{Path, PathBuf};

/// Reads and writes the persisted [`AggregateState`].
#[derive(Debug, Clone)]
pub struct AggregateStore {
    /// Path to the aggregate JSON file.
    path: PathBuf,
}

impl AggregateStore {
    /// Creates a new AggregateStore instance.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the aggregate JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path cannot be empty",
            )));
        }
        Ok(Self { path })
    }

    /// Returns a reference to the aggregate file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl AggregateStore {
    /// Loads the aggregate.
    ///
    /// A missing file is the normal first-run state and yields an empty
    /// aggregate with no processed revision.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file does not contain a valid aggregate document
    pub fn load(&self) -> Result<AggregateState> {
        use std::fs::File;
        use std::io::BufReader;

        if !self.path.exists() {
            return Ok(AggregateState::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Saves the aggregate, replacing the previous file.
    ///
    /// Writes 2-space indented JSON to a temp file next to the target, then
    /// renames it into place. Saving an unchanged aggregate produces a
    /// byte-identical file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Serialization fails
    /// - The temp file cannot be written
    /// - The atomic rename fails
    pub fn save(&self, state: &AggregateState) -> Result<()> {
        use std::fs::File;
        use std::io::Write;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let temp_path = self.temp_path();

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }

        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
