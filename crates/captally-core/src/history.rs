// Rust guideline compliant 2026-10-17

//! Revision history abstraction.
//!
//! The engine never talks to a version-control system directly. It is handed a
//! [`RevisionLog`], an ordered log of immutable snapshots of the source file.

use crate::Result;

/// Read-only access to the revision history of the source file.
pub trait RevisionLog {
    /// Lists revisions touching the source file, oldest first.
    ///
    /// # Arguments
    ///
    /// * `since` - Exclusive lower bound; `None` lists the full history
    ///
    /// # Returns
    ///
    /// Revision identifiers after `since`, or an empty list if there are none.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be queried at all.
    fn revisions_since(&self, since: Option<&str>) -> Result<Vec<String>>;

    /// Returns the content of the source file at a revision.
    ///
    /// An empty string is returned when the file has no content at that
    /// revision (for example, it was deleted).
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    fn content_at(&self, revision: &str) -> Result<String>;
}

/// In-memory revision log with fixed snapshots.
#[derive(Debug, Clone, Default)]
pub struct MemoryRevisionLog {
    revisions: Vec<(String, String)>,
}

impl MemoryRevisionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a revision as the newest entry of the log.
    pub fn push(&mut self, revision: impl Into<String>, content: impl Into<String>) {
        self.revisions.push((revision.into(), content.into()));
    }

    /// Builder form of [`MemoryRevisionLog::push`].
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>, content: impl Into<String>) -> Self {
        self.push(revision, content);
        self
    }

    /// Returns the number of revisions in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Returns true if the log holds no revisions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

impl RevisionLog for MemoryRevisionLog {
    fn revisions_since(&self, since: Option<&str>) -> Result<Vec<String>> {
        let start = match since {
            None => 0,
            Some(cursor) => match self.revisions.iter().position(|(id, _)| id == cursor) {
                Some(index) => index + 1,
                None => return Ok(Vec::new()),
            },
        };

        Ok(self.revisions[start..]
            .iter()
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn content_at(&self, revision: &str) -> Result<String> {
        Ok(self
            .revisions
            .iter()
            .find(|(id, _)| id == revision)
            .map(|(_, content)| content.clone())
            .unwrap_or_default())
    }
}
