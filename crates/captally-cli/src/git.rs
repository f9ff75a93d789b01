// Rust guideline compliant 2026-10-17

//! Git-backed revision log.
//!
//! Lists the commits that changed the source file and reads the file as it
//! was at each of them, straight from the object database.

use captally_core::{Error as CoreError, Result as CoreResult, RevisionLog};
use git2::{Commit, ErrorCode, ObjectType, Oid, Repository, Sort};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Revision log over the history of one file in a Git repository.
pub struct GitRevisionLog {
    repo: Repository,
    /// Source file path relative to the repository root.
    path: PathBuf,
}

impl GitRevisionLog {
    /// Opens the repository containing `repo_root`.
    ///
    /// # Arguments
    ///
    /// * `repo_root` - Any directory inside the repository
    /// * `source_path` - Source file path relative to the repository root
    ///
    /// # Errors
    ///
    /// Returns an error if no repository can be discovered.
    pub fn open(repo_root: &Path, source_path: &Path) -> anyhow::Result<Self> {
        let repo = Repository::discover(repo_root)?;
        Ok(Self::new(repo, source_path))
    }

    /// Wraps an already opened repository.
    #[must_use]
    pub fn new(repo: Repository, source_path: &Path) -> Self {
        let path = source_path
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect();
        Self { repo, path }
    }

    /// Returns the tracked source path.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.path
    }

    fn blob_at(&self, commit: &Commit<'_>) -> Result<Option<Oid>, git2::Error> {
        let tree = commit.tree()?;
        match tree.get_path(&self.path) {
            Ok(entry) if entry.kind() == Some(ObjectType::Blob) => Ok(Some(entry.id())),
            Ok(_) => Ok(None),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// A commit touches the path when its blob differs from every parent's.
    fn touches_path(&self, commit: &Commit<'_>) -> Result<bool, git2::Error> {
        let current = self.blob_at(commit)?;
        if commit.parent_count() == 0 {
            return Ok(current.is_some());
        }
        for parent in commit.parents() {
            if self.blob_at(&parent)? == current {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn resolve_cursor(&self, since: &str) -> Option<Oid> {
        let oid = match Oid::from_str(since) {
            Ok(oid) => oid,
            Err(err) => {
                warn!(cursor = since, error = %err, "Cursor is not a commit id");
                return None;
            }
        };
        match self.repo.find_commit(oid) {
            Ok(commit) => Some(commit.id()),
            Err(err) => {
                warn!(cursor = since, error = %err, "Cursor commit not found in repository");
                None
            }
        }
    }

    fn walk(&self, since: Option<&str>) -> Result<Vec<String>, git2::Error> {
        match self.repo.head() {
            Ok(_) => {}
            Err(err) if matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        if let Some(since) = since {
            let Some(cursor) = self.resolve_cursor(since) else {
                return Ok(Vec::new());
            };
            revwalk.hide(cursor)?;
        }
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;

        let mut revisions = Vec::new();
        for oid_result in revwalk {
            let commit = self.repo.find_commit(oid_result?)?;
            if self.touches_path(&commit)? {
                revisions.push(commit.id().to_string());
            }
        }
        Ok(revisions)
    }

    fn read(&self, revision: &str) -> Result<String, git2::Error> {
        let Ok(oid) = Oid::from_str(revision) else {
            return Ok(String::new());
        };
        let commit = match self.repo.find_commit(oid) {
            Ok(commit) => commit,
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(String::new()),
            Err(err) => return Err(err),
        };
        let Some(blob_id) = self.blob_at(&commit)? else {
            return Ok(String::new());
        };
        let blob = self.repo.find_blob(blob_id)?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

fn history_error(err: git2::Error) -> CoreError {
    CoreError::History(err.message().to_string())
}

impl RevisionLog for GitRevisionLog {
    fn revisions_since(&self, since: Option<&str>) -> CoreResult<Vec<String>> {
        self.walk(since).map_err(history_error)
    }

    fn content_at(&self, revision: &str) -> CoreResult<String> {
        self.read(revision).map_err(history_error)
    }
}
