// Rust guideline compliant 2026-10-17

//! Repository discovery and path management utilities.

use crate::git::GitRevisionLog;
use anyhow::{Context, Result};
use captally_core::config::CONFIG_FILE_NAME;
use captally_core::{AggregateStore, Config, RunSettings};
use git2::Repository;
use std::path::{Path, PathBuf};

/// Resolved paths and configuration for a repository being aggregated.
#[derive(Debug, Clone)]
pub struct RepoContext {
    root: PathBuf,
    git_dir: PathBuf,
    config_path: PathBuf,
    config: Config,
}

impl RepoContext {
    /// Discovers the Git repository and loads its configuration.
    ///
    /// # Arguments
    ///
    /// * `repo_root` - Directory to start discovery from (defaults to the
    ///   current directory)
    /// * `config_path` - Explicit config file (defaults to `captally.toml` in
    ///   the repository root)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No Git repository contains the start directory
    /// - The configuration cannot be loaded
    pub fn discover(repo_root: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let start = match repo_root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let repo = Repository::discover(&start)
            .with_context(|| format!("Not a Git repository: {}", start.display()))?;
        let root = repo.workdir().map_or(start, Path::to_path_buf);

        let config_path =
            config_path.map_or_else(|| root.join(CONFIG_FILE_NAME), Path::to_path_buf);
        let config = Config::load_from(&config_path)?;

        Ok(Self {
            git_dir: repo.path().to_path_buf(),
            root,
            config_path,
            config,
        })
    }

    /// Returns the repository root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns the config file path (which may not exist).
    #[must_use]
    pub fn config_path(&self) -> &Path {
        self.config_path.as_path()
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the resolved aggregate file path.
    #[must_use]
    pub fn aggregate_path(&self) -> PathBuf {
        self.config.resolve_aggregate_path(&self.root)
    }

    /// Opens the aggregate store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be initialized.
    pub fn open_store(&self) -> Result<AggregateStore> {
        Ok(AggregateStore::new(self.aggregate_path())?)
    }

    /// Opens the source file history.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be reopened.
    pub fn open_history(&self) -> Result<GitRevisionLog> {
        let repo = Repository::open(&self.git_dir)?;
        Ok(GitRevisionLog::new(repo, &self.config.source_path))
    }

    /// Builds run settings from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured offset is invalid.
    pub fn run_settings(&self, dry_run: bool) -> Result<RunSettings> {
        let mut settings = RunSettings::from_config(&self.config)?;
        settings.dry_run = dry_run;
        Ok(settings)
    }
}
