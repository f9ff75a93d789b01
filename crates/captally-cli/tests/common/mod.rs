// Rust guideline compliant 2026-10-17

//! Throwaway Git repositories for integration tests.

#![allow(dead_code)]

use git2::{Commit, Oid, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// 2024-01-01T04:00:00Z, which is 2024-01-01 in UTC+8.
pub const JAN_1_2024: i64 = 1_704_081_600_000;
/// 2023-01-01T04:00:00Z, which is 2023-01-01 in UTC+8.
pub const JAN_1_2023: i64 = 1_672_545_600_000;

/// Creates an empty repository in a temp dir.
pub fn init_repo() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let repo = Repository::init(temp_dir.path()).expect("Failed to init repo");
    (temp_dir, repo)
}

/// Writes (or deletes, with `None`) files and commits the whole index.
///
/// Parents default to the current `HEAD`; `update_head` controls whether the
/// new commit becomes `HEAD`. Commit times are explicit so history order is
/// deterministic.
pub fn commit_files(
    repo: &Repository,
    files: &[(&str, Option<&str>)],
    parents: Option<&[Oid]>,
    update_head: bool,
    secs: i64,
) -> Oid {
    let workdir = repo.workdir().expect("non-bare repo").to_path_buf();
    let mut index = repo.index().expect("Failed to open index");

    for (path, content) in files {
        let full = workdir.join(path);
        match content {
            Some(content) => {
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent).expect("Failed to create dir");
                }
                fs::write(&full, content).expect("Failed to write file");
                index.add_path(Path::new(path)).expect("Failed to stage file");
            }
            None => {
                let _ = fs::remove_file(&full);
                index.remove_path(Path::new(path)).expect("Failed to unstage file");
            }
        }
    }
    index.write().expect("Failed to write index");

    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let signature = Signature::new("tester", "tester@example.com", &Time::new(secs, 0))
        .expect("Failed to create signature");

    let parent_ids: Vec<Oid> = match parents {
        Some(ids) => ids.to_vec(),
        None => match repo.head() {
            Ok(head) => vec![head.peel_to_commit().expect("HEAD commit").id()],
            Err(_) => Vec::new(),
        },
    };
    let parent_commits: Vec<Commit<'_>> = parent_ids
        .iter()
        .map(|id| repo.find_commit(*id).expect("Failed to find parent"))
        .collect();
    let parent_refs: Vec<&Commit<'_>> = parent_commits.iter().collect();

    repo.commit(
        update_head.then_some("HEAD"),
        &signature,
        &signature,
        "test commit",
        &tree,
        &parent_refs,
    )
    .expect("Failed to commit")
}

/// Commits new content for one file on top of `HEAD`.
pub fn commit_source(repo: &Repository, path: &str, content: Option<&str>, secs: i64) -> Oid {
    commit_files(repo, &[(path, content)], None, true, secs)
}

/// Renders entries as a pretty JSON snapshot.
pub fn snapshot(entries: serde_json::Value) -> String {
    serde_json::to_string_pretty(&entries).expect("Failed to render snapshot")
}
