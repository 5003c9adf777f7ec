//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file into the working tree without staging it.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(path, content).expect("Failed to write test file");
    }

    /// Write the given files, delete the given paths, and commit on HEAD.
    pub fn commit_changes(&self, files: &[(&str, &str)], removed: &[&str], message: &str) -> Oid {
        let mut index = self.repo.index().expect("Failed to get index");

        for (name, content) in files {
            self.write(name, content);
            index.add_path(Path::new(name)).expect("Failed to add file");
        }
        for name in removed {
            std::fs::remove_file(self.dir.path().join(name)).expect("Failed to remove file");
            index.remove_path(Path::new(name)).expect("Failed to remove from index");
        }

        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let sig = self.signature();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Commit a set of files on HEAD.
    pub fn commit_files(&self, files: &[(&str, &str)], message: &str) -> Oid {
        self.commit_changes(files, &[], message)
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create a branch pointing to the given OID.
    pub fn branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo.branch(name, &commit, false).expect("Failed to create branch");
    }
}

/// Whether a `git` executable is available for tests that spawn it.
pub fn git_on_path() -> bool {
    let found = which::which("git").is_ok();
    if !found {
        eprintln!("git not found on PATH, skipping");
    }
    found
}

/// Sample repository: `feature-branch` sits at the first commit, HEAD two
/// commits later with one file modified, one added and one deleted.
pub struct FeatureScenario {
    pub repo: TestRepo,
    pub base: Oid,
    pub head: Oid,
}

pub fn feature_scenario() -> FeatureScenario {
    let repo = TestRepo::new();
    let base = repo.commit_files(
        &[
            ("src/lib.rs", "pub fn answer() -> u32 {\n    41\n}\n"),
            ("README.md", "# demo\n"),
            ("old.txt", "remove me\n"),
        ],
        "initial",
    );
    repo.branch("feature-branch", base);

    repo.commit_files(&[("src/lib.rs", "pub fn answer() -> u32 {\n    42\n}\n")], "fix answer");
    let head = repo.commit_changes(&[("docs/guide.md", "guide\n")], &["old.txt"], "docs");

    FeatureScenario { repo, base, head }
}
