//! Diff computation by reading repository objects through git2.

use std::path::{Path, PathBuf};

use git2::{Diff, DiffFormat, Repository};
use tracing::{debug, warn};

use crate::error::DiffError;

use super::DiffProvider;
use super::reference::{resolve_commit, validate_reference};

/// Diffs two commit trees in the repository enclosing a working directory.
#[derive(Debug, Clone)]
pub struct RepositoryDiff {
    workdir: PathBuf,
}

impl RepositoryDiff {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl DiffProvider for RepositoryDiff {
    fn diff(&self, source: &str, destination: Option<&str>) -> Result<String, DiffError> {
        validate_reference(source)?;
        if let Some(dest) = destination {
            validate_reference(dest)?;
        }

        // discover() walks up from workdir to the enclosing .git
        let repo = Repository::discover(&self.workdir).map_err(DiffError::OpenRepository)?;
        diff_commits(&repo, source, destination)
    }
}

/// Compute the patch text from `source` to `destination` in an open repository.
///
/// A missing destination means the commit HEAD currently points at.
pub fn diff_commits(
    repo: &Repository,
    source: &str,
    destination: Option<&str>,
) -> Result<String, DiffError> {
    let destination = destination.unwrap_or("HEAD");

    let source_commit = resolve_commit(repo, source)?;
    let destination_commit = resolve_commit(repo, destination)?;
    debug!(
        source = %source_commit.id(),
        destination = %destination_commit.id(),
        "diffing commit trees"
    );

    let source_tree = source_commit.tree().map_err(DiffError::Computation)?;
    let destination_tree = destination_commit.tree().map_err(DiffError::Computation)?;

    let diff = repo
        .diff_tree_to_tree(Some(&source_tree), Some(&destination_tree), None)
        .map_err(DiffError::Computation)?;

    render_patch(&diff)
}

/// Render a diff as unified patch text, the way `git diff` prints it.
fn render_patch(diff: &Diff<'_>) -> Result<String, DiffError> {
    let mut text = String::new();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        match std::str::from_utf8(line.content()) {
            Ok(content) => text.push_str(content),
            Err(_) => {
                warn!("Non-UTF-8 diff line, decoding lossily");
                text.push_str(&String::from_utf8_lossy(line.content()));
            }
        }
        true
    })
    .map_err(DiffError::Computation)?;

    Ok(text)
}
