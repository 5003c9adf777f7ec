//! Diff computation by spawning the `git` CLI.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::DiffError;

use super::DiffProvider;
use super::reference::validate_reference;

/// Flags that pin the output format regardless of the user's git config.
const DIFF_FORMAT_ARGS: &[&str] = &[
    "--no-color",
    "--no-ext-diff",
    "--no-textconv",
    "--no-relative",
    "--no-renames",
    "--src-prefix=a/",
    "--dst-prefix=b/",
];

/// stderr fragments git prints when a revision cannot be resolved.
const UNKNOWN_REVISION_MARKERS: &[&str] = &[
    "unknown revision",
    "bad revision",
    "ambiguous argument",
    "invalid object name",
];

/// Runs `git diff <source> <destination>` in a working directory.
#[derive(Debug, Clone)]
pub struct GitCliDiff {
    workdir: PathBuf,
}

impl GitCliDiff {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl DiffProvider for GitCliDiff {
    fn diff(&self, source: &str, destination: Option<&str>) -> Result<String, DiffError> {
        validate_reference(source)?;
        if let Some(dest) = destination {
            validate_reference(dest)?;
        }
        check_git_installed()?;

        // HEAD is passed explicitly so git never falls back to the working tree.
        let destination = destination.unwrap_or("HEAD");
        debug!(source, destination, workdir = %self.workdir.display(), "running git diff");

        let mut cmd = Command::new("git");
        cmd.current_dir(&self.workdir)
            .arg("diff")
            .args(DIFF_FORMAT_ARGS)
            .arg(source)
            .arg(destination)
            .arg("--");

        run_git_diff(&mut cmd, source, destination)
    }
}

/// Check that a `git` executable is on PATH.
pub fn check_git_installed() -> Result<(), DiffError> {
    which::which("git").map(|_| ()).map_err(|_| DiffError::GitNotInstalled)
}

/// Execute the prepared command and categorize the outcome.
fn run_git_diff(cmd: &mut Command, source: &str, destination: &str) -> Result<String, DiffError> {
    let output = cmd.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DiffError::GitNotInstalled
        } else {
            DiffError::SpawnFailed(e)
        }
    })?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).to_string());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if let Some(reference) = unresolved_reference(&stderr, source, destination) {
        return Err(DiffError::ReferenceNotFound {
            reference: reference.to_string(),
            reason: stderr,
        });
    }

    Err(DiffError::NonZeroExit {
        code: output.status.code().unwrap_or(-1),
        stderr,
    })
}

/// Pick out which reference git failed to resolve, if that was the failure.
fn unresolved_reference<'a>(stderr: &str, source: &'a str, destination: &'a str) -> Option<&'a str> {
    let lower = stderr.to_lowercase();
    if !UNKNOWN_REVISION_MARKERS.iter().any(|m| lower.contains(m)) {
        return None;
    }

    if stderr.contains(&format!("'{source}'")) {
        Some(source)
    } else if stderr.contains(&format!("'{destination}'")) {
        Some(destination)
    } else {
        Some(source)
    }
}
