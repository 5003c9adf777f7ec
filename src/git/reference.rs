//! Reference name validation and resolution.

use git2::{Commit, Oid, Reference, Repository};

use crate::error::DiffError;

/// Check that a user-supplied reference is well formed before it reaches git.
///
/// Accepts object ids (4 to 40 hex digits), full reference names, and short
/// branch or tag names, each optionally followed by `~N` / `^N` ancestry
/// suffixes. Names beginning with `-` are rejected so they can never be read
/// as command-line options.
pub fn validate_reference(reference: &str) -> Result<(), DiffError> {
    let malformed = || DiffError::MalformedReference(reference.to_string());

    if reference.is_empty() || reference.starts_with('-') {
        return Err(malformed());
    }

    let base = strip_ancestry_suffix(reference);
    if base.is_empty() {
        return Err(malformed());
    }

    if is_object_id(base)
        || Reference::is_valid_name(base)
        || Reference::is_valid_name(&format!("refs/heads/{base}"))
    {
        Ok(())
    } else {
        Err(malformed())
    }
}

/// Resolve a validated reference to the commit it points at.
pub fn resolve_commit<'r>(repo: &'r Repository, reference: &str) -> Result<Commit<'r>, DiffError> {
    validate_reference(reference)?;

    let not_found = |e: git2::Error| DiffError::ReferenceNotFound {
        reference: reference.to_string(),
        reason: e.message().to_string(),
    };

    // Full object ids skip revparse
    if reference.len() == 40
        && let Ok(oid) = Oid::from_str(reference)
        && let Ok(commit) = repo.find_commit(oid)
    {
        return Ok(commit);
    }

    repo.revparse_single(reference)
        .map_err(not_found)?
        .peel_to_commit()
        .map_err(not_found)
}

fn is_object_id(s: &str) -> bool {
    (4..=40).contains(&s.len()) && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn strip_ancestry_suffix(reference: &str) -> &str {
    match reference.find(['~', '^']) {
        Some(idx)
            if reference[idx..]
                .chars()
                .all(|c| c == '~' || c == '^' || c.is_ascii_digit()) =>
        {
            &reference[..idx]
        }
        _ => reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_reference_forms() {
        for reference in [
            "HEAD",
            "main",
            "feature-branch",
            "origin/main",
            "refs/heads/main",
            "refs/tags/v1.0.0",
            "v1.0.0",
            "HEAD~1",
            "main^",
            "HEAD~2^2",
            "abc1234",
            "0123456789abcdef0123456789abcdef01234567",
        ] {
            assert!(
                validate_reference(reference).is_ok(),
                "expected '{}' to be accepted",
                reference
            );
        }
    }

    #[test]
    fn test_rejects_malformed_references() {
        for reference in [
            "",
            "../../etc",
            "-p",
            "--output=/tmp/x",
            "feature..branch",
            "bad name",
            "trailing.lock",
            "with:colon",
            "~1",
            "star*",
        ] {
            assert!(
                matches!(validate_reference(reference), Err(DiffError::MalformedReference(_))),
                "expected '{}' to be rejected",
                reference
            );
        }
    }

    #[test]
    fn test_strip_ancestry_suffix_only_strips_revision_suffixes() {
        assert_eq!(strip_ancestry_suffix("HEAD~3"), "HEAD");
        assert_eq!(strip_ancestry_suffix("main^^"), "main");
        assert_eq!(strip_ancestry_suffix("release-2"), "release-2");
        assert_eq!(strip_ancestry_suffix("a~b"), "a~b");
    }

    #[test]
    fn test_resolve_commit_reports_missing_reference() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let head = repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();

        assert_eq!(resolve_commit(&repo, "HEAD").unwrap().id(), head);
        assert_eq!(resolve_commit(&repo, &head.to_string()).unwrap().id(), head);

        let err = resolve_commit(&repo, "nonexistent-ref").unwrap_err();
        assert!(matches!(err, DiffError::ReferenceNotFound { .. }));
        assert!(err.to_string().contains("nonexistent-ref"));
    }
}
