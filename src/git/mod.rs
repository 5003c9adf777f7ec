//! Diff providers: the `git` CLI and direct repository reads via git2.

pub mod cli;
pub mod reference;
pub mod repository;

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::DiffError;

pub use cli::{GitCliDiff, check_git_installed};
pub use reference::{resolve_commit, validate_reference};
pub use repository::{RepositoryDiff, diff_commits};

/// Produces unified diff text between two references.
///
/// With no destination, both implementations compare `source` against the
/// commit HEAD points at. Old side is `source`, new side is `destination`.
pub trait DiffProvider {
    fn diff(&self, source: &str, destination: Option<&str>) -> Result<String, DiffError>;
}

/// Which diff implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffStrategy {
    /// Spawn `git diff`.
    #[default]
    Cli,
    /// Read commit trees through git2.
    Repository,
}

impl DiffStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStrategy::Cli => "cli",
            DiffStrategy::Repository => "repository",
        }
    }

    /// Build the provider for this strategy, rooted at `workdir`.
    pub fn provider(self, workdir: &Path) -> Box<dyn DiffProvider> {
        match self {
            DiffStrategy::Cli => Box::new(GitCliDiff::new(workdir)),
            DiffStrategy::Repository => Box::new(RepositoryDiff::new(workdir)),
        }
    }
}

impl fmt::Display for DiffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cli" | "git" => Ok(DiffStrategy::Cli),
            "repository" | "repo" | "git2" => Ok(DiffStrategy::Repository),
            other => Err(format!(
                "unknown diff strategy '{other}' (expected 'cli' or 'repository')"
            )),
        }
    }
}

/// Collect the file paths touched by a unified diff.
///
/// Reads the `diff --git a/<old> b/<new>` headers and keeps both sides, so a
/// rename contributes its old and new path.
pub fn changed_paths(diff_text: &str) -> BTreeSet<String> {
    diff_text
        .lines()
        .filter_map(|line| line.strip_prefix("diff --git "))
        .flat_map(parse_header_paths)
        .collect()
}

fn parse_header_paths(header: &str) -> Vec<String> {
    let Some((old, new)) = split_header(header) else {
        return Vec::new();
    };
    let (Some(old), Some(new)) = (old.strip_prefix("a/"), new.strip_prefix("b/")) else {
        return Vec::new();
    };

    if old == new {
        vec![old.to_string()]
    } else {
        vec![old.to_string(), new.to_string()]
    }
}

/// Split a header into its two (still prefixed) sides, decoding quoted ones.
///
/// Git quotes a path that contains `"`, `\`, control or non-ASCII bytes, so
/// an unquoted side never contains `"`.
fn split_header(header: &str) -> Option<(String, String)> {
    if header.starts_with('"') {
        let (old, rest) = take_quoted(header)?;
        let rest = rest.strip_prefix(' ')?;
        let new = if rest.starts_with('"') {
            take_quoted(rest)?.0
        } else {
            rest.to_string()
        };
        return Some((old, new));
    }

    if let Some(i) = header.find(" \"") {
        let (new, _) = take_quoted(&header[i + 1..])?;
        return Some((header[..i].to_string(), new));
    }

    // Prefer the split where both sides agree, which handles spaces in names.
    let rest = header.strip_prefix("a/")?;
    let splits: Vec<usize> = rest.match_indices(" b/").map(|(i, _)| i).collect();
    let i = splits
        .iter()
        .copied()
        .find(|&i| rest[..i] == rest[i + 3..])
        .or_else(|| splits.last().copied())?;

    Some((format!("a/{}", &rest[..i]), format!("b/{}", &rest[i + 3..])))
}

/// Decode a C-style quoted path at the start of `s`, returning it and the
/// text after the closing quote. Octal escapes are raw bytes of a UTF-8 name.
fn take_quoted(s: &str) -> Option<(String, &str)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }

    let mut out = Vec::new();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Some((String::from_utf8_lossy(&out).into_owned(), &s[i + 1..])),
            b'\\' => {
                let escape = *bytes.get(i + 1)?;
                i += 2;
                match escape {
                    b'0'..=b'7' => {
                        let digits = bytes.get(i - 1..i + 2)?;
                        let value = digits.iter().try_fold(0u16, |acc, d| match d {
                            b'0'..=b'7' => Some(acc * 8 + u16::from(d - b'0')),
                            _ => None,
                        })?;
                        out.push(u8::try_from(value).ok()?);
                        i += 2;
                    }
                    b'a' => out.push(0x07),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'v' => out.push(0x0b),
                    other => out.push(other),
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_strategy_parsing() {
        assert_eq!("cli".parse(), Ok(DiffStrategy::Cli));
        assert_eq!("Repository".parse(), Ok(DiffStrategy::Repository));
        assert_eq!("git2".parse(), Ok(DiffStrategy::Repository));
        assert!("svn".parse::<DiffStrategy>().is_err());
    }

    #[test]
    fn test_changed_paths_from_headers() {
        let diff = "\
diff --git a/src/lib.rs b/src/lib.rs
index 1111111..2222222 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1 +1 @@
-old
+new
diff --git a/README.md b/README.md
new file mode 100644
--- /dev/null
+++ b/README.md
@@ -0,0 +1 @@
+hello
";
        let paths: Vec<String> = changed_paths(diff).into_iter().collect();
        assert_eq!(paths, vec!["README.md".to_string(), "src/lib.rs".to_string()]);
    }

    #[test]
    fn test_changed_paths_with_spaces_and_renames() {
        let diff = "diff --git a/my file.txt b/my file.txt\n\
                    diff --git a/old.rs b/new.rs\n";
        let paths = changed_paths(diff);
        assert!(paths.contains("my file.txt"));
        assert!(paths.contains("old.rs"));
        assert!(paths.contains("new.rs"));
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn test_changed_paths_decodes_quoted_names() {
        let diff = r#"diff --git "a/caf\303\251.txt" "b/caf\303\251.txt"
new file mode 100644
diff --git "a/tab\tname.txt" "b/tab\tname.txt"
diff --git "a/say \"hi\".txt" "b/back\\slash.txt"
"#;
        let paths: Vec<String> = changed_paths(diff).into_iter().collect();
        assert_eq!(
            paths,
            vec![
                "back\\slash.txt".to_string(),
                "café.txt".to_string(),
                "say \"hi\".txt".to_string(),
                "tab\tname.txt".to_string(),
            ]
        );
    }

    #[test]
    fn test_changed_paths_with_one_quoted_side() {
        let diff = "diff --git a/plain.txt \"b/caf\\303\\251.txt\"\n\
                    diff --git \"a/caf\\303\\251.txt\" b/plain.txt\n";
        let paths = changed_paths(diff);
        assert!(paths.contains("plain.txt"));
        assert!(paths.contains("café.txt"));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_take_quoted_rejects_unterminated() {
        assert!(take_quoted("\"a/never closed").is_none());
        assert!(take_quoted("\"a/bad\\9\"").map(|(p, _)| p) == Some("a/bad9".to_string()));
    }

    #[test]
    fn test_changed_paths_ignores_body_lines() {
        let diff = "+diff --git a/fake b/fake\n context diff --git a/x b/x\n";
        assert!(changed_paths(diff).is_empty());
    }
}
