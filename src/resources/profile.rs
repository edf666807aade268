//! Shell profile editing: the PATH export line and its removal.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use super::fs::ensure_parent_dir;
use super::{Resource, ResourceChange, ResourceState};

/// The line appended to the profile so new shells see `bin_dir`.
#[must_use]
pub fn export_line(bin_dir: &Path) -> String {
    format!("export PATH=\"$PATH:{}\"", bin_dir.display())
}

/// A single line that must be present in a shell profile.
#[derive(Debug)]
pub struct ProfileLineResource {
    profile: PathBuf,
    line: String,
}

impl ProfileLineResource {
    /// Create a resource ensuring `line` is present in `profile`.
    #[must_use]
    pub const fn new(profile: PathBuf, line: String) -> Self {
        Self { profile, line }
    }
}

impl Resource for ProfileLineResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.profile.exists() {
            return Ok(ResourceState::Missing);
        }
        let content = std::fs::read(&self.profile)
            .with_context(|| format!("reading {}", self.profile.display()))?;
        let wanted = self.line.as_bytes();
        Ok(
            if content
                .split(|b| *b == b'\n')
                .any(|l| l.trim_ascii() == wanted)
            {
                ResourceState::Correct
            } else {
                ResourceState::Missing
            },
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.profile)?;
        let needs_newline = std::fs::read(&self.profile)
            .is_ok_and(|bytes| bytes.last().is_some_and(|b| *b != b'\n'));
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.profile)
            .with_context(|| format!("opening {}", self.profile.display()))?;
        if needs_newline {
            writeln!(file).with_context(|| format!("writing {}", self.profile.display()))?;
        }
        writeln!(file, "{}", self.line)
            .with_context(|| format!("writing {}", self.profile.display()))?;
        Ok(ResourceChange::Applied)
    }
}

/// Whether `haystack` contains `needle` as a byte substring.
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Remove every line of `content` containing `needle`.
///
/// Works on raw bytes so lines that are not valid UTF-8 pass through
/// untouched. Line order and line endings of the kept lines are preserved.
/// Returns the new content and the number of lines removed.
#[must_use]
pub fn strip_lines(content: &[u8], needle: &str) -> (Vec<u8>, usize) {
    let needle = needle.as_bytes();
    let mut removed = 0;
    let mut kept = Vec::with_capacity(content.len());
    for line in content.split_inclusive(|b| *b == b'\n') {
        if contains_bytes(line, needle) {
            removed += 1;
        } else {
            kept.extend_from_slice(line);
        }
    }
    (kept, removed)
}

/// How a stripped profile was written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Sibling temp file renamed over the profile.
    Replace,
    /// Profile truncated and rewritten in place.
    InPlace,
}

/// Result of [`strip_profile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripResult {
    /// The profile does not exist.
    Missing,
    /// No line matched; the file was not touched.
    Unchanged,
    /// Matching lines were removed.
    Rewritten {
        /// Number of lines removed.
        removed: usize,
        /// How the new content was written.
        strategy: WriteStrategy,
    },
}

/// Remove every line containing `needle` from the profile at `path`.
///
/// A symlinked profile is followed: the file it points to is rewritten and
/// the link is left in place. Writes a sibling temp file and renames it over
/// the profile; when that fails (read-only directory, unwritable sibling)
/// the profile is truncated and rewritten in place instead.
///
/// # Errors
///
/// Returns an error if the profile cannot be read, or neither write
/// strategy succeeds.
pub fn strip_profile(path: &Path, needle: &str) -> Result<StripResult> {
    if !path.exists() {
        return Ok(StripResult::Missing);
    }
    let target =
        std::fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))?;
    let content =
        std::fs::read(&target).with_context(|| format!("reading {}", target.display()))?;
    let (stripped, removed) = strip_lines(&content, needle);
    if removed == 0 {
        return Ok(StripResult::Unchanged);
    }

    let strategy = match replace_via_rename(&target, &stripped) {
        Ok(()) => WriteStrategy::Replace,
        Err(rename_err) => {
            tracing::debug!(
                "rename strategy failed for {}: {rename_err:#}",
                target.display()
            );
            std::fs::write(&target, &stripped)
                .with_context(|| format!("rewriting {} in place", target.display()))?;
            WriteStrategy::InPlace
        }
    };
    Ok(StripResult::Rewritten { removed, strategy })
}

/// Sibling path used for the rename strategy.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "profile".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.soundness-tmp"))
}

fn replace_via_rename(path: &Path, content: &[u8]) -> Result<()> {
    let tmp = temp_sibling(path);
    let result = write_and_rename(&tmp, path, content);
    if result.is_err() && tmp.is_file() {
        std::fs::remove_file(&tmp).ok();
    }
    result
}

fn write_and_rename(tmp: &Path, path: &Path, content: &[u8]) -> Result<()> {
    std::fs::write(tmp, content).with_context(|| format!("writing {}", tmp.display()))?;
    let perms = std::fs::metadata(path)
        .with_context(|| format!("reading permissions of {}", path.display()))?
        .permissions();
    std::fs::set_permissions(tmp, perms)
        .with_context(|| format!("copying permissions to {}", tmp.display()))?;
    std::fs::rename(tmp, path)
        .with_context(|| {
            format!(
                "renaming {} to {}",
                tmp.display(),
                path.display()
            )
        })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const BIN: &str = "/home/u/.soundness/bin";

    fn resource(dir: &Path) -> ProfileLineResource {
        ProfileLineResource::new(dir.join(".bashrc"), export_line(Path::new(BIN)))
    }

    #[test]
    fn export_line_format() {
        assert_eq!(
            export_line(Path::new(BIN)),
            "export PATH=\"$PATH:/home/u/.soundness/bin\""
        );
    }

    #[test]
    fn apply_twice_yields_one_line() {
        let tmp = tempfile::tempdir().unwrap();
        let r = resource(tmp.path());
        assert_eq!(r.ensure().unwrap(), ResourceChange::Applied);
        assert_eq!(r.ensure().unwrap(), ResourceChange::AlreadyCorrect);
        let content = std::fs::read_to_string(tmp.path().join(".bashrc")).unwrap();
        assert_eq!(content.matches("export PATH").count(), 1);
    }

    #[test]
    fn apply_creates_missing_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join(".config/fish/config.fish");
        let r = ProfileLineResource::new(profile.clone(), export_line(Path::new(BIN)));
        r.ensure().unwrap();
        assert!(profile.is_file());
    }

    #[test]
    fn apply_adds_newline_before_unterminated_last_line() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join(".bashrc");
        std::fs::write(&profile, "alias ll='ls -l'").unwrap();
        resource(tmp.path()).ensure().unwrap();
        let content = std::fs::read_to_string(&profile).unwrap();
        assert_eq!(
            content,
            format!("alias ll='ls -l'\n{}\n", export_line(Path::new(BIN)))
        );
    }

    #[test]
    fn strip_lines_preserves_order_and_trailing_newline() {
        let content = b"a\nsoundness one\nb\nexport PATH=soundness\nc\n";
        let (out, removed) = strip_lines(content, "soundness");
        assert_eq!(removed, 2);
        assert_eq!(out, b"a\nb\nc\n");
    }

    #[test]
    fn strip_lines_without_trailing_newline() {
        let (out, removed) = strip_lines(b"a\nb soundness", "soundness");
        assert_eq!(removed, 1);
        assert_eq!(out, b"a\n");
        let (out, removed) = strip_lines(b"soundness\nb", "soundness");
        assert_eq!(removed, 1);
        assert_eq!(out, b"b");
    }

    #[test]
    fn strip_lines_passes_non_utf8_lines_through() {
        let content = b"# caf\xe9\nexport PATH=\"$PATH:/h/.soundness/bin\"\n\xff\xfe\n";
        let (out, removed) = strip_lines(content, "soundness");
        assert_eq!(removed, 1);
        assert_eq!(out, b"# caf\xe9\n\xff\xfe\n");
    }

    #[test]
    fn strip_profile_removes_matching_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join(".zshenv");
        let lines: Vec<String> = (0..10)
            .map(|i| {
                if i % 3 == 0 {
                    format!("export PATH=\"$PATH:/x/.soundness/bin\" # {i}")
                } else {
                    format!("line {i}")
                }
            })
            .collect();
        std::fs::write(&profile, lines.join("\n") + "\n").unwrap();

        let result = strip_profile(&profile, "soundness").unwrap();
        assert_eq!(
            result,
            StripResult::Rewritten {
                removed: 4,
                strategy: WriteStrategy::Replace
            }
        );
        let content = std::fs::read_to_string(&profile).unwrap();
        let kept: Vec<&str> = content.lines().collect();
        assert_eq!(
            kept,
            vec!["line 1", "line 2", "line 4", "line 5", "line 7", "line 8"]
        );
        assert!(!temp_sibling(&profile).exists());
    }

    #[test]
    fn strip_profile_falls_back_to_in_place_write() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join(".profile");
        std::fs::write(&profile, "keep\nsoundness\n").unwrap();
        // A directory squatting on the temp path makes the rename strategy fail.
        let blocker = temp_sibling(&std::fs::canonicalize(&profile).unwrap());
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("occupied"), "x").unwrap();

        let result = strip_profile(&profile, "soundness").unwrap();
        assert_eq!(
            result,
            StripResult::Rewritten {
                removed: 1,
                strategy: WriteStrategy::InPlace
            }
        );
        assert_eq!(std::fs::read_to_string(&profile).unwrap(), "keep\n");
        assert!(blocker.join("occupied").exists());
    }

    #[test]
    fn strip_profile_missing_and_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join(".bashrc");
        assert_eq!(
            strip_profile(&profile, "soundness").unwrap(),
            StripResult::Missing
        );
        std::fs::write(&profile, "nothing here\n").unwrap();
        assert_eq!(
            strip_profile(&profile, "soundness").unwrap(),
            StripResult::Unchanged
        );
    }

    #[test]
    fn strip_profile_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt as _;
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join(".bashrc");
        std::fs::write(&profile, "soundness\nkeep\n").unwrap();
        std::fs::set_permissions(&profile, std::fs::Permissions::from_mode(0o600)).unwrap();
        strip_profile(&profile, "soundness").unwrap();
        let mode = std::fs::metadata(&profile).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn strip_profile_handles_non_utf8_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join(".bashrc");
        std::fs::write(
            &profile,
            b"# caf\xe9\nexport PATH=\"$PATH:/h/.soundness/bin\"\n",
        )
        .unwrap();
        let result = strip_profile(&profile, "soundness").unwrap();
        assert!(matches!(result, StripResult::Rewritten { removed: 1, .. }));
        assert_eq!(std::fs::read(&profile).unwrap(), b"# caf\xe9\n");
    }

    #[test]
    fn strip_profile_follows_symlinked_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("dotfiles-bashrc");
        let link = tmp.path().join(".bashrc");
        std::fs::write(
            &target,
            "alias ll='ls -l'\nexport PATH=\"$PATH:/h/.soundness/bin\"\n",
        )
        .unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let result = strip_profile(&link, "soundness").unwrap();

        assert!(matches!(result, StripResult::Rewritten { removed: 1, .. }));
        assert!(
            std::fs::symlink_metadata(&link)
                .unwrap()
                .file_type()
                .is_symlink()
        );
        assert_eq!(std::fs::read_link(&link).unwrap(), target);
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "alias ll='ls -l'\n"
        );
    }

    #[test]
    fn line_state_reads_non_utf8_profile() {
        let tmp = tempfile::tempdir().unwrap();
        let profile = tmp.path().join(".bashrc");
        std::fs::write(&profile, b"# caf\xe9\n").unwrap();
        let r = resource(tmp.path());
        assert_eq!(r.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(r.ensure().unwrap(), ResourceChange::Applied);
        assert_eq!(r.current_state().unwrap(), ResourceState::Correct);
        let bytes = std::fs::read(&profile).unwrap();
        assert!(bytes.starts_with(b"# caf\xe9\n"));
    }
}
