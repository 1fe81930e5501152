//! Snapshot artifact paths
//!
//! Every command works on one pair of files derived from `--file-prefix`:
//! the snapshot text `<prefix>.txt` and its archive `<prefix>.tar.gz`. The
//! prefix may contain `~` and environment variables.

use std::path::{Path, PathBuf};

/// Prefix used when none is given
pub const DEFAULT_PREFIX: &str = "helm-releases";

/// Extension of the snapshot text file
pub const TEXT_EXTENSION: &str = ".txt";

/// Extension of the snapshot archive
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// The text and archive paths for one file prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub text: PathBuf,
    pub archive: PathBuf,
}

impl SnapshotPaths {
    pub fn from_prefix(prefix: &str) -> Self {
        let base = expand(prefix);
        Self {
            text: with_suffix(&base, TEXT_EXTENSION),
            archive: with_suffix(&base, ARCHIVE_EXTENSION),
        }
    }
}

/// Expand `~` and environment variables in a path
///
/// Unknown variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

// ============================================================================
// Tests
// ============================================================================
