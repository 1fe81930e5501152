//! Core types for reconciliation

use serde::{Deserialize, Serialize};
use snapshot::Status;
use std::fmt;

/// Operating mode of a reconciliation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Install missing releases; leave deployed ones alone
    #[default]
    InstallOnly,
    /// Install missing releases and upgrade deployed ones
    Upgrade,
    /// Purge deployed releases, then reinstall (upgrading any purge survivor)
    Delete,
}

impl Mode {
    /// Whether the executor acts on the upgrade set
    pub fn permits_upgrade(self) -> bool {
        matches!(self, Self::Upgrade | Self::Delete)
    }

    /// Whether a purge pass runs before classification
    pub fn purges(self) -> bool {
        matches!(self, Self::Delete)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InstallOnly => "install-only",
            Self::Upgrade => "upgrade",
            Self::Delete => "delete",
        })
    }
}

/// Settings for one reconciliation run, built once and passed down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    /// Plan everything, call no mutating backend operation
    pub dry_run: bool,
}

impl Settings {
    pub fn new(mode: Mode, dry_run: bool) -> Self {
        Self { mode, dry_run }
    }
}

/// Execution phase, in the order phases run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Purge,
    Install,
    Upgrade,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Purge => "purge",
            Self::Install => "install",
            Self::Upgrade => "upgrade",
        })
    }
}

/// Result of applying one release in one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Release was installed
    Installed { status: Status },
    /// Release was upgraded
    Upgraded { status: Status },
    /// Release was purged
    Purged,
    /// Backend call failed
    Failed { error: String },
    /// Backend was not called
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Installed { .. } | Self::Upgraded { .. } | Self::Purged
        )
    }
}

/// What happened to one release in one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub phase: Phase,
    pub release: String,
    pub result: ApplyResult,
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub installed: usize,
    pub upgraded: usize,
    pub purged: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Per-release outcomes in execution order
    pub outcomes: Vec<Outcome>,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.installed + self.upgraded + self.purged
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of release operations processed
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.result.is_success())
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: Self) {
        self.installed += other.installed;
        self.upgraded += other.upgraded;
        self.purged += other.purged;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.outcomes.extend(other.outcomes);
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, phase: Phase, release: &str, result: ApplyResult) {
        match &result {
            ApplyResult::Installed { .. } => self.installed += 1,
            ApplyResult::Upgraded { .. } => self.upgraded += 1,
            ApplyResult::Purged => self.purged += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
        self.outcomes.push(Outcome {
            phase,
            release: release.to_string(),
            result,
        });
    }
}
