//! Console progress for reconciliation runs

use reconcile::{ApplyResult, Phase, ProgressCallback};
use snapshot::Release;

use crate::ui;

/// Prints each phase's release list and every release's outcome
pub struct ConsoleProgress {
    quiet: bool,
}

impl ConsoleProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

/// Heading announcing what a phase is about to do
pub fn phase_title(phase: Phase) -> &'static str {
    match phase {
        Phase::Purge => "Existing Helm Releases to purge (prior to reinstall):",
        Phase::Install => "Helm Releases to install:",
        Phase::Upgrade => "Existing Helm Releases to update:",
    }
}

/// One line describing how a release fared
pub fn describe(phase: Phase, release: &Release, result: &ApplyResult) -> String {
    let name = &release.name;
    match result {
        ApplyResult::Installed { status } => {
            format!("{name} helm install response status: {status}")
        }
        ApplyResult::Upgraded { status } => {
            format!("{name} helm upgrade response status: {status}")
        }
        ApplyResult::Purged => format!("{name} purged"),
        ApplyResult::Skipped { reason } => format!("{name} skipped ({reason})"),
        ApplyResult::Failed { error } => match phase {
            Phase::Purge => format!("purge of Release: {name} failed: {error}"),
            Phase::Install => format!("loading of Release: {name} failed: {error}"),
            Phase::Upgrade => format!("upgrade of Release: {name} failed: {error}"),
        },
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_phase_start(&mut self, phase: Phase, releases: &[Release]) {
        if self.quiet {
            return;
        }
        ui::release_list(phase_title(phase), releases.iter().map(|r| r.name.as_str()));
        println!();
    }

    fn on_release_start(&mut self, phase: Phase, release: &Release) {
        log::debug!("{phase}: {}", release.name);
    }

    fn on_release_complete(&mut self, phase: Phase, release: &Release, result: &ApplyResult) {
        let line = describe(phase, release, result);
        match result {
            ApplyResult::Failed { .. } => ui::error(&line),
            ApplyResult::Skipped { .. } if !self.quiet => ui::dim(&line),
            ApplyResult::Skipped { .. } => {}
            _ if !self.quiet => ui::success(&line),
            _ => {}
        }
    }

    fn on_phase_complete(&mut self, phase: Phase) {
        log::debug!("{phase} phase complete");
    }
}
