//! Execution engine - applies a plan to the backend phase by phase

use crate::backend::{Backend, DeleteOptions, InstallOptions, UpgradeOptions};
use crate::context::ProgressCallback;
use crate::error::Result;
use crate::planner::{Plan, Reconciler};
use crate::types::{ApplyResult, ExecuteSummary, Phase, Settings};
use snapshot::Release;

const DRY_RUN: &str = "dry run";
const UPGRADE_DISABLED: &str = "upgrade not enabled";

/// Applies releases to a backend under one set of [`Settings`]
///
/// A failing backend call is recorded as [`ApplyResult::Failed`] for that
/// release and execution moves on; nothing in a phase aborts the batch.
pub struct Executor<'a, B: Backend + ?Sized> {
    backend: &'a B,
    settings: Settings,
}

impl<'a, B: Backend + ?Sized> Executor<'a, B> {
    pub fn new(backend: &'a B, settings: Settings) -> Self {
        Self { backend, settings }
    }

    /// Run the purge phase over `releases`
    pub fn purge<P: ProgressCallback + ?Sized>(
        &self,
        releases: &[Release],
        progress: &mut P,
    ) -> ExecuteSummary {
        let mut summary = ExecuteSummary::default();
        self.run_phase(Phase::Purge, releases, progress, &mut summary);
        summary
    }

    /// Run the install then upgrade phases of `plan`
    ///
    /// The purge set is not touched here; it was handled while planning.
    pub fn apply<P: ProgressCallback + ?Sized>(
        &self,
        plan: &Plan,
        progress: &mut P,
    ) -> ExecuteSummary {
        let mut summary = ExecuteSummary::default();
        self.run_phase(Phase::Install, &plan.to_install, progress, &mut summary);
        self.run_phase(Phase::Upgrade, &plan.to_upgrade, progress, &mut summary);
        summary
    }

    fn run_phase<P: ProgressCallback + ?Sized>(
        &self,
        phase: Phase,
        releases: &[Release],
        progress: &mut P,
        summary: &mut ExecuteSummary,
    ) {
        if releases.is_empty() {
            return;
        }

        progress.on_phase_start(phase, releases);
        for release in releases {
            progress.on_release_start(phase, release);
            let result = self.apply_release(phase, release);
            progress.on_release_complete(phase, release, &result);
            summary.add_result(phase, &release.name, result);
        }
        progress.on_phase_complete(phase);
    }

    /// Apply a single release
    fn apply_release(&self, phase: Phase, release: &Release) -> ApplyResult {
        if phase == Phase::Upgrade && !self.settings.mode.permits_upgrade() {
            return ApplyResult::Skipped {
                reason: UPGRADE_DISABLED.into(),
            };
        }
        if self.settings.dry_run {
            return ApplyResult::Skipped {
                reason: DRY_RUN.into(),
            };
        }

        let outcome = match phase {
            Phase::Purge => self
                .backend
                .delete(&release.name, &DeleteOptions::purge(release))
                .map(|()| ApplyResult::Purged),
            Phase::Install => self
                .backend
                .install(
                    &release.chart,
                    &release.namespace,
                    &InstallOptions::restore(release),
                )
                .map(|status| ApplyResult::Installed { status }),
            Phase::Upgrade => self
                .backend
                .upgrade(
                    &release.name,
                    &release.chart,
                    &UpgradeOptions::restore(release),
                )
                .map(|status| ApplyResult::Upgraded { status }),
        };

        outcome.unwrap_or_else(|e| {
            log::warn!("Failed to {phase} release {}: {e}", release.name);
            ApplyResult::Failed {
                error: e.to_string(),
            }
        })
    }
}

/// Reconcile `desired` against `backend`: plan, purge if the mode asks for
/// it, then install and upgrade.
///
/// Returns the final plan together with the summary of every phase.
///
/// # Errors
/// Fails only for an empty `desired` set or a failing live query. Per-release
/// backend failures are reported in the summary.
pub fn converge<B, P>(
    desired: Vec<Release>,
    backend: &B,
    settings: Settings,
    progress: &mut P,
) -> Result<(Plan, ExecuteSummary)>
where
    B: Backend + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let executor = Executor::new(backend, settings);
    let mut summary = ExecuteSummary::default();

    let plan = Reconciler::new(settings).plan(
        desired,
        || backend.list_deployed(),
        |releases| summary.merge(executor.purge(releases, progress)),
    )?;

    summary.merge(executor.apply(&plan, progress));
    Ok((plan, summary))
}
