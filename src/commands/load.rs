//! Load command - restore the snapshot's releases into the cluster

use anyhow::{Context as _, Result};
use reconcile::{Backend, ExecuteSummary, Mode, Plan, Settings, converge, order};

use crate::Context;
use crate::commands::read_snapshot;
use crate::progress::ConsoleProgress;
use crate::ui;

pub fn run<B: Backend + ?Sized>(
    ctx: &Context,
    backend: &B,
    mode: Mode,
    dry_run: bool,
) -> Result<ExecuteSummary> {
    log::info!("helm-bulk load called ({mode})");
    if dry_run {
        ui::warn("*** operating in dry-run mode ***");
    }

    let releases = read_snapshot(&ctx.config.paths)?;
    if !ctx.quiet {
        ui::release_list(
            "Helm Releases present in File:",
            releases.iter().map(|r| r.name.as_str()),
        );
    }
    let desired = order::resolve(&ctx.config.order_preference, releases);

    backend.health_check().context("helm is not available")?;

    let settings = Settings::new(mode, dry_run);
    let mut progress = ConsoleProgress::new(ctx.quiet);
    let (plan, summary) = converge(desired, backend, settings, &mut progress)
        .context("Could not reconcile Helm Releases")?;

    report(ctx, settings, &plan, &summary);
    Ok(summary)
}

fn report(ctx: &Context, settings: Settings, plan: &Plan, summary: &ExecuteSummary) {
    if plan.to_install.is_empty() {
        ui::info("No Releases found to install, maybe they already exist in the Cluster?");
    }
    if settings.mode.permits_upgrade()
        && plan.to_upgrade.is_empty()
        && plan.to_purge.is_empty()
    {
        ui::info("No Releases found to delete or upgrade");
    }

    for outcome in summary.failures() {
        log::warn!("{} of {} failed", outcome.phase, outcome.release);
    }

    if ctx.quiet && summary.is_success() {
        return;
    }

    println!();
    let line = format!(
        "{} installed, {} upgraded, {} purged, {} skipped, {} failed",
        summary.installed, summary.upgraded, summary.purged, summary.skipped, summary.failed
    );
    if summary.is_success() {
        ui::success(&line);
    } else {
        ui::warn(&line);
    }
}
