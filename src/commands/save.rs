//! Save command - snapshot every deployed release into the archive

use anyhow::{Context as _, Result};
use reconcile::{Backend, order};
use snapshot::store;

use crate::Context;
use crate::archive;
use crate::ui;

pub fn run<B: Backend + ?Sized>(ctx: &Context, backend: &B) -> Result<()> {
    log::info!("helm-bulk save called");
    let paths = &ctx.config.paths;

    backend.health_check().context("helm is not available")?;
    let releases = backend
        .list_deployed()
        .context("Could not list deployed Helm Releases")?;
    let releases = order::resolve(&ctx.config.order_preference, releases);

    if releases.is_empty() {
        ui::warn("No deployed Helm Releases found");
    }

    store::save(&paths.text, &releases)
        .with_context(|| format!("Could not write {}", paths.text.display()))?;
    let packed = archive::pack(&paths.text, &paths.archive);
    archive::discard(&paths.text);
    packed?;

    log::info!("Wrote {} Helm Releases to file", releases.len());
    if !ctx.quiet {
        ui::success(&format!(
            "Wrote {} to {}",
            ui::count(releases.len(), "Helm Release"),
            paths.archive.display()
        ));
    }
    Ok(())
}
