//! Show command - print the releases stored in the snapshot archive

use anyhow::Result;
use snapshot::Release;

use crate::Context;
use crate::commands::read_snapshot;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    log::info!("helm-bulk show called");
    let releases = read_snapshot(&ctx.config.paths)?;

    ui::header(&format!(
        "{} loaded from file:",
        ui::count(releases.len(), "Release")
    ));
    for release in &releases {
        print_release(release);
    }
    Ok(())
}

fn print_release(release: &Release) {
    ui::section(&release.name);
    ui::kv("namespace", &release.namespace);
    ui::kv("chart", &chart_label(release));
    ui::kv("status", &release.status.to_string());
    ui::kv("revision", &release.version.to_string());
    ui::block("values", &values_label(release));
}

fn chart_label(release: &Release) -> String {
    match release.chart.reference() {
        Some(reference) => reference.to_string(),
        None if release.chart.is_empty() => "(none)".to_string(),
        None => format!(
            "(embedded chart, {} bytes)",
            release.chart.as_bytes().len()
        ),
    }
}

fn values_label(release: &Release) -> String {
    if release.config.is_empty() {
        return "(none)".to_string();
    }
    match release.config.values() {
        Ok(values) if values.trim().is_empty() => "(none)".to_string(),
        Ok(values) => values,
        Err(e) => format!("(unreadable: {e})"),
    }
}
