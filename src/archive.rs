//! Snapshot archive packaging (tar + gzip)
//!
//! The snapshot text travels as a single-entry `.tar.gz`. The text file only
//! exists on disk between packing/unpacking and use.

use anyhow::{Context, Result, bail};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;
use tar::{Archive, Builder};

/// Pack `text` into a gzipped tarball at `archive`, stored under its file name
pub fn pack(text: &Path, archive: &Path) -> Result<()> {
    let name = text
        .file_name()
        .with_context(|| format!("{} has no file name", text.display()))?;

    let out = File::create(archive)
        .with_context(|| format!("Could not create {}", archive.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(out), Compression::default());
    let mut builder = Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);
    builder
        .append_path_with_name(text, name)
        .with_context(|| format!("Could not add {} to archive", text.display()))?;

    let encoder = builder.into_inner().context("Could not finish archive")?;
    let mut writer = encoder.finish().context("Could not finish compression")?;
    io::Write::flush(&mut writer)?;

    log::debug!("Packed {} into {}", text.display(), archive.display());
    Ok(())
}

/// Extract the entry named like `text` from `archive` and write it to `text`
pub fn unpack(archive: &Path, text: &Path) -> Result<()> {
    let name = text
        .file_name()
        .with_context(|| format!("{} has no file name", text.display()))?;

    let file =
        File::open(archive).with_context(|| format!("Could not open {}", archive.display()))?;
    let mut tarball = Archive::new(GzDecoder::new(file));

    for entry in tarball
        .entries()
        .with_context(|| format!("Could not read {}", archive.display()))?
    {
        let mut entry = entry.context("Corrupt archive entry")?;
        let path = entry.path()?.into_owned();

        if path.file_name() == Some(name) {
            let mut out = File::create(text)
                .with_context(|| format!("Could not create {}", text.display()))?;
            io::copy(&mut entry, &mut out)
                .with_context(|| format!("Could not extract {}", text.display()))?;
            log::debug!("Unpacked {} from {}", text.display(), archive.display());
            return Ok(());
        }
    }

    bail!(
        "{} does not contain {}",
        archive.display(),
        Path::new(name).display()
    )
}

/// Remove the intermediate text file, warning if it cannot be removed
pub fn discard(text: &Path) {
    if let Err(e) = fs::remove_file(text)
        && e.kind() != io::ErrorKind::NotFound
    {
        log::warn!("Could not remove {}: {e}", text.display());
    }
}

// ============================================================================
// Tests
// ============================================================================
