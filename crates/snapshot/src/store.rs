//! Snapshot store: a sequence of encoded releases in one text artifact

use crate::codec;
use crate::error::{Error, Result};
use crate::release::Release;
use std::fs;
use std::path::Path;

/// Separator between encoded releases
pub const SEPARATOR: char = ',';

/// Decode every release in a snapshot text, preserving order.
///
/// All-or-nothing: the first segment that fails to decode fails the whole
/// snapshot, so a release can never silently drop out of the desired set.
pub fn parse(text: &str) -> Result<Vec<Release>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyInput);
    }

    text.split(SEPARATOR)
        .enumerate()
        .map(|(index, segment)| {
            codec::decode(segment).map_err(|e| match e {
                Error::Format { message } => Error::Format {
                    message: format!("segment {index}: {message}"),
                },
                other => other,
            })
        })
        .collect()
}

/// Encode releases into snapshot text (no trailing separator, no whitespace)
pub fn render(releases: &[Release]) -> Result<String> {
    let encoded = releases
        .iter()
        .map(codec::encode)
        .collect::<Result<Vec<_>>>()?;
    Ok(encoded.join(&SEPARATOR.to_string()))
}

/// Load releases from a snapshot file
pub fn load(path: &Path) -> Result<Vec<Release>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let releases = parse(&text)?;
    log::debug!("Loaded {} releases from {}", releases.len(), path.display());
    Ok(releases)
}

/// Write releases to a snapshot file
pub fn save(path: &Path, releases: &[Release]) -> Result<()> {
    let text = render(releases)?;
    fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Saved {} releases to {}", releases.len(), path.display());
    Ok(())
}
