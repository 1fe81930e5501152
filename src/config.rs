//! Run configuration
//!
//! Everything a command needs is resolved once in `main` into an
//! [`AppConfig`] and passed down; nothing reads flags or the environment
//! after that.
//!
//! The ordering preference comes from `orderPref.{toml,json,yaml,yml}` in the
//! preference directory (key `order`, a list of release names), or from the
//! `HELM_BULK_ORDER` environment variable (comma-separated), which wins over
//! the file.

use crate::paths::{self, SnapshotPaths};
use crate::ui;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base name of the ordering preference file
pub const ORDER_PREF_FILE: &str = "orderPref";

/// Environment variable overriding the ordering preference file
pub const ENV_ORDER: &str = "HELM_BULK_ORDER";

/// Supported preference file formats, in lookup order
const ORDER_PREF_FORMATS: [(&str, Format); 4] = [
    ("toml", Format::Toml),
    ("json", Format::Json),
    ("yaml", Format::Yaml),
    ("yml", Format::Yaml),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Errors reading the ordering preference
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {format} in {}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

#[derive(Debug, Default, Deserialize)]
struct OrderPreference {
    #[serde(default, alias = "Order")]
    order: Vec<String>,
}

/// Resolved configuration for one invocation
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub paths: SnapshotPaths,
    /// Release names to process first, in this order
    pub order_preference: Vec<String>,
}

impl AppConfig {
    /// Resolve the configuration from the command line values and environment
    ///
    /// A malformed preference is reported and treated as empty.
    pub fn resolve(file_prefix: &str, order_pref_dir: &str) -> Self {
        let env_order = std::env::var(ENV_ORDER).ok();
        let order_preference =
            match load_order_preference(&paths::expand(order_pref_dir), env_order.as_deref()) {
                Ok(order) => order,
                Err(e) => {
                    log::warn!("{e}");
                    ui::warn(&format!("Ignoring ordering preference: {e}"));
                    Vec::new()
                }
            };

        Self {
            paths: SnapshotPaths::from_prefix(file_prefix),
            order_preference,
        }
    }
}

/// Load the ordering preference
///
/// `env_value` is the value of [`ENV_ORDER`], if set; a blank value counts as
/// unset. Without either source the preference is empty.
pub fn load_order_preference(
    dir: &Path,
    env_value: Option<&str>,
) -> Result<Vec<String>, ConfigError> {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        log::debug!("Using ordering preference from {ENV_ORDER}");
        return Ok(parse_name_list(value));
    }

    let Some((path, format)) = find_order_file(dir) else {
        log::debug!("No ordering preference found in {}", dir.display());
        return Ok(Vec::new());
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let order = parse_order_file(&content, format).map_err(|message| ConfigError::Parse {
        path: path.clone(),
        format: format.name(),
        message,
    })?;

    log::debug!(
        "Loaded ordering preference of {} names from {}",
        order.len(),
        path.display()
    );
    Ok(order)
}

fn find_order_file(dir: &Path) -> Option<(PathBuf, Format)> {
    ORDER_PREF_FORMATS.iter().find_map(|(ext, format)| {
        let path = dir.join(format!("{ORDER_PREF_FILE}.{ext}"));
        path.is_file().then_some((path, *format))
    })
}

fn parse_order_file(content: &str, format: Format) -> Result<Vec<String>, String> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let pref: OrderPreference = match format {
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string())?,
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
    };
    Ok(pref.order)
}

/// Split a comma-separated list of names, dropping blanks
fn parse_name_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
