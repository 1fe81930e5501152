//! Release records
//!
//! [`Release`] is the in-memory form used by the rest of the workspace. The
//! private `*Record` types are its binary wire form, field-compatible with the
//! historical Helm release protobuf so that snapshots written by older tools
//! still decode.

use prost::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment status of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Unknown,
    Deployed,
    Deleted,
    Superseded,
    Failed,
    Deleting,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
}

impl Status {
    /// Wire code of this status
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Deployed => 1,
            Self::Deleted => 2,
            Self::Superseded => 3,
            Self::Failed => 4,
            Self::Deleting => 5,
            Self::PendingInstall => 6,
            Self::PendingUpgrade => 7,
            Self::PendingRollback => 8,
        }
    }

    /// Status for a wire code; codes this crate does not know map to `Unknown`
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Deployed,
            2 => Self::Deleted,
            3 => Self::Superseded,
            4 => Self::Failed,
            5 => Self::Deleting,
            6 => Self::PendingInstall,
            7 => Self::PendingUpgrade,
            8 => Self::PendingRollback,
            0 => Self::Unknown,
            other => {
                log::debug!("Unrecognised release status code {other}, treating as unknown");
                Self::Unknown
            }
        }
    }

    pub fn is_deployed(self) -> bool {
        matches!(self, Self::Deployed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "UNKNOWN",
            Self::Deployed => "DEPLOYED",
            Self::Deleted => "DELETED",
            Self::Superseded => "SUPERSEDED",
            Self::Failed => "FAILED",
            Self::Deleting => "DELETING",
            Self::PendingInstall => "PENDING_INSTALL",
            Self::PendingUpgrade => "PENDING_UPGRADE",
            Self::PendingRollback => "PENDING_ROLLBACK",
        };
        f.write_str(label)
    }
}

/// Opaque chart payload
///
/// Snapshots written by older tools carry a full embedded chart message here;
/// snapshots written against the `helm` CLI carry a chart reference string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chart(Vec<u8>);

impl Chart {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Chart identified by a reference such as `bitnami/nginx` or a path
    pub fn from_reference(reference: &str) -> Self {
        Self(reference.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The payload as a printable reference, if it is one
    pub fn reference(&self) -> Option<&str> {
        std::str::from_utf8(&self.0)
            .ok()
            .filter(|s| !s.is_empty() && !s.chars().any(char::is_control))
    }
}

/// Opaque configuration blob (the release's values overlay)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Config(Vec<u8>);

impl Config {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Wrap a raw values document (YAML) in a config record
    pub fn from_values(values: &str) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let record = ConfigRecord {
            raw: values.to_string(),
        };
        Self(record.encode_to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw values document carried by this config
    pub fn values(&self) -> crate::Result<String> {
        let record = ConfigRecord::decode(self.0.as_slice())
            .map_err(|e| crate::Error::format(format!("config record: {e}")))?;
        Ok(record.raw)
    }
}

/// A named deployable unit: chart, values overlay and deployment status
///
/// Reconciliation identifies releases by `name` alone; the derived equality
/// compares every field and is what the codec round-trip guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub namespace: String,
    pub chart: Chart,
    pub config: Config,
    pub status: Status,
    /// Release revision
    pub version: i32,
}

impl Release {
    /// A release with only a name; every other field empty
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            chart: Chart::default(),
            config: Config::default(),
            status: Status::Unknown,
            version: 0,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_chart(mut self, chart: Chart) -> Self {
        self.chart = chart;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Whether `other` refers to the same release (name identity)
    pub fn same_name(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// Wire form
// ============================================================================

#[derive(Clone, PartialEq, Message)]
pub(crate) struct ReleaseRecord {
    #[prost(string, tag = "1")]
    name: String,
    #[prost(message, optional, tag = "2")]
    info: Option<InfoRecord>,
    #[prost(bytes = "vec", tag = "3")]
    chart: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    config: Vec<u8>,
    #[prost(int32, tag = "7")]
    version: i32,
    #[prost(string, tag = "8")]
    namespace: String,
}

#[derive(Clone, PartialEq, Message)]
struct InfoRecord {
    #[prost(message, optional, tag = "1")]
    status: Option<StatusRecord>,
}

#[derive(Clone, PartialEq, Message)]
struct StatusRecord {
    #[prost(int32, tag = "1")]
    code: i32,
}

#[derive(Clone, PartialEq, Message)]
struct ConfigRecord {
    #[prost(string, tag = "1")]
    raw: String,
}

impl From<&Release> for ReleaseRecord {
    fn from(release: &Release) -> Self {
        // An unknown status is the absence of an info block on the wire
        let info = (release.status != Status::Unknown).then(|| InfoRecord {
            status: Some(StatusRecord {
                code: release.status.code(),
            }),
        });

        Self {
            name: release.name.clone(),
            info,
            chart: release.chart.as_bytes().to_vec(),
            config: release.config.as_bytes().to_vec(),
            version: release.version,
            namespace: release.namespace.clone(),
        }
    }
}

impl From<ReleaseRecord> for Release {
    fn from(record: ReleaseRecord) -> Self {
        let status = record
            .info
            .and_then(|info| info.status)
            .map_or(Status::Unknown, |s| Status::from_code(s.code));

        Self {
            name: record.name,
            namespace: record.namespace,
            chart: Chart::from_bytes(record.chart),
            config: Config::from_bytes(record.config),
            status,
            version: record.version,
        }
    }
}
