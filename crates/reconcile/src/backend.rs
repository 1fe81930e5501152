//! Backend abstraction for the live deployment system.
//!
//! The [`Backend`] trait is the whole capability set reconciliation depends
//! on, so the planner and executor never see a particular transport (the
//! `helm` CLI in the binary, an in-memory recorder in tests).

use crate::error::BackendResult;
use snapshot::{Chart, Config, Release, Status};

/// Which releases a [`Backend::list`] call returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Only releases currently in the deployed status
    Deployed,
    /// Every release the backend knows about
    All,
}

/// Options for [`Backend::install`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Name to install the release under
    pub release_name: String,
    /// Values overlay applied on top of the chart defaults
    pub values_override: Config,
    /// Allow reusing a name still held by a deleted release
    pub reuse_name: bool,
    /// Skip chart hooks
    pub disable_hooks: bool,
}

impl InstallOptions {
    /// Options used when restoring a release from a snapshot
    pub fn restore(release: &Release) -> Self {
        Self {
            release_name: release.name.clone(),
            values_override: release.config.clone(),
            reuse_name: true,
            disable_hooks: true,
        }
    }
}

/// Options for [`Backend::upgrade`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeOptions {
    /// Namespace the release lives in (empty: backend default)
    pub namespace: String,
    /// Values overlay applied on top of the chart defaults
    pub values_override: Config,
    /// Merge with the values of the previous revision
    pub reuse_values: bool,
    /// Replace resources that cannot be patched
    pub force: bool,
    /// Skip chart hooks
    pub disable_hooks: bool,
}

impl UpgradeOptions {
    /// Options used when restoring a release from a snapshot
    pub fn restore(release: &Release) -> Self {
        Self {
            namespace: release.namespace.clone(),
            values_override: release.config.clone(),
            reuse_values: true,
            force: true,
            disable_hooks: true,
        }
    }
}

/// Options for [`Backend::delete`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Namespace the release lives in (empty: backend default)
    pub namespace: String,
    /// Remove the release record entirely so its name can be reinstalled
    pub purge: bool,
}

impl DeleteOptions {
    /// Options for purging a release ahead of a clean reinstall
    pub fn purge(release: &Release) -> Self {
        Self {
            namespace: release.namespace.clone(),
            purge: true,
        }
    }
}

/// Backend trait for live release operations.
///
/// Every call blocks until the backend answers. Implementations are driven
/// from a single thread.
pub trait Backend {
    /// List releases matching `filter`.
    fn list(&self, filter: StatusFilter) -> BackendResult<Vec<Release>>;

    /// Install `chart` into `namespace`, returning the resulting status.
    fn install(&self, chart: &Chart, namespace: &str, options: &InstallOptions)
    -> BackendResult<Status>;

    /// Upgrade the release `name` to `chart`, returning the resulting status.
    fn upgrade(&self, name: &str, chart: &Chart, options: &UpgradeOptions) -> BackendResult<Status>;

    /// Delete the release `name`.
    fn delete(&self, name: &str, options: &DeleteOptions) -> BackendResult<()>;

    /// Check that the backend is reachable.
    fn health_check(&self) -> BackendResult<()>;

    /// List releases currently deployed.
    fn list_deployed(&self) -> BackendResult<Vec<Release>> {
        self.list(StatusFilter::Deployed)
    }
}
