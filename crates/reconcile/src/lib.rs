//! # Reconcile
//!
//! Converges a live deployment system to a desired set of Helm releases.
//!
//! ## Core Concepts
//!
//! - **Backend**: the live system (list, install, upgrade, delete)
//! - **Ordering**: operator preference for which releases go first
//! - **Plan**: desired releases classified by name into install / upgrade,
//!   plus the purge set in delete mode
//! - **Executor**: applies a plan phase by phase (purge, install, upgrade),
//!   isolating per-release failures
//!
//! Delete mode is the subtle one: after the purge phase the live set is
//! queried again, and only that fresh answer decides between install and
//! upgrade. A release whose purge failed is upgraded rather than installed
//! twice.
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{converge, order, Mode, NoProgress, Settings};
//!
//! let desired = order::resolve(&preference, snapshot::store::load(path)?);
//! let settings = Settings::new(Mode::Upgrade, false);
//! let (plan, summary) = converge(desired, &backend, settings, &mut NoProgress)?;
//! println!("{} installed, {} upgraded", summary.installed, summary.upgraded);
//! ```

pub mod backend;
pub mod context;
pub mod error;
pub mod executor;
pub mod order;
pub mod planner;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use backend::{Backend, DeleteOptions, InstallOptions, StatusFilter, UpgradeOptions};
pub use context::{NoProgress, ProgressCallback};
pub use error::{BackendError, BackendResult, Error, Result};
pub use executor::{Executor, converge};
pub use planner::{Plan, Reconciler};
pub use types::{ApplyResult, ExecuteSummary, Mode, Outcome, Phase, Settings};
