//! Progress reporting
//!
//! The executor reports through this trait so the crate carries no
//! dependency on a particular console or UI.

use crate::types::{ApplyResult, Phase};
use snapshot::Release;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback {
    /// Called when a phase starts, with the releases it will process
    fn on_phase_start(&mut self, phase: Phase, releases: &[Release]);

    /// Called before a single release is processed
    fn on_release_start(&mut self, phase: Phase, release: &Release);

    /// Called when a single release completes
    fn on_release_complete(&mut self, phase: Phase, release: &Release, result: &ApplyResult);

    /// Called when a phase completes
    fn on_phase_complete(&mut self, phase: Phase);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_phase_start(&mut self, _phase: Phase, _releases: &[Release]) {}
    fn on_release_start(&mut self, _phase: Phase, _release: &Release) {}
    fn on_release_complete(&mut self, _phase: Phase, _release: &Release, _result: &ApplyResult) {}
    fn on_phase_complete(&mut self, _phase: Phase) {}
}
