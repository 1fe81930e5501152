//! Reconciliation planner - classifies desired releases against the live set
//!
//! Classification is by release name only. A desired release whose name is
//! deployed goes to the upgrade set, anything else to the install set.
//!
//! In delete mode the planner runs two passes: the deployed releases are
//! handed to a purge step first, then the live set is queried *again* and the
//! final classification uses that fresh answer. A release whose purge failed
//! is still deployed on the second query and lands in the upgrade set.

use crate::error::{BackendResult, Error, Result};
use crate::types::Settings;
use snapshot::Release;
use std::collections::{HashMap, HashSet};

/// Classification of a desired release set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Desired releases not deployed
    pub to_install: Vec<Release>,
    /// Desired releases already deployed
    pub to_upgrade: Vec<Release>,
    /// Releases handed to the purge pass (delete mode only)
    pub to_purge: Vec<Release>,
}

impl Plan {
    /// Check if the plan has nothing to do
    pub fn is_empty(&self) -> bool {
        self.to_install.is_empty() && self.to_upgrade.is_empty() && self.to_purge.is_empty()
    }

    /// Names in the install set, in execution order
    pub fn install_names(&self) -> Vec<&str> {
        self.to_install.iter().map(|r| r.name.as_str()).collect()
    }

    /// Names in the upgrade set, in execution order
    pub fn upgrade_names(&self) -> Vec<&str> {
        self.to_upgrade.iter().map(|r| r.name.as_str()).collect()
    }

    /// Names in the purge set, in execution order
    pub fn purge_names(&self) -> Vec<&str> {
        self.to_purge.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Computes a [`Plan`] for one run
pub struct Reconciler {
    settings: Settings,
}

impl Reconciler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Plan the reconciliation of `desired` (already in execution order).
    ///
    /// `live_query` returns the currently deployed releases; it is called once,
    /// or twice in delete mode. `purge` is called with the purge set between
    /// the two queries and is expected to honour dry-run itself. In a dry run
    /// nothing was purged, so the purged names are removed from the second
    /// answer to match what a real run would see.
    ///
    /// # Errors
    /// [`Error::EmptyInput`] for an empty `desired`, [`Error::Backend`] if a
    /// live query fails.
    pub fn plan<Q, P>(&self, desired: Vec<Release>, mut live_query: Q, mut purge: P) -> Result<Plan>
    where
        Q: FnMut() -> BackendResult<Vec<Release>>,
        P: FnMut(&[Release]),
    {
        if desired.is_empty() {
            return Err(Error::EmptyInput);
        }
        let desired = dedupe_last_wins(desired);

        let live = live_query()?;
        log::debug!("{} releases deployed before planning", live.len());

        if !self.settings.mode.purges() {
            let (to_install, to_upgrade) = classify(desired, &live);
            return Ok(Plan {
                to_install,
                to_upgrade,
                to_purge: Vec::new(),
            });
        }

        let to_purge = purge_candidates(&desired, &live);
        purge(&to_purge);

        let mut live = live_query()?;
        if self.settings.dry_run {
            let purged: HashSet<&str> = to_purge.iter().map(|r| r.name.as_str()).collect();
            live.retain(|r| !purged.contains(r.name.as_str()));
        }
        log::debug!("{} releases deployed after purge", live.len());

        let (to_install, to_upgrade) = classify(desired, &live);
        Ok(Plan {
            to_install,
            to_upgrade,
            to_purge,
        })
    }
}

/// Split `desired` into (install, upgrade) by membership in `live`
pub fn classify(desired: Vec<Release>, live: &[Release]) -> (Vec<Release>, Vec<Release>) {
    let deployed: HashSet<&str> = live.iter().map(|r| r.name.as_str()).collect();
    let (to_upgrade, to_install): (Vec<_>, Vec<_>) = desired
        .into_iter()
        .partition(|r| deployed.contains(r.name.as_str()));
    (to_install, to_upgrade)
}

/// Desired releases that are currently deployed
pub fn purge_candidates(desired: &[Release], live: &[Release]) -> Vec<Release> {
    let deployed: HashSet<&str> = live.iter().map(|r| r.name.as_str()).collect();
    desired
        .iter()
        .filter(|r| deployed.contains(r.name.as_str()))
        .cloned()
        .collect()
}

/// Keep only the last release of each name, at its own position
fn dedupe_last_wins(desired: Vec<Release>) -> Vec<Release> {
    let last: HashMap<&str, usize> = desired
        .iter()
        .enumerate()
        .map(|(i, r)| (r.name.as_str(), i))
        .collect();
    let keep: HashSet<usize> = last.into_values().collect();
    if keep.len() == desired.len() {
        return desired;
    }

    desired
        .into_iter()
        .enumerate()
        .filter_map(|(i, r)| {
            if keep.contains(&i) {
                Some(r)
            } else {
                log::warn!("Release {} appears more than once; using its last entry", r.name);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::types::Mode;
    use snapshot::Status;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    fn releases(names: &[&str]) -> Vec<Release> {
        names
            .iter()
            .map(|n| Release::new(*n).with_status(Status::Deployed))
            .collect()
    }

    /// Live query answering from a queue, recording how often it ran
    fn scripted(
        answers: Vec<Vec<Release>>,
    ) -> (impl FnMut() -> BackendResult<Vec<Release>>, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let mut answers: VecDeque<_> = answers.into();
        let query = move || {
            counter.set(counter.get() + 1);
            answers
                .pop_front()
                .ok_or_else(|| BackendError::Other("unexpected live query".into()))
        };
        (query, count)
    }

    fn no_purge(_: &[Release]) {}

    #[test]
    fn test_install_only_classification() {
        let (query, count) = scripted(vec![releases(&["a"])]);
        let plan = Reconciler::new(Settings::default())
            .plan(releases(&["a", "b"]), query, no_purge)
            .unwrap();

        assert_eq!(plan.install_names(), ["b"]);
        assert_eq!(plan.upgrade_names(), ["a"]);
        assert!(plan.to_purge.is_empty());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_upgrade_mode_same_classification() {
        let (query, _) = scripted(vec![releases(&["a"])]);
        let plan = Reconciler::new(Settings::new(Mode::Upgrade, false))
            .plan(releases(&["a", "b"]), query, no_purge)
            .unwrap();

        assert_eq!(plan.install_names(), ["b"]);
        assert_eq!(plan.upgrade_names(), ["a"]);
    }

    #[test]
    fn test_delete_mode_requeries_after_purge() {
        let (query, count) = scripted(vec![releases(&["a"]), Vec::new()]);
        let mut purged = Vec::new();
        let plan = Reconciler::new(Settings::new(Mode::Delete, false))
            .plan(releases(&["a", "b"]), query, |set: &[Release]| {
                purged.extend(set.iter().map(|r| r.name.clone()));
            })
            .unwrap();

        assert_eq!(purged, ["a"]);
        assert_eq!(plan.purge_names(), ["a"]);
        assert_eq!(plan.install_names(), ["a", "b"]);
        assert!(plan.to_upgrade.is_empty());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_delete_mode_failed_purge_is_upgraded() {
        // Second query still reports "a": its purge failed
        let (query, _) = scripted(vec![releases(&["a", "c"]), releases(&["a"])]);
        let plan = Reconciler::new(Settings::new(Mode::Delete, false))
            .plan(releases(&["a", "b", "c"]), query, no_purge)
            .unwrap();

        assert_eq!(plan.purge_names(), ["a", "c"]);
        assert_eq!(plan.install_names(), ["b", "c"]);
        assert_eq!(plan.upgrade_names(), ["a"]);
    }

    #[test]
    fn test_delete_dry_run_models_purge() {
        let (query, count) = scripted(vec![releases(&["a"]), releases(&["a"])]);
        let plan = Reconciler::new(Settings::new(Mode::Delete, true))
            .plan(releases(&["a", "b"]), query, no_purge)
            .unwrap();

        assert_eq!(plan.install_names(), ["a", "b"]);
        assert!(plan.to_upgrade.is_empty());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let desired = releases(&["a", "b", "c", "d", "e"]);
        for mode in [Mode::InstallOnly, Mode::Upgrade, Mode::Delete] {
            let (query, _) = scripted(vec![releases(&["b", "d", "x"]), releases(&["d", "x"])]);
            let plan = Reconciler::new(Settings::new(mode, false))
                .plan(desired.clone(), query, no_purge)
                .unwrap();

            let mut names: Vec<&str> = plan.install_names();
            names.extend(plan.upgrade_names());
            names.sort_unstable();
            assert_eq!(names, ["a", "b", "c", "d", "e"], "mode {mode}");

            let install: HashSet<&str> = plan.install_names().into_iter().collect();
            assert!(plan.upgrade_names().iter().all(|n| !install.contains(n)));
            assert!(plan.purge_names().iter().all(|n| ["b", "d"].contains(n)));
        }
    }

    #[test]
    fn test_order_preserved_within_sets() {
        let (query, _) = scripted(vec![releases(&["c", "a"])]);
        let plan = Reconciler::new(Settings::default())
            .plan(releases(&["d", "c", "b", "a"]), query, no_purge)
            .unwrap();

        assert_eq!(plan.install_names(), ["d", "b"]);
        assert_eq!(plan.upgrade_names(), ["c", "a"]);
    }

    #[test]
    fn test_empty_desired_rejected() {
        let (query, count) = scripted(vec![]);
        let err = Reconciler::new(Settings::default())
            .plan(Vec::new(), query, no_purge)
            .unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_live_query_failure_is_fatal() {
        let query = || -> BackendResult<Vec<Release>> {
            Err(BackendError::Unavailable {
                message: "cluster unreachable".into(),
            })
        };
        let err = Reconciler::new(Settings::default())
            .plan(releases(&["a"]), query, no_purge)
            .unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::Unavailable { .. })));
    }

    #[test]
    fn test_duplicates_last_wins_by_position() {
        let desired = vec![
            Release::new("a").with_version(1),
            Release::new("b"),
            Release::new("a").with_version(2),
        ];
        let (query, _) = scripted(vec![Vec::new()]);
        let plan = Reconciler::new(Settings::default())
            .plan(desired, query, no_purge)
            .unwrap();

        assert_eq!(plan.install_names(), ["b", "a"]);
        assert_eq!(plan.to_install[1].version, 2);
    }
}
