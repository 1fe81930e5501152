//! In-memory backend that records every call

use crate::backend::{Backend, DeleteOptions, InstallOptions, StatusFilter, UpgradeOptions};
use crate::error::{BackendError, BackendResult};
use snapshot::{Chart, Release, Status};
use std::cell::RefCell;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List,
    Install(String),
    Upgrade(String),
    Delete(String),
    HealthCheck,
}

impl Call {
    fn is_mutating(&self) -> bool {
        matches!(self, Self::Install(_) | Self::Upgrade(_) | Self::Delete(_))
    }
}

pub(crate) struct RecordingBackend {
    live: RefCell<Vec<Release>>,
    calls: RefCell<Vec<Call>>,
    failing: HashSet<String>,
    list_fails: bool,
}

impl RecordingBackend {
    /// Backend whose live set holds `names`, all deployed
    pub(crate) fn with_live(names: &[&str]) -> Self {
        Self {
            live: RefCell::new(
                names
                    .iter()
                    .map(|n| Release::new(*n).with_status(Status::Deployed))
                    .collect(),
            ),
            calls: RefCell::new(Vec::new()),
            failing: HashSet::new(),
            list_fails: false,
        }
    }

    /// Every mutating call for `name` fails
    pub(crate) fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub(crate) fn with_failing_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn mutating_calls(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.is_mutating())
            .cloned()
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, name: &str) -> BackendResult<()> {
        if self.failing.contains(name) {
            return Err(BackendError::CommandFailed {
                message: format!("simulated failure for {name}"),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

impl Backend for RecordingBackend {
    fn list(&self, filter: StatusFilter) -> BackendResult<Vec<Release>> {
        self.record(Call::List);
        if self.list_fails {
            return Err(BackendError::Unavailable {
                message: "cluster unreachable".into(),
            });
        }
        Ok(self
            .live
            .borrow()
            .iter()
            .filter(|r| filter == StatusFilter::All || r.status.is_deployed())
            .cloned()
            .collect())
    }

    fn install(
        &self,
        chart: &Chart,
        namespace: &str,
        options: &InstallOptions,
    ) -> BackendResult<Status> {
        self.record(Call::Install(options.release_name.clone()));
        self.check(&options.release_name)?;
        self.live.borrow_mut().push(
            Release::new(options.release_name.as_str())
                .with_namespace(namespace)
                .with_chart(chart.clone())
                .with_config(options.values_override.clone())
                .with_status(Status::Deployed),
        );
        Ok(Status::Deployed)
    }

    fn upgrade(
        &self,
        name: &str,
        _chart: &Chart,
        _options: &UpgradeOptions,
    ) -> BackendResult<Status> {
        self.record(Call::Upgrade(name.to_string()));
        self.check(name)?;
        Ok(Status::Deployed)
    }

    fn delete(&self, name: &str, _options: &DeleteOptions) -> BackendResult<()> {
        self.record(Call::Delete(name.to_string()));
        self.check(name)?;
        self.live.borrow_mut().retain(|r| r.name != name);
        Ok(())
    }

    fn health_check(&self) -> BackendResult<()> {
        self.record(Call::HealthCheck);
        Ok(())
    }
}
