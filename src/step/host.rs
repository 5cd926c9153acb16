//! The host workflow engine, as seen by the step.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::editor::IdentifierRegistry;

/// Notifications the step sends to its host.
pub trait WorkflowHost: IdentifierRegistry {
    /// Configuration finished; `configured` says whether it is runnable.
    fn step_configured(&self, _identifier: &str, _configured: bool) {}

    /// Execution finished and outputs may be read.
    fn done_execution(&self, _identifier: &str) {}
}

impl<T: WorkflowHost + ?Sized> WorkflowHost for &T {
    fn step_configured(&self, identifier: &str, configured: bool) {
        (**self).step_configured(identifier, configured)
    }

    fn done_execution(&self, identifier: &str) {
        (**self).done_execution(identifier)
    }
}

/// Host for running a single step outside a workflow engine.
///
/// Identifiers registered up front count as used by other steps. Notifications
/// are recorded so callers can inspect them.
#[derive(Debug, Default)]
pub struct StandaloneHost {
    identifiers: HashMap<String, usize>,
    configured: RefCell<Vec<(String, bool)>>,
    done: RefCell<Vec<String>>,
}

impl StandaloneHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identifiers<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut host = Self::new();
        for id in identifiers {
            host.register(id);
        }
        host
    }

    pub fn register(&mut self, identifier: impl Into<String>) {
        *self.identifiers.entry(identifier.into()).or_insert(0) += 1;
    }

    pub fn configured_events(&self) -> Vec<(String, bool)> {
        self.configured.borrow().clone()
    }

    pub fn done_events(&self) -> Vec<String> {
        self.done.borrow().clone()
    }
}

impl IdentifierRegistry for StandaloneHost {
    fn identifier_occurs_count(&self, identifier: &str) -> usize {
        self.identifiers.get(identifier).copied().unwrap_or(0)
    }
}

impl WorkflowHost for StandaloneHost {
    fn step_configured(&self, identifier: &str, configured: bool) {
        self.configured
            .borrow_mut()
            .push((identifier.to_string(), configured));
    }

    fn done_execution(&self, identifier: &str) {
        self.done.borrow_mut().push(identifier.to_string());
    }
}
