//! Shared application state.

use std::sync::Arc;

use crate::backend::TaskBackend;
use crate::dispatcher::Dispatcher;
use crate::reaper::Reaper;
use crate::translator::StatusTranslator;

/// Shared application state.
///
/// Immutable after construction: every piece of mutable state lives in the
/// scheduler, so handlers never take a lock here.
pub struct AppState {
    /// Scheduler backend all components talk to.
    pub backend: Arc<dyn TaskBackend>,

    /// Submits new build tasks.
    pub dispatcher: Dispatcher,

    /// Reads build task status.
    pub translator: StatusTranslator,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new(backend: Arc<dyn TaskBackend>) -> Arc<Self> {
        Arc::new(Self {
            dispatcher: Dispatcher::new(backend.clone()),
            translator: StatusTranslator::new(backend.clone()),
            backend,
        })
    }

    /// Namespace builds are dispatched to.
    pub fn namespace(&self) -> &str {
        self.backend.namespace()
    }

    /// Reaper sharing this state's backend.
    pub fn reaper(&self) -> Reaper {
        Reaper::new(self.backend.clone())
    }
}
