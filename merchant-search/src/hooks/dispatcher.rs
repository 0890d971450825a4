//! Lifecycle hook dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use merchant_search_shared::DomainObject;
use tracing::{debug, instrument};

use super::HookKind;
use crate::entities::{EntitySynchronizer, SyncOutcome};

/// Routes host hooks to the synchronizers subscribed to them.
///
/// Handlers run inline, one after another, in the order they subscribed. A
/// handler never fails the hook: every outcome is returned for inspection.
#[derive(Debug, Default)]
pub struct HookDispatcher {
    handlers: HashMap<&'static str, Vec<(HookKind, Arc<EntitySynchronizer>)>>,
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a synchronizer to every hook its entity declares.
    pub fn subscribe(&mut self, synchronizer: Arc<EntitySynchronizer>) {
        for binding in synchronizer.entity().hooks() {
            self.handlers
                .entry(binding.hook)
                .or_default()
                .push((binding.kind, synchronizer.clone()));
        }
    }

    pub fn hooks(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn handler_count(&self, hook: &str) -> usize {
        self.handlers.get(hook).map_or(0, Vec::len)
    }

    /// What `hook` means to its first subscriber. `None` when nobody listens.
    pub fn kind(&self, hook: &str) -> Option<HookKind> {
        self.handlers
            .get(hook)
            .and_then(|handlers| handlers.first())
            .map(|(kind, _)| *kind)
    }

    /// Fire a hook. Hooks nobody listens to are ignored.
    #[instrument(skip(self, object))]
    pub async fn dispatch(
        &self,
        hook: &str,
        id: u64,
        object: Option<&DomainObject>,
    ) -> Vec<(&'static str, SyncOutcome)> {
        let Some(handlers) = self.handlers.get(hook) else {
            debug!("No handlers subscribed");
            return Vec::new();
        };

        let mut outcomes = Vec::with_capacity(handlers.len());
        for (kind, synchronizer) in handlers {
            let outcome = synchronizer.handle(*kind, id, object).await;
            outcomes.push((synchronizer.slug(), outcome));
        }
        outcomes
    }
}
