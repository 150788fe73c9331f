use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use catchline_battle::{BattleEvent, EventKind};

/// Callback run on the read loop task for every matching event.
///
/// Handlers must not block: the next line is not read until every handler for
/// the current event has returned. Hand long work off to a channel instead,
/// see [`crate::BattleSession::channel`].
pub type Handler = Arc<dyn Fn(&BattleEvent) + Send + Sync>;

/// Token returned by a subscription, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    by_kind: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    all: Vec<(SubscriptionId, Handler)>,
}

/// Handlers keyed by event kind, plus handlers that see everything
#[derive(Default)]
pub(crate) struct Handlers {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
}

impl Handlers {
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn subscribe(&self, kind: EventKind, handler: Handler) -> SubscriptionId {
        let id = self.next_id();
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .by_kind
            .entry(kind)
            .or_default()
            .push((id, handler));
        id
    }

    pub(crate) fn subscribe_all(&self, handler: Handler) -> SubscriptionId {
        let id = self.next_id();
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .all
            .push((id, handler));
        id
    }

    /// Returns false when the id was not registered
    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let before = registry.all.len() + registry.by_kind.values().map(Vec::len).sum::<usize>();
        registry.all.retain(|(sub, _)| *sub != id);
        for handlers in registry.by_kind.values_mut() {
            handlers.retain(|(sub, _)| *sub != id);
        }
        let after = registry.all.len() + registry.by_kind.values().map(Vec::len).sum::<usize>();
        after < before
    }

    /// Run every matching handler in subscription order
    ///
    /// The handler list is copied out first so a handler may subscribe or
    /// unsubscribe without deadlocking.
    pub(crate) fn dispatch(&self, event: &BattleEvent) {
        let handlers: Vec<Handler> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .by_kind
                .get(&event.kind())
                .into_iter()
                .flatten()
                .chain(registry.all.iter())
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };
        for handler in handlers {
            handler(event);
        }
    }
}
