use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use super::state::AuthState;

type Callback = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, Callback)>>,
}

/// Callbacks to run after each session state transition
#[derive(Default, Clone)]
pub(crate) struct Listeners {
    registry: Arc<Registry>,
}

impl Listeners {
    pub(crate) fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut callbacks) = self.registry.callbacks.lock() {
            callbacks.push((id, Arc::new(callback)));
        }
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Runs every callback with `state`. The registry lock is released first,
    /// so a callback may subscribe or unsubscribe.
    pub(crate) fn notify(&self, state: &AuthState) {
        let snapshot: Vec<Callback> = match self.registry.callbacks.lock() {
            Ok(callbacks) => callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            Err(_) => return,
        };
        for callback in snapshot {
            callback(state);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.callbacks.lock().map_or(0, |c| c.len())
    }
}

/// Handle returned by `on_state_change`.
///
/// Dropping it keeps the callback registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade()
            && let Ok(mut callbacks) = registry.callbacks.lock()
        {
            callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}
