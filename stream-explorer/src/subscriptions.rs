use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::utils::{OnDrop, new_subscriber_id};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A set of callbacks notified with a `T` on every change.
pub(crate) struct Subscribers<T> {
    subs: Arc<Mutex<HashMap<u64, Callback<T>>>>,
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self {
        Self {
            subs: self.subs.clone(),
        }
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            subs: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: 'static> Subscribers<T> {
    pub fn add(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = new_subscriber_id();
        self.subs.lock().insert(id, Arc::new(callback));
        let weak = Arc::downgrade(&self.subs);
        Subscription {
            _guard: Box::new(OnDrop::new(move || {
                if let Some(subs) = weak.upgrade() {
                    subs.lock().remove(&id);
                }
            })),
        }
    }

    /// Call every subscriber. The lock isn't held while calling, so callbacks may (un)subscribe.
    pub fn notify(&self, value: &T) {
        let callbacks = self.subs.lock().values().cloned().collect::<Vec<_>>();
        for callback in callbacks {
            callback(value);
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.subs.lock().is_empty()
    }
}

/// Keeps a subscription alive. Dropping it unsubscribes.
#[must_use = "the subscription ends when this is dropped"]
pub struct Subscription {
    _guard: Box<dyn Send + Sync>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}
