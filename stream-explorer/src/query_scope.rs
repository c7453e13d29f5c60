use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    future::Future,
    hash::Hash,
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::{
    FetchError, QueryOptions,
    query::LazyQuery,
    timer::{TimeoutHandle, set_timeout},
    utils::{KeyHash, new_cache_entry_id},
};

type QueryFn<K, V> = dyn Fn(K) -> BoxFuture<'static, Result<V, FetchError>> + Send + Sync;

/// A named async fetch function plus the cache of the values it has produced.
///
/// Clones share the cache, so every [`LazyQuery`] created from the same scope (or a clone of it) sees the values the others
/// fetched. Only successful values are cached, each one for [`QueryOptions::gc_time`] after it was fetched.
pub struct QueryScope<K, V> {
    query: Arc<QueryFn<K, V>>,
    cache: Arc<Mutex<HashMap<KeyHash, Cached<V>>>>,
    options: Option<QueryOptions>,
    title: Arc<str>,
}

struct Cached<V> {
    value: V,
    updated_at: DateTime<Utc>,
    entry_id: u64,
    gc: TimeoutHandle,
}

impl<V> Drop for Cached<V> {
    fn drop(&mut self) {
        self.gc.cancel();
    }
}

impl<K, V> Clone for QueryScope<K, V> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            cache: self.cache.clone(),
            options: self.options,
            title: self.title.clone(),
        }
    }
}

impl<K, V> Debug for QueryScope<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryScope")
            .field("title", &self.title)
            .field("query", &"Arc<dyn Fn(K) -> BoxFuture<Result<V, FetchError>>>")
            .field("options", &self.options)
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}

impl<K, V> QueryScope<K, V>
where
    K: Hash + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Wrap `query`. The title only shows up in logs.
    pub fn new<Fut>(title: impl Into<String>, query: impl Fn(K) -> Fut + Send + Sync + 'static) -> Self
    where
        Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
    {
        let title: String = title.into();
        Self {
            query: Arc::new(move |key: K| -> BoxFuture<'static, Result<V, FetchError>> {
                Box::pin(query(key))
            }),
            cache: Arc::new(Mutex::new(HashMap::new())),
            options: None,
            title: title.into(),
        }
    }

    /// Set [`QueryOptions`] that only apply to this scope, taking precedence over the ones passed to [`QueryScope::lazy`].
    pub fn set_options(mut self, options: QueryOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// The options set on this scope, if any.
    pub fn options(&self) -> Option<QueryOptions> {
        self.options
    }

    /// The title used in logs.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// A new lazy query handle over this scope.
    pub fn lazy(&self, base_options: QueryOptions) -> LazyQuery<K, V>
    where
        K: Clone + Sync,
        V: Sync,
    {
        LazyQuery::new(self.clone(), base_options)
    }

    /// Run the fetch function, bypassing the cache.
    pub fn fetch(&self, key: K) -> BoxFuture<'static, Result<V, FetchError>> {
        (self.query)(key)
    }

    /// The cached value for `key` regardless of age.
    pub fn get_cached(&self, key: &K) -> Option<V> {
        self.cache
            .lock()
            .get(&KeyHash::new(key))
            .map(|cached| cached.value.clone())
    }

    /// Seed or overwrite the cached value for `key`. It's evicted after the scope's [`QueryOptions::gc_time`].
    pub fn set_cached(&self, key: &K, value: V) {
        let gc_time = self.options.unwrap_or_default().gc_time();
        self.insert(KeyHash::new(key), value, gc_time);
    }

    /// Forget the cached value for `key`.
    pub fn invalidate(&self, key: &K) {
        self.cache.lock().remove(&KeyHash::new(key));
    }

    /// Forget every cached value of this scope.
    pub fn invalidate_all(&self) {
        self.cache.lock().clear();
    }

    pub(crate) fn get_fresh(&self, key_hash: &KeyHash, stale_time: Duration) -> Option<V> {
        let now = Utc::now();
        self.cache
            .lock()
            .get(key_hash)
            .filter(|cached| is_fresh(cached.updated_at, stale_time, now))
            .map(|cached| cached.value.clone())
    }

    pub(crate) fn insert(&self, key_hash: KeyHash, value: V, gc_time: Duration) {
        let entry_id = new_cache_entry_id();
        self.cache.lock().insert(
            key_hash,
            Cached {
                value,
                updated_at: Utc::now(),
                entry_id,
                gc: TimeoutHandle::None,
            },
        );
        if gc_time == Duration::MAX {
            return;
        }

        let cache = Arc::downgrade(&self.cache);
        let title = self.title.clone();
        let mut gc = set_timeout(
            move || {
                let Some(cache) = cache.upgrade() else {
                    return;
                };
                let mut cache = cache.lock();
                // Only the entry this timer was armed for, not a newer value under the same key:
                if cache.get(&key_hash).is_some_and(|cached| cached.entry_id == entry_id) {
                    cache.remove(&key_hash);
                    tracing::trace!(scope = &*title, "evicted cached value after gc time");
                }
            },
            gc_time,
        );
        match self.cache.lock().get_mut(&key_hash) {
            Some(cached) if cached.entry_id == entry_id => cached.gc = gc,
            _ => gc.cancel(),
        }
    }

    #[cfg(test)]
    pub(crate) fn cache_size(&self) -> usize {
        self.cache.lock().len()
    }
}

fn is_fresh(updated_at: DateTime<Utc>, stale_time: Duration, now: DateTime<Utc>) -> bool {
    match TimeDelta::from_std(stale_time) {
        Ok(delta) => updated_at
            .checked_add_signed(delta)
            .is_none_or(|stale_at| now < stale_at),
        // Too large to represent, never stale:
        Err(_) => true,
    }
}
