use std::{fmt::Debug, hash::Hash, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{
    FetchError, PagedResult, QueryOptions, QueryScope,
    options::options_combine,
    subscriptions::{Subscribers, Subscription},
    utils::{KeyHash, new_request_id},
};

/// A read-only snapshot of a [`LazyQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<K, V> {
    /// A fetch is in flight and there is no data yet.
    pub is_loading: bool,
    /// A fetch is in flight.
    pub is_fetching: bool,
    /// The last settled request succeeded.
    pub is_success: bool,
    /// The last settled request failed, see [`QueryResult::error`].
    pub is_error: bool,
    /// The value of the last successful request. Kept while refetching and after errors.
    pub data: Option<V>,
    /// The error of the last settled request, if it failed.
    pub error: Option<FetchError>,
    /// The arguments of the latest trigger, whether or not it has settled.
    pub original_args: Option<K>,
    /// When the last request settled.
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl<K, V> Default for QueryResult<K, V> {
    fn default() -> Self {
        Self {
            is_loading: false,
            is_fetching: false,
            is_success: false,
            is_error: false,
            data: None,
            error: None,
            original_args: None,
            fulfilled_at: None,
        }
    }
}

impl<K, V> QueryResult<K, V> {
    /// Whether the query was never triggered.
    pub fn is_uninitialized(&self) -> bool {
        self.original_args.is_none()
    }
}

impl<K, T> QueryResult<K, PagedResult<T>> {
    /// The rows of the current page, empty without data.
    pub fn rows(&self) -> &[T] {
        self.data.as_ref().map(|page| page.data.as_slice()).unwrap_or_default()
    }

    /// Whether the current page says there's another one after it.
    pub fn has_next_page(&self) -> bool {
        self.data.as_ref().is_some_and(PagedResult::has_next_page)
    }
}

struct QueryState<K, V> {
    latest_request: Option<u64>,
    result: QueryResult<K, V>,
}

impl<K, V> QueryState<K, V> {
    fn settle(&mut self, result: Result<V, FetchError>) {
        let current = &mut self.result;
        current.is_fetching = false;
        current.is_loading = false;
        current.fulfilled_at = Some(Utc::now());
        match result {
            Ok(value) => {
                current.data = Some(value);
                current.error = None;
                current.is_success = true;
                current.is_error = false;
            }
            Err(e) => {
                current.error = Some(e);
                current.is_success = false;
                current.is_error = true;
            }
        }
    }
}

/// A manually triggered query over a [`QueryScope`], holding the result of the latest trigger.
///
/// Every [`LazyQuery::trigger`] supersedes the previous one: when an older request completes after a newer one was
/// triggered its value still lands in the scope's cache, but never in this query's result.
///
/// Fetches run on the [`any_spawner::Executor`], which must have been initialised.
pub struct LazyQuery<K, V> {
    scope: QueryScope<K, V>,
    options: QueryOptions,
    state: Arc<Mutex<QueryState<K, V>>>,
    subscribers: Subscribers<QueryResult<K, V>>,
}

impl<K, V> Clone for LazyQuery<K, V> {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            options: self.options,
            state: self.state.clone(),
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<K, V> Debug for LazyQuery<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyQuery")
            .field("scope", &self.scope)
            .field("options", &self.options)
            .finish()
    }
}

impl<K, V> LazyQuery<K, V>
where
    K: Clone + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Usually created with [`QueryScope::lazy`].
    pub fn new(scope: QueryScope<K, V>, base_options: QueryOptions) -> Self {
        Self {
            options: options_combine(base_options, scope.options()),
            scope,
            state: Arc::new(Mutex::new(QueryState {
                latest_request: None,
                result: QueryResult::default(),
            })),
            subscribers: Subscribers::default(),
        }
    }

    /// The scope this query fetches through.
    pub fn scope(&self) -> &QueryScope<K, V> {
        &self.scope
    }

    /// Fetch for `args`, superseding any in-flight request.
    ///
    /// A cached value younger than the stale time is used without fetching.
    pub fn trigger(&self, args: K) {
        let request_id = new_request_id();
        let key_hash = KeyHash::new(&args);
        let cached = self.scope.get_fresh(&key_hash, self.options.stale_time());
        let from_cache = cached.is_some();

        let snapshot = {
            let mut state = self.state.lock();
            state.latest_request = Some(request_id);
            state.result.original_args = Some(args.clone());
            if let Some(value) = cached {
                state.settle(Ok(value));
            } else {
                state.result.is_fetching = true;
                state.result.is_loading = state.result.data.is_none();
            }
            state.result.clone()
        };
        self.subscribers.notify(&snapshot);

        if from_cache {
            tracing::trace!(scope = self.scope.title(), request_id, "served from cache");
            return;
        }

        tracing::debug!(scope = self.scope.title(), request_id, "fetching");
        let fut = self.scope.fetch(args);
        let gc_time = self.options.gc_time();
        let scope = self.scope.clone();
        let state = self.state.clone();
        let subscribers = self.subscribers.clone();
        any_spawner::Executor::spawn(async move {
            let result = fut.await;
            if let Ok(value) = &result {
                scope.insert(key_hash, value.clone(), gc_time);
            }
            if let Err(e) = &result {
                tracing::debug!(scope = scope.title(), request_id, "fetch failed: {e}");
            }

            let snapshot = {
                let mut state = state.lock();
                if state.latest_request == Some(request_id) {
                    state.settle(result);
                    Some(state.result.clone())
                } else {
                    None
                }
            };
            match snapshot {
                Some(snapshot) => subscribers.notify(&snapshot),
                None => tracing::trace!(
                    scope = scope.title(),
                    request_id,
                    "superseded response, not applied"
                ),
            }
        });
    }

    /// Refetch the latest arguments, ignoring the cache. Does nothing if never triggered.
    pub fn refetch(&self) {
        let args = self.state.lock().result.original_args.clone();
        if let Some(args) = args {
            self.scope.invalidate(&args);
            self.trigger(args);
        }
    }

    /// Clear the scope's cache. The current result stays until the next trigger.
    pub fn invalidate(&self) {
        self.scope.invalidate_all();
    }

    /// Snapshot of the current state.
    pub fn result(&self) -> QueryResult<K, V> {
        self.state.lock().result.clone()
    }

    /// The arguments of the latest trigger.
    pub fn original_args(&self) -> Option<K> {
        self.state.lock().result.original_args.clone()
    }

    /// Whether a request is in flight.
    pub fn is_fetching(&self) -> bool {
        self.state.lock().result.is_fetching
    }

    /// Call `callback` with a new snapshot on every change until the returned [`Subscription`] is dropped.
    pub fn subscribe(
        &self,
        callback: impl Fn(&QueryResult<K, V>) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribers.add(callback)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use any_spawner::Executor;

    use super::*;

    const FETCH_MS: u64 = 30;

    fn counting_scope() -> (QueryScope<u64, u64>, Arc<AtomicUsize>) {
        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let scope = QueryScope::new("counting", {
            let fetch_calls = fetch_calls.clone();
            move |key: u64| {
                let fetch_calls = fetch_calls.clone();
                async move {
                    // Bigger keys answer faster, to force out of order completion:
                    tokio::time::sleep(Duration::from_millis(FETCH_MS * 10 / (key + 1))).await;
                    fetch_calls.fetch_add(1, Ordering::Relaxed);
                    if key == 99 {
                        Err(FetchError::Subgraph("boom".into()))
                    } else {
                        Ok(key * 2)
                    }
                }
            }
        });
        (scope, fetch_calls)
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_fetches_and_settles() {
        _ = Executor::init_tokio();
        let (scope, fetch_calls) = counting_scope();
        let query = scope.lazy(QueryOptions::default());
        assert!(query.result().is_uninitialized());

        query.trigger(4);
        let pending = query.result();
        assert!(pending.is_loading && pending.is_fetching);
        assert_eq!(pending.original_args, Some(4));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let settled = query.result();
        assert!(settled.is_success && !settled.is_fetching && !settled.is_loading);
        assert_eq!(settled.data, Some(8));
        assert_eq!(fetch_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn last_request_wins() {
        _ = Executor::init_tokio();
        let (scope, fetch_calls) = counting_scope();
        let query = scope.lazy(QueryOptions::default());

        // 1 is slow, 9 is fast, so 1 completes last:
        query.trigger(1);
        query.trigger(9);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(fetch_calls.load(Ordering::Relaxed), 2);
        let result = query.result();
        assert_eq!(result.data, Some(18));
        assert_eq!(result.original_args, Some(9));
        // The superseded value still made it into the cache:
        assert_eq!(scope.get_cached(&1), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_cache_skips_fetch() {
        _ = Executor::init_tokio();
        let (scope, fetch_calls) = counting_scope();
        let first = scope.lazy(QueryOptions::default());
        first.trigger(3);
        tokio::time::sleep(Duration::from_secs(1)).await;

        // A second handle on the same scope:
        let second = scope.lazy(QueryOptions::default());
        second.trigger(3);
        let result = second.result();
        assert!(result.is_success && !result.is_fetching);
        assert_eq!(result.data, Some(6));
        assert_eq!(fetch_calls.load(Ordering::Relaxed), 1);

        // Unless the cache is always stale:
        let always_stale = scope
            .clone()
            .set_options(QueryOptions::new().with_stale_time(Duration::ZERO))
            .lazy(QueryOptions::default());
        always_stale.trigger(3);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetch_calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_keep_previous_data() {
        _ = Executor::init_tokio();
        let (scope, _fetch_calls) = counting_scope();
        let query = scope.lazy(QueryOptions::default());
        query.trigger(2);
        tokio::time::sleep(Duration::from_secs(1)).await;
        query.trigger(99);
        assert!(!query.result().is_loading, "has data, so fetching but not loading");
        tokio::time::sleep(Duration::from_secs(1)).await;

        let result = query.result();
        assert!(result.is_error && !result.is_success);
        assert_eq!(result.error, Some(FetchError::Subgraph("boom".into())));
        assert_eq!(result.data, Some(4));
        assert_eq!(scope.get_cached(&99), None);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_every_change() {
        _ = Executor::init_tokio();
        let (scope, _fetch_calls) = counting_scope();
        let query = scope.lazy(QueryOptions::default());
        let seen = Arc::new(Mutex::new(vec![]));
        let sub = query.subscribe({
            let seen = seen.clone();
            move |result| seen.lock().push((result.is_fetching, result.data))
        });

        query.trigger(5);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*seen.lock(), vec![(true, None), (false, Some(10))]);

        drop(sub);
        query.refetch();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(seen.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_ignores_cache() {
        _ = Executor::init_tokio();
        let (scope, fetch_calls) = counting_scope();
        let query = scope.lazy(QueryOptions::default());
        query.refetch();
        assert!(query.result().is_uninitialized());

        query.trigger(5);
        tokio::time::sleep(Duration::from_secs(1)).await;
        query.refetch();
        assert!(query.is_fetching());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetch_calls.load(Ordering::Relaxed), 2);
        assert_eq!(query.original_args(), Some(5));
    }
}
