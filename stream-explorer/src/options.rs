use std::time::Duration;

pub(crate) const DEFAULT_STALE_TIME: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_GC_TIME: Duration = Duration::from_secs(300);
pub(crate) const DEFAULT_DEBOUNCE_TIME: Duration = Duration::from_millis(250);
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 10;

/// Configuration for fetching, used with [`crate::QueryScope`] and [`crate::Explorer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QueryOptions {
    stale_time: Option<Duration>,
    gc_time: Option<Duration>,
}

impl QueryOptions {
    /// Create new [`QueryOptions`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration during which a cached value is served without refetching.
    ///
    /// To always refetch, set [`Duration::ZERO`]. To never refetch a cached value, set [`Duration::MAX`].
    ///
    /// Default: `10 seconds`
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }

    /// Set how long a cached value is kept after it was fetched. Once it's gone the next trigger fetches again, and
    /// the cache doesn't grow with every argument ever queried.
    ///
    /// To never evict, set [`Duration::MAX`].
    ///
    /// Default: `5 minutes`
    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = Some(gc_time);
        self
    }

    /// The duration during which a cached value is served without refetching.
    ///
    /// Default: `10 seconds`
    pub fn stale_time(&self) -> Duration {
        self.stale_time.unwrap_or(DEFAULT_STALE_TIME)
    }

    /// How long a cached value is kept after it was fetched.
    ///
    /// Default: `5 minutes`
    pub fn gc_time(&self) -> Duration {
        self.gc_time.unwrap_or(DEFAULT_GC_TIME)
    }
}

pub(crate) fn options_combine(base: QueryOptions, scope: Option<QueryOptions>) -> QueryOptions {
    if let Some(scope) = scope {
        QueryOptions {
            stale_time: scope.stale_time.or(base.stale_time),
            gc_time: scope.gc_time.or(base.gc_time),
        }
    } else {
        base
    }
}

/// Configuration for an [`crate::Explorer`] and the list controllers it creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplorerOptions {
    debounce_time: Option<Duration>,
    page_size: Option<u32>,
    query: QueryOptions,
}

impl ExplorerOptions {
    /// Create new [`ExplorerOptions`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long a filter edit waits for further edits before it is fetched.
    ///
    /// Only edits confined to the filter are debounced, paging, ordering and navigation always fetch immediately.
    ///
    /// Default: `250 milliseconds`
    pub fn with_debounce_time(mut self, debounce_time: Duration) -> Self {
        self.debounce_time = Some(debounce_time);
        self
    }

    /// Set the page size list views start with. Clamped to at least 1.
    ///
    /// Default: `10`
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Set the base [`QueryOptions`], combined with any options set on an individual [`crate::QueryScope`].
    pub fn with_query_options(mut self, query: QueryOptions) -> Self {
        self.query = query;
        self
    }

    /// How long a filter edit waits for further edits before it is fetched.
    pub fn debounce_time(&self) -> Duration {
        self.debounce_time.unwrap_or(DEFAULT_DEBOUNCE_TIME)
    }

    /// The page size list views start with.
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// The base [`QueryOptions`].
    pub fn query_options(&self) -> QueryOptions {
        self.query
    }
}
