use std::{
    fmt,
    sync::{Arc, Weak},
};

use parking_lot::{Mutex, ReentrantMutex};

use crate::{
    ExplorerOptions, Filter, OrderDirection, Ordering, PagedResult, QueryResult, SkipPaging,
    debounce::Debounced,
    list_view::{ListArgs, ListQuery, ListView, ListViewState, SortIndicator},
    subscriptions::Subscription,
};

/// How a change to the query arguments gets fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCadence {
    /// Straight away, cancelling any pending debounced fetch.
    Immediate,
    /// After the debounce delay, unless superseded by another change first.
    Debounced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    /// Navigation, paging, sorting, resets.
    Discrete,
    /// Typing into or toggling the filter editor.
    FilterEdit,
}

/// Holds the filter, sort and page state of one list and keeps its query in sync with it.
///
/// Every operation derives a new [`crate::QueryArguments`] snapshot and fetches it. Filter edits, which arrive per
/// keystroke, are debounced when nothing else changed since the last fetch. Everything else fetches immediately.
///
/// Cloning gives another handle on the same controller.
pub struct QueryController<L: ListView> {
    inner: Arc<ControllerInner<L>>,
}

impl<L: ListView> Clone for QueryController<L> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct ControllerInner<L: ListView> {
    query: ListQuery<L>,
    debounced: Debounced<ListArgs<L>>,
    page_size: u32,
    /// Held from changing the arguments until their fetch is dispatched, so fetches go out in the order the changes
    /// were made. Reentrant, subscribers may change the controller from their callback.
    dispatching: ReentrantMutex<()>,
    state: Mutex<ControllerState<L>>,
}

impl<L: ListView> ControllerInner<L> {
    fn fire_debounced(&self, args: ListArgs<L>) {
        let _dispatching = self.dispatching.lock();
        // A newer change got in between the timer firing and here:
        if self.state.lock().args != args {
            tracing::trace!(scope = self.query.scope().title(), "debounced arguments superseded, not fetched");
            return;
        }
        tracing::debug!(scope = self.query.scope().title(), "debounced fetch firing");
        self.query.trigger(args);
    }
}

struct ControllerState<L: ListView> {
    scope: L::Scope,
    args: ListArgs<L>,
    status: Option<L::Status>,
    filter_editor_open: bool,
}

impl<L: ListView> fmt::Debug for QueryController<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("QueryController")
            .field("scope", &state.scope)
            .field("args", &state.args)
            .field("status", &state.status)
            .finish()
    }
}

impl<L: ListView> QueryController<L> {
    /// Create a controller for `scope` and immediately fetch its first page.
    pub fn new(query: ListQuery<L>, scope: L::Scope, options: &ExplorerOptions) -> Self {
        let page_size = options.page_size();
        let args = L::default_args(&scope, page_size);
        let inner = Arc::new_cyclic(|weak: &Weak<ControllerInner<L>>| {
            let weak = weak.clone();
            ControllerInner {
                query,
                debounced: Debounced::new(options.debounce_time(), move |args| {
                    if let Some(inner) = weak.upgrade() {
                        inner.fire_debounced(args);
                    }
                }),
                page_size,
                dispatching: ReentrantMutex::new(()),
                state: Mutex::new(ControllerState {
                    scope,
                    args,
                    status: None,
                    filter_editor_open: false,
                }),
            }
        });
        let controller = Self { inner };
        controller.apply(Change::Discrete, |_| {});
        controller
    }

    /// Start over for a new scope: default filter, paging and ordering, status cleared, fetched immediately.
    pub fn set_scope(&self, scope: L::Scope) {
        let page_size = self.inner.page_size;
        self.apply(Change::Discrete, |state| {
            state.args = L::default_args(&scope, page_size);
            state.scope = scope;
            state.status = None;
        });
    }

    /// Set (`Some`) or remove (`None`) one filter predicate. Goes back to the first page.
    pub fn set_filter_field(&self, key: L::FilterKey, value: Option<String>) {
        self.update_filter(|filter, _| match value {
            Some(value) => filter.with_field(key, value),
            None => filter.without_field(key),
        });
    }

    /// Free text filter input: lower-cased, and empty text removes the predicate.
    pub fn set_filter_text(&self, key: L::FilterKey, text: &str) {
        let value = (!text.is_empty()).then(|| text.to_lowercase());
        self.set_filter_field(key, value);
    }

    /// Remove several predicates at once. Status predicates removed this way also clear the status selector.
    pub fn clear_filter_fields(&self, keys: &[L::FilterKey]) {
        self.update_filter(|filter, status| {
            if keys.iter().any(|key| L::STATUS_KEYS.contains(key)) {
                *status = None;
            }
            filter.without_fields(keys)
        });
    }

    /// Select a status (or none): previous status predicates are removed before the new ones are applied.
    pub fn set_status_filter(&self, new_status: Option<L::Status>) {
        self.update_filter(|filter, status| {
            *status = new_status;
            filter
                .without_fields(L::STATUS_KEYS)
                .merge(new_status.map(L::status_predicates).unwrap_or_default())
        });
    }

    /// Replace the ordering. Keeps the page window as is.
    pub fn set_ordering(&self, ordering: Ordering<L::OrderBy>) {
        self.update_args(|args| args.with_order(ordering));
    }

    /// Click on the sort header of `field`: descending, then ascending, then back to the default ordering.
    pub fn cycle_sort_field(&self, field: L::OrderBy) {
        self.update_args(|args| args.with_order(args.order.cycled(field, L::default_ordering())));
    }

    /// Go to the 1-indexed `page`.
    pub fn set_page(&self, page: u32) {
        self.update_args(|args| args.with_pagination(args.pagination.with_page(page)));
    }

    /// Change the page size. The offset is kept, so the current page number may no longer line up.
    pub fn set_page_size(&self, take: u32) {
        self.update_args(|args| args.with_pagination(args.pagination.with_take(take)));
    }

    /// Back to the default filter of the scope with the status selector cleared and the editor closed, fetched
    /// immediately.
    pub fn reset_filter(&self) {
        self.apply(Change::Discrete, |state| {
            state.args = state.args.with_filter(L::default_filter(&state.scope));
            state.status = None;
            state.filter_editor_open = false;
        });
    }

    /// Open the filter editor.
    pub fn open_filter_editor(&self) {
        self.inner.state.lock().filter_editor_open = true;
    }

    /// Close the filter editor. Edits already apply as they're made, so nothing is fetched.
    pub fn close_filter_editor(&self) {
        self.inner.state.lock().filter_editor_open = false;
    }

    /// Submitting the filter form only closes the editor.
    pub fn submit_filter_editor(&self) {
        self.close_filter_editor();
    }

    /// Refetch the current arguments, ignoring the cache.
    pub fn refresh(&self) {
        let _dispatching = self.inner.dispatching.lock();
        self.inner.debounced.cancel();
        let args = self.args();
        self.inner.query.scope().invalidate(&args);
        self.inner.query.trigger(args);
    }

    /// The current arguments. May be ahead of [`QueryResult::original_args`] while a debounced fetch is pending.
    pub fn args(&self) -> ListArgs<L> {
        self.inner.state.lock().args.clone()
    }

    /// The current scope.
    pub fn scope(&self) -> L::Scope {
        self.inner.state.lock().scope.clone()
    }

    /// The current filter.
    pub fn filter(&self) -> Filter<L::FilterKey> {
        self.inner.state.lock().args.filter.clone()
    }

    /// The current ordering.
    pub fn ordering(&self) -> Ordering<L::OrderBy> {
        self.inner.state.lock().args.order
    }

    /// The current page window.
    pub fn pagination(&self) -> SkipPaging {
        self.inner.state.lock().args.pagination
    }

    /// The current 1-indexed page.
    pub fn page(&self) -> u32 {
        self.pagination().page()
    }

    /// The selected status.
    pub fn status(&self) -> Option<L::Status> {
        self.inner.state.lock().status
    }

    /// Whether the filter editor is open.
    pub fn is_filter_editor_open(&self) -> bool {
        self.inner.state.lock().filter_editor_open
    }

    /// Whether a debounced fetch is waiting to fire.
    pub fn has_pending_fetch(&self) -> bool {
        self.inner.debounced.is_pending()
    }

    /// The latest query result.
    pub fn result(&self) -> QueryResult<ListArgs<L>, PagedResult<L::Row>> {
        self.inner.query.result()
    }

    /// How the sort header of `field` should render.
    pub fn sort_indicator(&self, field: L::OrderBy) -> SortIndicator {
        let order = self.ordering();
        if order.order_by == field {
            SortIndicator {
                active: true,
                direction: order.order_direction,
            }
        } else {
            SortIndicator {
                active: false,
                direction: OrderDirection::Desc,
            }
        }
    }

    /// Everything needed to render the list right now.
    pub fn view(&self) -> ListViewState<L::Row> {
        let result = self.result();
        let (pagination, can_reset_filter, filter_editor_open) = {
            let state = self.inner.state.lock();
            (
                state.args.pagination,
                !state.args.filter.is_empty(),
                state.filter_editor_open,
            )
        };
        let rows = result.rows().to_vec();
        ListViewState {
            show_empty: result.is_success && rows.is_empty(),
            show_pagination: !rows.is_empty(),
            has_next_page: result.has_next_page(),
            is_loading: result.is_loading,
            is_fetching: result.is_fetching,
            page: pagination.page(),
            page_size: pagination.take,
            error: result.error,
            can_reset_filter,
            filter_editor_open,
            rows,
        }
    }

    /// Call `callback` on every change of the query result until the returned [`Subscription`] is dropped.
    pub fn subscribe(
        &self,
        callback: impl Fn(&QueryResult<ListArgs<L>, PagedResult<L::Row>>) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.query.subscribe(callback)
    }

    fn update_filter(
        &self,
        f: impl FnOnce(&Filter<L::FilterKey>, &mut Option<L::Status>) -> Filter<L::FilterKey>,
    ) {
        self.apply(Change::FilterEdit, |state| {
            let filter = f(&state.args.filter, &mut state.status);
            state.args = state.args.with_filter(filter);
        });
    }

    fn update_args(&self, f: impl FnOnce(&ListArgs<L>) -> ListArgs<L>) {
        self.apply(Change::Discrete, |state| state.args = f(&state.args));
    }

    /// Change the state and dispatch the fetch of the resulting arguments, without another change getting in between.
    fn apply(&self, change: Change, f: impl FnOnce(&mut ControllerState<L>)) {
        let _dispatching = self.inner.dispatching.lock();
        let args = {
            let mut state = self.inner.state.lock();
            f(&mut *state);
            state.args.clone()
        };
        self.dispatch(args, change);
    }

    fn cadence(&self, args: &ListArgs<L>, change: Change) -> FetchCadence {
        match change {
            Change::Discrete => FetchCadence::Immediate,
            Change::FilterEdit => match self.inner.query.original_args() {
                Some(last) if args.differs_only_in_filter(&last) => FetchCadence::Debounced,
                _ => FetchCadence::Immediate,
            },
        }
    }

    fn dispatch(&self, args: ListArgs<L>, change: Change) {
        let cadence = self.cadence(&args, change);
        tracing::debug!(
            scope = self.inner.query.scope().title(),
            ?cadence,
            chain_id = args.chain_id,
            skip = args.pagination.skip,
            take = args.pagination.take,
            "query arguments changed"
        );
        match cadence {
            FetchCadence::Debounced => self.inner.debounced.call(args),
            FetchCadence::Immediate => {
                // A pending debounced snapshot is older than this one, it must not fire after it:
                self.inner.debounced.cancel();
                self.inner.query.trigger(args);
            }
        }
    }
}
