use std::fmt::Debug;

use crate::{
    FetchError, Filter, LazyQuery, OrderDirection, Ordering, PagedResult, QueryArguments, QueryScope,
    SkipPaging, filter::FieldName,
};

/// The arguments a [`ListView`] is queried with.
pub type ListArgs<L> = QueryArguments<<L as ListView>::FilterKey, <L as ListView>::OrderBy>;

/// The [`QueryScope`] a [`ListView`] fetches through.
pub type ListScope<L> = QueryScope<ListArgs<L>, PagedResult<<L as ListView>::Row>>;

/// The [`LazyQuery`] a [`ListView`] fetches with.
pub type ListQuery<L> = LazyQuery<ListArgs<L>, PagedResult<<L as ListView>::Row>>;

/// The definition of a paginated, filterable, sortable list: what it is scoped to and what it starts out as.
///
/// Implemented by marker types, driven by a [`crate::QueryController`].
pub trait ListView: Sized + Send + Sync + 'static {
    /// What the list is about, e.g. a network and an account.
    type Scope: Clone + PartialEq + Debug + Send + Sync + 'static;
    /// Filter keys.
    type FilterKey: FieldName;
    /// Sortable fields.
    type OrderBy: FieldName;
    /// The status selector of the filter editor. Use [`std::convert::Infallible`] when there is none.
    type Status: Copy + Eq + Debug + Send + Sync + 'static;
    /// The rows.
    type Row: Clone + Send + Sync + 'static;

    /// Every filter key a status may set.
    const STATUS_KEYS: &'static [Self::FilterKey];

    /// The chain `scope` lives on.
    fn chain_id(scope: &Self::Scope) -> u64;

    /// The filter of a freshly opened or reset list.
    fn default_filter(scope: &Self::Scope) -> Filter<Self::FilterKey>;

    /// The ordering of a freshly opened list, and the one a sort cycle ends on.
    fn default_ordering() -> Ordering<Self::OrderBy>;

    /// The predicates selecting `status`. Must only use [`ListView::STATUS_KEYS`].
    fn status_predicates(status: Self::Status) -> Vec<(Self::FilterKey, String)>;

    /// The arguments of a freshly opened list.
    fn default_args(scope: &Self::Scope, page_size: u32) -> ListArgs<Self> {
        QueryArguments {
            chain_id: Self::chain_id(scope),
            filter: Self::default_filter(scope),
            pagination: SkipPaging::new(page_size),
            order: Self::default_ordering(),
        }
    }
}

/// How a sort header should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortIndicator {
    /// The list is sorted on this field.
    pub active: bool,
    /// The current direction when active, otherwise the direction a click would sort in.
    pub direction: OrderDirection,
}

/// Everything needed to render a list, derived from a controller and its latest query result.
#[derive(Debug, Clone, PartialEq)]
pub struct ListViewState<R> {
    /// Rows of the current page.
    pub rows: Vec<R>,
    /// Show a loading indicator, nothing has loaded yet.
    pub is_loading: bool,
    /// A fetch is in flight, e.g. to disable pagination controls.
    pub is_fetching: bool,
    /// Show a "no results" message.
    pub show_empty: bool,
    /// Show the pagination footer.
    pub show_pagination: bool,
    /// Enable the next page control.
    pub has_next_page: bool,
    /// Current 1-indexed page.
    pub page: u32,
    /// Current page size.
    pub page_size: u32,
    /// The last fetch failed.
    pub error: Option<FetchError>,
    /// Show the filter reset control.
    pub can_reset_filter: bool,
    /// The filter editor is open.
    pub filter_editor_open: bool,
}
