use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use parking_lot::RwLock;

use crate::{
    FetchError, PagedResult, QueryArguments,
    entities::{
        Entity, Stream, StreamFilterKey, StreamOrderBy, StreamPeriod, StreamPeriodFilterKey,
        StreamPeriodOrderBy,
    },
};

/// Arguments of a [`Stream`] list query.
pub type StreamsQuery = QueryArguments<StreamFilterKey, StreamOrderBy>;

/// Arguments of a [`StreamPeriod`] list query.
pub type StreamPeriodsQuery = QueryArguments<StreamPeriodFilterKey, StreamPeriodOrderBy>;

/// Arguments of a single [`Stream`] lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamArgs {
    /// The chain to look on.
    pub chain_id: u64,
    /// The stream id.
    pub id: String,
}

/// The indexed read API the explorer queries.
///
/// Implementations must be cheap to call concurrently, the returned futures are spawned on the ambient executor.
pub trait Subgraph: Send + Sync + 'static {
    /// One page of streams.
    fn streams(&self, args: StreamsQuery) -> BoxFuture<'static, Result<PagedResult<Stream>, FetchError>>;

    /// A single stream, `None` when no stream has that id.
    fn stream(&self, args: StreamArgs) -> BoxFuture<'static, Result<Option<Stream>, FetchError>>;

    /// One page of stream periods.
    fn stream_periods(
        &self,
        args: StreamPeriodsQuery,
    ) -> BoxFuture<'static, Result<PagedResult<StreamPeriod>, FetchError>>;
}

/// Apply `args` to `items`: filter, sort (id breaking ties) and cut out the requested page.
pub fn select<E: Entity>(items: &[E], args: &QueryArguments<E::FilterKey, E::OrderBy>) -> PagedResult<E> {
    let mut selected = items
        .iter()
        .filter(|item| args.filter.iter().all(|(key, value)| item.matches(key, value)))
        .cloned()
        .collect::<Vec<_>>();
    selected.sort_by(|a, b| {
        let by_field = a.cmp_by(b, args.order.order_by);
        let by_field = match args.order.order_direction {
            crate::OrderDirection::Asc => by_field,
            crate::OrderDirection::Desc => by_field.reverse(),
        };
        by_field.then_with(|| a.id().cmp(b.id()))
    });

    let paging = args.pagination;
    // One extra, only to learn whether there's a next page:
    let window = selected
        .into_iter()
        .skip(paging.skip as usize)
        .take((paging.take as usize).saturating_add(1))
        .collect();
    PagedResult::from_lookahead(window, paging)
}

#[derive(Debug, Default)]
struct ChainData {
    streams: Vec<Stream>,
    stream_periods: Vec<StreamPeriod>,
}

/// A [`Subgraph`] over data held in memory, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySubgraph {
    chains: Arc<RwLock<HashMap<u64, ChainData>>>,
}

impl MemorySubgraph {
    /// An empty subgraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace (by id) a stream on `chain_id`.
    pub fn insert_stream(&self, chain_id: u64, stream: Stream) {
        let mut chains = self.chains.write();
        let streams = &mut chains.entry(chain_id).or_default().streams;
        streams.retain(|existing| existing.id != stream.id);
        streams.push(stream);
    }

    /// Add or replace (by id) a stream period on `chain_id`.
    pub fn insert_stream_period(&self, chain_id: u64, period: StreamPeriod) {
        let mut chains = self.chains.write();
        let periods = &mut chains.entry(chain_id).or_default().stream_periods;
        periods.retain(|existing| existing.id != period.id);
        periods.push(period);
    }

    fn with_chain<T>(&self, chain_id: u64, f: impl FnOnce(&ChainData) -> T) -> T {
        let chains = self.chains.read();
        match chains.get(&chain_id) {
            Some(chain) => f(chain),
            None => f(&ChainData::default()),
        }
    }
}

impl Subgraph for MemorySubgraph {
    fn streams(&self, args: StreamsQuery) -> BoxFuture<'static, Result<PagedResult<Stream>, FetchError>> {
        let page = self.with_chain(args.chain_id, |chain| select(&chain.streams, &args));
        Box::pin(async move { Ok(page) })
    }

    fn stream(&self, args: StreamArgs) -> BoxFuture<'static, Result<Option<Stream>, FetchError>> {
        let stream = self.with_chain(args.chain_id, |chain| {
            chain
                .streams
                .iter()
                .find(|stream| stream.id.eq_ignore_ascii_case(&args.id))
                .cloned()
        });
        Box::pin(async move { Ok(stream) })
    }

    fn stream_periods(
        &self,
        args: StreamPeriodsQuery,
    ) -> BoxFuture<'static, Result<PagedResult<StreamPeriod>, FetchError>> {
        let page = self.with_chain(args.chain_id, |chain| select(&chain.stream_periods, &args));
        Box::pin(async move { Ok(page) })
    }
}
