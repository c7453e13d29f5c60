use std::sync::Arc;

use crate::{
    ExplorerError, ExplorerOptions, NetworkRegistry, PagedResult, QueryController, QueryScope,
    entities::{Stream, StreamPeriod},
    stream_page::{StreamPage, StreamPageParams},
    stream_periods::{StreamPeriodsView, StreamScope},
    streams::{AccountScope, IncomingStreamsView, OutgoingStreamsView},
    subgraph::{StreamArgs, StreamPeriodsQuery, StreamsQuery, Subgraph},
};

/// The explorer's services: the networks, the subgraph and the query caches shared by every view.
///
/// Create one at startup and hand out clones, they share everything.
#[derive(Debug, Clone)]
pub struct Explorer {
    options: ExplorerOptions,
    networks: Arc<NetworkRegistry>,
    streams: QueryScope<StreamsQuery, PagedResult<Stream>>,
    stream: QueryScope<StreamArgs, Option<Stream>>,
    stream_periods: QueryScope<StreamPeriodsQuery, PagedResult<StreamPeriod>>,
}

impl Explorer {
    /// An explorer over `subgraph` with the builtin networks and default options.
    pub fn new(subgraph: impl Subgraph) -> Self {
        let subgraph: Arc<dyn Subgraph> = Arc::new(subgraph);
        Self {
            options: ExplorerOptions::default(),
            networks: Arc::new(NetworkRegistry::builtin()),
            streams: QueryScope::new("streams", {
                let subgraph = subgraph.clone();
                move |args: StreamsQuery| subgraph.streams(args)
            }),
            stream: QueryScope::new("stream", {
                let subgraph = subgraph.clone();
                move |args: StreamArgs| subgraph.stream(args)
            }),
            stream_periods: QueryScope::new("stream_periods", move |args: StreamPeriodsQuery| {
                subgraph.stream_periods(args)
            }),
        }
    }

    /// Replace the options. Affects views created afterwards.
    pub fn with_options(mut self, options: ExplorerOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the network registry.
    pub fn with_networks(mut self, networks: NetworkRegistry) -> Self {
        self.networks = Arc::new(networks);
        self
    }

    /// The options views are created with.
    pub fn options(&self) -> &ExplorerOptions {
        &self.options
    }

    /// The known networks.
    pub fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    /// Resolve an account route.
    pub fn account_scope(&self, network: Option<&str>, account: &str) -> Result<AccountScope, ExplorerError> {
        AccountScope::new(self.networks.resolve(network)?, account)
    }

    /// The incoming streams table of an account, fetching its first page.
    pub fn incoming_streams(&self, scope: AccountScope) -> QueryController<IncomingStreamsView> {
        QueryController::new(
            self.streams.lazy(self.options.query_options()),
            scope,
            &self.options,
        )
    }

    /// The outgoing streams table of an account, fetching its first page.
    pub fn outgoing_streams(&self, scope: AccountScope) -> QueryController<OutgoingStreamsView> {
        QueryController::new(
            self.streams.lazy(self.options.query_options()),
            scope,
            &self.options,
        )
    }

    /// The period table of a stream, fetching its first page.
    pub fn stream_periods(&self, scope: StreamScope) -> QueryController<StreamPeriodsView> {
        QueryController::new(
            self.stream_periods.lazy(self.options.query_options()),
            scope,
            &self.options,
        )
    }

    /// Resolve a stream route and start loading the page.
    pub fn stream_page(&self, network: Option<&str>, id: Option<&str>) -> Result<StreamPage, ExplorerError> {
        let params = StreamPageParams::resolve(&self.networks, network, id)?;
        let periods = self.stream_periods(params.periods_scope());
        Ok(StreamPage::new(
            params,
            self.stream.lazy(self.options.query_options()),
            periods,
        ))
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        self.streams.invalidate_all();
        self.stream.invalidate_all();
        self.stream_periods.invalidate_all();
    }
}
