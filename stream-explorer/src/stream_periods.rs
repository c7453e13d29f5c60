use std::convert::Infallible;

use crate::{
    Filter, Network, Ordering,
    entities::{StreamPeriod, StreamPeriodFilterKey, StreamPeriodOrderBy},
    list_view::ListView,
};

/// A list scoped to one stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamScope {
    /// The network the stream lives on.
    pub network: Network,
    /// The stream id.
    pub stream_id: String,
}

/// The periods of a stream, latest first.
#[derive(Debug, Clone, Copy)]
pub struct StreamPeriodsView;

impl ListView for StreamPeriodsView {
    type Scope = StreamScope;
    type FilterKey = StreamPeriodFilterKey;
    type OrderBy = StreamPeriodOrderBy;
    type Status = Infallible;
    type Row = StreamPeriod;

    const STATUS_KEYS: &'static [StreamPeriodFilterKey] = &[];

    fn chain_id(scope: &StreamScope) -> u64 {
        scope.network.chain_id
    }

    fn default_filter(scope: &StreamScope) -> Filter<StreamPeriodFilterKey> {
        Filter::new().with_field(StreamPeriodFilterKey::Stream, scope.stream_id.clone())
    }

    fn default_ordering() -> Ordering<StreamPeriodOrderBy> {
        Ordering::desc(StreamPeriodOrderBy::StartedAtTimestamp)
    }

    fn status_predicates(status: Infallible) -> Vec<(StreamPeriodFilterKey, String)> {
        match status {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkRegistry;

    #[test]
    fn defaults() {
        let scope = StreamScope {
            network: NetworkRegistry::builtin().find("xdai").cloned().unwrap(),
            stream_id: "0xa-0xb-0xc-0".to_string(),
        };
        let args = StreamPeriodsView::default_args(&scope, 10);
        assert_eq!(args.chain_id, 100);
        assert_eq!(args.filter.get(StreamPeriodFilterKey::Stream), Some("0xa-0xb-0xc-0"));
        assert_eq!(args.order, Ordering::desc(StreamPeriodOrderBy::StartedAtTimestamp));
    }
}
