//! Stream lists of an account.

use crate::{
    ExplorerError, Filter, Network, Ordering,
    entities::{Stream, StreamFilterKey, StreamOrderBy, normalize_address},
    list_view::ListView,
};

/// A list scoped to one account on one network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountScope {
    /// The network the account lives on.
    pub network: Network,
    /// Lower-cased account address.
    pub account: String,
}

impl AccountScope {
    /// Scope to `account` on `network`, failing with [`ExplorerError::NotFound`] for something that isn't an address.
    pub fn new(network: Network, account: &str) -> Result<Self, ExplorerError> {
        Ok(Self {
            network,
            account: normalize_address(account)?,
        })
    }
}

/// The status selector of stream lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamStatus {
    /// Streams with a flow rate above zero.
    Active,
    /// Closed streams.
    Inactive,
}

fn stream_status_predicates(status: StreamStatus) -> Vec<(StreamFilterKey, String)> {
    match status {
        StreamStatus::Active => vec![(StreamFilterKey::CurrentFlowRateGt, "0".to_string())],
        StreamStatus::Inactive => vec![(StreamFilterKey::CurrentFlowRate, "0".to_string())],
    }
}

const STREAM_STATUS_KEYS: &[StreamFilterKey] = &[
    StreamFilterKey::CurrentFlowRate,
    StreamFilterKey::CurrentFlowRateGt,
];

/// Streams flowing into an account, most recently updated first.
///
/// Filtered by sender with [`StreamFilterKey::SenderContains`].
#[derive(Debug, Clone, Copy)]
pub struct IncomingStreamsView;

impl ListView for IncomingStreamsView {
    type Scope = AccountScope;
    type FilterKey = StreamFilterKey;
    type OrderBy = StreamOrderBy;
    type Status = StreamStatus;
    type Row = Stream;

    const STATUS_KEYS: &'static [StreamFilterKey] = STREAM_STATUS_KEYS;

    fn chain_id(scope: &AccountScope) -> u64 {
        scope.network.chain_id
    }

    fn default_filter(scope: &AccountScope) -> Filter<StreamFilterKey> {
        Filter::new().with_field(StreamFilterKey::Receiver, scope.account.to_lowercase())
    }

    fn default_ordering() -> Ordering<StreamOrderBy> {
        Ordering::desc(StreamOrderBy::UpdatedAtTimestamp)
    }

    fn status_predicates(status: StreamStatus) -> Vec<(StreamFilterKey, String)> {
        stream_status_predicates(status)
    }
}

/// Streams flowing out of an account, most recently updated first.
///
/// Filtered by receiver with [`StreamFilterKey::ReceiverContains`].
#[derive(Debug, Clone, Copy)]
pub struct OutgoingStreamsView;

impl ListView for OutgoingStreamsView {
    type Scope = AccountScope;
    type FilterKey = StreamFilterKey;
    type OrderBy = StreamOrderBy;
    type Status = StreamStatus;
    type Row = Stream;

    const STATUS_KEYS: &'static [StreamFilterKey] = STREAM_STATUS_KEYS;

    fn chain_id(scope: &AccountScope) -> u64 {
        scope.network.chain_id
    }

    fn default_filter(scope: &AccountScope) -> Filter<StreamFilterKey> {
        Filter::new().with_field(StreamFilterKey::Sender, scope.account.to_lowercase())
    }

    fn default_ordering() -> Ordering<StreamOrderBy> {
        Ordering::desc(StreamOrderBy::UpdatedAtTimestamp)
    }

    fn status_predicates(status: StreamStatus) -> Vec<(StreamFilterKey, String)> {
        stream_status_predicates(status)
    }
}
