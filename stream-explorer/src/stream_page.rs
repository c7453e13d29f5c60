//! The stream detail page: one stream and its periods.

use std::{fmt, str::FromStr};

use crate::{
    EntityKind, ExplorerError, FetchError, LazyQuery, Network, NetworkRegistry, QueryController,
    entities::{Stream, normalize_address},
    stream_periods::{StreamPeriodsView, StreamScope},
    subgraph::StreamArgs,
};

/// A parsed stream id, `{sender}-{receiver}-{token}-{revisionIndex}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId {
    /// Sending account, lower-cased.
    pub sender: String,
    /// Receiving account, lower-cased.
    pub receiver: String,
    /// Super token, lower-cased.
    pub token: String,
    /// How many times a stream between these accounts was reopened before this one.
    pub revision_index: u32,
}

impl FromStr for StreamId {
    type Err = ExplorerError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let not_found = || ExplorerError::not_found(EntityKind::Stream, id);
        let mut parts = id.trim().split('-');
        let (Some(sender), Some(receiver), Some(token), Some(revision), None) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(not_found());
        };
        Ok(Self {
            sender: normalize_address(sender).map_err(|_| not_found())?,
            receiver: normalize_address(receiver).map_err(|_| not_found())?,
            token: normalize_address(token).map_err(|_| not_found())?,
            revision_index: revision.parse().map_err(|_| not_found())?,
        })
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.sender, self.receiver, self.token, self.revision_index
        )
    }
}

/// The route parameters of a stream page, resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPageParams {
    /// The network from the route.
    pub network: Network,
    /// The stream id from the route.
    pub id: StreamId,
}

impl StreamPageParams {
    /// Resolve raw route parameters. A missing or malformed parameter, or an unknown network, is a not found error.
    pub fn resolve(
        registry: &NetworkRegistry,
        network: Option<&str>,
        id: Option<&str>,
    ) -> Result<Self, ExplorerError> {
        let network = registry.resolve(network)?;
        let id = id
            .ok_or_else(|| ExplorerError::not_found(EntityKind::Stream, ""))?
            .parse()?;
        Ok(Self { network, id })
    }

    /// The lookup arguments for the stream.
    pub fn stream_args(&self) -> StreamArgs {
        StreamArgs {
            chain_id: self.network.chain_id,
            id: self.id.to_string(),
        }
    }

    /// The scope of the stream's period list.
    pub fn periods_scope(&self) -> StreamScope {
        StreamScope {
            network: self.network.clone(),
            stream_id: self.id.to_string(),
        }
    }
}

/// What the stream page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamPageState {
    /// Nothing has loaded yet.
    Loading,
    /// The stream.
    Loaded(Stream),
    /// The subgraph has no stream with this id.
    NotFound,
    /// The lookup failed and there is nothing to show.
    Failed(FetchError),
}

/// A stream detail page: the stream lookup plus a controller for its periods.
#[derive(Debug, Clone)]
pub struct StreamPage {
    params: StreamPageParams,
    stream: LazyQuery<StreamArgs, Option<Stream>>,
    periods: QueryController<StreamPeriodsView>,
}

impl StreamPage {
    /// Starts the stream lookup. `periods` should already be scoped to the stream.
    pub fn new(
        params: StreamPageParams,
        stream: LazyQuery<StreamArgs, Option<Stream>>,
        periods: QueryController<StreamPeriodsView>,
    ) -> Self {
        tracing::debug!(stream = %params.id, chain_id = params.network.chain_id, "opening stream page");
        stream.trigger(params.stream_args());
        Self {
            params,
            stream,
            periods,
        }
    }

    /// The resolved route.
    pub fn params(&self) -> &StreamPageParams {
        &self.params
    }

    /// The controller of the period list.
    pub fn periods(&self) -> &QueryController<StreamPeriodsView> {
        &self.periods
    }

    /// The stream lookup.
    pub fn stream_query(&self) -> &LazyQuery<StreamArgs, Option<Stream>> {
        &self.stream
    }

    /// What the page shows right now.
    pub fn state(&self) -> StreamPageState {
        let result = self.stream.result();
        match result.data {
            Some(Some(stream)) => StreamPageState::Loaded(stream),
            Some(None) => StreamPageState::NotFound,
            None => match result.error {
                Some(error) if !result.is_fetching => StreamPageState::Failed(error),
                _ => StreamPageState::Loading,
            },
        }
    }

    /// [`StreamPage::state`] as a result: `Ok(None)` while loading.
    pub fn stream(&self) -> Result<Option<Stream>, ExplorerError> {
        match self.state() {
            StreamPageState::Loading => Ok(None),
            StreamPageState::Loaded(stream) => Ok(Some(stream)),
            StreamPageState::NotFound => Err(ExplorerError::not_found(
                EntityKind::Stream,
                self.params.id.to_string(),
            )),
            StreamPageState::Failed(error) => Err(error.into()),
        }
    }

    /// Refetch the stream and its periods.
    pub fn refresh(&self) {
        self.stream.refetch();
        self.periods.refresh();
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;
    use crate::entities::tests::{ALICE, BOB, TOKEN};

    fn id() -> String {
        format!("{ALICE}-{BOB}-{TOKEN}-0")
    }

    #[test]
    fn parse_and_display() {
        let upper = format!("{}-{BOB}-{TOKEN}-3", ALICE.to_uppercase().replacen("0X", "0x", 1));
        let parsed = upper.parse::<StreamId>().unwrap();
        assert_eq!(parsed.sender, ALICE);
        assert_eq!(parsed.revision_index, 3);
        assert_eq!(parsed.to_string(), format!("{ALICE}-{BOB}-{TOKEN}-3"));
    }

    #[rstest]
    #[case(Some("matic"), None)]
    #[case(Some("matic"), Some("not-a-stream"))]
    #[case(Some("matic"), Some("0x1-0x2-0x3-0"))]
    #[case(None, Some("ok"))]
    #[case(Some("mainnet"), Some("ok"))]
    fn unresolvable_routes_are_not_found(#[case] network: Option<&str>, #[case] stream_id: Option<&str>) {
        let registry = NetworkRegistry::builtin();
        let valid = id();
        let stream_id = stream_id.map(|raw| if raw == "ok" { valid.as_str() } else { raw });
        let err = StreamPageParams::resolve(&registry, network, stream_id).unwrap_err();
        assert!(err.is_not_found(), "{err}");
    }

    #[test]
    fn resolves_route() {
        let params = StreamPageParams::resolve(&NetworkRegistry::builtin(), Some("xdai"), Some(&id())).unwrap();
        assert_eq!(params.stream_args(), StreamArgs { chain_id: 100, id: id() });
        assert_eq!(params.periods_scope().stream_id, id());
    }
}
