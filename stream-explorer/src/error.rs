use std::fmt;

/// Errors surfaced by the explorer outside of a fetch result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplorerError {
    /// An entity or route parameter could not be resolved.
    #[error("{kind} {id:?} not found")]
    NotFound {
        /// What was being looked up.
        kind: EntityKind,
        /// The identifier as received, empty when it was missing entirely.
        id: String,
    },
    /// A network name or chain id that isn't in the registry.
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),
    /// A fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ExplorerError {
    /// Shorthand for [`ExplorerError::NotFound`].
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether this error should be shown as a "not found" page.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnknownNetwork(_))
    }
}

/// The kinds of entity the explorer resolves by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A token stream.
    Stream,
    /// An account address.
    Account,
    /// A network.
    Network,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Stream => write!(f, "stream"),
            EntityKind::Account => write!(f, "account"),
            EntityKind::Network => write!(f, "network"),
        }
    }
}

/// A failed fetch. Kept [`Clone`] so it can live in cached results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The subgraph rejected or failed the request.
    #[error("subgraph request failed: {0}")]
    Subgraph(String),
    /// The subgraph answered with data that couldn't be interpreted.
    #[error("could not decode subgraph response: {0}")]
    Decode(String),
}
