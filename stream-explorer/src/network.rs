use serde::{Deserialize, Serialize};

use crate::{EntityKind, ExplorerError};

/// A chain the protocol is deployed on, with the subgraph indexing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Human readable name, e.g. `Polygon`.
    pub display_name: String,
    /// The name used in routes, e.g. `matic`.
    pub slug: String,
    /// EVM chain id.
    pub chain_id: u64,
    /// Whether this is a testnet.
    pub is_testnet: bool,
    /// Where the subgraph for this chain is served.
    pub subgraph_url: String,
}

impl Network {
    fn builtin(display_name: &str, slug: &str, chain_id: u64, is_testnet: bool) -> Self {
        Self {
            display_name: display_name.to_string(),
            slug: slug.to_string(),
            chain_id,
            is_testnet,
            subgraph_url: format!(
                "https://api.thegraph.com/subgraphs/name/superfluid-finance/protocol-v1-{slug}"
            ),
        }
    }
}

/// The networks the explorer knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: Vec<Network>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NetworkRegistry {
    /// A registry of exactly `networks`.
    pub fn new(networks: Vec<Network>) -> Self {
        Self { networks }
    }

    /// The networks the protocol is deployed on.
    pub fn builtin() -> Self {
        Self::new(vec![
            Network::builtin("Polygon", "matic", 137, false),
            Network::builtin("xDAI", "xdai", 100, false),
            Network::builtin("Ropsten", "ropsten", 3, true),
            Network::builtin("Rinkeby", "rinkeby", 4, true),
            Network::builtin("Goerli", "goerli", 5, true),
            Network::builtin("Kovan", "kovan", 42, true),
            Network::builtin("Mumbai", "mumbai", 80001, true),
            Network::builtin("Arbitrum Rinkeby", "arbitrum-rinkeby", 421611, true),
            Network::builtin("Optimism Kovan", "optimism-kovan", 69, true),
            Network::builtin("Avalanche Fuji", "avalanche-fuji", 43113, true),
        ])
    }

    /// All networks, mainnets first.
    pub fn iter(&self) -> impl Iterator<Item = &Network> + '_ {
        self.networks
            .iter()
            .filter(|network| !network.is_testnet)
            .chain(self.networks.iter().filter(|network| network.is_testnet))
    }

    /// Look up a network by slug (case insensitive) or by chain id.
    pub fn find(&self, name_or_chain_id: &str) -> Option<&Network> {
        let needle = name_or_chain_id.trim();
        if let Ok(chain_id) = needle.parse::<u64>() {
            return self.by_chain_id(chain_id);
        }
        self.networks
            .iter()
            .find(|network| network.slug.eq_ignore_ascii_case(needle))
    }

    /// Look up a network by chain id.
    pub fn by_chain_id(&self, chain_id: u64) -> Option<&Network> {
        self.networks
            .iter()
            .find(|network| network.chain_id == chain_id)
    }

    /// Like [`NetworkRegistry::find`], but a missing name is an error too.
    pub fn resolve(&self, name_or_chain_id: Option<&str>) -> Result<Network, ExplorerError> {
        let name = name_or_chain_id.ok_or_else(|| ExplorerError::not_found(EntityKind::Network, ""))?;
        self.find(name)
            .cloned()
            .ok_or_else(|| ExplorerError::UnknownNetwork(name.to_string()))
    }
}
