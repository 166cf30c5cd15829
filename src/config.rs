use crate::driver::NodeOptions;
use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// NodeConfig is everything one node process needs to start, read from the environment.
///
/// * `ID` - this node's id, `1..=N+1` for `N` peers (default `1`, also when blank)
/// * `PEERS` - comma separated transport addresses of the other nodes, in cluster order
/// * `API_ADDRESS` - KV API listen address (default `0.0.0.0:8000`)
/// * `PEER_ADDRESS` - peer transport listen address (default `0.0.0.0:8001`)
/// * `DEBUG` - `true` (any case) to enable debug logs; anything else leaves them off
/// * `LOG_DIRECTORY` - write logs to a file in this directory instead of stdout
///
/// Addresses may omit the host (`:8000`), meaning all interfaces.
#[derive(Clone)]
pub struct NodeConfig {
    pub id: u64,
    pub peers: Vec<String>,
    pub api_addr: SocketAddr,
    pub peer_addr: String,
    pub debug: bool,
    pub log_directory: Option<PathBuf>,
    pub options: NodeOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ID must be a node number, got '{0}'")]
    InvalidId(String),
    #[error("PEERS contains an empty address at position {0}")]
    EmptyPeer(usize),
    #[error("API_ADDRESS '{value}' is not a socket address")]
    InvalidApiAddress { value: String, source: AddrParseError },
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        NodeConfig::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let id = match lookup("ID").filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidId(raw))?,
            None => 1,
        };

        let peers = parse_peers(&lookup("PEERS").unwrap_or_default())?;

        let raw_api_addr = lookup("API_ADDRESS").unwrap_or_else(|| ":8000".to_string());
        let api_addr = with_default_host(&raw_api_addr)
            .parse()
            .map_err(|source| ConfigError::InvalidApiAddress {
                value: raw_api_addr.clone(),
                source,
            })?;

        let peer_addr = with_default_host(&lookup("PEER_ADDRESS").unwrap_or_else(|| ":8001".to_string()));

        let debug = lookup("DEBUG").map_or(false, |raw| raw.trim().eq_ignore_ascii_case("true"));

        Ok(NodeConfig {
            id,
            peers,
            api_addr,
            peer_addr,
            debug,
            log_directory: lookup("LOG_DIRECTORY").filter(|d| !d.is_empty()).map(PathBuf::from),
            options: NodeOptions::default(),
        })
    }
}

fn parse_peers(raw: &str) -> Result<Vec<String>, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(vec![]);
    }

    raw.split(',')
        .enumerate()
        .map(|(position, peer)| {
            let peer = peer.trim();
            if peer.is_empty() {
                Err(ConfigError::EmptyPeer(position))
            } else {
                Ok(peer.to_string())
            }
        })
        .collect()
}

fn with_default_host(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}
