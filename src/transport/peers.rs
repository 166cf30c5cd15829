use std::collections::BTreeMap;

/// PeerTable maps consensus node ids to peer transport addresses.
///
/// A cluster of `N + 1` nodes uses ids `1..=N+1`. Each node is configured with the addresses of
/// the other `N` nodes, which are assigned ids in declared order, skipping the node's own id. The
/// local node has no address, so it is never dialed.
#[derive(Clone, Debug)]
pub struct PeerTable {
    my_id: u64,
    cluster_size: u64,
    addresses: BTreeMap<u64, String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PeerTableError {
    #[error("node id must be at least 1")]
    InvalidNodeId,
    #[error("node id {id} out of range for a cluster of {cluster_size} nodes")]
    NodeIdOutOfRange { id: u64, cluster_size: u64 },
    #[error("peer address at position {0} is empty")]
    EmptyAddress(usize),
}

impl PeerTable {
    pub fn new(my_id: u64, peer_addresses: Vec<String>) -> Result<Self, PeerTableError> {
        let cluster_size = peer_addresses.len() as u64 + 1;
        if my_id == 0 {
            return Err(PeerTableError::InvalidNodeId);
        }
        if my_id > cluster_size {
            return Err(PeerTableError::NodeIdOutOfRange {
                id: my_id,
                cluster_size,
            });
        }

        let peer_ids = (1..=cluster_size).filter(|id| *id != my_id);
        let mut addresses = BTreeMap::new();
        for (position, (id, address)) in peer_ids.zip(peer_addresses).enumerate() {
            let address = address.trim();
            if address.is_empty() {
                return Err(PeerTableError::EmptyAddress(position));
            }
            addresses.insert(id, address.to_string());
        }

        Ok(PeerTable {
            my_id,
            cluster_size,
            addresses,
        })
    }

    pub fn my_id(&self) -> u64 {
        self.my_id
    }

    /// Transport address for `id`. `None` for the local node and for ids outside the cluster.
    pub fn address(&self, id: u64) -> Option<&str> {
        self.addresses.get(&id).map(String::as_str)
    }

    /// Every node id in the cluster, the local one included, in ascending order.
    pub fn node_ids(&self) -> Vec<u64> {
        (1..=self.cluster_size).collect()
    }

    pub fn peer_ids(&self) -> Vec<u64> {
        self.addresses.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(addrs: &[&str]) -> Vec<String> {
        addrs.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn peers_skip_own_slot() {
        let table = PeerTable::new(2, addrs(&["a:1", "c:1"])).unwrap();

        assert_eq!(table.address(1), Some("a:1"));
        assert_eq!(table.address(2), None);
        assert_eq!(table.address(3), Some("c:1"));
        assert_eq!(table.address(4), None);
        assert_eq!(table.node_ids(), vec![1, 2, 3]);
        assert_eq!(table.peer_ids(), vec![1, 3]);
    }

    #[test]
    fn first_and_last_slot() {
        let first = PeerTable::new(1, addrs(&["b:1", "c:1"])).unwrap();
        assert_eq!(first.address(2), Some("b:1"));
        assert_eq!(first.address(3), Some("c:1"));

        let last = PeerTable::new(3, addrs(&["a:1", "b:1"])).unwrap();
        assert_eq!(last.address(1), Some("a:1"));
        assert_eq!(last.address(2), Some("b:1"));
    }

    #[test]
    fn single_node_cluster() {
        let table = PeerTable::new(1, vec![]).unwrap();

        assert_eq!(table.node_ids(), vec![1]);
        assert!(table.peer_ids().is_empty());
    }

    #[test]
    fn invalid_ids() {
        assert_eq!(PeerTable::new(0, addrs(&["a:1"])).unwrap_err(), PeerTableError::InvalidNodeId);
        assert_eq!(
            PeerTable::new(3, addrs(&["a:1"])).unwrap_err(),
            PeerTableError::NodeIdOutOfRange { id: 3, cluster_size: 2 }
        );
    }

    #[test]
    fn empty_address() {
        assert_eq!(
            PeerTable::new(1, addrs(&["a:1", " "])).unwrap_err(),
            PeerTableError::EmptyAddress(1)
        );
    }
}
