use crate::commitlog::InMemoryLog;
use crate::driver::{InboundStepper, NodeOptionsValidated, ReplicationDriver};
use crate::engine::{EngineConfig, EngineError, RawNodeEngine};
use crate::store::KvStore;
use crate::transport::{PeerTable, PeerTableError, Transport};
use raft::prelude::Message;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct StartNodeConfig<T> {
    pub logger: slog::Logger,
    pub my_id: u64,
    /// Transport addresses of every other node, in cluster order.
    pub peer_addresses: Vec<String>,
    pub options: NodeOptionsValidated,
    pub store: Arc<KvStore>,
    pub transport: Arc<T>,
    /// Receiving side of the queue the transport delivers inbound messages to.
    pub inbound: mpsc::Receiver<Message>,
}

pub struct StartedNode<T> {
    pub driver: ReplicationDriver<RawNodeEngine, InMemoryLog, T>,
    pub stepper: InboundStepper<RawNodeEngine>,
    pub engine: Arc<RawNodeEngine>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartNodeError {
    #[error("invalid cluster membership")]
    InvalidPeers(#[from] PeerTableError),
    #[error("failed to start consensus engine")]
    Engine(#[from] EngineError),
}

/// Build the peer table, log storage and consensus engine for one node, bootstrapped with every
/// node in the cluster as a voter. Neither loop is running until the caller spawns them.
pub fn start_node<T: Transport>(config: StartNodeConfig<T>) -> Result<StartedNode<T>, StartNodeError> {
    let StartNodeConfig {
        logger,
        my_id,
        peer_addresses,
        options,
        store,
        transport,
        inbound,
    } = config;

    let peers = PeerTable::new(my_id, peer_addresses)?;
    for id in peers.peer_ids() {
        slog::info!(logger, "Peer {} at '{}'", id, peers.address(id).unwrap_or_default());
    }

    let log = InMemoryLog::create(logger.new(slog::o!("component" => "log")), peers.node_ids());

    let engine = Arc::new(RawNodeEngine::start(
        EngineConfig {
            id: my_id,
            election_tick: options.election_tick,
            heartbeat_tick: options.heartbeat_tick,
            max_size_per_msg: options.max_size_per_msg,
            max_inflight_msgs: options.max_inflight_msgs,
        },
        log.storage(),
        logger.clone(),
    )?);

    let driver = ReplicationDriver::new(
        logger.new(slog::o!("component" => "driver")),
        engine.clone(),
        log,
        transport,
        peers,
        store,
        options.tick_interval,
    );
    let stepper = InboundStepper::new(
        logger.new(slog::o!("component" => "stepper")),
        engine.clone(),
        inbound,
        options.step_timeout,
    );

    Ok(StartedNode {
        driver,
        stepper,
        engine,
    })
}
