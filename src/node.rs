use crate::api::KvRpcServer;
use crate::config::NodeConfig;
use crate::driver::{start_node, DriverError, NodeOptionsError, NodeOptionsValidated, StartNodeConfig, StartNodeError};
use crate::store::KvStore;
use crate::transport::{TcpTransport, Transport, TransportError};
use std::convert::TryFrom;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Options(#[from] NodeOptionsError),
    #[error("failed to start node")]
    Start(#[from] StartNodeError),
    #[error("replication driver failed")]
    Driver(#[from] DriverError),
    #[error("peer transport failed")]
    Transport(#[from] TransportError),
    #[error("KV API server failed")]
    Api(#[from] tonic::transport::Error),
    #[error("node task panicked")]
    TaskPanicked(#[from] JoinError),
}

/// Run one node until `cancel` fires or any of its tasks fails. The replication driver, inbound
/// stepper, peer listener and KV API each run as their own task. The first failure cancels the
/// rest and is returned once every task has stopped.
pub async fn run_node(config: NodeConfig, logger: slog::Logger, cancel: CancellationToken) -> Result<(), NodeError> {
    let options = NodeOptionsValidated::try_from(config.options)?;

    let (inbound_tx, inbound_rx) = mpsc::channel(options.inbound_queue_depth);
    let store = Arc::new(KvStore::new());
    let transport = Arc::new(TcpTransport::new(
        logger.new(slog::o!("component" => "transport")),
        config.peer_addr,
        inbound_tx,
        options.transport,
    ));

    let node = start_node(StartNodeConfig {
        logger: logger.clone(),
        my_id: config.id,
        peer_addresses: config.peers,
        options: options.clone(),
        store: store.clone(),
        transport: transport.clone(),
        inbound: inbound_rx,
    })?;

    let api = KvRpcServer::new(
        logger.new(slog::o!("component" => "api")),
        node.engine.clone(),
        store,
        options.propose_timeout,
    );

    let stepper = node.stepper;
    let tasks = vec![
        supervise(cancel.clone(), node.driver.run(cancel.clone())),
        supervise(cancel.clone(), {
            let cancel = cancel.clone();
            async move {
                stepper.run(cancel).await;
                Ok::<(), NodeError>(())
            }
        }),
        supervise(cancel.clone(), {
            let cancel = cancel.clone();
            async move { transport.listen(cancel).await }
        }),
        supervise(cancel.clone(), api.run(config.api_addr, cancel.clone())),
    ];

    let mut first_error = None;
    for task in tasks {
        let result = task.await.map_err(NodeError::from).and_then(|result| result);
        if let Err(e) = result {
            cancel.cancel();
            slog::error!(logger, "Node task failed: {:?}", e);
            first_error.get_or_insert(e);
        }
    }

    slog::info!(logger, "Node {} has stopped", config.id);
    first_error.map_or(Ok(()), Err)
}

/// Spawn `task`, cancelling the whole node if it fails.
fn supervise<F, E>(cancel: CancellationToken, task: F) -> JoinHandle<Result<(), NodeError>>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<NodeError> + Send + 'static,
{
    tokio::spawn(async move {
        let result = task.await.map_err(Into::into);
        if result.is_err() {
            cancel.cancel();
        }
        result
    })
}
