use crate::engine::ConsensusEngine;
use raft::prelude::Message;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;

/// InboundStepper drains messages received by the transport into the consensus engine. It runs
/// alongside the replication driver so network arrivals and ready processing never block each
/// other.
pub struct InboundStepper<E> {
    logger: slog::Logger,
    engine: Arc<E>,
    inbound: mpsc::Receiver<Message>,
    step_timeout: Duration,
}

impl<E: ConsensusEngine> InboundStepper<E> {
    pub fn new(logger: slog::Logger, engine: Arc<E>, inbound: mpsc::Receiver<Message>, step_timeout: Duration) -> Self {
        InboundStepper {
            logger,
            engine,
            inbound,
            step_timeout,
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                message = self.inbound.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            let from = message.get_from();
            // Stepping waits while the driver holds an outstanding batch.
            match time::timeout(self.step_timeout, self.engine.step(message)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => slog::debug!(self.logger, "Engine rejected message from node {}: {}", from, e),
                Err(_) => slog::warn!(self.logger, "Timed out stepping message from node {}", from),
            }
        }

        slog::info!(self.logger, "Inbound stepper has exited");
    }
}
