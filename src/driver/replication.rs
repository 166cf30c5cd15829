use crate::action::Action;
use crate::commitlog::{LogStorage, LogStorageError};
use crate::engine::{ConsensusEngine, MembershipChange, ReadyBatch};
use crate::store::KvStore;
use crate::transport::{PeerTable, Transport};
use protobuf::Message as ProtobufMessage;
use raft::prelude::{ConfChange, ConfChangeV2, Entry, EntryType, Message, MessageType};
use raft::SnapshotStatus;
use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to persist ready batch")]
    Persistence(#[from] LogStorageError),
}

/// ReplicationDriver runs a node's main loop: it ticks the consensus engine, and for every ready
/// batch the engine emits it persists, applies, dispatches and then advances, strictly in that
/// order and one batch at a time.
///
/// The driver is the only writer of the log storage and the only task that applies committed
/// entries to the store.
pub struct ReplicationDriver<E, L, T> {
    logger: slog::Logger,
    engine: Arc<E>,
    log: L,
    transport: Arc<T>,
    peers: PeerTable,
    store: Arc<KvStore>,
    tick_interval: Duration,
}

enum LoopEvent {
    Cancelled,
    Tick,
    Ready(ReadyBatch),
}

/// Result of shipping one outbound message.
struct Delivery {
    to: u64,
    is_snapshot: bool,
    delivered: bool,
}

impl<E, L, T> ReplicationDriver<E, L, T>
where
    E: ConsensusEngine,
    L: LogStorage,
    T: Transport,
{
    pub fn new(
        logger: slog::Logger,
        engine: Arc<E>,
        log: L,
        transport: Arc<T>,
        peers: PeerTable,
        store: Arc<KvStore>,
        tick_interval: Duration,
    ) -> Self {
        ReplicationDriver {
            logger,
            engine,
            log,
            transport,
            peers,
            store,
            tick_interval,
        }
    }

    /// Run until `cancel` fires or persisting a batch fails. A batch already being processed when
    /// cancellation arrives is finished and advanced before returning.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), DriverError> {
        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let engine = self.engine.clone();

        slog::info!(self.logger, "Replication driver started for node {}", self.peers.my_id());

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => LoopEvent::Cancelled,
                _ = ticker.tick() => LoopEvent::Tick,
                batch = engine.ready() => LoopEvent::Ready(batch),
            };

            match event {
                LoopEvent::Cancelled => break,
                LoopEvent::Tick => engine.tick(),
                LoopEvent::Ready(batch) => {
                    if let Err(e) = self.handle_ready(batch).await {
                        slog::error!(self.logger, "Replication driver stopping: {:?}", e);
                        return Err(e);
                    }
                }
            }
        }

        slog::info!(self.logger, "Replication driver has exited");
        Ok(())
    }

    async fn handle_ready(&mut self, mut batch: ReadyBatch) -> Result<(), DriverError> {
        self.persist(&batch)?;
        self.apply_committed(mem::take(&mut batch.committed_entries))?;
        self.dispatch(mem::take(&mut batch.messages)).await;
        self.engine.advance();

        Ok(())
    }

    fn persist(&mut self, batch: &ReadyBatch) -> Result<(), LogStorageError> {
        if let Some(hard_state) = &batch.hard_state {
            self.log.set_hard_state(hard_state)?;
        }
        if let Some(commit_index) = batch.commit_index {
            self.log.set_commit_index(commit_index)?;
        }
        if let Some(snapshot) = &batch.snapshot {
            self.log.apply_snapshot(snapshot)?;
        }
        if !batch.entries.is_empty() {
            self.log.append(&batch.entries)?;
        }

        Ok(())
    }

    fn apply_committed(&mut self, entries: Vec<Entry>) -> Result<(), LogStorageError> {
        for entry in entries {
            match entry.get_entry_type() {
                EntryType::EntryNormal => self.apply_normal(&entry),
                EntryType::EntryConfChange => {
                    let mut cc = ConfChange::default();
                    if let Err(e) = cc.merge_from_bytes(entry.get_data()) {
                        slog::warn!(self.logger, "Skipping undecodable conf change at index {}: {:?}", entry.index, e);
                        continue;
                    }
                    self.apply_membership_change(entry.index, MembershipChange::Single(cc))?;
                }
                EntryType::EntryConfChangeV2 => {
                    let mut cc = ConfChangeV2::default();
                    if let Err(e) = cc.merge_from_bytes(entry.get_data()) {
                        slog::warn!(self.logger, "Skipping undecodable conf change at index {}: {:?}", entry.index, e);
                        continue;
                    }
                    self.apply_membership_change(entry.index, MembershipChange::Joint(cc))?;
                }
            }
        }

        Ok(())
    }

    fn apply_normal(&self, entry: &Entry) {
        // Empty entries are appended by a new leader to commit its term.
        if entry.get_data().is_empty() {
            return;
        }

        match Action::decode(entry.get_data()) {
            Ok(action) => {
                slog::debug!(self.logger, "Applying entry {}: {:?}", entry.index, action);
                self.store.apply(action);
            }
            Err(e) => {
                slog::warn!(self.logger, "Skipping committed entry {}: {}", entry.index, e);
            }
        }
    }

    fn apply_membership_change(&mut self, index: u64, change: MembershipChange) -> Result<(), LogStorageError> {
        match self.engine.apply_conf_change(change) {
            Ok(conf_state) => self.log.set_conf_state(conf_state),
            Err(e) => {
                slog::warn!(self.logger, "Engine rejected conf change at index {}: {}", index, e);
                Ok(())
            }
        }
    }

    /// Send every message and wait for all sends to finish. Messages to one peer go out in order
    /// over successive connections; different peers are sent to concurrently. Once a send to a
    /// peer fails, the rest of that peer's messages in this batch are dropped.
    async fn dispatch(&self, messages: Vec<Message>) {
        let mut by_peer: BTreeMap<u64, Vec<Message>> = BTreeMap::new();
        for message in messages {
            by_peer.entry(message.get_to()).or_default().push(message);
        }

        let mut sends = Vec::with_capacity(by_peer.len());
        for (to, messages) in by_peer {
            let address = match self.peers.address(to) {
                Some(address) => address.to_string(),
                None => {
                    slog::warn!(self.logger, "Dropping {} message(s) to unknown node {}", messages.len(), to);
                    for message in &messages {
                        self.report_delivery(&Delivery {
                            to,
                            is_snapshot: is_snapshot(message),
                            delivered: false,
                        });
                    }
                    continue;
                }
            };

            let transport = self.transport.clone();
            sends.push(tokio::spawn(async move {
                let mut deliveries = Vec::with_capacity(messages.len());
                let mut reachable = true;
                for message in messages {
                    let is_snapshot = is_snapshot(&message);
                    if reachable {
                        reachable = transport.send(message, &address).await.is_some();
                    }
                    deliveries.push(Delivery {
                        to,
                        is_snapshot,
                        delivered: reachable,
                    });
                }
                deliveries
            }));
        }

        for send in sends {
            match send.await {
                Ok(deliveries) => deliveries.iter().for_each(|d| self.report_delivery(d)),
                Err(e) => slog::error!(self.logger, "Send task failed: {:?}", e),
            }
        }
    }

    fn report_delivery(&self, delivery: &Delivery) {
        if !delivery.delivered {
            self.engine.report_unreachable(delivery.to);
        }
        if delivery.is_snapshot {
            let status = if delivery.delivered {
                SnapshotStatus::Finish
            } else {
                SnapshotStatus::Failure
            };
            self.engine.report_snapshot(delivery.to, status);
        }
    }
}

fn is_snapshot(message: &Message) -> bool {
    message.get_msg_type() == MessageType::MsgSnapshot
}
