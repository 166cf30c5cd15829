use crate::engine::{ConsensusEngine, EngineError, EngineStatus, MembershipChange, ReadyBatch};
use async_trait::async_trait;
use raft::prelude::{ConfState, Config, Message};
use raft::storage::MemStorage;
use raft::{RawNode, Ready, SnapshotStatus};
use std::mem;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub id: u64,
    pub election_tick: usize,
    pub heartbeat_tick: usize,
    pub max_size_per_msg: u64,
    pub max_inflight_msgs: usize,
}

/// RawNodeEngine adapts tikv's `RawNode` to `ConsensusEngine`.
///
/// The library splits each round of output into a `Ready` and, after advancing, a `LightReady`
/// that may carry a newer commit index plus more committed entries and messages. Both phases are
/// surfaced as separate `ReadyBatch`es so the driver persists and applies them the same way.
///
/// `RawNode` must not be stepped or proposed to between handing out a `Ready` and advancing it.
/// `step` and `propose` wait for the outstanding `Ready` batch to be advanced first.
pub struct RawNodeEngine {
    logger: slog::Logger,
    state: Mutex<EngineState>,
    // Signalled whenever the node might have new output.
    wakeup: Notify,
    // Signalled when a `Ready` batch is advanced.
    settled: Notify,
}

struct EngineState {
    node: RawNode<MemStorage>,
    outstanding: Outstanding,
    follow_up: Option<FollowUp>,
}

enum Outstanding {
    None,
    Ready { ready: Ready, apply_to: Option<u64> },
    FollowUp { apply_to: Option<u64> },
}

/// Output of `RawNode::advance` that still has to be handed to the driver.
struct FollowUp {
    batch: ReadyBatch,
    // Index of the last committed entry in `batch`.
    apply_to: Option<u64>,
}

impl RawNodeEngine {
    pub fn start(config: EngineConfig, storage: MemStorage, logger: slog::Logger) -> Result<Self, EngineError> {
        let raft_config = Config {
            id: config.id,
            election_tick: config.election_tick,
            heartbeat_tick: config.heartbeat_tick,
            max_size_per_msg: config.max_size_per_msg,
            max_inflight_msgs: config.max_inflight_msgs,
            ..Default::default()
        };
        raft_config.validate()?;

        let raft_logger = logger.new(slog::o!("component" => "raft"));
        let node = RawNode::new(&raft_config, storage, &raft_logger)?;

        slog::info!(logger, "Started consensus engine for node {}", config.id);

        Ok(RawNodeEngine {
            logger,
            state: Mutex::new(EngineState {
                node,
                outstanding: Outstanding::None,
                follow_up: None,
            }),
            wakeup: Notify::new(),
            settled: Notify::new(),
        })
    }

    // A panic while holding the lock means `RawNode` hit a fatal invariant violation. Its state
    // can't be trusted after that.
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().expect("RawNodeEngine mutex guard poison")
    }

    /// Run `f` against the node once no `Ready` batch is outstanding.
    async fn when_settled<R>(&self, f: impl FnOnce(&mut RawNode<MemStorage>) -> R) -> R {
        loop {
            // Created before checking so an advance in between is not missed.
            let settled = self.settled.notified();
            {
                let mut state = self.lock();
                if !matches!(state.outstanding, Outstanding::Ready { .. }) {
                    let result = f(&mut state.node);
                    drop(state);
                    self.wakeup.notify_one();
                    return result;
                }
            }
            settled.await;
        }
    }
}

impl EngineState {
    fn next_batch(&mut self) -> Option<ReadyBatch> {
        if !matches!(self.outstanding, Outstanding::None) {
            return None;
        }

        if let Some(FollowUp { batch, apply_to }) = self.follow_up.take() {
            self.outstanding = Outstanding::FollowUp { apply_to };
            return Some(batch);
        }

        if !self.node.has_ready() {
            return None;
        }

        let mut ready = self.node.ready();
        let snapshot = if ready.snapshot().is_empty() {
            None
        } else {
            Some(ready.snapshot().clone())
        };
        let mut messages = ready.take_messages();
        messages.extend(ready.take_persisted_messages());

        let committed_entries = ready.take_committed_entries();
        let apply_to = committed_entries.last().map(|e| e.index);
        let batch = ReadyBatch {
            hard_state: ready.hs().cloned(),
            commit_index: None,
            snapshot,
            entries: ready.entries().to_vec(),
            committed_entries,
            messages,
        };

        self.outstanding = Outstanding::Ready { ready, apply_to };
        Some(batch)
    }
}

#[async_trait]
impl ConsensusEngine for RawNodeEngine {
    async fn propose(&self, data: Vec<u8>) -> Result<(), EngineError> {
        self.when_settled(|node| node.propose(vec![], data)).await?;
        Ok(())
    }

    async fn step(&self, message: Message) -> Result<(), EngineError> {
        self.when_settled(|node| node.step(message)).await?;
        Ok(())
    }

    fn tick(&self) {
        let has_ready = {
            let mut state = self.lock();
            state.node.tick();
            state.node.has_ready()
        };
        if has_ready {
            self.wakeup.notify_one();
        }
    }

    async fn ready(&self) -> ReadyBatch {
        loop {
            if let Some(batch) = self.lock().next_batch() {
                return batch;
            }
            self.wakeup.notified().await;
        }
    }

    fn advance(&self) {
        {
            let mut state = self.lock();
            match mem::replace(&mut state.outstanding, Outstanding::None) {
                Outstanding::Ready { ready, apply_to } => {
                    let mut light = state.node.advance(ready);
                    if let Some(index) = apply_to {
                        state.node.advance_apply_to(index);
                    }

                    let committed_entries = light.take_committed_entries();
                    let apply_to = committed_entries.last().map(|e| e.index);
                    let batch = ReadyBatch {
                        commit_index: light.commit_index(),
                        committed_entries,
                        messages: light.take_messages(),
                        ..Default::default()
                    };

                    if !batch.is_empty() {
                        state.follow_up = Some(FollowUp { batch, apply_to });
                    }
                }
                Outstanding::FollowUp { apply_to: Some(index) } => state.node.advance_apply_to(index),
                Outstanding::FollowUp { apply_to: None } => {}
                Outstanding::None => {
                    slog::warn!(self.logger, "Advance called with no outstanding ready batch");
                }
            }
        }

        self.settled.notify_waiters();
        self.wakeup.notify_one();
    }

    fn apply_conf_change(&self, change: MembershipChange) -> Result<ConfState, EngineError> {
        let conf_state = {
            let mut state = self.lock();
            match change {
                MembershipChange::Single(cc) => state.node.apply_conf_change(&cc)?,
                MembershipChange::Joint(cc) => state.node.apply_conf_change(&cc)?,
            }
        };

        slog::info!(self.logger, "Applied membership change, voters now {:?}", conf_state.voters);
        self.wakeup.notify_one();
        Ok(conf_state)
    }

    fn status(&self) -> EngineStatus {
        let state = self.lock();
        let status = state.node.status();

        EngineStatus {
            id: status.id,
            leader_id: status.ss.leader_id,
            term: status.hs.term,
            role: status.ss.raft_state,
            commit_index: status.hs.commit,
            applied_index: status.applied,
        }
    }

    fn report_unreachable(&self, peer_id: u64) {
        self.lock().node.report_unreachable(peer_id);
    }

    fn report_snapshot(&self, peer_id: u64, status: SnapshotStatus) {
        self.lock().node.report_snapshot(peer_id, status);
        self.wakeup.notify_one();
    }
}
