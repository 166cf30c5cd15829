use async_trait::async_trait;
use raft::prelude::{ConfChange, ConfChangeV2, ConfState, Entry, HardState, Message, Snapshot};
use raft::{SnapshotStatus, StateRole, INVALID_ID};

/// ConsensusEngine is the control surface of the consensus protocol. Leader election, log
/// matching and term bookkeeping all live behind it; the replication driver only calls these
/// operations in a fixed order.
#[async_trait]
pub trait ConsensusEngine: Send + Sync + 'static {
    /// Submit an opaque payload to be appended to the replicated log. Only succeeds on the leader.
    /// Success means the payload was accepted, not that it committed.
    async fn propose(&self, data: Vec<u8>) -> Result<(), EngineError>;

    /// Feed a message received from a peer into the engine.
    async fn step(&self, message: Message) -> Result<(), EngineError>;

    /// Advance the engine's logical clock by one tick.
    fn tick(&self);

    /// Resolves with the next batch of work. At most one batch is outstanding at a time: the
    /// next batch is not produced until `advance()` acknowledges the current one.
    async fn ready(&self) -> ReadyBatch;

    /// Acknowledge that the outstanding batch was persisted, applied and dispatched.
    fn advance(&self);

    fn apply_conf_change(&self, change: MembershipChange) -> Result<ConfState, EngineError>;

    fn status(&self) -> EngineStatus;

    /// A message to `peer_id` could not be delivered.
    fn report_unreachable(&self, peer_id: u64);

    fn report_snapshot(&self, peer_id: u64, status: SnapshotStatus);
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("consensus engine rejected request: {0}")]
    Rejected(#[from] raft::Error),
    #[error("consensus engine request timed out")]
    Timeout,
}

/// ReadyBatch is one unit of engine output. Everything in it must be persisted, applied and
/// dispatched before the engine is advanced.
#[derive(Debug, Default)]
pub struct ReadyBatch {
    pub hard_state: Option<HardState>,
    pub commit_index: Option<u64>,
    pub snapshot: Option<Snapshot>,
    /// New unstable entries to append to durable log storage.
    pub entries: Vec<Entry>,
    /// Entries to apply to the state machine, in this order.
    pub committed_entries: Vec<Entry>,
    pub messages: Vec<Message>,
}

impl ReadyBatch {
    pub fn is_empty(&self) -> bool {
        self.hard_state.is_none()
            && self.commit_index.is_none()
            && self.snapshot.is_none()
            && self.entries.is_empty()
            && self.committed_entries.is_empty()
            && self.messages.is_empty()
    }
}

#[derive(Clone, Debug)]
pub enum MembershipChange {
    Single(ConfChange),
    Joint(ConfChangeV2),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineStatus {
    pub id: u64,
    pub leader_id: u64,
    pub term: u64,
    pub role: StateRole,
    pub commit_index: u64,
    pub applied_index: u64,
}

impl EngineStatus {
    pub fn is_leader(&self) -> bool {
        self.role == StateRole::Leader
    }

    pub fn leader(&self) -> Option<u64> {
        if self.leader_id == INVALID_ID {
            None
        } else {
            Some(self.leader_id)
        }
    }
}
