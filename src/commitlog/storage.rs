use raft::prelude::{ConfState, Entry, HardState, Snapshot};

/// LogStorage is the durable side of the replicated log: everything the consensus engine hands
/// back in a ready batch that must be persisted before the batch is acknowledged.
///
/// Callers must persist in the order hard state, commit index, snapshot, entries. An error from
/// any method means the batch was not persisted and must not be acknowledged.
pub trait LogStorage: Send + Sync {
    fn set_hard_state(&mut self, hard_state: &HardState) -> Result<(), LogStorageError>;

    fn set_commit_index(&mut self, commit_index: u64) -> Result<(), LogStorageError>;

    fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), LogStorageError>;

    fn append(&mut self, entries: &[Entry]) -> Result<(), LogStorageError>;

    fn set_conf_state(&mut self, conf_state: ConfState) -> Result<(), LogStorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LogStorageError {
    #[error("log storage rejected write: {0}")]
    Rejected(#[from] raft::Error),
    #[error("entries starting at {first_new} do not continue log [{first_index}, {last_index}]")]
    NonContiguous {
        first_new: u64,
        first_index: u64,
        last_index: u64,
    },
}
