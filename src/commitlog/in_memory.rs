use crate::commitlog::{LogStorage, LogStorageError};
use raft::prelude::{ConfState, Entry, HardState, Snapshot};
use raft::storage::MemStorage;
use raft::Storage;

// Persistence is modelled, not durable: a restarted node starts from an empty log. The engine
// reads through a clone of the same `MemStorage`, so writes here are visible to it immediately.
pub struct InMemoryLog {
    logger: slog::Logger,
    storage: MemStorage,
}

impl InMemoryLog {
    pub fn create(logger: slog::Logger, voters: Vec<u64>) -> Self {
        let storage = MemStorage::new_with_conf_state(ConfState::from((voters, vec![])));

        InMemoryLog { logger, storage }
    }

    /// Handle to the same underlying log, for the consensus engine to read from.
    pub fn storage(&self) -> MemStorage {
        self.storage.clone()
    }
}

impl LogStorage for InMemoryLog {
    fn set_hard_state(&mut self, hard_state: &HardState) -> Result<(), LogStorageError> {
        self.storage.wl().set_hardstate(hard_state.clone());
        Ok(())
    }

    fn set_commit_index(&mut self, commit_index: u64) -> Result<(), LogStorageError> {
        self.storage.wl().mut_hard_state().set_commit(commit_index);
        Ok(())
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), LogStorageError> {
        let mut core = self.storage.wl();
        let prev_commit = core.hard_state().commit;

        core.apply_snapshot(snapshot.clone())?;

        // Applying a snapshot resets the commit index to the snapshot's index. A hard state
        // persisted earlier in the same batch may already be past that.
        let snapshot_index = snapshot.get_metadata().index;
        core.mut_hard_state().set_commit(prev_commit.max(snapshot_index));

        slog::info!(self.logger, "Applied snapshot at index {}", snapshot_index);
        Ok(())
    }

    fn append(&mut self, entries: &[Entry]) -> Result<(), LogStorageError> {
        if entries.is_empty() {
            return Ok(());
        }

        // The backing store panics on a gap or on overwriting compacted entries.
        let first_index = self.storage.first_index()?;
        let last_index = self.storage.last_index()?;
        let first_new = entries[0].index;
        if first_new < first_index || first_new > last_index + 1 {
            return Err(LogStorageError::NonContiguous {
                first_new,
                first_index,
                last_index,
            });
        }

        self.storage.wl().append(entries)?;
        Ok(())
    }

    fn set_conf_state(&mut self, conf_state: ConfState) -> Result<(), LogStorageError> {
        slog::debug!(self.logger, "Persisting conf state {:?}", conf_state);
        self.storage.wl().set_conf_state(conf_state);
        Ok(())
    }
}
