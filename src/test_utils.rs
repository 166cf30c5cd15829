use crate::commitlog::{LogStorage, LogStorageError};
use crate::engine::{ConsensusEngine, EngineError, EngineStatus, MembershipChange, ReadyBatch};
use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use raft::prelude::{ConfState, Entry, HardState, Message, Snapshot};
use raft::{SnapshotStatus, StateRole, StorageError};
use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch, Notify};
use tokio_util::sync::CancellationToken;

pub(crate) fn test_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

pub(crate) struct TestUtilReceiver<T> {
    rx: mpsc::Receiver<T>,
}

impl<T: Debug> TestUtilReceiver<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>) -> Self {
        TestUtilReceiver { rx }
    }

    pub(crate) async fn recv(&mut self) -> T {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("Unexpected timeout")
            .expect("Expected value")
    }

    pub(crate) async fn recv_assert_timeout(&mut self, timeout: Duration) {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .expect_err("Expected timeout");
    }
}

/// Poll `condition` until it holds, panicking after a generous sanity timeout.
pub(crate) async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "Condition never became true");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

// -- engine --

pub(crate) fn follower_status(id: u64, leader_id: u64) -> EngineStatus {
    EngineStatus {
        id,
        leader_id,
        term: 2,
        role: StateRole::Follower,
        commit_index: 5,
        applied_index: 5,
    }
}

pub(crate) fn leader_status(id: u64) -> EngineStatus {
    EngineStatus {
        role: StateRole::Leader,
        ..follower_status(id, id)
    }
}

pub(crate) struct FakeEngineState {
    pub batches: VecDeque<ReadyBatch>,
    pub outstanding: bool,
    pub advances: usize,
    pub ticks: usize,
    pub proposals: Vec<Vec<u8>>,
    pub steps: Vec<Message>,
    pub conf_changes: Vec<MembershipChange>,
    pub unreachable: Vec<u64>,
    pub snapshot_reports: Vec<(u64, SnapshotStatus)>,
    pub status: EngineStatus,
    pub reject_proposals: bool,
}

/// Scripted engine: hands out queued batches one at a time and records every call made to it.
/// Like the real engine, `step` and `propose` wait while a batch is outstanding.
pub(crate) struct FakeEngine {
    state: Mutex<FakeEngineState>,
    wakeup: Notify,
    settled: Notify,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        FakeEngine {
            state: Mutex::new(FakeEngineState {
                batches: VecDeque::new(),
                outstanding: false,
                advances: 0,
                ticks: 0,
                proposals: vec![],
                steps: vec![],
                conf_changes: vec![],
                unreachable: vec![],
                snapshot_reports: vec![],
                status: follower_status(1, 0),
                reject_proposals: false,
            }),
            wakeup: Notify::new(),
            settled: Notify::new(),
        }
    }

    pub(crate) fn push_batch(&self, batch: ReadyBatch) {
        self.with(|state| state.batches.push_back(batch));
        self.wakeup.notify_one();
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut FakeEngineState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub(crate) async fn wait_for_advances(&self, advances: usize) {
        eventually(|| self.with(|state| state.advances) >= advances).await;
    }

    async fn when_settled<R>(&self, f: impl FnOnce(&mut FakeEngineState) -> R) -> R {
        loop {
            let settled = self.settled.notified();
            {
                let mut state = self.state.lock().unwrap();
                if !state.outstanding {
                    return f(&mut state);
                }
            }
            settled.await;
        }
    }
}

#[async_trait]
impl ConsensusEngine for FakeEngine {
    async fn propose(&self, data: Vec<u8>) -> Result<(), EngineError> {
        self.when_settled(|state| {
            if state.reject_proposals {
                return Err(EngineError::Rejected(raft::Error::ProposalDropped));
            }
            state.proposals.push(data);
            Ok(())
        })
        .await
    }

    async fn step(&self, message: Message) -> Result<(), EngineError> {
        self.when_settled(|state| state.steps.push(message)).await;
        Ok(())
    }

    fn tick(&self) {
        self.with(|state| state.ticks += 1);
    }

    async fn ready(&self) -> ReadyBatch {
        loop {
            let next = self.with(|state| {
                if state.outstanding {
                    return None;
                }
                let batch = state.batches.pop_front()?;
                state.outstanding = true;
                Some(batch)
            });
            if let Some(batch) = next {
                return batch;
            }
            self.wakeup.notified().await;
        }
    }

    fn advance(&self) {
        self.with(|state| {
            state.advances += 1;
            state.outstanding = false;
        });
        self.settled.notify_waiters();
        self.wakeup.notify_one();
    }

    fn apply_conf_change(&self, change: MembershipChange) -> Result<ConfState, EngineError> {
        self.with(|state| state.conf_changes.push(change));
        Ok(ConfState::from((vec![1, 2, 3, 4], vec![])))
    }

    fn status(&self) -> EngineStatus {
        self.with(|state| state.status.clone())
    }

    fn report_unreachable(&self, peer_id: u64) {
        self.with(|state| state.unreachable.push(peer_id));
    }

    fn report_snapshot(&self, peer_id: u64, status: SnapshotStatus) {
        self.with(|state| state.snapshot_reports.push((peer_id, status)));
    }
}

// -- transport --

/// Records every send. Sends to addresses marked unreachable fail. While held, sends are
/// recorded and then wait for `release_sends`.
pub(crate) struct RecordingTransport {
    sent: Mutex<Vec<(Message, String)>>,
    unreachable: Mutex<HashSet<String>>,
    open_tx: watch::Sender<bool>,
    open_rx: watch::Receiver<bool>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        let (open_tx, open_rx) = watch::channel(true);
        RecordingTransport {
            sent: Mutex::new(vec![]),
            unreachable: Mutex::new(HashSet::new()),
            open_tx,
            open_rx,
        }
    }

    pub(crate) fn mark_unreachable(&self, address: &str) {
        self.unreachable.lock().unwrap().insert(address.to_string());
    }

    pub(crate) fn hold_sends(&self) {
        self.open_tx.send(false).unwrap();
    }

    pub(crate) fn release_sends(&self) {
        self.open_tx.send(true).unwrap();
    }

    pub(crate) fn sent(&self) -> Vec<(Message, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, message: Message, address: &str) -> Option<Message> {
        self.sent.lock().unwrap().push((message.clone(), address.to_string()));

        let mut open = self.open_rx.clone();
        loop {
            let is_open = *open.borrow();
            if is_open {
                break;
            }
            open.changed().await.unwrap();
        }

        if self.unreachable.lock().unwrap().contains(address) {
            None
        } else {
            Some(message)
        }
    }

    async fn listen(&self, cancel: CancellationToken) -> Result<(), TransportError> {
        cancel.cancelled().await;
        Ok(())
    }
}

// -- log storage --

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LogOp {
    HardState { term: u64, commit: u64 },
    CommitIndex(u64),
    Snapshot(u64),
    Append(Vec<u64>),
    ConfState(Vec<u64>),
}

/// Log storage that records each write, optionally failing all of them.
#[derive(Clone, Default)]
pub(crate) struct RecordingLog {
    ops: Arc<Mutex<Vec<LogOp>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingLog {
    pub(crate) fn new() -> Self {
        RecordingLog::default()
    }

    pub(crate) fn fail_writes(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub(crate) fn ops(&self) -> Vec<LogOp> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: LogOp) -> Result<(), LogStorageError> {
        if *self.failing.lock().unwrap() {
            return Err(LogStorageError::Rejected(raft::Error::Store(StorageError::Unavailable)));
        }
        self.ops.lock().unwrap().push(op);
        Ok(())
    }
}

impl LogStorage for RecordingLog {
    fn set_hard_state(&mut self, hard_state: &HardState) -> Result<(), LogStorageError> {
        self.record(LogOp::HardState {
            term: hard_state.term,
            commit: hard_state.commit,
        })
    }

    fn set_commit_index(&mut self, commit_index: u64) -> Result<(), LogStorageError> {
        self.record(LogOp::CommitIndex(commit_index))
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), LogStorageError> {
        self.record(LogOp::Snapshot(snapshot.get_metadata().index))
    }

    fn append(&mut self, entries: &[Entry]) -> Result<(), LogStorageError> {
        self.record(LogOp::Append(entries.iter().map(|e| e.index).collect()))
    }

    fn set_conf_state(&mut self, conf_state: ConfState) -> Result<(), LogStorageError> {
        self.record(LogOp::ConfState(conf_state.voters))
    }
}
