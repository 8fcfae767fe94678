//! Snapshot writes on a dedicated thread.
//!
//! The runtime encodes a snapshot and hands it over. File I/O and retry
//! delays happen here, off the async executor, while the runtime keeps
//! answering requests.

use std::thread::{self, JoinHandle};

use records_core::error::DbError;
use records_core::persistence::{EncodedSnapshot, PersistenceManager};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{ResponseSender, Result};

/// Destination for encoded snapshots. Only the persistence thread calls it.
pub trait SnapshotStore: Send + 'static {
    /// Durably stores `snapshot`, blocking until done.
    fn write(&mut self, snapshot: &EncodedSnapshot) -> Result<()>;
}

impl SnapshotStore for PersistenceManager {
    fn write(&mut self, snapshot: &EncodedSnapshot) -> Result<()> {
        PersistenceManager::write(self, snapshot)
    }
}

/// Snapshot queued for the persistence thread.
struct FlushJob {
    snapshot: EncodedSnapshot,
    /// `Flush` caller answered once the write lands
    reply: Option<ResponseSender>,
}

/// Result of one write, reported back to the runtime.
#[derive(Debug)]
pub(crate) struct FlushOutcome {
    pub revision: u64,
    pub result: Result<()>,
}

/// Handle to the persistence thread.
pub(crate) struct PersistenceWorker {
    jobs: mpsc::UnboundedSender<FlushJob>,
    outcomes: mpsc::UnboundedReceiver<FlushOutcome>,
    thread: JoinHandle<()>,
}

impl PersistenceWorker {
    /// Moves `store` onto a new thread that writes queued snapshots in order.
    pub fn spawn(mut store: Box<dyn SnapshotStore>) -> Result<Self> {
        let (jobs, mut job_rx) = mpsc::unbounded_channel::<FlushJob>();
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();

        let thread = thread::Builder::new()
            .name("records-persistence".to_string())
            .spawn(move || {
                while let Some(job) = job_rx.blocking_recv() {
                    let revision = job.snapshot.revision();
                    let result = store.write(&job.snapshot);
                    if let Some(reply) = job.reply {
                        let _ = reply.send(result.clone().map(|()| Value::Bool(true)));
                    }
                    if outcome_tx.send(FlushOutcome { revision, result }).is_err() {
                        break;
                    }
                }
                tracing::debug!("Persistence thread stopping");
            })
            .map_err(|e| DbError::Internal(format!("Failed to start persistence thread: {}", e)))?;

        Ok(Self {
            jobs,
            outcomes,
            thread,
        })
    }

    /// Queues a snapshot. A `Flush` caller in `reply` hears back from the thread.
    pub fn submit(&self, snapshot: EncodedSnapshot, reply: Option<ResponseSender>) -> Result<()> {
        self.jobs
            .send(FlushJob { snapshot, reply })
            .map_err(|mpsc::error::SendError(job)| {
                let err = DbError::Internal("Persistence thread stopped".to_string());
                if let Some(reply) = job.reply {
                    let _ = reply.send(Err(err.clone()));
                }
                err
            })
    }

    /// Next finished write, or `None` once the thread is gone.
    pub async fn next_outcome(&mut self) -> Option<FlushOutcome> {
        self.outcomes.recv().await
    }

    /// Closes the queue, waits for the writes still queued and returns their outcomes.
    pub async fn finish(self) -> Vec<FlushOutcome> {
        let Self {
            jobs,
            mut outcomes,
            thread,
        } = self;
        drop(jobs);

        let mut finished = Vec::new();
        while let Some(outcome) = outcomes.recv().await {
            finished.push(outcome);
        }
        match tokio::task::spawn_blocking(move || thread.join()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => tracing::error!("Persistence thread panicked"),
            Err(e) => tracing::error!("Failed to join persistence thread: {}", e),
        }
        finished
    }
}
