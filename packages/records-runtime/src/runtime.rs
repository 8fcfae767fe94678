//! Runtime loop: request phase and periodic persistence phase.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use records_core::config::RecordsConfig;
use records_core::database::Database;
use records_core::error::DbError;
use records_core::model::PasswordHasher;
use records_core::persistence::{EncodedSnapshot, PersistenceManager};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::api_handlers::ApiHandlers;
use crate::api_request::ApiRequest;
use crate::persistence_worker::{FlushOutcome, PersistenceWorker, SnapshotStore};
use crate::{ResponseSender, Result};

/// Counters reported when the runtime stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Requests applied
    pub requests: u64,
    /// Write requests among them
    pub writes: u64,
    /// Snapshots written
    pub flushes: u64,
    /// Snapshot writes that failed
    pub failed_flushes: u64,
}

/// Main runtime loop
pub struct Runtime {
    /// Database instance, owned exclusively
    database: Database,
    /// Persistence interval
    persistence_interval: Duration,
    /// API request receiver
    api_rx: mpsc::Receiver<ApiRequest>,
    /// Snapshot store, moved onto the persistence thread when `run` starts
    store: Option<Box<dyn SnapshotStore>>,
    /// Persistence thread while `run` is active
    worker: Option<PersistenceWorker>,
    /// Revision known to be stored (`None` until the first write)
    flushed_revision: Option<u64>,
    /// Revision most recently handed to the persistence thread
    queued_revision: Option<u64>,
    /// API handlers
    api_handlers: ApiHandlers,
    stats: RuntimeStats,
}

/// Runtime running on its own thread.
pub struct RuntimeHandle {
    thread: JoinHandle<Result<Database>>,
}

impl RuntimeHandle {
    /// Waits for the loop to stop and returns the final database.
    pub async fn join(self) -> Result<Database> {
        let thread = self.thread;
        match tokio::task::spawn_blocking(move || thread.join()).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(DbError::Internal("Runtime thread panicked".to_string())),
            Err(e) => Err(DbError::Internal(format!(
                "Failed to join runtime thread: {}",
                e
            ))),
        }
    }
}

impl Runtime {
    /// Create a new runtime around a snapshot file manager.
    pub fn new(
        database: Database,
        config: &RecordsConfig,
        api_rx: mpsc::Receiver<ApiRequest>,
        persistence: Option<PersistenceManager>,
    ) -> Self {
        let flushed_revision = persistence
            .as_ref()
            .and_then(PersistenceManager::flushed_revision);
        let store = persistence.map(|p| Box::new(p) as Box<dyn SnapshotStore>);
        let mut runtime = Self::with_store(database, config, api_rx, store);
        runtime.flushed_revision = flushed_revision;
        runtime
    }

    /// Create a runtime writing snapshots to `store`.
    ///
    /// The database is taken to match what the store already holds.
    pub fn with_store(
        database: Database,
        config: &RecordsConfig,
        api_rx: mpsc::Receiver<ApiRequest>,
        store: Option<Box<dyn SnapshotStore>>,
    ) -> Self {
        let database =
            database.with_password_hasher(PasswordHasher::new(config.password_hash_cost));
        Self {
            flushed_revision: Some(database.revision()),
            database,
            persistence_interval: Duration::from_millis(config.persistence_interval_ms.max(1)),
            api_rx,
            store,
            worker: None,
            queued_revision: None,
            api_handlers: ApiHandlers::new(config),
            stats: RuntimeStats::default(),
        }
    }

    /// Loads the database from the configured data directory (or starts
    /// empty in memory) and builds the runtime around it.
    pub fn open(config: &RecordsConfig, api_rx: mpsc::Receiver<ApiRequest>) -> Result<Self> {
        let mut persistence = PersistenceManager::from_config(config);
        let database = match persistence.as_mut() {
            Some(persistence) => persistence.load()?,
            None => Database::new(),
        };
        Ok(Self::new(database, config, api_rx, persistence))
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn stats(&self) -> RuntimeStats {
        self.stats
    }

    /// Runs the loop on a dedicated thread with its own single-threaded
    /// executor. Password hashing and snapshot encoding stay off the caller's
    /// executor.
    pub fn spawn(self) -> Result<RuntimeHandle> {
        let thread = thread::Builder::new()
            .name("records-runtime".to_string())
            .spawn(move || {
                let executor = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .map_err(|e| {
                        DbError::Internal(format!("Failed to build executor: {}", e))
                    })?;
                executor.block_on(self.run())
            })
            .map_err(|e| DbError::Internal(format!("Failed to start runtime thread: {}", e)))?;
        Ok(RuntimeHandle { thread })
    }

    /// Applies one request and answers it.
    fn handle_request(&mut self, req: ApiRequest) {
        self.stats.requests += 1;
        if req.is_write() {
            self.stats.writes += 1;
        }
        tracing::trace!("Applying {}", req.label());

        match req {
            ApiRequest::Flush { response } => self.process_persistence_phase(Some(response)),
            other => self.api_handlers.handle_api_request(&mut self.database, other),
        }
    }

    /// Hands a snapshot to the persistence thread if the database changed
    /// since the last write.
    ///
    /// A `Flush` caller gets `false` when nothing changed, otherwise its
    /// answer comes from the persistence thread once the write lands.
    fn process_persistence_phase(&mut self, reply: Option<ResponseSender>) {
        let revision = self.database.revision();
        let Some(worker) = self.worker.as_ref() else {
            if let Some(reply) = reply {
                let _ = reply.send(Ok(Value::Bool(false)));
            }
            return;
        };
        if self.flushed_revision == Some(revision) {
            if let Some(reply) = reply {
                let _ = reply.send(Ok(Value::Bool(false)));
            }
            return;
        }
        // Already on its way and nobody is waiting for it
        if reply.is_none() && self.queued_revision == Some(revision) {
            return;
        }

        let snapshot = match EncodedSnapshot::encode(&self.database) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.stats.failed_flushes += 1;
                tracing::error!("Failed to encode snapshot: {}", e);
                if let Some(reply) = reply {
                    let _ = reply.send(Err(e));
                }
                return;
            }
        };
        match worker.submit(snapshot, reply) {
            Ok(()) => {
                tracing::trace!("Queued snapshot revision {}", revision);
                self.queued_revision = Some(revision);
            }
            Err(e) => {
                self.stats.failed_flushes += 1;
                tracing::error!("Failed to queue snapshot: {}", e);
            }
        }
    }

    fn record_outcome(&mut self, outcome: FlushOutcome) {
        match outcome.result {
            Ok(()) => {
                self.stats.flushes += 1;
                if self.flushed_revision.map_or(true, |r| outcome.revision > r) {
                    self.flushed_revision = Some(outcome.revision);
                }
                tracing::debug!("Flushed snapshot at revision {}", outcome.revision);
            }
            Err(e) => {
                self.stats.failed_flushes += 1;
                // Retried on the next persistence phase
                if self.queued_revision == Some(outcome.revision) {
                    self.queued_revision = None;
                }
                tracing::error!(
                    "Failed to flush snapshot at revision {}: {}",
                    outcome.revision,
                    e
                );
            }
        }
    }

    /// Runs until every request sender is dropped, then writes a final
    /// snapshot and returns the database.
    pub async fn run(mut self) -> Result<Database> {
        if let Some(store) = self.store.take() {
            self.worker = Some(PersistenceWorker::spawn(store)?);
        }
        let mut next_persistence = Instant::now() + self.persistence_interval;

        loop {
            tokio::select! {
                maybe_req = self.api_rx.recv() => match maybe_req {
                    Some(req) => self.handle_request(req),
                    None => break,
                },
                Some(outcome) = next_outcome(&mut self.worker) => self.record_outcome(outcome),
                _ = time::sleep_until(next_persistence) => {}
            }

            // Checked after every wakeup so a busy queue cannot starve snapshots
            if Instant::now() >= next_persistence {
                self.process_persistence_phase(None);
                next_persistence = Instant::now() + self.persistence_interval;
            }
        }

        let result = self.shutdown().await;
        tracing::info!(
            "Runtime stopping: requests={}, writes={}, flushes={}, failed_flushes={}",
            self.stats.requests,
            self.stats.writes,
            self.stats.flushes,
            self.stats.failed_flushes
        );
        result.map(|()| self.database)
    }

    /// Queues the final snapshot and waits for every outstanding write.
    async fn shutdown(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let revision = self.database.revision();
        // A queued write of this revision reports through `finish`
        let covered = self.flushed_revision == Some(revision)
            || self.queued_revision == Some(revision);
        let submitted = if covered {
            Ok(())
        } else {
            EncodedSnapshot::encode(&self.database)
                .and_then(|snapshot| worker.submit(snapshot, None))
        };

        let mut final_error = None;
        for outcome in worker.finish().await {
            if outcome.revision == revision {
                if let Err(e) = &outcome.result {
                    final_error = Some(e.clone());
                }
            }
            self.record_outcome(outcome);
        }

        submitted?;
        if self.flushed_revision == Some(revision) {
            return Ok(());
        }
        Err(final_error.unwrap_or_else(|| {
            DbError::Internal(format!(
                "Final snapshot at revision {} was not written",
                revision
            ))
        }))
    }
}

async fn next_outcome(worker: &mut Option<PersistenceWorker>) -> Option<FlushOutcome> {
    match worker {
        Some(worker) => worker.next_outcome().await,
        None => std::future::pending().await,
    }
}
