//! Fixed-size hashing worker pool.
//!
//! Each worker loops: check the abort flag, claim the next record through
//! the store cursor, hash the file, save the digest. The store lock is held
//! only while claiming and while saving, never during file I/O. The
//! coordinator waits on worker exits with a short timeout so it can publish
//! progress and react to cancellation in between.

use super::CancellationToken;
use crate::core::digest::digest_file;
use crate::core::store::SharedStore;
use crate::error::PipelineError;
use crate::events::{Event, EventSender, HashEvent, HashProgress};
use crossbeam_channel::RecvTimeoutError;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default number of hashing workers
pub const DEFAULT_WORKERS: usize = 2;

/// Default coordinator poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a hashing run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOutcome {
    /// Every record was hashed
    Completed { files_hashed: usize },
    /// The user cancelled; the store has been emptied
    Cancelled,
}

/// Report a worker sends when its loop ends
struct WorkerExit {
    worker: usize,
    hashed: usize,
    error: Option<PipelineError>,
}

/// Pool of hashing workers sharing one record store
#[derive(Debug, Clone)]
pub struct HashWorkerPool {
    workers: usize,
    poll_interval: Duration,
}

impl HashWorkerPool {
    pub fn new(workers: usize, poll_interval: Duration) -> Self {
        Self {
            workers: workers.max(1),
            poll_interval,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Hash every unclaimed record in `store`, reading files from `directory`.
    ///
    /// On cancellation or a worker failure the store is reset to empty once
    /// every worker has exited.
    pub fn run(
        &self,
        store: &SharedStore,
        directory: &Path,
        cancel: &CancellationToken,
        events: &EventSender,
    ) -> Result<PoolOutcome, PipelineError> {
        let total = store.len();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("hash-worker-{i}"))
            .panic_handler(|_| error!("Hash worker panicked"))
            .build()
            .map_err(|e| PipelineError::PoolStartup(e.to_string()))?;

        let abort = CancellationToken::new();
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<WorkerExit>();

        info!(workers = self.workers, total, "Starting hash workers");
        events.send(Event::Hash(HashEvent::Started {
            total_files: total,
            workers: self.workers,
        }));

        for worker in 0..self.workers {
            let store = store.clone();
            let directory = directory.to_path_buf();
            let abort = abort.clone();
            let events = events.clone();
            let done = done_tx.clone();

            pool.spawn(move || {
                let exit = hash_worker(worker, &store, &directory, &abort, &events);
                let _ = done.send(exit);
            });
        }
        drop(done_tx);

        let mut remaining = self.workers;
        let mut files_hashed = 0;
        let mut failure = None;
        let mut lost = false;
        let mut user_cancelled = false;

        while remaining > 0 {
            match done_rx.recv_timeout(self.poll_interval) {
                Ok(exit) => {
                    remaining -= 1;
                    files_hashed += exit.hashed;
                    debug!(worker = exit.worker, hashed = exit.hashed, "Hash worker finished");
                    if let Some(error) = exit.error {
                        abort.cancel();
                        if failure.is_none() {
                            failure = Some(error);
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    abort.cancel();
                    lost = true;
                    break;
                }
            }

            if cancel.is_cancelled() && !user_cancelled {
                info!("Cancellation requested, waiting for workers to stop");
                user_cancelled = true;
                abort.cancel();
            }

            let (processed, bytes) = store.progress();
            events.send(Event::Hash(HashEvent::Progress(HashProgress::new(
                processed, total, bytes,
            ))));
        }

        if let Some(error) = failure {
            warn!(%error, "Hashing aborted");
            store.lock().clear();
            return Err(error);
        }
        if lost {
            store.lock().clear();
            return Err(PipelineError::WorkerLost);
        }
        if user_cancelled {
            store.lock().clear();
            info!("Hashing cancelled, records discarded");
            return Ok(PoolOutcome::Cancelled);
        }

        events.send(Event::Hash(HashEvent::Completed { files_hashed }));
        Ok(PoolOutcome::Completed { files_hashed })
    }
}

impl Default for HashWorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS, DEFAULT_POLL_INTERVAL)
    }
}

fn hash_worker(
    worker: usize,
    store: &SharedStore,
    directory: &Path,
    abort: &CancellationToken,
    events: &EventSender,
) -> WorkerExit {
    debug!(worker, "Hash worker started");
    let mut hashed = 0;

    while !abort.is_cancelled() {
        let Some((index, name)) = store.claim_next() else {
            break;
        };

        let digest = match digest_file(&directory.join(&name)) {
            Ok(digest) => digest,
            Err(source) => {
                warn!(worker, file = %name, error = %source, "Failed to hash file");
                return WorkerExit {
                    worker,
                    hashed,
                    error: Some(PipelineError::Worker { name, source }),
                };
            }
        };

        if store.save_digest(index, digest.to_hex()).is_err() {
            // Store was reset underneath us
            break;
        }
        hashed += 1;
        events.send(Event::Hash(HashEvent::FileHashed { index, name }));
    }

    WorkerExit {
        worker,
        hashed,
        error: None,
    }
}
