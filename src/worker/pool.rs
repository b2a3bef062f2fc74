//! Worker pool management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use solana_sdk::signature::Keypair;
use tracing::debug;

use crate::crypto::KeyPairSource;
use crate::error::{ResourceError, Result};
use crate::matcher::VanityPattern;

use super::cpu::{CpuWorker, WorkerStats};

/// A keypair whose address satisfied the pattern.
pub struct VanityMatch {
    /// The matching keypair; owned by whoever holds this value
    pub keypair: Keypair,
    /// The base-58 address, original casing
    pub address: String,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl std::fmt::Debug for VanityMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VanityMatch")
            .field("address", &self.address)
            .field("worker_id", &self.worker_id)
            .field("keypair", &"<redacted>")
            .finish()
    }
}

/// Manages a pool of workers for parallel vanity keypair search.
pub struct WorkerPool {
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for results
    result_rx: Receiver<VanityMatch>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Per-worker statistics, indexed by worker ID
    stats: Vec<Arc<WorkerStats>>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Creates a new worker pool with the specified number of workers.
    ///
    /// `stop_flag` is shared with the caller so the search can be cancelled
    /// from outside (signal handlers, request aborts).
    pub fn new(
        num_workers: usize,
        pattern: VanityPattern,
        source: Arc<dyn KeyPairSource>,
        stop_flag: Arc<AtomicBool>,
    ) -> Result<Self> {
        // Every worker sends at most once, so sends never block.
        let (result_tx, result_rx) = bounded(num_workers.max(1));
        let stats: Vec<_> = (0..num_workers)
            .map(|_| Arc::new(WorkerStats::new()))
            .collect();

        let handles = Self::spawn_workers(&pattern, &source, result_tx, &stop_flag, &stats)?;

        Ok(Self {
            handles: Some(handles),
            result_rx,
            stop_flag,
            stats,
            start_time: Instant::now(),
        })
    }

    /// Spawns worker threads.
    fn spawn_workers(
        pattern: &VanityPattern,
        source: &Arc<dyn KeyPairSource>,
        result_tx: Sender<VanityMatch>,
        stop_flag: &Arc<AtomicBool>,
        stats: &[Arc<WorkerStats>],
    ) -> Result<Vec<JoinHandle<()>>> {
        let mut handles = Vec::with_capacity(stats.len());

        for (id, worker_stats) in stats.iter().enumerate() {
            let worker = CpuWorker::new(
                id,
                pattern.clone(),
                source.clone(),
                result_tx.clone(),
                stop_flag.clone(),
                worker_stats.clone(),
            );

            let spawned = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    stop_flag.store(true, Ordering::Relaxed);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(ResourceError::Worker(e.to_string()).into());
                }
            }
        }

        debug!(workers = handles.len(), "vanity workers started");
        Ok(handles)
    }

    /// Waits for a result with a timeout.
    ///
    /// Returns `Some(result)` if a match is found, `None` if timeout expires.
    pub fn wait_for_result(&self, timeout: Duration) -> Option<VanityMatch> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    /// Attempts to receive a result without blocking.
    pub fn try_recv(&self) -> Option<VanityMatch> {
        self.result_rx.try_recv().ok()
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops all workers and waits for their threads to exit.
    pub fn join(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.stats.len()
    }

    /// Returns the keys generated by each worker, indexed by worker ID.
    pub fn worker_keys(&self) -> Vec<u64> {
        self.stats.iter().map(|s| s.total_keys()).collect()
    }

    /// Returns the total keys generated across all workers.
    pub fn total_keys(&self) -> u64 {
        self.stats.iter().map(|s| s.total_keys()).sum()
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.stats.iter().map(|s| s.total_matches()).sum()
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Wait for workers to finish if they haven't been joined
        self.stop_and_join();
    }
}
