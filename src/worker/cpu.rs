//! CPU-based worker for vanity keypair search.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use solana_sdk::signature::Signer;

use crate::crypto::KeyPairSource;
use crate::matcher::VanityPattern;

use super::VanityMatch;

/// Keys generated between two polls of the stop flag.
///
/// Bounds how long a worker can run past a stop request.
pub const BATCH_SIZE: u64 = 256;

/// Statistics for a CPU worker.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total keys generated
    pub keys_generated: AtomicU64,
    /// Matches found
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total keys generated.
    pub fn total_keys(&self) -> u64 {
        self.keys_generated.load(Ordering::Relaxed)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// A CPU worker that generates and tests keypairs.
pub struct CpuWorker {
    /// Worker ID
    id: usize,
    /// The pattern to match against
    pattern: VanityPattern,
    /// Where fresh keypairs come from
    source: Arc<dyn KeyPairSource>,
    /// Channel to send results
    result_tx: Sender<VanityMatch>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// This worker's statistics
    stats: Arc<WorkerStats>,
}

impl CpuWorker {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        pattern: VanityPattern,
        source: Arc<dyn KeyPairSource>,
        result_tx: Sender<VanityMatch>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            pattern,
            source,
            result_tx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates keypairs and tests them against the pattern until:
    /// - A match is found (sends the result, then raises the stop flag)
    /// - Stop flag is set by another worker, the deadline or the caller
    ///
    /// Rejected keypairs are dropped immediately and never leave this loop.
    pub fn run(&self) {
        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                break;
            }

            let mut generated = 0;
            let mut found = None;
            while generated < BATCH_SIZE {
                let keypair = self.source.generate();
                generated += 1;

                let address = self.source.render(&keypair.pubkey());
                if self.pattern.matches(&address).is_match() {
                    found = Some(VanityMatch {
                        keypair,
                        address,
                        worker_id: self.id,
                    });
                    break;
                }
            }

            self.stats
                .keys_generated
                .fetch_add(generated, Ordering::Relaxed);

            if let Some(result) = found {
                self.stats.matches_found.fetch_add(1, Ordering::Relaxed);
                // The result must be queued before the flag is raised so the
                // pool never observes "stopped" without the match behind it.
                // A full or closed channel means another worker already won.
                let _ = self.result_tx.try_send(result);
                self.stop_flag.store(true, Ordering::Relaxed);
                break;
            }
        }
    }
}
