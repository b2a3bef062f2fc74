//! Deadline-bounded vanity search on top of the worker pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use solana_sdk::signature::Signer;
use tracing::{info, warn};

use crate::crypto::{keypair_secret_bytes, Ed25519Source, KeyPairSource};
use crate::error::Result;
use crate::matcher::VanityPattern;

use super::{VanityMatch, WorkerPool};

/// Bounds for the number of worker threads.
pub const MIN_THREADS: usize = 1;
pub const MAX_THREADS: usize = 16;

/// Patterns longer than this trigger a cost warning.
pub const LONG_PATTERN_WARN_LEN: usize = 4;

/// Time budget for a search, a step function of the combined pattern length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget(Duration);

impl SearchBudget {
    pub fn for_pattern_len(len: usize) -> Self {
        let secs = match len {
            0..=2 => 30,
            3 => 120,
            4 => 300,
            _ => 600,
        };
        Self(Duration::from_secs(secs))
    }

    pub fn duration(self) -> Duration {
        self.0
    }
}

/// Cloneable handle that stops a running search from another thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Raw flag, for signal handlers that need an `Arc<AtomicBool>`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.0.clone()
    }
}

/// One search request: a pattern, a worker count and a deadline.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pattern: VanityPattern,
    thread_count: usize,
    deadline: Duration,
    stop: StopHandle,
}

impl SearchJob {
    /// Creates a job with the thread count clamped to 1..=16 and the
    /// deadline taken from [`SearchBudget`].
    pub fn new(pattern: VanityPattern, thread_count: usize) -> Self {
        let deadline = SearchBudget::for_pattern_len(pattern.len()).duration();
        Self {
            pattern,
            thread_count: thread_count.clamp(MIN_THREADS, MAX_THREADS),
            deadline,
            stop: StopHandle::new(),
        }
    }

    /// Overrides the deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn pattern(&self) -> &VanityPattern {
        &self.pattern
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Handle for stopping this job once it is running.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

/// Snapshot of real worker throughput, emitted on the progress cadence.
#[derive(Debug, Clone)]
pub struct SearchProgress {
    pub elapsed: Duration,
    pub deadline: Duration,
    /// Keys generated per worker, indexed by worker ID
    pub worker_attempts: Vec<u64>,
}

impl SearchProgress {
    pub fn total_attempts(&self) -> u64 {
        self.worker_attempts.iter().sum()
    }

    pub fn keys_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_attempts() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Terminal state of a [`SearchJob`].
#[derive(Debug)]
pub enum SearchOutcome {
    Found {
        result: VanityMatch,
        attempts: u64,
        elapsed: Duration,
    },
    TimedOut {
        attempts: u64,
        elapsed: Duration,
        suggestion: Option<String>,
    },
    Cancelled {
        attempts: u64,
        elapsed: Duration,
    },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}

/// Suggests a shorter pattern after a timeout, if a shorter one is worth trying.
pub fn shorter_pattern_suggestion(pattern_len: usize) -> Option<String> {
    (pattern_len > 2).then(|| {
        format!(
            "Try a pattern with {} or fewer characters",
            pattern_len - 1
        )
    })
}

/// Successful search as handed to a caller: address plus keypair bytes.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VanityResponse {
    pub public_key: String,
    pub secret_key: Vec<u8>,
}

impl std::fmt::Debug for VanityResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VanityResponse")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl From<&VanityMatch> for VanityResponse {
    fn from(result: &VanityMatch) -> Self {
        Self {
            public_key: result.keypair.pubkey().to_string(),
            secret_key: keypair_secret_bytes(&result.keypair),
        }
    }
}

/// Timed-out search as handed to a caller.
#[derive(Debug, Clone, Serialize)]
pub struct TimeoutResponse {
    pub error: String,
    pub suggestion: Option<String>,
}

/// Orchestrates worker pools for vanity searches.
#[derive(Clone)]
pub struct VanitySearchEngine {
    source: Arc<dyn KeyPairSource>,
    progress_interval: Duration,
}

impl Default for VanitySearchEngine {
    fn default() -> Self {
        Self::new(Arc::new(Ed25519Source))
    }
}

impl VanitySearchEngine {
    pub fn new(source: Arc<dyn KeyPairSource>) -> Self {
        Self {
            source,
            progress_interval: Duration::from_secs(5),
        }
    }

    /// Sets how often progress callbacks fire.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval.max(Duration::from_millis(10));
        self
    }

    /// Validates the pattern and runs a search with the default budget.
    pub fn search_pattern(
        &self,
        prefix: &str,
        suffix: &str,
        thread_count: usize,
        ignore_case: bool,
    ) -> Result<SearchOutcome> {
        let pattern = VanityPattern::new(prefix, suffix, !ignore_case)?;
        self.search(SearchJob::new(pattern, thread_count), |_| {})
    }

    /// Runs `job` to a terminal state, blocking the calling thread.
    ///
    /// Terminates on the first match, the job's deadline, or its stop
    /// handle. All worker threads have exited when this returns.
    pub fn search<F>(&self, job: SearchJob, mut on_progress: F) -> Result<SearchOutcome>
    where
        F: FnMut(&SearchProgress),
    {
        let pattern_len = job.pattern.len();
        if pattern_len > LONG_PATTERN_WARN_LEN {
            warn!(
                pattern_len,
                expected_attempts = job.pattern.estimated_attempts(),
                "long vanity pattern requested, this may take a very long time"
            );
        }
        info!(
            pattern = %job.pattern,
            threads = job.thread_count,
            budget_secs = job.deadline.as_secs(),
            difficulty = %job.pattern.difficulty_description(),
            "starting vanity search"
        );

        let pool = WorkerPool::new(
            job.thread_count,
            job.pattern.clone(),
            self.source.clone(),
            job.stop.flag(),
        )?;

        let outcome = loop {
            let elapsed = pool.elapsed();
            if elapsed >= job.deadline {
                pool.stop();
                // A worker may have matched right at the deadline.
                break match pool.try_recv() {
                    Some(result) => Self::found(&pool, result),
                    None => SearchOutcome::TimedOut {
                        attempts: pool.total_keys(),
                        elapsed,
                        suggestion: shorter_pattern_suggestion(pattern_len),
                    },
                };
            }

            let wait = self.progress_interval.min(job.deadline - elapsed);
            if let Some(result) = pool.wait_for_result(wait) {
                break Self::found(&pool, result);
            }

            if pool.is_stopped() {
                break match pool.try_recv() {
                    Some(result) => Self::found(&pool, result),
                    None => SearchOutcome::Cancelled {
                        attempts: pool.total_keys(),
                        elapsed: pool.elapsed(),
                    },
                };
            }

            on_progress(&SearchProgress {
                elapsed: pool.elapsed(),
                deadline: job.deadline,
                worker_attempts: pool.worker_keys(),
            });
        };

        pool.join();

        match &outcome {
            SearchOutcome::Found {
                result,
                attempts,
                elapsed,
            } => info!(
                address = %result.address,
                attempts,
                elapsed_ms = elapsed.as_millis() as u64,
                "vanity address found"
            ),
            SearchOutcome::TimedOut { attempts, .. } => {
                warn!(attempts, "vanity search exhausted its time budget")
            }
            SearchOutcome::Cancelled { attempts, .. } => info!(attempts, "vanity search cancelled"),
        }

        Ok(outcome)
    }

    fn found(pool: &WorkerPool, result: VanityMatch) -> SearchOutcome {
        pool.stop();
        SearchOutcome::Found {
            result,
            attempts: pool.total_keys(),
            elapsed: pool.elapsed(),
        }
    }
}
