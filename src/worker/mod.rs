//! Worker pool for parallel vanity keypair search.
//!
//! This module provides:
//! - Multi-threaded CPU workers
//! - A pool with a shared stop flag and per-worker attempt counters
//! - The deadline-bounded search engine built on top of the pool

mod cpu;
mod engine;
mod pool;

pub use cpu::{CpuWorker, WorkerStats, BATCH_SIZE};
pub use engine::{
    shorter_pattern_suggestion, SearchBudget, SearchJob, SearchOutcome, SearchProgress,
    StopHandle, TimeoutResponse, VanityResponse, VanitySearchEngine, MAX_THREADS, MIN_THREADS,
};
pub use pool::{VanityMatch, WorkerPool};
