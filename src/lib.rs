//! # vanity_mint
//!
//! Solana SPL token minter with parallel vanity mint address search.
//!
//! ## Architecture
//!
//! - `crypto`: Keypair generation and base-58 rendering
//! - `matcher`: Prefix/suffix pattern matching
//! - `worker`: Parallel search workers, pool and deadline-bounded engine
//! - `metadata`: Metadata document, content store and URI resolution
//! - `ledger` / `wallet`: Boundaries to the RPC node and the signing wallet
//! - `token`: Token spec, cost estimation, assembly and submission
//! - `flow`: The end-to-end mint pipeline
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod error;
pub mod flow;
pub mod ledger;
pub mod matcher;
pub mod metadata;
pub mod token;
pub mod wallet;
pub mod worker;

pub use config::Config;
pub use crypto::{Ed25519Source, KeyPairSource};
pub use error::{Error, ErrorKind, ResourceError, Result};
pub use flow::{MintReport, MintRequest, TokenMinter};
pub use ledger::{LedgerClient, RecentBlockhash, RpcLedger};
pub use matcher::{MatchResult, VanityPattern};
pub use metadata::{ContentStore, MetadataUriResolver, PinataStore, UriMode};
pub use token::{
    AssembledTransaction, AuthorityFlags, CostBreakdown, CostEstimator, SubmissionOrchestrator,
    SubmissionState, TokenSpec, TransactionAssembler,
};
pub use wallet::{KeypairWallet, WalletSigner};
pub use worker::{SearchJob, SearchOutcome, VanityMatch, VanitySearchEngine, WorkerPool};
