//! Error taxonomy shared by the search engine and the mint pipeline.
//!
//! Every failure is tagged with its category where it is raised, so callers
//! branch on [`Error::kind`] instead of inspecting messages.

use std::time::Duration;

use solana_sdk::signature::Signature;
use solana_sdk::transaction::TransactionError;

/// Coarse category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any work started.
    Validation,
    /// A time budget was exhausted.
    Timeout,
    /// Balance or wallet state prevents the attempt.
    Resource,
    /// Ledger RPC, wallet transport or content store failed.
    ExternalService,
    /// The transaction landed but the ledger rejected it.
    OnChainExecution,
    /// The user or caller explicitly stopped the attempt.
    Cancelled,
}

/// External collaborator that produced an [`Error::ExternalService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Ledger,
    Wallet,
    ContentStore,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Ledger => write!(f, "ledger rpc"),
            Service::Wallet => write!(f, "wallet"),
            Service::ContentStore => write!(f, "content store"),
        }
    }
}

/// Conditions that make the current attempt impossible without user action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error(
        "insufficient balance: need {required} lamports, have {available} (short by {} lamports)",
        lamports_short(.required, .available)
    )]
    InsufficientBalance { required: u64, available: u64 },

    #[error("wallet disconnected, reconnect and try again")]
    WalletDisconnected,

    #[error("vanity worker failed: {0}")]
    Worker(String),
}

fn lamports_short(required: &u64, available: &u64) -> u64 {
    required.saturating_sub(*available)
}

impl ResourceError {
    /// Lamports missing for an [`ResourceError::InsufficientBalance`], zero otherwise.
    pub fn shortfall(&self) -> u64 {
        match self {
            ResourceError::InsufficientBalance {
                required,
                available,
            } => lamports_short(required, available),
            _ => 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{operation} timed out after {}s", .elapsed.as_secs())]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("{service} error: {message}")]
    ExternalService { service: Service, message: String },

    #[error("transaction {signature} failed on-chain: {detail}")]
    OnChainExecution {
        signature: Signature,
        detail: TransactionError,
    },

    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn ledger(message: impl std::fmt::Display) -> Self {
        Error::ExternalService {
            service: Service::Ledger,
            message: message.to_string(),
        }
    }

    pub fn wallet(message: impl std::fmt::Display) -> Self {
        Error::ExternalService {
            service: Service::Wallet,
            message: message.to_string(),
        }
    }

    pub fn content_store(message: impl std::fmt::Display) -> Self {
        Error::ExternalService {
            service: Service::ContentStore,
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Resource(_) => ErrorKind::Resource,
            Error::ExternalService { .. } => ErrorKind::ExternalService,
            Error::OnChainExecution { .. } => ErrorKind::OnChainExecution,
            Error::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
