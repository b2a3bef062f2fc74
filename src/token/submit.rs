//! Signs, submits and confirms an assembled mint transaction.

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tracing::{error, info};

use crate::error::{Error, ResourceError, Result};
use crate::ledger::LedgerClient;
use crate::wallet::{SendOptions, WalletSigner};

use super::assembler::AssembledTransaction;
use super::cost::CostBreakdown;

/// Default wait for confirmation before giving up.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Progress of a single submission. Only moves forward; `Failed` is
/// reachable from any non-terminal state and is itself terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Preparing,
    AwaitingWalletApproval,
    Submitted(Signature),
    Confirming,
    Confirmed,
    Failed(String),
}

impl SubmissionState {
    fn rank(&self) -> u8 {
        match self {
            SubmissionState::Preparing => 0,
            SubmissionState::AwaitingWalletApproval => 1,
            SubmissionState::Submitted(_) => 2,
            SubmissionState::Confirming => 3,
            SubmissionState::Confirmed => 4,
            SubmissionState::Failed(_) => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Confirmed | SubmissionState::Failed(_))
    }

    pub fn can_advance_to(&self, next: &SubmissionState) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(next, SubmissionState::Failed(_)) || next.rank() > self.rank()
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionState::Preparing => write!(f, "preparing transaction"),
            SubmissionState::AwaitingWalletApproval => write!(f, "awaiting wallet approval"),
            SubmissionState::Submitted(sig) => write!(f, "submitted {}", sig),
            SubmissionState::Confirming => write!(f, "confirming"),
            SubmissionState::Confirmed => write!(f, "confirmed"),
            SubmissionState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Outcome of a confirmed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub signature: Signature,
    pub mint_address: Pubkey,
}

/// Forwards forward-only state changes to the caller's callback.
struct StateReporter<F> {
    current: Option<SubmissionState>,
    on_state: F,
}

impl<F: FnMut(&SubmissionState)> StateReporter<F> {
    fn advance(&mut self, next: SubmissionState) {
        if let Some(current) = &self.current {
            if !current.can_advance_to(&next) {
                return;
            }
        }
        info!(state = %next, "submission state");
        (self.on_state)(&next);
        self.current = Some(next);
    }

    fn fail(&mut self, err: Error) -> Error {
        error!(error = %err, "submission failed");
        self.advance(SubmissionState::Failed(err.to_string()));
        err
    }
}

/// Drives one submission per mint attempt. Never retries on its own.
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    ledger: Arc<dyn LedgerClient>,
    confirm_timeout: Duration,
    commitment: CommitmentConfig,
}

impl SubmissionOrchestrator {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            commitment: CommitmentConfig::confirmed(),
        }
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Verifies wallet and balance, partially signs with the mint keypair,
    /// hands the transaction to the wallet and waits for confirmation.
    ///
    /// Nothing reaches the wallet unless the pre-flight checks pass.
    pub async fn submit<F>(
        &self,
        assembled: &AssembledTransaction,
        cost: &CostBreakdown,
        mint_keypair: &Keypair,
        wallet: &dyn WalletSigner,
        on_state: F,
    ) -> Result<SubmissionReceipt>
    where
        F: FnMut(&SubmissionState),
    {
        let mut reporter = StateReporter {
            current: None,
            on_state,
        };
        reporter.advance(SubmissionState::Preparing);

        let transaction = match self.prepare(assembled, cost, mint_keypair, wallet).await {
            Ok(transaction) => transaction,
            Err(e) => return Err(reporter.fail(e)),
        };

        reporter.advance(SubmissionState::AwaitingWalletApproval);
        let signature = match wallet
            .send_transaction(transaction, SendOptions::default())
            .await
        {
            Ok(signature) => signature,
            Err(e) => return Err(reporter.fail(e)),
        };
        reporter.advance(SubmissionState::Submitted(signature));

        reporter.advance(SubmissionState::Confirming);
        match self.confirm(&signature, assembled).await {
            Ok(()) => {
                reporter.advance(SubmissionState::Confirmed);
                Ok(SubmissionReceipt {
                    signature,
                    mint_address: assembled.mint,
                })
            }
            Err(e) => Err(reporter.fail(e)),
        }
    }

    async fn prepare(
        &self,
        assembled: &AssembledTransaction,
        cost: &CostBreakdown,
        mint_keypair: &Keypair,
        wallet: &dyn WalletSigner,
    ) -> Result<Transaction> {
        if !wallet.is_connected() {
            return Err(ResourceError::WalletDisconnected.into());
        }
        if wallet.pubkey() != assembled.fee_payer {
            return Err(Error::validation(format!(
                "wallet {} is not the fee payer {} the transaction was built for",
                wallet.pubkey(),
                assembled.fee_payer
            )));
        }
        if mint_keypair.pubkey() != assembled.mint {
            return Err(Error::validation(
                "mint keypair does not match the assembled transaction",
            ));
        }

        let required = cost.total();
        let available = self.ledger.balance(&assembled.fee_payer).await?;
        if available < required {
            return Err(ResourceError::InsufficientBalance {
                required,
                available,
            }
            .into());
        }

        let mut transaction = Transaction::new_unsigned(assembled.message());
        transaction
            .try_partial_sign(&[mint_keypair], assembled.recent_blockhash.blockhash)
            .map_err(|e| Error::validation(format!("mint keypair could not sign: {}", e)))?;
        Ok(transaction)
    }

    async fn confirm(&self, signature: &Signature, assembled: &AssembledTransaction) -> Result<()> {
        let confirmation = self.ledger.confirm_transaction(
            signature,
            &assembled.recent_blockhash,
            self.commitment,
        );

        match tokio::time::timeout(self.confirm_timeout, confirmation).await {
            Err(_) => Err(Error::Timeout {
                operation: "transaction confirmation",
                elapsed: self.confirm_timeout,
            }),
            Ok(Err(e)) => Err(e),
            Ok(Ok(Some(detail))) => Err(Error::OnChainExecution {
                signature: *signature,
                detail,
            }),
            Ok(Ok(None)) => {
                info!(%signature, "transaction confirmed");
                Ok(())
            }
        }
    }
}
