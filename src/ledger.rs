//! Read-mostly ledger queries used by cost estimation and submission.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::TransactionError;
use tracing::debug;

use crate::error::{Error, Result};

/// How often signature status is polled while confirming.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A blockhash together with the last block height at which it is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Ledger queries the mint pipeline depends on.
///
/// Implementations never mutate shared state, so one client can be shared
/// between the estimator, assembler and orchestrator.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn minimum_balance_for_rent_exemption(&self, size: usize) -> Result<u64>;

    /// Fee for `message` under the current fee schedule, `None` if unknown.
    async fn fee_for_message(&self, message: &Message) -> Result<Option<u64>>;

    async fn balance(&self, pubkey: &Pubkey) -> Result<u64>;

    async fn latest_blockhash(&self, commitment: CommitmentConfig) -> Result<RecentBlockhash>;

    /// Waits until `signature` reaches `commitment` or its blockhash expires.
    ///
    /// Returns the on-chain execution error, if the transaction failed.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &RecentBlockhash,
        commitment: CommitmentConfig,
    ) -> Result<Option<TransactionError>>;
}

/// [`LedgerClient`] over the JSON-RPC API.
#[derive(Clone)]
pub struct RpcLedger {
    client: Arc<RpcClient>,
}

impl RpcLedger {
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_client(Arc::new(RpcClient::new_with_timeout(
            url.into(),
            Duration::from_secs(30),
        )))
    }

    pub fn from_client(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> Arc<RpcClient> {
        self.client.clone()
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn minimum_balance_for_rent_exemption(&self, size: usize) -> Result<u64> {
        self.client
            .get_minimum_balance_for_rent_exemption(size)
            .await
            .map_err(|e| Error::ledger(format!("rent exemption query failed: {}", e)))
    }

    async fn fee_for_message(&self, message: &Message) -> Result<Option<u64>> {
        self.client
            .get_fee_for_message(message)
            .await
            .map(Some)
            .map_err(|e| Error::ledger(format!("fee query failed: {}", e)))
    }

    async fn balance(&self, pubkey: &Pubkey) -> Result<u64> {
        self.client
            .get_balance(pubkey)
            .await
            .map_err(|e| Error::ledger(format!("balance query failed: {}", e)))
    }

    async fn latest_blockhash(&self, commitment: CommitmentConfig) -> Result<RecentBlockhash> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map_err(|e| Error::ledger(format!("failed to get latest blockhash: {}", e)))?;
        Ok(RecentBlockhash {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &RecentBlockhash,
        commitment: CommitmentConfig,
    ) -> Result<Option<TransactionError>> {
        loop {
            let statuses = self
                .client
                .get_signature_statuses(&[*signature])
                .await
                .map_err(|e| Error::ledger(format!("signature status query failed: {}", e)))?;

            if let Some(Some(status)) = statuses.value.first() {
                if status.err.is_some() {
                    return Ok(status.err.clone());
                }
                if status.satisfies_commitment(commitment) {
                    return Ok(None);
                }
                debug!(%signature, confirmations = ?status.confirmations, "awaiting commitment");
            }

            let height = self
                .client
                .get_block_height_with_commitment(commitment)
                .await
                .map_err(|e| Error::ledger(format!("block height query failed: {}", e)))?;
            if height > blockhash.last_valid_block_height {
                return Err(Error::ledger(format!(
                    "blockhash expired at block height {} before {} was confirmed",
                    blockhash.last_valid_block_height, signature
                )));
            }

            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }
}
