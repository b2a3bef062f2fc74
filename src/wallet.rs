//! Wallet signer boundary: supplies the payer signature and submits.

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tracing::info;

use crate::error::{Error, Result};

/// Submission options passed through to the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub skip_preflight: bool,
    pub preflight_commitment: CommitmentLevel,
}

impl Default for SendOptions {
    /// Simulation is skipped: the mint account does not exist yet, which
    /// makes preflight simulation of the metadata instruction unreliable.
    fn default() -> Self {
        Self {
            skip_preflight: true,
            preflight_commitment: CommitmentLevel::Processed,
        }
    }
}

/// Anything that can add the payer's signature and broadcast a transaction.
///
/// Implementations return [`Error::Cancelled`] when the user declines
/// approval and [`Error::ExternalService`] for transport failures.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// The fee payer this wallet signs for.
    fn pubkey(&self) -> Pubkey;

    fn is_connected(&self) -> bool;

    async fn send_transaction(
        &self,
        transaction: Transaction,
        options: SendOptions,
    ) -> Result<Signature>;
}

/// Signs with a local payer keypair and submits over RPC.
pub struct KeypairWallet {
    payer: Keypair,
    client: Arc<RpcClient>,
}

impl KeypairWallet {
    pub fn new(payer: Keypair, client: Arc<RpcClient>) -> Self {
        Self { payer, client }
    }
}

#[async_trait]
impl WalletSigner for KeypairWallet {
    fn pubkey(&self) -> Pubkey {
        self.payer.pubkey()
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn send_transaction(
        &self,
        mut transaction: Transaction,
        options: SendOptions,
    ) -> Result<Signature> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.payer], blockhash)
            .map_err(|e| Error::wallet(format!("payer signature failed: {}", e)))?;

        let config = RpcSendTransactionConfig {
            skip_preflight: options.skip_preflight,
            preflight_commitment: Some(options.preflight_commitment),
            ..RpcSendTransactionConfig::default()
        };
        let signature = self
            .client
            .send_transaction_with_config(&transaction, config)
            .await
            .map_err(|e| Error::wallet(format!("failed to send transaction: {}", e)))?;

        info!(%signature, "transaction sent");
        Ok(signature)
    }
}
