//! Rent and fee estimation for a mint transaction.

use std::sync::Arc;

use serde::Serialize;
use solana_sdk::message::Message;
use spl_token::solana_program::program_pack::Pack;
use tracing::{info, warn};

use crate::error::Result;
use crate::ledger::LedgerClient;

/// Size of an SPL mint account.
pub const MINT_ACCOUNT_SIZE: usize = spl_token::state::Mint::LEN;

/// Space reserved for a token metadata account.
pub const METADATA_ACCOUNT_SIZE: usize = 679;

/// Fee assumed when the ledger cannot quote one.
pub const DEFAULT_FEE_LAMPORTS: u64 = 5000;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Lamports the payer needs for one mint transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub mint_account_rent: u64,
    /// Zero when no metadata instruction is attached
    pub metadata_account_rent: u64,
    pub estimated_fee: u64,
}

impl CostBreakdown {
    pub fn total(&self) -> u64 {
        self.mint_account_rent
            .saturating_add(self.metadata_account_rent)
            .saturating_add(self.estimated_fee)
    }

    pub fn total_sol(&self) -> f64 {
        self.total() as f64 / LAMPORTS_PER_SOL as f64
    }
}

/// Read-only cost queries against the ledger.
#[derive(Clone)]
pub struct CostEstimator {
    ledger: Arc<dyn LedgerClient>,
    default_fee: u64,
}

impl CostEstimator {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            default_fee: DEFAULT_FEE_LAMPORTS,
        }
    }

    pub fn with_default_fee(mut self, lamports: u64) -> Self {
        self.default_fee = lamports;
        self
    }

    /// Rent-exempt minimum for the mint account.
    pub async fn mint_account_rent(&self) -> Result<u64> {
        self.ledger
            .minimum_balance_for_rent_exemption(MINT_ACCOUNT_SIZE)
            .await
    }

    /// Fee for `message`, or the default fee if the ledger cannot quote one.
    pub async fn fee(&self, message: &Message) -> u64 {
        match self.ledger.fee_for_message(message).await {
            Ok(Some(fee)) => fee,
            Ok(None) => {
                warn!(default = self.default_fee, "ledger returned no fee quote, using default");
                self.default_fee
            }
            Err(e) => {
                warn!(error = %e, default = self.default_fee, "fee estimation failed, using default");
                self.default_fee
            }
        }
    }

    pub async fn estimate(&self, message: &Message, has_metadata: bool) -> Result<CostBreakdown> {
        let mint_account_rent = self.mint_account_rent().await?;
        let metadata_account_rent = if has_metadata {
            self.ledger
                .minimum_balance_for_rent_exemption(METADATA_ACCOUNT_SIZE)
                .await?
        } else {
            0
        };
        let estimated_fee = self.fee(message).await;

        let cost = CostBreakdown {
            mint_account_rent,
            metadata_account_rent,
            estimated_fee,
        };
        info!(
            mint_rent = cost.mint_account_rent,
            metadata_rent = cost.metadata_account_rent,
            fee = cost.estimated_fee,
            total = cost.total(),
            "estimated mint cost"
        );
        Ok(cost)
    }
}
