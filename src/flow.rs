//! End-to-end mint pipeline: metadata URI, assembly, cost, submission.

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use tracing::{info, warn};

use crate::error::{Error, ResourceError, Result};
use crate::ledger::LedgerClient;
use crate::metadata::{MetadataUriResolver, UriMode};
use crate::token::{
    AuthorityFlags, CostBreakdown, CostEstimator, MetadataStep, SubmissionOrchestrator,
    SubmissionState, TokenSpec, TransactionAssembler,
};
use crate::wallet::WalletSigner;
use crate::worker::{SearchJob, SearchOutcome, SearchProgress, VanitySearchEngine};

/// Everything needed to mint one token.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub spec: TokenSpec,
    /// Image URL referenced from the metadata document
    pub image: Option<String>,
    pub uri_mode: UriMode,
    pub flags: AuthorityFlags,
}

/// What a successful mint produced.
#[derive(Debug, Clone)]
pub struct MintReport {
    pub signature: Signature,
    pub mint_address: Pubkey,
    pub cost: CostBreakdown,
    pub metadata: MetadataStep,
}

/// Wires the resolver, assembler, estimator and orchestrator together over
/// one shared ledger client.
#[derive(Clone)]
pub struct TokenMinter {
    resolver: MetadataUriResolver,
    assembler: TransactionAssembler,
    estimator: CostEstimator,
    orchestrator: SubmissionOrchestrator,
}

impl TokenMinter {
    pub fn new(ledger: Arc<dyn LedgerClient>, resolver: MetadataUriResolver) -> Self {
        Self {
            resolver,
            assembler: TransactionAssembler::new(ledger.clone()),
            estimator: CostEstimator::new(ledger.clone()),
            orchestrator: SubmissionOrchestrator::new(ledger),
        }
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.orchestrator = self.orchestrator.with_confirm_timeout(timeout);
        self
    }

    pub fn with_default_fee(mut self, lamports: u64) -> Self {
        self.estimator = self.estimator.with_default_fee(lamports);
        self
    }

    /// Mints the token described by `request` at `mint_keypair`'s address.
    ///
    /// The mint keypair is consumed and dropped when the attempt ends,
    /// whether it was confirmed or abandoned.
    pub async fn mint<F>(
        &self,
        request: &MintRequest,
        mint_keypair: Keypair,
        wallet: &dyn WalletSigner,
        on_state: F,
    ) -> Result<MintReport>
    where
        F: FnMut(&SubmissionState),
    {
        request.spec.validate()?;
        let payer = wallet.pubkey();
        let mint = mint_keypair.pubkey();

        let metadata_uri = if request.spec.has_metadata() {
            match self
                .resolver
                .resolve(&request.spec, request.image.as_deref(), &request.uri_mode)
                .await
            {
                Ok(uri) => Some(uri),
                Err(e) => {
                    warn!(error = %e, "metadata URI could not be resolved");
                    None
                }
            }
        } else {
            None
        };

        let assembled = self
            .assembler
            .assemble(
                &request.spec,
                &mint,
                &payer,
                metadata_uri.as_deref(),
                request.flags,
            )
            .await?;

        let cost = self
            .estimator
            .estimate(&assembled.message(), assembled.has_metadata())
            .await?;
        info!(
            total_sol = %format!("{:.6}", cost.total_sol()),
            "payer balance must cover rent and fees"
        );

        let receipt = self
            .orchestrator
            .submit(&assembled, &cost, &mint_keypair, wallet, on_state)
            .await?;

        Ok(MintReport {
            signature: receipt.signature,
            mint_address: receipt.mint_address,
            cost,
            metadata: assembled.metadata,
        })
    }
}

/// Runs a vanity search on the blocking thread pool.
pub async fn search_async<F>(
    engine: &VanitySearchEngine,
    job: SearchJob,
    on_progress: F,
) -> Result<SearchOutcome>
where
    F: FnMut(&SearchProgress) + Send + 'static,
{
    let engine = engine.clone();
    tokio::task::spawn_blocking(move || engine.search(job, on_progress))
        .await
        .map_err(|e| Error::from(ResourceError::Worker(e.to_string())))?
}
