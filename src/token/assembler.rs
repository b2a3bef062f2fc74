//! Builds the ordered instruction list for a token mint.

use std::sync::Arc;

use mpl_token_metadata::accounts::Metadata;
use mpl_token_metadata::instructions::CreateMetadataAccountV3Builder;
use mpl_token_metadata::types::DataV2;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token::instruction::{initialize_mint, mint_to, set_authority, AuthorityType};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::ledger::{LedgerClient, RecentBlockhash};
use crate::metadata::MAX_URI_LEN;

use super::cost::{CostEstimator, MINT_ACCOUNT_SIZE};
use super::spec::{TokenSpec, MAX_NAME_LEN, MAX_SYMBOL_LEN};

/// Optional authority revocations appended after metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorityFlags {
    pub revoke_mint: bool,
    pub revoke_freeze: bool,
}

/// Label for each instruction in an [`AssembledTransaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    CreateMintAccount,
    InitializeMint,
    CreateAssociatedAccount,
    MintTo,
    CreateMetadata,
    RevokeMintAuthority,
    RevokeFreezeAuthority,
}

/// Whether the metadata instruction made it into the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataStep {
    Attached { uri: String },
    Skipped { reason: String },
}

impl MetadataStep {
    pub fn is_attached(&self) -> bool {
        matches!(self, MetadataStep::Attached { .. })
    }
}

/// A fully ordered, unsigned mint transaction.
#[derive(Debug, Clone)]
pub struct AssembledTransaction {
    pub instructions: Vec<Instruction>,
    /// Parallel to `instructions`
    pub kinds: Vec<InstructionKind>,
    pub fee_payer: Pubkey,
    pub mint: Pubkey,
    pub associated_account: Pubkey,
    pub recent_blockhash: RecentBlockhash,
    pub metadata: MetadataStep,
}

impl AssembledTransaction {
    /// Compiles the instructions into a message against the recent blockhash.
    pub fn message(&self) -> Message {
        Message::new_with_blockhash(
            &self.instructions,
            Some(&self.fee_payer),
            &self.recent_blockhash.blockhash,
        )
    }

    pub fn position(&self, kind: InstructionKind) -> Option<usize> {
        self.kinds.iter().position(|k| *k == kind)
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.is_attached()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Accumulates instructions together with their labels.
#[derive(Default)]
struct InstructionList {
    instructions: Vec<Instruction>,
    kinds: Vec<InstructionKind>,
}

impl InstructionList {
    fn push(&mut self, kind: InstructionKind, instruction: Instruction) {
        self.instructions.push(instruction);
        self.kinds.push(kind);
    }
}

/// Builds mint transactions in the only order the token programs accept.
#[derive(Clone)]
pub struct TransactionAssembler {
    ledger: Arc<dyn LedgerClient>,
    estimator: CostEstimator,
}

impl TransactionAssembler {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            estimator: CostEstimator::new(ledger.clone()),
            ledger,
        }
    }

    /// Assembles the mint transaction.
    ///
    /// Order: create mint account, initialize mint, create the payer's
    /// associated account, mint the supply, attach metadata, then revoke
    /// authorities. Metadata creation needs the mint authority to sign, so
    /// it always precedes the revocations. A missing or oversized
    /// `metadata_uri` skips metadata instead of failing the mint.
    pub async fn assemble(
        &self,
        spec: &TokenSpec,
        mint: &Pubkey,
        payer: &Pubkey,
        metadata_uri: Option<&str>,
        flags: AuthorityFlags,
    ) -> Result<AssembledTransaction> {
        spec.validate()?;
        let raw_supply = spec.raw_supply()?;
        let token_program = spl_token::id();
        let associated_account = get_associated_token_address(payer, mint);

        let mint_rent = self.estimator.mint_account_rent().await?;
        let mut list = InstructionList::default();

        list.push(
            InstructionKind::CreateMintAccount,
            system_instruction::create_account(
                payer,
                mint,
                mint_rent,
                MINT_ACCOUNT_SIZE as u64,
                &token_program,
            ),
        );

        // Freeze authority is granted even when it will be revoked below;
        // only an existing authority can be revoked.
        list.push(
            InstructionKind::InitializeMint,
            initialize_mint(&token_program, mint, payer, Some(payer), spec.decimals)
                .map_err(instruction_error)?,
        );

        list.push(
            InstructionKind::CreateAssociatedAccount,
            create_associated_token_account(payer, payer, mint, &token_program),
        );

        list.push(
            InstructionKind::MintTo,
            mint_to(&token_program, mint, &associated_account, payer, &[], raw_supply)
                .map_err(instruction_error)?,
        );

        let metadata = if spec.has_metadata() {
            match metadata_instruction(spec, mint, payer, metadata_uri) {
                Ok((instruction, uri)) => {
                    list.push(InstructionKind::CreateMetadata, instruction);
                    MetadataStep::Attached { uri }
                }
                Err(reason) => {
                    warn!(%reason, "continuing without token metadata");
                    MetadataStep::Skipped { reason }
                }
            }
        } else {
            MetadataStep::Skipped {
                reason: "name or symbol missing".into(),
            }
        };

        if flags.revoke_mint {
            list.push(
                InstructionKind::RevokeMintAuthority,
                set_authority(
                    &token_program,
                    mint,
                    None,
                    AuthorityType::MintTokens,
                    payer,
                    &[],
                )
                .map_err(instruction_error)?,
            );
        }

        if flags.revoke_freeze {
            list.push(
                InstructionKind::RevokeFreezeAuthority,
                set_authority(
                    &token_program,
                    mint,
                    None,
                    AuthorityType::FreezeAccount,
                    payer,
                    &[],
                )
                .map_err(instruction_error)?,
            );
        }

        let recent_blockhash = self
            .ledger
            .latest_blockhash(CommitmentConfig::finalized())
            .await?;

        info!(
            %mint,
            instructions = list.instructions.len(),
            metadata = metadata.is_attached(),
            revoke_mint = flags.revoke_mint,
            revoke_freeze = flags.revoke_freeze,
            "mint transaction assembled"
        );

        Ok(AssembledTransaction {
            instructions: list.instructions,
            kinds: list.kinds,
            fee_payer: *payer,
            mint: *mint,
            associated_account,
            recent_blockhash,
            metadata,
        })
    }
}

fn instruction_error(e: impl std::fmt::Display) -> Error {
    Error::validation(format!("failed to build instruction: {}", e))
}

/// Builds the metadata instruction, or explains why it cannot be built.
fn metadata_instruction(
    spec: &TokenSpec,
    mint: &Pubkey,
    payer: &Pubkey,
    metadata_uri: Option<&str>,
) -> std::result::Result<(Instruction, String), String> {
    let uri = metadata_uri
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .ok_or_else(|| "no metadata URI available".to_string())?;
    if uri.len() > MAX_URI_LEN {
        return Err(format!(
            "metadata URI is {} characters, the limit is {}",
            uri.len(),
            MAX_URI_LEN
        ));
    }

    let (metadata_account, _bump) = Metadata::find_pda(mint);
    let instruction = CreateMetadataAccountV3Builder::new()
        .metadata(metadata_account)
        .mint(*mint)
        .mint_authority(*payer)
        .payer(*payer)
        .update_authority(*payer, true)
        .data(DataV2 {
            name: truncate_to(&spec.name, MAX_NAME_LEN),
            symbol: truncate_to(&spec.symbol, MAX_SYMBOL_LEN),
            uri: uri.to_string(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        })
        .is_mutable(true)
        .instruction();

    Ok((instruction, uri.to_string()))
}

/// Truncates to at most `max` bytes without splitting a character.
fn truncate_to(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
