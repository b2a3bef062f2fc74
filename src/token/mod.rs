//! SPL token minting: the token description, cost estimation, transaction
//! assembly and submission.

mod assembler;
mod cost;
mod spec;
mod submit;

pub use assembler::{
    AssembledTransaction, AuthorityFlags, InstructionKind, MetadataStep, TransactionAssembler,
};
pub use cost::{
    CostBreakdown, CostEstimator, DEFAULT_FEE_LAMPORTS, LAMPORTS_PER_SOL, METADATA_ACCOUNT_SIZE,
    MINT_ACCOUNT_SIZE,
};
pub use spec::{SocialLinks, TokenSpec, MAX_DECIMALS, MAX_NAME_LEN, MAX_SYMBOL_LEN};
pub use submit::{
    SubmissionOrchestrator, SubmissionReceipt, SubmissionState, DEFAULT_CONFIRM_TIMEOUT,
};
