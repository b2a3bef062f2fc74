//! End-to-end mint pipeline against in-memory collaborators.

mod common;

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::instruction::InstructionError;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::TransactionError;

use vanity_mint::error::{Error, ErrorKind, ResourceError};
use vanity_mint::metadata::{MetadataUriResolver, UriMode};
use vanity_mint::token::{
    AuthorityFlags, CostEstimator, InstructionKind, MetadataStep, SubmissionState, TokenSpec,
    TransactionAssembler,
};
use vanity_mint::{MintRequest, TokenMinter};

use common::{expected_total, shared, Confirmation, FeeQuote, MockLedger, MockStore, MockWallet};

const METADATA_URL: &str = "https://example.com/token.json";

fn request(flags: AuthorityFlags) -> MintRequest {
    MintRequest {
        spec: TokenSpec::new("Test Token", "TEST", 6, "1000000"),
        image: None,
        uri_mode: UriMode::DirectUrl(METADATA_URL.into()),
        flags,
    }
}

fn minter(ledger: &Arc<MockLedger>) -> TokenMinter {
    TokenMinter::new(ledger.clone(), MetadataUriResolver::default())
}

#[tokio::test]
async fn test_mint_with_exact_balance_confirms() {
    let ledger = shared(MockLedger::new(expected_total(true)));
    let wallet = MockWallet::new();
    let mint = Keypair::new();
    let mint_address = mint.pubkey();

    let mut states = Vec::new();
    let report = minter(&ledger)
        .mint(&request(AuthorityFlags::default()), mint, &wallet, |s| {
            states.push(s.clone())
        })
        .await
        .unwrap();

    assert_eq!(report.mint_address, mint_address);
    assert_eq!(report.cost.total(), expected_total(true));
    assert_eq!(
        report.metadata,
        MetadataStep::Attached {
            uri: METADATA_URL.into()
        }
    );
    assert_eq!(wallet.send_count(), 1);

    let sent = wallet.last_sent.lock().unwrap();
    let (transaction, options) = sent.as_ref().unwrap();
    assert_eq!(transaction.message.instructions.len(), 5);
    assert!(transaction.is_signed());
    assert!(options.skip_preflight);
    assert_eq!(options.preflight_commitment, CommitmentLevel::Processed);

    assert_eq!(states.first(), Some(&SubmissionState::Preparing));
    assert_eq!(states.last(), Some(&SubmissionState::Confirmed));
    assert!(states
        .iter()
        .any(|s| matches!(s, SubmissionState::Submitted(sig) if *sig == report.signature)));
}

#[tokio::test]
async fn test_revocations_follow_metadata() {
    let ledger = shared(MockLedger::new(0));
    let assembler = TransactionAssembler::new(ledger.clone());
    let spec = TokenSpec::new("Test Token", "TEST", 6, "1000000");
    let mint = Keypair::new().pubkey();
    let payer = Keypair::new().pubkey();

    let assembled = assembler
        .assemble(
            &spec,
            &mint,
            &payer,
            Some(METADATA_URL),
            AuthorityFlags {
                revoke_mint: true,
                revoke_freeze: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(assembled.len(), 7);
    assert_eq!(
        assembled.kinds,
        vec![
            InstructionKind::CreateMintAccount,
            InstructionKind::InitializeMint,
            InstructionKind::CreateAssociatedAccount,
            InstructionKind::MintTo,
            InstructionKind::CreateMetadata,
            InstructionKind::RevokeMintAuthority,
            InstructionKind::RevokeFreezeAuthority,
        ]
    );
    let metadata = assembled.position(InstructionKind::CreateMetadata).unwrap();
    for revoke in [
        InstructionKind::RevokeMintAuthority,
        InstructionKind::RevokeFreezeAuthority,
    ] {
        assert!(metadata < assembled.position(revoke).unwrap());
    }
    assert_eq!(assembled.recent_blockhash.blockhash, ledger.blockhash);
    assert_eq!(assembled.message().account_keys[0], payer);
}

#[tokio::test]
async fn test_one_lamport_short_never_reaches_wallet() {
    let ledger = shared(MockLedger::new(expected_total(true) - 1));
    let wallet = MockWallet::new();

    let mut states = Vec::new();
    let err = minter(&ledger)
        .mint(
            &request(AuthorityFlags::default()),
            Keypair::new(),
            &wallet,
            |s| states.push(s.clone()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Resource);
    match &err {
        Error::Resource(resource) => assert_eq!(resource.shortfall(), 1),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("short by 1 lamports"));
    assert_eq!(wallet.send_count(), 0);
    assert!(matches!(states.last(), Some(SubmissionState::Failed(_))));
}

#[tokio::test]
async fn test_disconnected_wallet_rejected_before_send() {
    let ledger = shared(MockLedger::new(u64::MAX));
    let mut wallet = MockWallet::new();
    wallet.connected = false;

    let err = minter(&ledger)
        .mint(&request(AuthorityFlags::default()), Keypair::new(), &wallet, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Resource(ResourceError::WalletDisconnected)
    ));
    assert_eq!(wallet.send_count(), 0);
}

#[tokio::test]
async fn test_declined_approval_is_cancelled() {
    let ledger = shared(MockLedger::new(u64::MAX));
    let mut wallet = MockWallet::new();
    wallet.decline = true;

    let err = minter(&ledger)
        .mint(&request(AuthorityFlags::default()), Keypair::new(), &wallet, |_| {})
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(ledger.confirm_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_on_chain_failure_distinct_from_network_failure() {
    let on_chain = shared(MockLedger::new(u64::MAX).with_confirmation(
        Confirmation::FailsOnChain(TransactionError::InstructionError(
            4,
            InstructionError::Custom(1),
        )),
    ));
    let err = minter(&on_chain)
        .mint(
            &request(AuthorityFlags::default()),
            Keypair::new(),
            &MockWallet::new(),
            |_| {},
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OnChainExecution);

    let network =
        shared(MockLedger::new(u64::MAX).with_confirmation(Confirmation::NetworkError));
    let err = minter(&network)
        .mint(
            &request(AuthorityFlags::default()),
            Keypair::new(),
            &MockWallet::new(),
            |_| {},
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalService);
}

#[tokio::test]
async fn test_confirmation_times_out() {
    let ledger = shared(MockLedger::new(u64::MAX).with_confirmation(Confirmation::Hangs));
    let wallet = MockWallet::new();

    let mut states = Vec::new();
    let err = minter(&ledger)
        .with_confirm_timeout(Duration::from_millis(50))
        .mint(
            &request(AuthorityFlags::default()),
            Keypair::new(),
            &wallet,
            |s| states.push(s.clone()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(wallet.send_count(), 1);
    assert!(states.contains(&SubmissionState::Confirming));
    assert!(matches!(states.last(), Some(SubmissionState::Failed(_))));
}

#[tokio::test]
async fn test_metadata_rent_only_when_attached() {
    let ledger = shared(MockLedger::new(0));
    let estimator = CostEstimator::new(ledger.clone());
    let assembled = TransactionAssembler::new(ledger.clone())
        .assemble(
            &TokenSpec::new("Test Token", "TEST", 6, "1"),
            &Keypair::new().pubkey(),
            &Keypair::new().pubkey(),
            Some(METADATA_URL),
            AuthorityFlags::default(),
        )
        .await
        .unwrap();
    let message = assembled.message();

    let without = estimator.estimate(&message, false).await.unwrap();
    let with = estimator.estimate(&message, true).await.unwrap();
    assert_eq!(without.metadata_account_rent, 0);
    assert!(with.total() > without.total());
    assert_eq!(with.total(), expected_total(true));
}

#[tokio::test]
async fn test_fee_falls_back_to_default() {
    for quote in [FeeQuote::Unknown, FeeQuote::Fails] {
        let ledger = shared(MockLedger::new(0).with_fee(quote));
        let estimator = CostEstimator::new(ledger.clone()).with_default_fee(7_000);
        let assembled = TransactionAssembler::new(ledger.clone())
            .assemble(
                &TokenSpec::new("Test Token", "TEST", 6, "1"),
                &Keypair::new().pubkey(),
                &Keypair::new().pubkey(),
                None,
                AuthorityFlags::default(),
            )
            .await
            .unwrap();

        let cost = estimator.estimate(&assembled.message(), false).await.unwrap();
        assert_eq!(cost.estimated_fee, 7_000);
    }
}

#[tokio::test]
async fn test_failed_upload_skips_metadata_but_mints() {
    let ledger = shared(MockLedger::new(expected_total(false)));
    let store = Arc::new(MockStore {
        fail: true,
        ..MockStore::default()
    });
    let minter = TokenMinter::new(ledger.clone(), MetadataUriResolver::new(Some(store)));
    let wallet = MockWallet::new();

    let request = MintRequest {
        uri_mode: UriMode::ContentStoreUpload,
        ..request(AuthorityFlags::default())
    };
    let report = minter
        .mint(&request, Keypair::new(), &wallet, |_| {})
        .await
        .unwrap();

    assert!(matches!(report.metadata, MetadataStep::Skipped { .. }));
    assert_eq!(report.cost.metadata_account_rent, 0);
    let sent = wallet.last_sent.lock().unwrap();
    assert_eq!(sent.as_ref().unwrap().0.message.instructions.len(), 4);
}

#[tokio::test]
async fn test_upload_with_inline_fallback_attaches_data_uri() {
    let ledger = shared(MockLedger::new(u64::MAX));
    let store = Arc::new(MockStore {
        fail: true,
        ..MockStore::default()
    });
    let resolver = MetadataUriResolver::new(Some(store)).with_inline_fallback(true);
    let minter = TokenMinter::new(ledger.clone(), resolver);

    let request = MintRequest {
        uri_mode: UriMode::ContentStoreUpload,
        ..request(AuthorityFlags::default())
    };
    let report = minter
        .mint(&request, Keypair::new(), &MockWallet::new(), |_| {})
        .await
        .unwrap();

    match report.metadata {
        MetadataStep::Attached { uri } => assert!(uri.starts_with("data:application/json;base64,")),
        other => panic!("metadata was not attached: {other:?}"),
    }
}

#[tokio::test]
async fn test_uploaded_document_carries_spec_fields() {
    let ledger = shared(MockLedger::new(u64::MAX));
    let store = Arc::new(MockStore::default());
    let minter = TokenMinter::new(ledger.clone(), MetadataUriResolver::new(Some(store.clone())));

    let request = MintRequest {
        spec: TokenSpec::new("Test Token", "TEST", 6, "1000000")
            .with_description("A test token")
            .with_created_on("launchpad"),
        image: Some("https://imgur.com/abc123".into()),
        uri_mode: UriMode::ContentStoreUpload,
        flags: AuthorityFlags::default(),
    };
    let report = minter
        .mint(&request, Keypair::new(), &MockWallet::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(
        report.metadata,
        MetadataStep::Attached {
            uri: "https://gateway.test/ipfs/Qm1".into()
        }
    );
    let documents = store.documents.lock().unwrap();
    assert_eq!(documents[0]["name"], "Test Token");
    assert_eq!(documents[0]["createdOn"], "launchpad");
    assert_eq!(documents[0]["image"], "https://i.imgur.com/abc123.jpg");
}

#[tokio::test]
async fn test_invalid_spec_rejected_before_any_call() {
    let ledger = shared(MockLedger::new(u64::MAX));
    let wallet = MockWallet::new();
    let mut request = request(AuthorityFlags::default());
    request.spec.decimals = 12;

    let err = minter(&ledger)
        .mint(&request, Keypair::new(), &wallet, |_| {})
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(wallet.send_count(), 0);
}

#[tokio::test]
async fn test_multibyte_name_over_byte_limit_rejected() {
    let ledger = shared(MockLedger::new(u64::MAX));
    let wallet = MockWallet::new();
    let mut request = request(AuthorityFlags::default());
    request.spec.name = "é".repeat(32);

    let err = minter(&ledger)
        .mint(&request, Keypair::new(), &wallet, |_| {})
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(wallet.send_count(), 0);

    let err = TransactionAssembler::new(ledger.clone())
        .assemble(
            &request.spec,
            &Keypair::new().pubkey(),
            &wallet.payer.pubkey(),
            Some(METADATA_URL),
            AuthorityFlags::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
