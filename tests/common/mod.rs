//! In-memory stand-ins for the ledger, the wallet and the content store.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::{Transaction, TransactionError};

use vanity_mint::error::{Error, Result};
use vanity_mint::ledger::{LedgerClient, RecentBlockhash};
use vanity_mint::metadata::{ContentStore, StoredFile};
use vanity_mint::token::{DEFAULT_FEE_LAMPORTS, METADATA_ACCOUNT_SIZE, MINT_ACCOUNT_SIZE};
use vanity_mint::wallet::{SendOptions, WalletSigner};

/// Rent quoted by [`MockLedger`] for an account of `size` bytes.
pub fn rent_for(size: usize) -> u64 {
    (size as u64 + 128) * 6_960
}

/// Total a mint costs against a [`MockLedger`] with the default fee.
pub fn expected_total(has_metadata: bool) -> u64 {
    let metadata = if has_metadata {
        rent_for(METADATA_ACCOUNT_SIZE)
    } else {
        0
    };
    rent_for(MINT_ACCOUNT_SIZE) + metadata + DEFAULT_FEE_LAMPORTS
}

#[derive(Debug, Clone)]
pub enum FeeQuote {
    Quoted(u64),
    Unknown,
    Fails,
}

#[derive(Debug, Clone)]
pub enum Confirmation {
    Succeeds,
    FailsOnChain(TransactionError),
    NetworkError,
    Hangs,
}

pub struct MockLedger {
    pub balance: AtomicU64,
    pub fee: Mutex<FeeQuote>,
    pub confirmation: Mutex<Confirmation>,
    pub blockhash: Hash,
    pub confirm_calls: AtomicUsize,
}

impl MockLedger {
    pub fn new(balance: u64) -> Self {
        Self {
            balance: AtomicU64::new(balance),
            fee: Mutex::new(FeeQuote::Quoted(DEFAULT_FEE_LAMPORTS)),
            confirmation: Mutex::new(Confirmation::Succeeds),
            blockhash: Hash::new_unique(),
            confirm_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_fee(self, fee: FeeQuote) -> Self {
        *self.fee.lock().unwrap() = fee;
        self
    }

    pub fn with_confirmation(self, confirmation: Confirmation) -> Self {
        *self.confirmation.lock().unwrap() = confirmation;
        self
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn minimum_balance_for_rent_exemption(&self, size: usize) -> Result<u64> {
        Ok(rent_for(size))
    }

    async fn fee_for_message(&self, _message: &Message) -> Result<Option<u64>> {
        let quote = self.fee.lock().unwrap().clone();
        match quote {
            FeeQuote::Quoted(fee) => Ok(Some(fee)),
            FeeQuote::Unknown => Ok(None),
            FeeQuote::Fails => Err(Error::ledger("fee endpoint unavailable")),
        }
    }

    async fn balance(&self, _pubkey: &Pubkey) -> Result<u64> {
        Ok(self.balance.load(Ordering::SeqCst))
    }

    async fn latest_blockhash(&self, _commitment: CommitmentConfig) -> Result<RecentBlockhash> {
        Ok(RecentBlockhash {
            blockhash: self.blockhash,
            last_valid_block_height: 150,
        })
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        _blockhash: &RecentBlockhash,
        _commitment: CommitmentConfig,
    ) -> Result<Option<TransactionError>> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        let confirmation = self.confirmation.lock().unwrap().clone();
        match confirmation {
            Confirmation::Succeeds => Ok(None),
            Confirmation::FailsOnChain(err) => Ok(Some(err)),
            Confirmation::NetworkError => Err(Error::ledger("connection reset")),
            Confirmation::Hangs => std::future::pending().await,
        }
    }
}

/// Wallet that records every transaction handed to it.
pub struct MockWallet {
    pub payer: Keypair,
    pub connected: bool,
    pub decline: bool,
    pub sends: AtomicUsize,
    pub last_sent: Mutex<Option<(Transaction, SendOptions)>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            payer: Keypair::new(),
            connected: true,
            decline: false,
            sends: AtomicUsize::new(0),
            last_sent: Mutex::new(None),
        }
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn pubkey(&self) -> Pubkey {
        self.payer.pubkey()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send_transaction(
        &self,
        mut transaction: Transaction,
        options: SendOptions,
    ) -> Result<Signature> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.decline {
            return Err(Error::Cancelled("user rejected the request".into()));
        }

        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.payer], blockhash)
            .map_err(Error::wallet)?;
        let signature = transaction.signatures[0];
        *self.last_sent.lock().unwrap() = Some((transaction, options));
        Ok(signature)
    }
}

/// Content store that keeps uploads in memory.
#[derive(Default)]
pub struct MockStore {
    pub fail: bool,
    pub documents: Mutex<Vec<serde_json::Value>>,
}

#[async_trait]
impl ContentStore for MockStore {
    async fn upload_json(&self, document: &serde_json::Value) -> Result<String> {
        if self.fail {
            return Err(Error::content_store("upload failed: 503 Service Unavailable"));
        }
        let mut documents = self.documents.lock().unwrap();
        documents.push(document.clone());
        Ok(format!("https://gateway.test/ipfs/Qm{}", documents.len()))
    }

    async fn upload_file(&self, bytes: Vec<u8>, file_name: &str) -> Result<StoredFile> {
        if self.fail {
            return Err(Error::content_store("upload failed: 503 Service Unavailable"));
        }
        let content_id = format!("Qm{}{}", file_name.len(), bytes.len());
        Ok(StoredFile {
            url: format!("https://gateway.test/ipfs/{}", content_id),
            content_id,
        })
    }
}

pub fn shared(ledger: MockLedger) -> Arc<MockLedger> {
    Arc::new(ledger)
}
