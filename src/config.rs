//! Runtime configuration for the vanity mint CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::crypto::MAX_ADDRESS_LEN;
use crate::worker::{MAX_THREADS, MIN_THREADS};

/// Solana token minter with vanity mint addresses
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search for a keypair whose address matches a prefix and/or suffix
    Grind(GrindArgs),
    /// Create a token, optionally at a vanity mint address
    Mint(MintArgs),
}

/// Vanity search options
#[derive(Args, Debug, Clone, Default)]
pub struct GrindArgs {
    /// Address prefix to search for (base-58 characters only)
    #[arg(short = 'p', long, default_value = "")]
    pub prefix: String,

    /// Address suffix to search for (base-58 characters only)
    #[arg(short = 's', long, default_value = "")]
    pub suffix: String,

    /// Number of worker threads (default: number of CPU cores, at most 16)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Match case-insensitively
    #[arg(short = 'i', long, default_value = "false")]
    pub ignore_case: bool,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,
}

impl GrindArgs {
    /// Returns the number of workers, defaulting to CPU count.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(num_cpus::get)
            .clamp(MIN_THREADS, MAX_THREADS)
    }

    /// True if a search was requested at all.
    pub fn is_requested(&self) -> bool {
        !self.prefix.is_empty() || !self.suffix.is_empty()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_requested() {
            return Err(ConfigError::InvalidPattern(
                "At least one of --prefix or --suffix must be provided".into(),
            ));
        }

        let total_len = self.prefix.chars().count() + self.suffix.chars().count();
        if total_len > MAX_ADDRESS_LEN {
            return Err(ConfigError::InvalidPattern(format!(
                "Combined prefix + suffix cannot be longer than {} characters",
                MAX_ADDRESS_LEN
            )));
        }

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidValue(
                "Report interval must be at least 1 second".into(),
            ));
        }

        Ok(())
    }
}

/// Token creation options
#[derive(Args, Debug, Clone)]
pub struct MintArgs {
    /// RPC endpoint
    #[arg(long, env = "SOLANA_RPC_URL", default_value = "https://api.devnet.solana.com")]
    pub rpc_url: String,

    /// Payer keypair file
    #[arg(short = 'k', long)]
    pub keypair: PathBuf,

    /// Token name (max 32 bytes)
    #[arg(long)]
    pub name: String,

    /// Token symbol (max 10 bytes)
    #[arg(long)]
    pub symbol: String,

    /// Number of decimals (0-9)
    #[arg(long, default_value = "9")]
    pub decimals: u8,

    /// Initial supply in whole tokens
    #[arg(long)]
    pub supply: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Image URL referenced from the metadata
    #[arg(long, conflicts_with = "image_file")]
    pub image: Option<String>,

    /// Local image to upload to the content store
    #[arg(long)]
    pub image_file: Option<PathBuf>,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub twitter: Option<String>,

    #[arg(long)]
    pub discord: Option<String>,

    #[arg(long)]
    pub telegram: Option<String>,

    /// Override for the createdOn metadata field
    #[arg(long)]
    pub created_on: Option<String>,

    /// Use this metadata URI verbatim
    #[arg(long, conflicts_with = "upload")]
    pub metadata_uri: Option<String>,

    /// Upload metadata to the content store instead of inlining it
    #[arg(long, default_value = "false")]
    pub upload: bool,

    /// Inline the metadata if the upload fails
    #[arg(long, default_value = "false")]
    pub inline_fallback: bool,

    /// Content store JWT
    #[arg(long, env = "PINATA_JWT", hide_env_values = true)]
    pub pinata_jwt: Option<String>,

    /// Content store gateway host
    #[arg(long, env = "PINATA_GATEWAY")]
    pub pinata_gateway: Option<String>,

    /// Revoke the mint authority after minting the supply
    #[arg(long, default_value = "false")]
    pub revoke_mint: bool,

    /// Revoke the freeze authority
    #[arg(long, default_value = "false")]
    pub revoke_freeze: bool,

    /// Seconds to wait for confirmation
    #[arg(long, default_value = "60")]
    pub confirm_timeout: u64,

    /// Grind a vanity mint address first
    #[command(flatten)]
    pub vanity: GrindArgs,
}

impl MintArgs {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.upload || self.image_file.is_some())
            && (self.pinata_jwt.is_none() || self.pinata_gateway.is_none())
        {
            return Err(ConfigError::InvalidValue(
                "Uploading requires PINATA_JWT and PINATA_GATEWAY".into(),
            ));
        }

        if self.confirm_timeout == 0 {
            return Err(ConfigError::InvalidValue(
                "Confirmation timeout must be at least 1 second".into(),
            ));
        }

        if self.vanity.is_requested() {
            self.vanity.validate()?;
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
