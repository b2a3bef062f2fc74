//! Caller-supplied description of the token to mint.

use chrono::{SecondsFormat, Utc};

use crate::error::{Error, Result};

/// Longest on-chain token name, in bytes.
pub const MAX_NAME_LEN: usize = 32;
/// Longest on-chain token symbol, in bytes.
pub const MAX_SYMBOL_LEN: usize = 10;
/// Largest supported number of decimals.
pub const MAX_DECIMALS: u8 = 9;

/// Optional project links; empty entries are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialLinks {
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
    pub telegram: Option<String>,
}

impl SocialLinks {
    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn website(&self) -> Option<&str> {
        Self::non_empty(&self.website)
    }

    pub fn twitter(&self) -> Option<&str> {
        Self::non_empty(&self.twitter)
    }

    pub fn discord(&self) -> Option<&str> {
        Self::non_empty(&self.discord)
    }

    pub fn telegram(&self) -> Option<&str> {
        Self::non_empty(&self.telegram)
    }
}

/// Token parameters, read-only once handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Whole-token supply as a decimal string, e.g. `"1000000"` or `"2.5"`
    pub supply: String,
    pub description: String,
    pub social: SocialLinks,
    /// Free-form origin marker; an RFC 3339 timestamp unless overridden
    pub created_on: String,
}

impl TokenSpec {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        supply: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            supply: supply.into(),
            description: String::new(),
            social: SocialLinks::default(),
            created_on: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_social(mut self, social: SocialLinks) -> Self {
        self.social = social;
        self
    }

    pub fn with_created_on(mut self, created_on: impl Into<String>) -> Self {
        self.created_on = created_on.into();
        self
    }

    /// Checks required fields and limits before any ledger work starts.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("token name is required"));
        }
        if self.symbol.trim().is_empty() {
            return Err(Error::validation("token symbol is required"));
        }
        if self.supply.trim().is_empty() {
            return Err(Error::validation("token supply is required"));
        }
        // On-chain limits count UTF-8 bytes, not characters.
        if self.name.len() > MAX_NAME_LEN {
            return Err(Error::validation(format!(
                "token name cannot be longer than {} bytes",
                MAX_NAME_LEN
            )));
        }
        if self.symbol.len() > MAX_SYMBOL_LEN {
            return Err(Error::validation(format!(
                "token symbol cannot be longer than {} bytes",
                MAX_SYMBOL_LEN
            )));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(Error::validation(format!(
                "decimals must be between 0 and {}",
                MAX_DECIMALS
            )));
        }
        self.raw_supply().map(|_| ())
    }

    /// True when the metadata instruction should be attached.
    pub fn has_metadata(&self) -> bool {
        !self.name.trim().is_empty() && !self.symbol.trim().is_empty()
    }

    /// Supply in base units: `supply × 10^decimals`, computed exactly.
    pub fn raw_supply(&self) -> Result<u64> {
        parse_supply(self.supply.trim(), self.decimals)
    }
}

fn parse_supply(supply: &str, decimals: u8) -> Result<u64> {
    let invalid = || Error::validation(format!("invalid token supply '{}'", supply));
    let overflow = || Error::validation(format!("token supply '{}' is too large", supply));

    let (whole, fraction) = match supply.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (supply, ""),
    };
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(invalid());
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(Error::validation(format!(
            "token supply '{}' has more than {} decimal places",
            supply, decimals
        )));
    }

    let scale = 10u64.checked_pow(decimals as u32).ok_or_else(overflow)?;
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let fraction_units: u64 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded.parse().map_err(|_| invalid())?
    };

    let raw = whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or_else(overflow)?;
    if raw == 0 {
        return Err(Error::validation("token supply must be greater than zero"));
    }
    Ok(raw)
}
