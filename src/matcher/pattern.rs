//! Pattern matching implementation.

use crate::crypto::{is_base58_char, is_base58_char_any_case, ALPHABET_SIZE, MAX_ADDRESS_LEN};
use crate::error::{Error, Result};

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// A validated prefix/suffix pattern for base-58 addresses.
///
/// Immutable once built; the search engine clones it into every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VanityPattern {
    prefix: String,
    suffix: String,
    case_sensitive: bool,
    /// Lowercased copies used when matching case-insensitively
    folded_prefix: String,
    folded_suffix: String,
}

impl VanityPattern {
    /// Builds a pattern, rejecting empty, oversized or non-base-58 input.
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        case_sensitive: bool,
    ) -> Result<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();

        if prefix.is_empty() && suffix.is_empty() {
            return Err(Error::validation(
                "at least one of prefix or suffix must be provided",
            ));
        }

        let total_len = prefix.chars().count() + suffix.chars().count();
        if total_len > MAX_ADDRESS_LEN {
            return Err(Error::validation(format!(
                "combined prefix + suffix cannot be longer than {} characters (got {})",
                MAX_ADDRESS_LEN, total_len
            )));
        }

        let valid = |c: char| {
            if case_sensitive {
                is_base58_char(c)
            } else {
                is_base58_char_any_case(c)
            }
        };
        for (label, part) in [("prefix", &prefix), ("suffix", &suffix)] {
            if let Some(bad) = part.chars().find(|c| !valid(*c)) {
                return Err(Error::validation(format!(
                    "{} contains '{}', which never appears in a base-58 address",
                    label, bad
                )));
            }
        }

        Ok(Self {
            folded_prefix: prefix.to_ascii_lowercase(),
            folded_suffix: suffix.to_ascii_lowercase(),
            prefix,
            suffix,
            case_sensitive,
        })
    }

    /// Returns the prefix as supplied.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the suffix as supplied.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Combined number of characters that must match.
    pub fn len(&self) -> usize {
        self.prefix.len() + self.suffix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matches an address against this pattern.
    ///
    /// The address is never modified, so a case-insensitive hit still
    /// reports the original-cased address to the caller.
    #[inline]
    pub fn matches(&self, address: &str) -> MatchResult {
        let matched = if self.case_sensitive {
            address.starts_with(&self.prefix) && address.ends_with(&self.suffix)
        } else {
            starts_with_ignore_case(address, &self.folded_prefix)
                && ends_with_ignore_case(address, &self.folded_suffix)
        };

        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    /// Returns the expected number of attempts to find a match.
    ///
    /// For base-58 patterns:
    /// - Each character has 58 possible values
    /// - Expected attempts = 58^n where n is the combined length
    ///
    /// Case-insensitive patterns are cheaper in practice; this is the upper bound.
    pub fn estimated_attempts(&self) -> u64 {
        ALPHABET_SIZE.saturating_pow(self.len() as u32)
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_attempts();
        match diff {
            0..=10_000 => "Very Easy (< 1 second)".into(),
            10_001..=1_000_000 => "Easy (seconds)".into(),
            1_000_001..=100_000_000 => "Medium (minutes)".into(),
            100_000_001..=10_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

impl std::fmt::Display for VanityPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let case = if self.case_sensitive { "" } else { ", ignore case" };
        match (self.prefix.is_empty(), self.suffix.is_empty()) {
            (false, true) => write!(f, "starts with '{}'{}", self.prefix, case),
            (true, false) => write!(f, "ends with '{}'{}", self.suffix, case),
            _ => write!(
                f,
                "starts with '{}' and ends with '{}'{}",
                self.prefix, self.suffix, case
            ),
        }
    }
}

#[inline]
fn starts_with_ignore_case(address: &str, folded: &str) -> bool {
    address
        .get(..folded.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(folded))
}

#[inline]
fn ends_with_ignore_case(address: &str, folded: &str) -> bool {
    address
        .len()
        .checked_sub(folded.len())
        .and_then(|start| address.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(folded))
}
