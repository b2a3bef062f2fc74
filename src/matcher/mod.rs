//! Pattern matching for base-58 addresses.
//!
//! A pattern pins characters at the start (prefix) and/or the end (suffix)
//! of the rendered public key, optionally ignoring case.

mod pattern;

pub use pattern::{MatchResult, VanityPattern};
