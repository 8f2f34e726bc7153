//! Token frequency counting in the MapReduce style.
//!
//! Every partition of the input is fed through its own [`LocalAggregator`],
//! which counts tokens in memory and flushes one [`PartialCount`] per distinct
//! token. Partial counts sharing a token are summed by [`merge`], and the very
//! same reduction runs as a pre-shuffle combiner via [`merge::combine`].
//! The [`standalone`] driver wires these together inside a single process.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};

pub mod aggregator;
pub mod config;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod standalone;
pub mod tokenizer;
pub mod utils;

pub use aggregator::LocalAggregator;
pub use config::JobConfig;
pub use error::{Error, Result};
pub use merge::merge;
pub use metrics::{Counters, MetricsSink, NoopMetrics, TokenCounter};
pub use tokenizer::{Tokenizer, TokenizerRegistry};

/////////////////////////////////////////////////////////////////////////////
// Count records
/////////////////////////////////////////////////////////////////////////////

/// An atomic unit of text produced by a [`Tokenizer`].
pub type Token = String;

/// Occurrences of one token observed within a single partition or merge step.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct PartialCount {
    /// The token.
    pub token: Token,
    /// How often it was seen.
    pub count: u64,
}

impl PartialCount {
    /// Construct a new partial count record.
    pub fn new(token: impl Into<Token>, count: u64) -> Self {
        Self {
            token: token.into(),
            count,
        }
    }

    /// Get the token of this record.
    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Consumes the record and returns the token.
    #[inline]
    pub fn into_token(self) -> Token {
        self.token
    }
}

/// The total number of occurrences of one token across the whole corpus.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct FinalCount {
    /// The token.
    pub token: Token,
    /// Sum of all partial counts for the token.
    pub count: u64,
}

impl FinalCount {
    /// Construct a new final count record.
    pub fn new(token: impl Into<Token>, count: u64) -> Self {
        Self {
            token: token.into(),
            count,
        }
    }
}

/// Hashes a token. Compute a reduce partition for a given token
/// by calculating `ihash(token) % n_reduce`.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    hasher.write(key);
    // Masked to 31 bits, so the conversion cannot fail.
    (hasher.finish() & 0x7fff_ffff) as u32
}
