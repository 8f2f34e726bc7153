//! Errors raised by the counting core and its configuration.

use thiserror::Error;

/// Library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No tokenizer is registered under the requested name.
    #[error("No tokenizer named `{0}` found.")]
    UnknownTokenizer(String),

    /// The tokenizer exists but could not be built from its argument.
    #[error("Tokenizer `{name}` could not be constructed: {reason}")]
    TokenizerInit { name: String, reason: String },

    /// A count no longer fits in 64 bits.
    #[error("Count for token `{0}` overflowed a 64-bit accumulator")]
    CountOverflow(String),

    /// A job configuration value is out of range.
    #[error("Invalid job configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether the error stems from configuration and should stop a job
    /// before any input is processed.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, Error::CountOverflow(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
