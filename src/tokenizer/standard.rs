//! The default tokenizer: splits on whitespace and punctuation.
//!

use once_cell::sync::Lazy;
use regex::Regex;

use super::Tokenizer;
use crate::Token;

// Unicode punctuation plus the ASCII punctuation/symbol set.
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\p{P}[:punct:]]+").expect("separator pattern is valid"));

/// Splits text on runs of whitespace and punctuation. Case is preserved.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardTokenizer;

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        SEPARATORS
            .split(text)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
