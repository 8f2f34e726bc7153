//! Lowercased alphabetic words.
//!

use super::Tokenizer;
use crate::Token;

/// Splits on every non-alphabetic character and lowercases each word.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordsTokenizer;

impl Tokenizer for WordsTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split(|c: char| !c.is_alphabetic())
            .filter(|s| !s.is_empty())
            .map(|word| word.to_lowercase())
            .collect()
    }
}
