//! Tokens separated by whitespace only; punctuation stays attached.

use super::Tokenizer;
use crate::Token;

/// Splits text on Unicode whitespace only; punctuation stays attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace().map(str::to_string).collect()
    }
}
