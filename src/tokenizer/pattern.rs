//! User supplied token pattern.
//!

use regex::Regex;

use super::Tokenizer;
use crate::{Error, Result, Token};

/// Every non-overlapping match of a regular expression is one token.
#[derive(Debug, Clone)]
pub struct PatternTokenizer {
    pattern: Regex,
}

impl PatternTokenizer {
    /// Compiles `pattern`. An invalid expression is reported as
    /// [`Error::TokenizerInit`].
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::TokenizerInit {
                name: "pattern".to_string(),
                reason: "empty pattern".to_string(),
            });
        }
        let pattern = Regex::new(pattern).map_err(|e| Error::TokenizerInit {
            name: "pattern".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }
}

impl Tokenizer for PatternTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_become_tokens() {
        let tokenizer = PatternTokenizer::new(r"[A-Za-z0-9_']+").unwrap();
        assert_eq!(
            vec!["don't", "stop", "42"],
            tokenizer.tokenize("don't stop -- 42!")
        );
    }

    #[test]
    fn invalid_pattern_fails_at_construction() {
        let err = PatternTokenizer::new("(unclosed").unwrap_err();
        assert!(matches!(err, Error::TokenizerInit { .. }));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(PatternTokenizer::new("").is_err());
    }

    #[test]
    fn empty_matches_are_skipped() {
        let tokenizer = PatternTokenizer::new("a*").unwrap();
        assert_eq!(vec!["aa", "a"], tokenizer.tokenize("aabca"));
    }
}
