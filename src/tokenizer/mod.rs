//! Converts tokenizer names to actual tokenizer implementations.
//!
//! # Example
//!
//! To get the default tokenizer:
//! ```
//! # use wordfreq::Result;
//! use wordfreq::tokenizer;
//! # fn main() -> Result<()> {
//! let standard = tokenizer::named("standard")?;
//! assert_eq!(vec!["hello", "world"], standard.tokenize("hello, world!"));
//! # Ok(())
//! # }
//! ```
//!
//! A selector is either a bare name (`whitespace`) or a name followed by
//! an argument for the factory (`pattern:[a-z]+`).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{Error, Result, Token};

pub mod pattern;
pub mod standard;
pub mod whitespace;
pub mod words;

pub use pattern::PatternTokenizer;
pub use standard::StandardTokenizer;
pub use whitespace::WhitespaceTokenizer;
pub use words::WordsTokenizer;

/// Name of the tokenizer used when nothing else is configured.
pub const DEFAULT_TOKENIZER: &str = "standard";

/// Splits a text record into an ordered sequence of tokens.
///
/// Implementations must be deterministic and free of side effects: the same
/// text always yields the same tokens in the same order.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Builds a tokenizer from the optional argument part of a selector.
pub type TokenizerFactory = fn(arg: Option<&str>) -> Result<Box<dyn Tokenizer>>;

/// Tokenizers available to a job, keyed by name.
#[derive(Clone)]
pub struct TokenizerRegistry {
    factories: BTreeMap<String, TokenizerFactory>,
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("standard", |arg| {
            no_argument("standard", arg)?;
            Ok(Box::new(StandardTokenizer))
        });
        registry.register("whitespace", |arg| {
            no_argument("whitespace", arg)?;
            Ok(Box::new(WhitespaceTokenizer))
        });
        registry.register("words", |arg| {
            no_argument("words", arg)?;
            Ok(Box::new(WordsTokenizer))
        });
        registry.register("pattern", |arg| {
            let pattern = arg.ok_or_else(|| Error::TokenizerInit {
                name: "pattern".to_string(),
                reason: "expected `pattern:<regex>`".to_string(),
            })?;
            Ok(Box::new(PatternTokenizer::new(pattern)?))
        });
        registry
    }
}

impl TokenizerRegistry {
    /// A registry without any tokenizers, not even the built-in ones.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: TokenizerFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Names of all registered tokenizers, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiates the tokenizer described by `selector`.
    ///
    /// Returns [`Error::UnknownTokenizer`] if no factory is registered under
    /// the name, or whatever the factory fails with.
    pub fn build(&self, selector: &str) -> Result<Arc<dyn Tokenizer>> {
        let (name, arg) = match selector.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (selector, None),
        };
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::UnknownTokenizer(name.to_string()))?;
        Ok(Arc::from(factory(arg)?))
    }
}

fn no_argument(name: &str, arg: Option<&str>) -> Result<()> {
    match arg {
        None => Ok(()),
        Some(arg) => Err(Error::TokenizerInit {
            name: name.to_string(),
            reason: format!("takes no argument, got `{}`", arg),
        }),
    }
}

/// Gets the built-in tokenizer described by `selector`.
pub fn named(selector: &str) -> Result<Arc<dyn Tokenizer>> {
    TokenizerRegistry::default().build(selector)
}
