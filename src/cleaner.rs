use rustc_hash::FxHashSet;

use crate::{
    config::TokenizationStrategy,
    frequency::{FrequencyTable, Token},
    utils::{self, split_into_tokens_aolm, split_into_tokens_symbol, split_into_tokens_whitespace},
};

/// A resolved cleaning configuration: the tokenization strategy plus the concrete set of
/// excluded tokens. Immutable and shareable between threads.
#[derive(Debug, Clone, Default)]
pub struct CleanerConfig {
    strategy: TokenizationStrategy,
    stopwords: FxHashSet<Token>,
}

impl CleanerConfig {
    pub fn new(strategy: TokenizationStrategy, stopwords: FxHashSet<Token>) -> Self {
        Self {
            strategy,
            stopwords,
        }
    }

    pub fn strategy(&self) -> TokenizationStrategy {
        self.strategy
    }

    pub fn stopwords(&self) -> &FxHashSet<Token> {
        &self.stopwords
    }

    /// Normalize a raw line into tokens without touching any tally.
    pub fn tokenize(&self, line: &str) -> Vec<Token> {
        let lowercase = utils::to_lowercase(line);
        let pieces = match self.strategy {
            TokenizationStrategy::Aolm => split_into_tokens_aolm(&lowercase),
            TokenizationStrategy::Whitespace => split_into_tokens_whitespace(&lowercase),
            TokenizationStrategy::Symbol => split_into_tokens_symbol(&lowercase),
        };

        pieces
            .into_iter()
            .filter(|token| !self.stopwords.contains(*token))
            .map(Token::from)
            .collect()
    }
}

/// Cleans the lines of one unit at a time and keeps a running tally of everything it
/// produced since it was created or last [`reset`](TextCleaner::reset).
pub struct TextCleaner<'a> {
    config: &'a CleanerConfig,
    frequencies: FrequencyTable,
}

impl<'a> TextCleaner<'a> {
    pub fn new(config: &'a CleanerConfig) -> Self {
        Self {
            config,
            frequencies: FrequencyTable::new(),
        }
    }

    pub fn config(&self) -> &CleanerConfig {
        self.config
    }

    pub fn tokenize_line(&mut self, line: &str) -> Vec<Token> {
        let tokens = self.config.tokenize(line);
        self.frequencies.extend(&tokens);
        tokens
    }

    /// The cleaned form of `line`: its tokens joined by single spaces.
    pub fn clean_line(&mut self, line: &str) -> String {
        self.tokenize_line(line).join(" ")
    }

    /// Tally of the current unit.
    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    /// Start a new unit, returning the tally of the previous one.
    pub fn reset(&mut self) -> FrequencyTable {
        std::mem::take(&mut self.frequencies)
    }
}
