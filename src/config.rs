//! Pipeline configuration.
//!
//! A [`Config`] holds the user-facing choices as plain names so that it can be read
//! from TOML and overridden from the command line. [`Config::resolve`] turns those
//! names into a [`CleanerConfig`], validating every name and reading the selected
//! stopword list before any edition is touched.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{cleaner::CleanerConfig, frequency::Token, utils};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown tokenization strategy `{0}` (expected one of: aolm, whitespace, symbol)")]
    UnknownTokenization(String),
    #[error("unknown stopword list `{0}` (expected one of: none, voyant, nltk)")]
    UnknownStopwords(String),
    #[error("no source file configured for stopword list `{0}`")]
    MissingStopwordSource(String),
    #[error("unknown metric `{0}` (expected one of: IntrinsicOverallMatch, TokenTotals)")]
    UnknownMetric(String),
    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration file")]
    Parse(#[from] toml::de::Error),
}

/// How raw lines are split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenizationStrategy {
    /// Regex cleaning: everything but letters, digits and in-word apostrophes separates tokens.
    #[default]
    Aolm,
    /// Whitespace split with punctuation trimmed from the ends of each piece.
    Whitespace,
    /// Multi-pattern symbol table split.
    Symbol,
}

impl TokenizationStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            TokenizationStrategy::Aolm => "aolm",
            TokenizationStrategy::Whitespace => "whitespace",
            TokenizationStrategy::Symbol => "symbol",
        }
    }
}

impl FromStr for TokenizationStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aolm" => Ok(TokenizationStrategy::Aolm),
            "whitespace" => Ok(TokenizationStrategy::Whitespace),
            "symbol" => Ok(TokenizationStrategy::Symbol),
            other => Err(ConfigError::UnknownTokenization(other.to_string())),
        }
    }
}

impl fmt::Display for TokenizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which stopword list is excluded from counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopwordVariant {
    #[default]
    None,
    Voyant,
    Nltk,
}

impl StopwordVariant {
    pub fn name(&self) -> &'static str {
        match self {
            StopwordVariant::None => "none",
            StopwordVariant::Voyant => "voyant",
            StopwordVariant::Nltk => "nltk",
        }
    }
}

impl FromStr for StopwordVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(StopwordVariant::None),
            "voyant" => Ok(StopwordVariant::Voyant),
            "nltk" => Ok(StopwordVariant::Nltk),
            other => Err(ConfigError::UnknownStopwords(other.to_string())),
        }
    }
}

impl fmt::Display for StopwordVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the tokenization strategy.
    pub tokenization: String,
    /// Name of the stopword list.
    pub stopwords: String,
    /// Number of most frequent tokens reported per edition.
    pub top_words: usize,
    /// Stopword list name to the file it is read from.
    pub stopwords_sources: BTreeMap<String, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tokenization: TokenizationStrategy::default().name().to_string(),
            stopwords: StopwordVariant::default().name().to_string(),
            top_words: 10,
            stopwords_sources: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Validate all names and load the selected stopword list.
    pub fn resolve(&self) -> Result<CleanerConfig, ConfigError> {
        let strategy: TokenizationStrategy = self.tokenization.parse()?;
        let variant: StopwordVariant = self.stopwords.parse()?;

        let stopwords = match variant {
            StopwordVariant::None => FxHashSet::default(),
            named => {
                let path = self
                    .stopwords_sources
                    .get(named.name())
                    .ok_or_else(|| ConfigError::MissingStopwordSource(named.to_string()))?;
                load_stopwords(path)?
            }
        };

        tracing::debug!(
            strategy = %strategy,
            stopwords = %variant,
            excluded = stopwords.len(),
            "resolved cleaner configuration"
        );

        Ok(CleanerConfig::new(strategy, stopwords))
    }
}

pub fn load_stopwords(path: &Path) -> Result<FxHashSet<Token>, ConfigError> {
    let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_stopwords(&input))
}

/// Stopword lists are separated by newlines and/or commas; entries are case-folded.
pub fn parse_stopwords(input: &str) -> FxHashSet<Token> {
    input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Token::from(utils::to_lowercase(s)))
        .collect()
}
