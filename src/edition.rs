//! Edition metadata documents and the corpus they are loaded into.
//!
//! Every edition lives in its own JSON document. The only field the pipeline requires is
//! `components`, the raw component tree. Analysing an edition adds derived top-level
//! fields to the same document and never touches the fields that were already there, so
//! a cleaned document can be fed back in and analysed again.

use rayon::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::instrument;

use crate::{
    algorithm::EditionAnalysis,
    cleaner::CleanerConfig,
    component::{Component, StructureError},
    frequency::FrequencyTable,
};

pub const COMPONENTS: &str = "components";
pub const CLEAN_COMPONENTS: &str = "clean_components";
pub const FLAT_COMPONENTS: &str = "flat_components";
pub const WORD_COUNTS: &str = "word_counts";
pub const CUMULATIVE_WORD_COUNTS: &str = "cumulative_word_counts";
pub const TOTAL_WORD_FREQUENCIES: &str = "total_word_frequencies";
pub const TOP_WORDS: &str = "top_words";
pub const TOP_WORD_COUNTS_BY_CHAPTER: &str = "top_word_counts_by_chapter";

/// Suffix of the file stem under which analysed documents are written.
pub const CLEANED_SUFFIX: &str = "_cleaned";

#[derive(Debug, thiserror::Error)]
pub enum EditionError {
    #[error("I/O failure on `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed edition document")]
    Json(#[from] serde_json::Error),
    #[error("edition document is not a JSON object")]
    NotAnObject,
    #[error("edition document has no `components` field")]
    MissingComponents,
    #[error("invalid `{field}` field")]
    InvalidField {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed component tree")]
    Structure(#[from] StructureError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> EditionError + '_ {
    move |source| EditionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One edition's metadata document together with its parsed component tree.
#[derive(Debug, Clone)]
pub struct EditionMetadata {
    document: Map<String, Value>,
    components: Component,
    total_word_frequencies: Option<FrequencyTable>,
}

impl EditionMetadata {
    pub fn from_value(value: Value) -> Result<Self, EditionError> {
        let Value::Object(document) = value else {
            return Err(EditionError::NotAnObject);
        };

        let components = document
            .get(COMPONENTS)
            .ok_or(EditionError::MissingComponents)?;
        let components = Component::from_value("", components)?;

        let total_word_frequencies = document
            .get(TOTAL_WORD_FREQUENCIES)
            .map(|value| FrequencyTable::deserialize(value))
            .transpose()
            .map_err(|source| EditionError::InvalidField {
                field: TOTAL_WORD_FREQUENCIES,
                source,
            })?;

        Ok(Self {
            document,
            components,
            total_word_frequencies,
        })
    }

    pub fn from_json_str(input: &str) -> Result<Self, EditionError> {
        Self::from_value(serde_json::from_str(input)?)
    }

    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self, EditionError> {
        let input = fs::read_to_string(path).map_err(io_error(path))?;
        Self::from_json_str(&input)
    }

    pub fn components(&self) -> &Component {
        &self.components
    }

    /// The whole-edition frequency table, present once the edition has been analysed.
    pub fn total_word_frequencies(&self) -> Option<&FrequencyTable> {
        self.total_word_frequencies.as_ref()
    }

    pub fn is_analysed(&self) -> bool {
        self.total_word_frequencies.is_some()
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Clean and count the edition, adding the derived fields to the document.
    pub fn analyse(&mut self, config: &CleanerConfig, top_words: usize) -> Result<(), EditionError> {
        let analysis = EditionAnalysis::analyse_edition(&self.components, config);
        self.apply_analysis(&analysis, top_words)
    }

    /// Analyse the edition unless it already carries word frequencies and `reanalyse` is
    /// false. Returns whether an analysis ran.
    pub fn ensure_analysed(
        &mut self,
        config: &CleanerConfig,
        top_words: usize,
        reanalyse: bool,
    ) -> Result<bool, EditionError> {
        if self.is_analysed() && !reanalyse {
            return Ok(false);
        }
        self.analyse(config, top_words)?;
        Ok(true)
    }

    pub fn apply_analysis(
        &mut self,
        analysis: &EditionAnalysis,
        top_words: usize,
    ) -> Result<(), EditionError> {
        let flat_components: Map<String, Value> = analysis
            .flat_components()
            .into_iter()
            .map(|(path, lines)| Ok((path, serde_json::to_value(lines)?)))
            .collect::<Result<_, serde_json::Error>>()?;

        let cumulative_word_counts: Map<String, Value> = analysis
            .cumulative_word_counts
            .iter()
            .map(|(path, table)| Ok((path.clone(), serde_json::to_value(table)?)))
            .collect::<Result<_, serde_json::Error>>()?;

        let top = analysis.top_words(top_words);
        let by_chapter: Map<String, Value> = analysis
            .word_counts_by_leaf(&top)
            .into_iter()
            .map(|(word, series)| {
                let series: Map<String, Value> = series
                    .into_iter()
                    .map(|(path, count)| (path, Value::from(count)))
                    .collect();
                (word.to_string(), Value::Object(series))
            })
            .collect();

        let derived = [
            (CLEAN_COMPONENTS, serde_json::to_value(&analysis.clean_components)?),
            (FLAT_COMPONENTS, Value::Object(flat_components)),
            (WORD_COUNTS, serde_json::to_value(&analysis.word_counts)?),
            (CUMULATIVE_WORD_COUNTS, Value::Object(cumulative_word_counts)),
            (
                TOTAL_WORD_FREQUENCIES,
                serde_json::to_value(&analysis.total_word_frequencies)?,
            ),
            (TOP_WORDS, serde_json::to_value(&top)?),
            (TOP_WORD_COUNTS_BY_CHAPTER, Value::Object(by_chapter)),
        ];
        for (key, value) in derived {
            self.document.insert(key.to_string(), value);
        }

        self.total_word_frequencies = Some(analysis.total_word_frequencies.clone());
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, EditionError> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), EditionError> {
        let output = self.to_json_pretty()?;
        fs::write(path, output).map_err(io_error(path))
    }
}

/// The edition key of a document file: its file stem.
pub fn edition_key(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

pub fn cleaned_file_name(key: &str) -> String {
    format!("{key}{CLEANED_SUFFIX}.json")
}

/// Editions by key, in key order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    editions: BTreeMap<String, EditionMetadata>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` edition document in `dir`.
    ///
    /// Documents written by a previous run (stem ending in `_cleaned`) are skipped, as are
    /// documents whose key does not contain `filter`. Unreadable or malformed documents are
    /// logged and skipped unless the `strict` feature is enabled.
    #[instrument(level = "debug")]
    pub fn load_dir(dir: &Path, filter: Option<&str>) -> Result<Self, EditionError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error(dir))? {
            let path = entry.map_err(io_error(dir))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut corpus = Corpus::new();
        for path in paths {
            let Some(key) = edition_key(&path) else {
                tracing::warn!(path = %path.display(), "skipping file with non-UTF-8 name");
                continue;
            };
            if key.ends_with(CLEANED_SUFFIX) {
                continue;
            }
            if filter.is_some_and(|filter| !key.contains(filter)) {
                continue;
            }

            match EditionMetadata::load(&path) {
                Ok(edition) => {
                    corpus.insert(key, edition);
                }
                Err(e) => {
                    if cfg!(feature = "strict") {
                        tracing::error!(path = %path.display(), error = %e, "aborting corpus loading");
                        return Err(e);
                    }
                    tracing::warn!(path = %path.display(), error = %e, "skipping edition. The corpus will be incomplete.");
                }
            }
        }

        tracing::info!(dir = %dir.display(), editions = corpus.len(), "loaded corpus");
        Ok(corpus)
    }

    pub fn insert(&mut self, key: String, edition: EditionMetadata) -> Option<EditionMetadata> {
        self.editions.insert(key, edition)
    }

    pub fn get(&self, key: &str) -> Option<&EditionMetadata> {
        self.editions.get(key)
    }

    pub fn len(&self) -> usize {
        self.editions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EditionMetadata)> {
        self.editions.iter()
    }

    /// Analyse every edition, one task per edition.
    pub fn analyse_all(&mut self, config: &CleanerConfig, top_words: usize) -> Result<(), EditionError> {
        self.editions
            .par_iter_mut()
            .try_for_each(|(key, edition)| {
                tracing::debug!(edition = %key, "analysing edition");
                edition.analyse(config, top_words)
            })?;
        tracing::info!(editions = self.len(), "analysed corpus");
        Ok(())
    }

    /// Write every edition as `<key>_cleaned.json` into `dir`, creating it if needed.
    pub fn write_cleaned(&self, dir: &Path) -> Result<Vec<PathBuf>, EditionError> {
        fs::create_dir_all(dir).map_err(io_error(dir))?;

        let mut written = Vec::with_capacity(self.len());
        for (key, edition) in &self.editions {
            let path = dir.join(cleaned_file_name(key));
            edition.write(&path)?;
            tracing::debug!(path = %path.display(), "wrote cleaned edition");
            written.push(path);
        }
        Ok(written)
    }
}
