// SPDX-License-Identifier: MPL-2.0
//! # variorum
//!
//! Word-frequency comparison of the editions of a literary work.
//!
//! ## Overview
//!
//! Editions of the same work rarely agree on their text. Printings drop words, OCR
//! introduces new ones, and editors regularize spelling. `variorum` quantifies those
//! differences: it decomposes each edition into its structural components (title,
//! preface, a body of chapters, ...), cleans and tokenizes every line, counts words at
//! every level of that hierarchy and runs data-quality metrics that compare one edition's
//! vocabulary with a reference edition.
//!
//! **Key Features:**
//!
//! - **Heterogeneous editions**: Flat lists of chapters and nested bodies of chapters are
//!   handled by the same recursive aggregation; no unit name is special.
//! - **Configurable cleaning**: Three tokenization strategies and named stopword lists,
//!   validated before any text is read.
//! - **Additive documents**: Derived data is added to each edition's JSON document next to
//!   the raw fields, which are never modified.
//! - **Parallel corpora**: Editions are independent and are analysed one task per edition.
//!
//! ## Getting Started
//!
//! ### Comparing two editions
//!
//! ```rust
//! use variorum::config::Config;
//! use variorum::edition::EditionMetadata;
//! use variorum::metric::MetricKind;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Validate the configuration and load the stopword list once
//!     let cleaner_config = Config::default().resolve()?;
//!
//!     // A flat edition and one that nests its chapters in a body
//!     let mut reference = EditionMetadata::from_json_str(
//!         r#"{ "components": { "chapter_1": ["The boat, the boat."] } }"#,
//!     )?;
//!     let mut candidate = EditionMetadata::from_json_str(
//!         r#"{ "components": { "body": { "chapter_1": ["The boat and the river."] } } }"#,
//!     )?;
//!     reference.analyse(&cleaner_config, 10)?;
//!     candidate.analyse(&cleaner_config, 10)?;
//!
//!     let output = MetricKind::IntrinsicOverallMatch.run(&reference, &candidate)?;
//!     // one `boat` is missing from the candidate; `and` and `river` are not in the reference
//!     assert_eq!(output.result, -1);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Processing a directory of editions
//!
//! ```rust,no_run
//! use std::path::Path;
//! use variorum::config::Config;
//! use variorum::edition::Corpus;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("variorum.toml"))?;
//!     let cleaner_config = config.resolve()?;
//!
//!     let mut corpus = Corpus::load_dir(Path::new("input"), Some("HuckFinn"))?;
//!     corpus.analyse_all(&cleaner_config, config.top_words)?;
//!     corpus.write_cleaned(Path::new("output"))?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules and API
//!
//! ### `component` Module
//!
//! The structural [`Tree`](component::Tree) of an edition. A node either holds data
//! directly (a leaf, e.g. the lines of a chapter) or holds named children in document
//! order (a composite, e.g. a body of chapters).
//!
//! ### `cleaner` Module
//!
//! [`TextCleaner`](cleaner::TextCleaner) normalizes raw lines into tokens and keeps a
//! running tally of the current unit.
//!
//! ### `algorithm` Module
//!
//! [`EditionAnalysis::analyse_edition`](algorithm::EditionAnalysis::analyse_edition) walks
//! a component tree children first, producing the cleaned tree, a frequency table per leaf,
//! a cumulative table per composite and the edition total.
//!
//! ### `edition` Module
//!
//! Reading, analysing and writing edition metadata documents, and loading a
//! [`Corpus`](edition::Corpus) from a directory.
//!
//! ### `metric` Module
//!
//! The [`Metric`](metric::Metric) trait and its implementations.
//! [`IntrinsicOverallMatch`](metric::IntrinsicOverallMatch) sums, over every token of the
//! reference edition, how many more (or fewer) times the candidate uses it. Tokens that only
//! the candidate uses are not counted.
//!
//! ## Document Format
//!
//! The input document needs a `components` object. Arrays of strings are leaves, objects
//! are composites:
//!
//! ```json
//! {
//!     "components": {
//!         "title": ["Adventures of Huckleberry Finn"],
//!         "body": {
//!             "chapter_1": ["YOU don't know about me, without you have read a book..."],
//!             "chapter_2": ["WE went tiptoeing along a path amongst the trees..."]
//!         }
//!     }
//! }
//! ```
//!
//! Analysis adds `clean_components`, `flat_components`, `word_counts`,
//! `cumulative_word_counts`, `total_word_frequencies`, `top_words` and
//! `top_word_counts_by_chapter`.
//!
//! ## Features and Configuration
//!
//! - **`strict`**: Abort corpus loading on the first unreadable or malformed document
//!   instead of logging a warning and skipping it.
//! - **`optimized-str`**: Table-driven Unicode lowercasing.
//!
//! ### Logging and Error Handling
//!
//! - Uses the `tracing` crate for logging progress and skipped inputs.
//! - Configuration, I/O and structural problems are reported as distinct error types.
//!
//! ## Dependencies
//!
//! - **`compact_str`**: Tokens are [`CompactString`](compact_str::CompactString)s; most
//!   words fit inline.
//! - **`serde_json`**: Edition documents and metric output are JSON.

pub mod algorithm;
pub mod cleaner;
pub mod component;
pub mod config;
pub mod edition;
pub mod frequency;
#[cfg(test)]
mod integration_tests;
pub mod metric;
#[cfg(test)]
mod test_support;
pub mod utils;
