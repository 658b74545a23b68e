use tracing::instrument;

use crate::{
    cleaner::{CleanerConfig, TextCleaner},
    component::{join_path, Component, Tree},
    frequency::{FrequencyTable, Token},
};

/// Everything derived from one edition's raw component tree.
#[derive(Debug, Clone, PartialEq)]
pub struct EditionAnalysis {
    /// Same shape as the raw tree, each line replaced by its cleaned form.
    pub clean_components: Tree<Vec<String>>,
    /// Same shape as the raw tree, one frequency table per leaf.
    pub word_counts: Tree<FrequencyTable>,
    /// One table per composite below the root, keyed by path, in document order.
    /// Each is the merge of every leaf table underneath it.
    pub cumulative_word_counts: Vec<(String, FrequencyTable)>,
    /// Merge of every leaf table in the edition.
    pub total_word_frequencies: FrequencyTable,
}

impl EditionAnalysis {
    /// Clean every leaf and roll the frequencies up to the root.
    ///
    /// Children are processed before their parent and each composite sums its children's
    /// tables. The walk only distinguishes nodes with lines from nodes with children;
    /// unit names carry no meaning. Empty leaves yield empty tables.
    #[instrument(level = "debug", skip_all, fields(leaves = components.leaf_count()))]
    pub fn analyse_edition(components: &Component, config: &CleanerConfig) -> Self {
        let mut cleaner = TextCleaner::new(config);
        let mut cumulative_word_counts = Vec::new();

        let (clean_components, word_counts, total_word_frequencies) =
            aggregate(components, "", 0, &mut cleaner, &mut cumulative_word_counts);

        tracing::debug!(
            total_tokens = total_word_frequencies.total(),
            distinct_tokens = total_word_frequencies.len(),
            composites = cumulative_word_counts.len(),
            "aggregated edition"
        );

        Self {
            clean_components,
            word_counts,
            cumulative_word_counts,
            total_word_frequencies,
        }
    }

    /// Leaf path to cleaned lines, flattening the tree in document order.
    pub fn flat_components(&self) -> Vec<(String, &[String])> {
        let mut result = Vec::new();
        self.clean_components
            .for_each_leaf(|path, lines| result.push((path.to_string(), lines.as_slice())));
        result
    }

    /// The `n` most frequent tokens of the whole edition.
    pub fn top_words(&self, n: usize) -> Vec<&Token> {
        self.total_word_frequencies
            .most_common(n)
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    /// For each word, its count in every leaf in document order (zero where absent).
    pub fn word_counts_by_leaf(&self, words: &[&Token]) -> Vec<(Token, Vec<(String, u64)>)> {
        words
            .iter()
            .map(|word| {
                let mut series = Vec::new();
                self.word_counts.for_each_leaf(|path, table| {
                    series.push((path.to_string(), table.get(word).unwrap_or(0)))
                });
                ((*word).clone(), series)
            })
            .collect()
    }
}

fn aggregate(
    node: &Component,
    path: &str,
    depth: usize,
    cleaner: &mut TextCleaner,
    cumulative: &mut Vec<(String, FrequencyTable)>,
) -> (Tree<Vec<String>>, Tree<FrequencyTable>, FrequencyTable) {
    match node {
        Tree::Leaf(lines) => {
            cleaner.reset();
            let cleaned = lines.iter().map(|line| cleaner.clean_line(line)).collect();
            let table = cleaner.reset();
            (Tree::Leaf(cleaned), Tree::Leaf(table.clone()), table)
        }
        Tree::Composite(children) => {
            // reserve the slot so composites are listed parent first; the root is the total
            let slot = if depth == 0 {
                None
            } else {
                cumulative.push((path.to_string(), FrequencyTable::new()));
                Some(cumulative.len() - 1)
            };

            let mut clean_children = Vec::with_capacity(children.len());
            let mut count_children = Vec::with_capacity(children.len());
            let mut total = FrequencyTable::new();

            for (name, child) in children {
                let (clean, counts, child_total) =
                    aggregate(child, &join_path(path, name), depth + 1, cleaner, cumulative);
                total.merge(&child_total);
                clean_children.push((name.clone(), clean));
                count_children.push((name.clone(), counts));
            }

            if let Some(slot) = slot {
                cumulative[slot].1 = total.clone();
            }

            (
                Tree::Composite(clean_children),
                Tree::Composite(count_children),
                total,
            )
        }
    }
}
