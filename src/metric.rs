//! Data-quality metrics over analysed editions.
//!
//! A metric borrows the edition metadata it inspects, computes its result once (computing
//! again yields the same value) and exposes a serializable `{name, result}` view. The
//! input metadata is never modified.

use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;

use crate::{config::ConfigError, edition::EditionMetadata, frequency::FrequencyTable};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MetricError {
    #[error("metric `{0}` was asked for output before it was computed")]
    NotComputed(&'static str),
    #[error("the {0} edition has not been analysed (no word frequencies)")]
    NotAnalysed(&'static str),
    #[error("result of metric `{0}` does not fit a signed 64-bit integer")]
    Overflow(&'static str),
}

/// Serializable view of a computed metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricOutput {
    pub name: String,
    pub result: Value,
}

pub trait Metric {
    fn name(&self) -> &'static str;

    /// Compute the result from the held inputs. Idempotent.
    fn compute(&mut self);

    /// `{name, result}` of the last computation; an error before [`Metric::compute`] ran.
    fn output(&self) -> Result<MetricOutput, MetricError>;
}

fn total_frequencies<'a>(
    edition: &'a EditionMetadata,
    role: &'static str,
) -> Result<&'a FrequencyTable, MetricError> {
    edition
        .total_word_frequencies()
        .ok_or(MetricError::NotAnalysed(role))
}

/// Net deviation of the candidate's token counts from the reference's, over the tokens of
/// the reference only.
///
/// Every reference token adds `candidate - reference` when the candidate has it and
/// subtracts the reference count when it does not. Tokens only the candidate has are
/// never visited, so swapping the arguments generally changes the result.
///
/// Counts read from documents may be as large as `u64::MAX`, so the tally is kept in
/// `i128` and only the final value has to fit an `i64`.
pub fn intrinsic_overall_match(
    reference: &FrequencyTable,
    candidate: &FrequencyTable,
) -> Result<i64, MetricError> {
    let mut word_match_tally: i128 = 0;
    for (token, reference_count) in reference.iter() {
        match candidate.get(token) {
            Some(candidate_count) => {
                word_match_tally += i128::from(candidate_count) - i128::from(reference_count)
            }
            None => word_match_tally -= i128::from(reference_count),
        }
    }
    i64::try_from(word_match_tally)
        .map_err(|_| MetricError::Overflow(IntrinsicOverallMatch::NAME))
}

/// Compares a candidate edition's overall word counts against a reference edition.
pub struct IntrinsicOverallMatch<'a> {
    reference: &'a FrequencyTable,
    candidate: &'a FrequencyTable,
    result: Option<Result<i64, MetricError>>,
}

impl<'a> IntrinsicOverallMatch<'a> {
    pub const NAME: &'static str = "IntrinsicOverallMatch";

    pub fn new(
        reference: &'a EditionMetadata,
        candidate: &'a EditionMetadata,
    ) -> Result<Self, MetricError> {
        Ok(Self::from_tables(
            total_frequencies(reference, "reference")?,
            total_frequencies(candidate, "candidate")?,
        ))
    }

    pub fn from_tables(reference: &'a FrequencyTable, candidate: &'a FrequencyTable) -> Self {
        Self {
            reference,
            candidate,
            result: None,
        }
    }

    pub fn result(&self) -> Option<Result<i64, MetricError>> {
        self.result.clone()
    }
}

impl Metric for IntrinsicOverallMatch<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn compute(&mut self) {
        self.result = Some(intrinsic_overall_match(self.reference, self.candidate));
    }

    fn output(&self) -> Result<MetricOutput, MetricError> {
        let result = self
            .result
            .clone()
            .ok_or(MetricError::NotComputed(Self::NAME))??;
        Ok(MetricOutput {
            name: Self::NAME.to_string(),
            result: Value::from(result),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total_tokens: u64,
    pub distinct_tokens: usize,
}

/// Total and distinct token counts of a single edition.
pub struct TokenTotals<'a> {
    frequencies: &'a FrequencyTable,
    result: Option<Totals>,
}

impl<'a> TokenTotals<'a> {
    pub const NAME: &'static str = "TokenTotals";

    pub fn new(edition: &'a EditionMetadata) -> Result<Self, MetricError> {
        Ok(Self::from_table(total_frequencies(edition, "candidate")?))
    }

    pub fn from_table(frequencies: &'a FrequencyTable) -> Self {
        Self {
            frequencies,
            result: None,
        }
    }

    pub fn result(&self) -> Option<Totals> {
        self.result
    }
}

impl Metric for TokenTotals<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn compute(&mut self) {
        self.result = Some(Totals {
            total_tokens: self.frequencies.total(),
            distinct_tokens: self.frequencies.len(),
        });
    }

    fn output(&self) -> Result<MetricOutput, MetricError> {
        let totals = self.result.ok_or(MetricError::NotComputed(Self::NAME))?;
        Ok(MetricOutput {
            name: Self::NAME.to_string(),
            result: json!({
                "total_tokens": totals.total_tokens,
                "distinct_tokens": totals.distinct_tokens,
            }),
        })
    }
}

/// Metric selection by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricKind {
    #[default]
    IntrinsicOverallMatch,
    TokenTotals,
}

impl FromStr for MetricKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IntrinsicOverallMatch" => Ok(MetricKind::IntrinsicOverallMatch),
            "TokenTotals" => Ok(MetricKind::TokenTotals),
            other => Err(ConfigError::UnknownMetric(other.to_string())),
        }
    }
}

impl MetricKind {
    /// Build the selected metric over a reference and a candidate edition.
    ///
    /// Single-edition metrics describe the candidate.
    pub fn build<'a>(
        &self,
        reference: &'a EditionMetadata,
        candidate: &'a EditionMetadata,
    ) -> Result<Box<dyn Metric + 'a>, MetricError> {
        Ok(match self {
            MetricKind::IntrinsicOverallMatch => {
                Box::new(IntrinsicOverallMatch::new(reference, candidate)?)
            }
            MetricKind::TokenTotals => Box::new(TokenTotals::new(candidate)?),
        })
    }

    /// Build, compute and report the selected metric.
    pub fn run(
        &self,
        reference: &EditionMetadata,
        candidate: &EditionMetadata,
    ) -> Result<MetricOutput, MetricError> {
        let mut metric = self.build(reference, candidate)?;
        metric.compute();
        let output = metric.output()?;
        tracing::debug!(metric = %output.name, result = %output.result, "computed metric");
        Ok(output)
    }
}
