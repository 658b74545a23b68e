use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};

/// A normalized unit of text after cleaning.
pub type Token = CompactString;

/// Token to occurrence count.
///
/// The sum of all counts always equals the number of tokens that were added, with
/// multiplicity. Tables serialize as a JSON object sorted by token so that identical
/// tables produce identical documents regardless of hashing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: FxHashMap<Token, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `token`.
    pub fn add(&mut self, token: &str) {
        self.add_count(token, 1);
    }

    pub fn add_count(&mut self, token: &str, count: u64) {
        if let Some(existing) = self.counts.get_mut(token) {
            *existing = existing.saturating_add(count);
        } else {
            self.counts.insert(token.into(), count);
        }
    }

    /// Count of `token`, or `None` when the token never occurred.
    pub fn get(&self, token: &str) -> Option<u64> {
        self.counts.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.counts.contains_key(token)
    }

    /// Total number of tokens counted. Saturates at `u64::MAX` for tables read from
    /// documents with oversized counts.
    pub fn total(&self) -> u64 {
        self.counts
            .values()
            .fold(0u64, |total, count| total.saturating_add(*count))
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, u64)> + '_ {
        self.counts.iter().map(|(token, count)| (token, *count))
    }

    /// Add every count of `other` into `self`.
    pub fn merge(&mut self, other: &FrequencyTable) {
        self.counts.reserve(other.counts.len());
        for (token, count) in &other.counts {
            self.add_count(token, *count);
        }
    }

    /// The count-wise sum of two tables.
    pub fn merged(&self, other: &FrequencyTable) -> FrequencyTable {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Entries ordered by token.
    pub fn sorted(&self) -> Vec<(&Token, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// The `n` most frequent tokens, ties broken by token order.
    pub fn most_common(&self, n: usize) -> Vec<(&Token, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        table.extend(iter);
        table
    }
}

impl<S: AsRef<str>> Extend<S> for FrequencyTable {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for token in iter {
            self.add(token.as_ref());
        }
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted = self.sorted();
        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (token, count) in sorted {
            map.serialize_entry(token.as_str(), &count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FrequencyTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let counts = FxHashMap::<Token, u64>::deserialize(deserializer)?;
        Ok(Self { counts })
    }
}
