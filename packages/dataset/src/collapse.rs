//! Rare-category collapsing.
//!
//! High-cardinality crime categories are reduced to a bounded vocabulary:
//! any category observed fewer than the threshold number of times in the
//! training subset is rewritten to [`OTHER_CATEGORY`]. Records are only
//! relabeled, never deleted.

use std::collections::{BTreeMap, BTreeSet};

use crime_forecast_models::TrainingRecord;

/// Sentinel label that absorbs all rare categories.
pub const OTHER_CATEGORY: &str = "Other";

/// Default minimum frequency a category needs to keep its own label.
pub const DEFAULT_COLLAPSE_THRESHOLD: u64 = 1000;

/// Counts occurrences of each distinct value.
///
/// Ordered by value so the result is deterministic regardless of input
/// order.
pub fn value_counts<I, S>(values: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value.as_ref().to_owned()).or_insert(0) += 1;
    }
    counts
}

/// The fitted category vocabulary: which labels survive collapsing.
///
/// Built once from the training subset and immutable afterwards. The same
/// input distribution always yields the same vocabulary, independent of
/// row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryVocabulary {
    retained: BTreeSet<String>,
    threshold: u64,
}

impl CategoryVocabulary {
    /// Computes category frequencies over the training subset and retains
    /// every category meeting the threshold.
    #[must_use]
    pub fn fit(records: &[TrainingRecord], threshold: u64) -> Self {
        let counts = value_counts(records.iter().map(|r| r.crime_type.as_str()));
        let retained: BTreeSet<String> = counts
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(label, _)| label)
            .collect();

        log::info!(
            "Category vocabulary: {} labels retained at threshold {threshold}",
            retained.len()
        );

        Self { retained, threshold }
    }

    /// Returns the collapsed form of `label`: itself when retained,
    /// [`OTHER_CATEGORY`] otherwise.
    #[must_use]
    pub fn collapse<'a>(&self, label: &'a str) -> &'a str {
        if self.retained.contains(label) {
            label
        } else {
            OTHER_CATEGORY
        }
    }

    /// Returns whether `label` keeps its own name under this vocabulary.
    #[must_use]
    pub fn retains(&self, label: &str) -> bool {
        self.retained.contains(label)
    }

    /// Rewrites every record's category to its collapsed form, in place.
    pub fn apply(&self, records: &mut [TrainingRecord]) {
        for record in records {
            if !self.retained.contains(&record.crime_type) {
                record.crime_type = OTHER_CATEGORY.to_owned();
            }
        }
    }

    /// The full output vocabulary: every retained label plus
    /// [`OTHER_CATEGORY`], in sorted order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels: BTreeSet<String> = self.retained.clone();
        labels.insert(OTHER_CATEGORY.to_owned());
        labels.into_iter().collect()
    }

    /// The frequency threshold this vocabulary was fitted with.
    #[must_use]
    pub const fn threshold(&self) -> u64 {
        self.threshold
    }
}
