//! The two transform kinds: categorical code maps and numeric
//! standardizers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::EncodeError;

/// A fitted bijection between observed string values and contiguous
/// integer codes.
///
/// Codes are assigned in sorted value order, so the same set of observed
/// values always produces the same mapping regardless of row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMap {
    feature: String,
    codes: BTreeMap<String, usize>,
    values: Vec<String>,
}

impl CodeMap {
    /// Builds the code map from every value observed at fit time.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::EmptyFit`] when no values are observed.
    pub fn fit<I, S>(feature: &str, observed: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: std::collections::BTreeSet<String> = observed
            .into_iter()
            .map(|value| value.as_ref().to_owned())
            .collect();

        if distinct.is_empty() {
            return Err(EncodeError::EmptyFit {
                feature: feature.to_owned(),
            });
        }

        let values: Vec<String> = distinct.into_iter().collect();
        let codes: BTreeMap<String, usize> = values
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code))
            .collect();

        Ok(Self {
            feature: feature.to_owned(),
            codes,
            values,
        })
    }

    /// Maps a value to its fitted code.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnseenValue`] for any value that was not
    /// present at fit time.
    pub fn encode(&self, value: &str) -> Result<usize, EncodeError> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| EncodeError::UnseenValue {
                feature: self.feature.clone(),
                value: value.to_owned(),
            })
    }

    /// Maps a code back to the original value.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnknownClassId`] when the code is out of
    /// range.
    pub fn decode(&self, code: usize) -> Result<&str, EncodeError> {
        self.values
            .get(code)
            .map(String::as_str)
            .ok_or(EncodeError::UnknownClassId {
                class_id: code,
                n_classes: self.values.len(),
            })
    }

    /// Number of distinct values observed at fit time.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no values were observed (never the case for a
    /// successfully fitted map).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The fitted values in code order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The feature this map was fitted for.
    #[must_use]
    pub fn feature(&self) -> &str {
        &self.feature
    }
}

/// A fitted z-score standardization for one numeric feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    feature: String,
    mean: f64,
    /// Population standard deviation, replaced by 1.0 when the feature is
    /// constant so that transforming never divides by zero.
    scale: f64,
}

impl Standardizer {
    /// Learns the mean and population standard deviation of `observed`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::EmptyFit`] when no values are observed.
    pub fn fit(feature: &str, observed: &[f64]) -> Result<Self, EncodeError> {
        if observed.is_empty() {
            return Err(EncodeError::EmptyFit {
                feature: feature.to_owned(),
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let n = observed.len() as f64;
        let mean = observed.iter().sum::<f64>() / n;
        let variance = observed.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let scale = if std_dev > 0.0 { std_dev } else { 1.0 };

        Ok(Self {
            feature: feature.to_owned(),
            mean,
            scale,
        })
    }

    /// Applies the fitted z-score to one value.
    #[must_use]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    /// The fitted mean.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// The fitted scale (standard deviation, or 1.0 for a constant
    /// feature).
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// The feature this standardizer was fitted for.
    #[must_use]
    pub fn feature(&self) -> &str {
        &self.feature
    }
}

/// One fitted per-feature transform.
///
/// Features are dispatched on this tagged union rather than on column
/// strings at each call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureTransform {
    /// Categorical value-to-code mapping.
    Codes(CodeMap),
    /// Numeric z-score standardization.
    Zscore(Standardizer),
}
