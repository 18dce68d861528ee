//! The fitted feature encoder for the fixed model feature set.

use crime_forecast_models::TrainingRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::transform::{CodeMap, FeatureTransform, Standardizer};
use crate::EncodeError;

/// The model's feature columns, in matrix order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    /// Longitude, standardized.
    Longitude,
    /// Latitude, standardized.
    Latitude,
    /// Reporting force, code-mapped.
    ReportedBy,
    /// Jurisdiction, code-mapped.
    FallsWithin,
    /// Last outcome category, code-mapped.
    LastOutcomeCategory,
}

impl Feature {
    /// The fixed feature order of the encoded matrix.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Longitude,
            Self::Latitude,
            Self::ReportedBy,
            Self::FallsWithin,
            Self::LastOutcomeCategory,
        ]
    }
}

/// A borrowed view of the five model features of one record.
///
/// The scenario generator builds these for synthetic records; training
/// records convert via `From`.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Reporting force.
    pub reported_by: &'a str,
    /// Jurisdiction.
    pub falls_within: &'a str,
    /// Last outcome category.
    pub last_outcome_category: &'a str,
}

impl<'a> From<&'a TrainingRecord> for FeatureRow<'a> {
    fn from(record: &'a TrainingRecord) -> Self {
        Self {
            longitude: record.longitude,
            latitude: record.latitude,
            reported_by: &record.reported_by,
            falls_within: &record.falls_within,
            last_outcome_category: &record.last_outcome_category,
        }
    }
}

/// The fitted feature encoder: one transform per feature, fixed at fit
/// time and immutable afterwards.
///
/// Transforming reuses the exact fitted means, scales, and code maps; a
/// categorical value unseen at fit time is rejected with
/// [`EncodeError::UnseenValue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    transforms: Vec<(Feature, FeatureTransform)>,
}

impl FeatureEncoder {
    /// Fits every per-feature transform over the training subset.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::EmptyFit`] when the subset is empty.
    pub fn fit(records: &[TrainingRecord]) -> Result<Self, EncodeError> {
        let longitudes: Vec<f64> = records.iter().map(|r| r.longitude).collect();
        let latitudes: Vec<f64> = records.iter().map(|r| r.latitude).collect();

        let mut transforms = Vec::with_capacity(Feature::all().len());
        for &feature in Feature::all() {
            let transform = match feature {
                Feature::Longitude => {
                    FeatureTransform::Zscore(Standardizer::fit(feature.as_ref(), &longitudes)?)
                }
                Feature::Latitude => {
                    FeatureTransform::Zscore(Standardizer::fit(feature.as_ref(), &latitudes)?)
                }
                Feature::ReportedBy => FeatureTransform::Codes(CodeMap::fit(
                    feature.as_ref(),
                    records.iter().map(|r| r.reported_by.as_str()),
                )?),
                Feature::FallsWithin => FeatureTransform::Codes(CodeMap::fit(
                    feature.as_ref(),
                    records.iter().map(|r| r.falls_within.as_str()),
                )?),
                Feature::LastOutcomeCategory => FeatureTransform::Codes(CodeMap::fit(
                    feature.as_ref(),
                    records.iter().map(|r| r.last_outcome_category.as_str()),
                )?),
            };
            transforms.push((feature, transform));
        }

        log::debug!("Fitted feature encoder over {} records", records.len());

        Ok(Self { transforms })
    }

    /// Encodes one record into the fixed-order numeric feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnseenValue`] for any categorical value not
    /// present at fit time.
    #[allow(clippy::cast_precision_loss)]
    pub fn transform(&self, row: &FeatureRow<'_>) -> Result<Vec<f64>, EncodeError> {
        let mut encoded = Vec::with_capacity(self.transforms.len());

        for (feature, transform) in &self.transforms {
            let value = match (feature, transform) {
                (Feature::Longitude, FeatureTransform::Zscore(scaler)) => {
                    scaler.transform(row.longitude)
                }
                (Feature::Latitude, FeatureTransform::Zscore(scaler)) => {
                    scaler.transform(row.latitude)
                }
                (Feature::ReportedBy, FeatureTransform::Codes(map)) => {
                    map.encode(row.reported_by)? as f64
                }
                (Feature::FallsWithin, FeatureTransform::Codes(map)) => {
                    map.encode(row.falls_within)? as f64
                }
                (Feature::LastOutcomeCategory, FeatureTransform::Codes(map)) => {
                    map.encode(row.last_outcome_category)? as f64
                }
                // fit() pairs every feature with its own transform kind.
                _ => unreachable!("feature paired with wrong transform kind"),
            };
            encoded.push(value);
        }

        Ok(encoded)
    }

    /// Encodes the whole training subset into a feature matrix.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if any record fails to transform.
    pub fn transform_records(
        &self,
        records: &[TrainingRecord],
    ) -> Result<Vec<Vec<f64>>, EncodeError> {
        records
            .iter()
            .map(|record| self.transform(&FeatureRow::from(record)))
            .collect()
    }

    /// Number of features in the encoded matrix.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.transforms.len()
    }
}
