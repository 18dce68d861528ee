//! Future scenario generation.
//!
//! Synthetic incidents sample coordinates uniformly within the training
//! bounding box while every non-spatial categorical feature is pinned to
//! its training-subset mode. Each period draws independently from its own
//! seeded generator, so periods are i.i.d. and could be generated in
//! parallel without changing results.

use crime_forecast_dataset::value_counts;
use crime_forecast_encoding::{FeatureEncoder, FeatureRow, TargetEncoder};
use crime_forecast_forest::RandomForest;
use crime_forecast_models::{FutureIncident, TrainingRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::PipelineError;

/// Closed bounding box of the training subset's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum observed latitude.
    pub lat_min: f64,
    /// Maximum observed latitude.
    pub lat_max: f64,
    /// Minimum observed longitude.
    pub lon_min: f64,
    /// Maximum observed longitude.
    pub lon_max: f64,
}

impl BoundingBox {
    /// Computes the min/max coordinate bounds over the training subset.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyTrainingSubset`] when there are no
    /// records.
    pub fn from_records(records: &[TrainingRecord]) -> Result<Self, PipelineError> {
        let (first, rest) = records
            .split_first()
            .ok_or(PipelineError::EmptyTrainingSubset)?;

        let mut bounds = Self {
            lat_min: first.latitude,
            lat_max: first.latitude,
            lon_min: first.longitude,
            lon_max: first.longitude,
        };
        for record in rest {
            bounds.lat_min = bounds.lat_min.min(record.latitude);
            bounds.lat_max = bounds.lat_max.max(record.latitude);
            bounds.lon_min = bounds.lon_min.min(record.longitude);
            bounds.lon_max = bounds.lon_max.max(record.longitude);
        }
        Ok(bounds)
    }

    /// Whether the point lies within the closed box.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&latitude)
            && (self.lon_min..=self.lon_max).contains(&longitude)
    }
}

/// The most frequent value of each non-spatial categorical feature.
///
/// Frequency ties break toward the lexicographically smaller value, so
/// the context is deterministic for a given distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalContext {
    /// Modal reporting force.
    pub reported_by: String,
    /// Modal jurisdiction.
    pub falls_within: String,
    /// Modal outcome category.
    pub last_outcome_category: String,
}

impl ModalContext {
    /// Computes the per-feature mode over the training subset.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyTrainingSubset`] when there are no
    /// records.
    pub fn from_records(records: &[TrainingRecord]) -> Result<Self, PipelineError> {
        if records.is_empty() {
            return Err(PipelineError::EmptyTrainingSubset);
        }
        Ok(Self {
            reported_by: mode(records.iter().map(|r| r.reported_by.as_str())),
            falls_within: mode(records.iter().map(|r| r.falls_within.as_str())),
            last_outcome_category: mode(
                records.iter().map(|r| r.last_outcome_category.as_str()),
            ),
        })
    }
}

/// Most frequent value; first key in sorted order wins ties. Calls with
/// at least one value only.
fn mode<'a, I: IntoIterator<Item = &'a str>>(values: I) -> String {
    let counts = value_counts(values);
    let mut best: Option<(&String, u64)> = None;
    for (value, &count) in &counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone()).unwrap_or_default()
}

/// Derives the sampling seed for one period from the run's base seed.
#[must_use]
pub fn period_seed(base: u64, period: u32) -> u64 {
    base.wrapping_add(u64::from(period))
}

/// Draws, encodes, and scores one period's batch of synthetic incidents.
///
/// # Errors
///
/// Returns [`PipelineError`] if encoding or class-id decoding fails —
/// which cannot happen when the encoder, forest, and target encoder come
/// from the same fit.
#[allow(clippy::too_many_arguments)]
pub fn generate_period(
    period: u32,
    samples: usize,
    seed: u64,
    bounds: &BoundingBox,
    context: &ModalContext,
    encoder: &FeatureEncoder,
    forest: &RandomForest,
    target: &TargetEncoder,
) -> Result<Vec<FutureIncident>, PipelineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut batch = Vec::with_capacity(samples);

    for _ in 0..samples {
        let longitude = rng.gen_range(bounds.lon_min..=bounds.lon_max);
        let latitude = rng.gen_range(bounds.lat_min..=bounds.lat_max);

        let row = FeatureRow {
            longitude,
            latitude,
            reported_by: &context.reported_by,
            falls_within: &context.falls_within,
            last_outcome_category: &context.last_outcome_category,
        };
        let encoded = encoder.transform(&row)?;
        let class_id = forest.predict(&encoded);
        let predicted = target.decode(class_id)?;

        batch.push(FutureIncident {
            period,
            longitude,
            latitude,
            reported_by: context.reported_by.clone(),
            falls_within: context.falls_within.clone(),
            last_outcome_category: context.last_outcome_category.clone(),
            predicted_crime_type: predicted.to_owned(),
        });
    }

    log::debug!("Period {period}: generated and scored {} incidents", batch.len());

    Ok(batch)
}
