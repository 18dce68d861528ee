#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared record and report types for the crime forecast pipeline.
//!
//! Every stage of the pipeline consumes and produces these types: the
//! loader emits [`Incident`]s, the training-subset builder emits
//! [`TrainingRecord`]s, the scenario generator emits [`FutureIncident`]s,
//! and the aggregator emits an [`AggregateReport`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A cleaned crime incident.
///
/// Produced by the dataset loader after header normalization, coordinate
/// coercion, and dropping of incomplete or duplicate rows. Coordinates are
/// always finite; administrative and statistical-area fields may still be
/// missing (they are only required for the training subset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Unique incident identifier from the source dataset.
    pub crime_id: String,
    /// Reporting month in `YYYY-MM` form, when present.
    pub month: Option<String>,
    /// Force that recorded the incident.
    pub reported_by: Option<String>,
    /// Force whose jurisdiction the incident falls within.
    pub falls_within: Option<String>,
    /// Longitude (WGS84), finite after cleaning.
    pub longitude: f64,
    /// Latitude (WGS84), finite after cleaning.
    pub latitude: f64,
    /// Free-text location description, trimmed.
    pub location: String,
    /// Lower-layer statistical area code.
    pub lsoa_code: Option<String>,
    /// Lower-layer statistical area name.
    pub lsoa_name: Option<String>,
    /// Crime category label.
    pub crime_type: String,
    /// Last known outcome category.
    pub last_outcome_category: Option<String>,
}

/// An incident restricted to the model-training subset.
///
/// Only incidents that carry both statistical-area fields make it into the
/// training subset. Administrative fields that were missing in the source
/// row are normalized to the empty string, which the feature encoder treats
/// as a distinct observed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    /// Unique incident identifier from the source dataset.
    pub crime_id: String,
    /// Reporting month in `YYYY-MM` form, when present.
    pub month: Option<String>,
    /// Force that recorded the incident.
    pub reported_by: String,
    /// Force whose jurisdiction the incident falls within.
    pub falls_within: String,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Free-text location description.
    pub location: String,
    /// Lower-layer statistical area code.
    pub lsoa_code: String,
    /// Lower-layer statistical area name.
    pub lsoa_name: String,
    /// Crime category label (post-collapse once the vocabulary is applied).
    pub crime_type: String,
    /// Last known outcome category.
    pub last_outcome_category: String,
}

/// A synthetic future incident scored by the classifier.
///
/// Coordinates are the raw sampled degrees, not the standardized values fed
/// to the model. The non-spatial context is the modal value of each
/// categorical feature in the training subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureIncident {
    /// Simulated future period, numbered from 1.
    pub period: u32,
    /// Sampled longitude within the training bounding box.
    pub longitude: f64,
    /// Sampled latitude within the training bounding box.
    pub latitude: f64,
    /// Modal reporting force held constant across the batch.
    pub reported_by: String,
    /// Modal jurisdiction held constant across the batch.
    pub falls_within: String,
    /// Modal outcome category held constant across the batch.
    pub last_outcome_category: String,
    /// Category predicted by the classifier.
    pub predicted_crime_type: String,
}

/// Total predicted count for one category across all periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Predicted crime category.
    pub category: String,
    /// Number of future incidents predicted as this category.
    pub count: u64,
}

/// Predicted counts per category for one simulated period.
///
/// The category set is the union of categories predicted in any period, so
/// categories absent from this period appear with a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCategoryCounts {
    /// Simulated future period.
    pub period: u32,
    /// Count per predicted category, zero-filled.
    pub counts: BTreeMap<String, u64>,
}

/// Total predicted volume for one period against the historical baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// Simulated future period.
    pub period: u32,
    /// Total predicted incidents in this period.
    pub future_count: u64,
    /// Historical average incidents per period.
    pub historical_average: f64,
}

/// Descriptive summary of the scored future-incident collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    /// Per-category totals across all periods, descending by count.
    pub category_totals: Vec<CategoryCount>,
    /// Period-by-category pivot, zero-filled.
    pub period_pivot: Vec<PeriodCategoryCounts>,
    /// Per-period totals compared against the historical average.
    pub period_summaries: Vec<PeriodSummary>,
    /// Number of records in the training subset.
    pub training_size: usize,
    /// Historical window length, in periods, used for the baseline.
    pub historical_window: usize,
    /// Training-subset size divided by the historical window.
    pub historical_average: f64,
}
