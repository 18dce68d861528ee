#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! End-to-end crime forecast pipeline.
//!
//! One linear synchronous pass: load → clean → training subset → collapse
//! → fit encoders → fit forest → per-period scenario loop → aggregate.
//! Every fitted artifact is immutable after its fit; a retrain builds a
//! whole new [`PipelineOutput`] rather than mutating anything in place.

pub mod aggregate;
pub mod config;
pub mod scenario;

use std::path::Path;
use std::time::Instant;

use crime_forecast_dataset::{
    clean, load_table, training_subset, CategoryVocabulary, DatasetError,
};
use crime_forecast_encoding::{EncodeError, FeatureEncoder, TargetEncoder};
use crime_forecast_forest::{ForestError, RandomForestTrainer};
use crime_forecast_models::{AggregateReport, FutureIncident, Incident, TrainingRecord};

pub use aggregate::{aggregate, observed_window, resolve_window};
pub use config::{PipelineConfig, DEFAULT_HISTORICAL_WINDOW};
pub use scenario::{generate_period, period_seed, BoundingBox, ModalContext};

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Dataset loading or cleaning failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Feature or target encoding failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Classifier training failed.
    #[error(transparent)]
    Forest(#[from] ForestError),

    /// No incident carries the statistical-area fields needed for
    /// training.
    #[error("training subset is empty: no incident carries statistical-area fields")]
    EmptyTrainingSubset,
}

/// Everything one pipeline run hands to the presentation layer.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The cleaned incident collection.
    pub cleaned: Vec<Incident>,
    /// The collapsed training subset.
    pub training: Vec<TrainingRecord>,
    /// The fitted category vocabulary.
    pub vocabulary: CategoryVocabulary,
    /// All scored synthetic future incidents.
    pub future: Vec<FutureIncident>,
    /// Descriptive summary of the future collection.
    pub report: AggregateReport,
}

/// Runs the full pipeline against the incident table at `path`.
///
/// # Errors
///
/// Returns [`PipelineError`] on any fatal input error: missing or
/// unreadable data source, missing required columns, no rows surviving
/// cleaning, an empty training subset, or fewer than two target classes.
pub fn run(path: &Path, config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let rows = load_table(path)?;
    let cleaned = clean(&rows)?;
    run_incidents(cleaned, config)
}

/// Runs the pipeline stages that follow cleaning.
///
/// Split out from [`run`] so callers with an already-cleaned collection
/// (and tests) can drive the model stages directly.
///
/// # Errors
///
/// Returns [`PipelineError`] on an empty training subset or any encoder
/// or training failure.
pub fn run_incidents(
    cleaned: Vec<Incident>,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let start = Instant::now();

    // ── Training subset + category collapse ─────────────────────────
    let mut training = training_subset(&cleaned);
    if training.is_empty() {
        return Err(PipelineError::EmptyTrainingSubset);
    }
    let vocabulary = CategoryVocabulary::fit(&training, config.collapse_threshold);
    vocabulary.apply(&mut training);

    // ── Fit encoders and classifier ─────────────────────────────────
    let encoder = FeatureEncoder::fit(&training)?;
    let target = TargetEncoder::fit(training.iter().map(|r| r.crime_type.as_str()))?;

    let matrix = encoder.transform_records(&training)?;
    let labels = target.encode_all(training.iter().map(|r| r.crime_type.as_str()))?;

    let forest = RandomForestTrainer::new()
        .with_trees(config.n_trees)
        .with_seed(config.seed)
        .fit(&matrix, &labels, target.n_classes())?;

    // ── Scenario loop ───────────────────────────────────────────────
    let bounds = BoundingBox::from_records(&training)?;
    let context = ModalContext::from_records(&training)?;

    let mut future = Vec::with_capacity(config.samples_per_period * config.periods as usize);
    for period in 1..=config.periods {
        let batch = generate_period(
            period,
            config.samples_per_period,
            period_seed(config.seed, period),
            &bounds,
            &context,
            &encoder,
            &forest,
            &target,
        )?;
        future.extend(batch);
    }

    // ── Aggregate ───────────────────────────────────────────────────
    let window = resolve_window(&training, config.historical_window);
    let report = aggregate(&future, training.len(), window);

    log::info!(
        "Pipeline complete in {:?}: {} cleaned, {} training, {} future incidents",
        start.elapsed(),
        cleaned.len(),
        training.len(),
        future.len()
    );

    Ok(PipelineOutput {
        cleaned,
        training,
        vocabulary,
        future,
        report,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use super::*;

    /// Builds a cleaned incident inside one of three spatial clusters.
    fn incident(id: usize, crime_type: &str, lat: f64, lon: f64) -> Incident {
        #[allow(clippy::cast_precision_loss)]
        let jitter = (id % 50) as f64 * 0.002;
        Incident {
            crime_id: format!("{crime_type}-{id}"),
            month: Some("2024-03".to_owned()),
            reported_by: Some("Humberside Police".to_owned()),
            falls_within: Some("Humberside Police".to_owned()),
            longitude: lon + jitter,
            latitude: lat + jitter,
            location: "On or near High Street".to_owned(),
            lsoa_code: Some("E01012345".to_owned()),
            lsoa_name: Some("Hull 001A".to_owned()),
            crime_type: crime_type.to_owned(),
            last_outcome_category: Some("Under investigation".to_owned()),
        }
    }

    /// The literal collapse scenario: Burglary and Theft above threshold,
    /// Vandalism below.
    fn clustered_incidents() -> Vec<Incident> {
        let mut incidents = Vec::new();
        for i in 0..150 {
            incidents.push(incident(i, "Burglary", 53.4, -1.2));
        }
        for i in 0..120 {
            incidents.push(incident(i, "Theft", 53.8, -0.6));
        }
        for i in 0..40 {
            incidents.push(incident(i, "Vandalism", 53.6, -0.9));
        }
        incidents
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            collapse_threshold: 100,
            periods: 6,
            samples_per_period: 50,
            n_trees: 15,
            seed: 42,
            historical_window: None,
        }
    }

    #[test]
    fn end_to_end_collapses_and_predicts_inside_vocabulary() {
        let output = run_incidents(clustered_incidents(), &test_config()).unwrap();

        assert_eq!(
            output.vocabulary.labels(),
            vec![
                "Burglary".to_owned(),
                "Other".to_owned(),
                "Theft".to_owned()
            ]
        );

        // Every prediction decodes into the collapsed vocabulary; the
        // collapsed-away label can never come back.
        for future in &output.future {
            assert_ne!(future.predicted_crime_type, "Vandalism");
            assert!(output
                .vocabulary
                .labels()
                .contains(&future.predicted_crime_type));
        }
    }

    #[test]
    fn covers_every_period_with_exact_batch_size() {
        let output = run_incidents(clustered_incidents(), &test_config()).unwrap();

        let mut per_period: BTreeMap<u32, usize> = BTreeMap::new();
        for future in &output.future {
            *per_period.entry(future.period).or_insert(0) += 1;
        }

        assert_eq!(
            per_period.keys().copied().collect::<Vec<u32>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert!(per_period.values().all(|&count| count == 50));
        assert_eq!(output.future.len(), 300);
    }

    #[test]
    fn sampled_coordinates_stay_inside_training_bounds() {
        let output = run_incidents(clustered_incidents(), &test_config()).unwrap();
        let bounds = BoundingBox::from_records(&output.training).unwrap();

        for future in &output.future {
            assert!(bounds.contains(future.latitude, future.longitude));
        }
    }

    #[test]
    fn pivot_sums_match_batch_size_per_period() {
        let output = run_incidents(clustered_incidents(), &test_config()).unwrap();

        for row in &output.report.period_pivot {
            assert_eq!(row.counts.values().sum::<u64>(), 50);
        }
    }

    #[test]
    fn report_baseline_uses_observed_window() {
        // All records share one month, so the observed window is 1 and
        // the baseline equals the training-subset size.
        let output = run_incidents(clustered_incidents(), &test_config()).unwrap();
        assert_eq!(output.report.historical_window, 1);
        assert_eq!(output.report.training_size, 310);
        assert!((output.report.historical_average - 310.0).abs() < f64::EPSILON);
    }

    #[test]
    fn identical_seeds_reproduce_the_run() {
        let a = run_incidents(clustered_incidents(), &test_config()).unwrap();
        let b = run_incidents(clustered_incidents(), &test_config()).unwrap();
        assert_eq!(a.future, b.future);
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn modal_context_is_held_constant() {
        let output = run_incidents(clustered_incidents(), &test_config()).unwrap();
        let contexts: HashSet<(&str, &str, &str)> = output
            .future
            .iter()
            .map(|f| {
                (
                    f.reported_by.as_str(),
                    f.falls_within.as_str(),
                    f.last_outcome_category.as_str(),
                )
            })
            .collect();
        assert_eq!(contexts.len(), 1);
    }

    #[test]
    fn single_category_training_is_fatal() {
        let incidents: Vec<Incident> =
            (0..120).map(|i| incident(i, "Burglary", 53.4, -1.2)).collect();
        // Collapse leaves a single class ("Burglary" only), which the
        // trainer must refuse.
        let result = run_incidents(incidents, &test_config());
        assert!(matches!(
            result,
            Err(PipelineError::Forest(ForestError::TooFewClasses { found: 1 }))
        ));
    }

    #[test]
    fn missing_statistical_area_everywhere_is_fatal() {
        let mut incidents = clustered_incidents();
        for incident in &mut incidents {
            incident.lsoa_code = None;
            incident.lsoa_name = None;
        }
        assert!(matches!(
            run_incidents(incidents, &test_config()),
            Err(PipelineError::EmptyTrainingSubset)
        ));
    }
}
