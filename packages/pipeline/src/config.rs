//! Pipeline configuration.

/// Fallback historical window, in periods, when the training data carries
/// no parseable month column.
pub const DEFAULT_HISTORICAL_WINDOW: usize = 36;

/// Tunable parameters for one pipeline run.
///
/// The defaults reproduce the reference configuration: a collapse
/// threshold of 1000, six simulated periods of 5000 synthetic incidents,
/// a 100-tree forest, and seed 42.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum training-subset frequency a category needs to keep its own
    /// label.
    pub collapse_threshold: u64,
    /// Number of simulated future periods.
    pub periods: u32,
    /// Synthetic incidents drawn per period.
    pub samples_per_period: usize,
    /// Trees in the random forest ensemble.
    pub n_trees: usize,
    /// Base seed for training and per-period sampling.
    pub seed: u64,
    /// Historical window override, in periods. `None` derives the window
    /// from the observed month span of the training subset.
    pub historical_window: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collapse_threshold: crime_forecast_dataset::collapse::DEFAULT_COLLAPSE_THRESHOLD,
            periods: 6,
            samples_per_period: 5000,
            n_trees: crime_forecast_forest::forest::DEFAULT_N_TREES,
            seed: crime_forecast_forest::forest::DEFAULT_SEED,
            historical_window: None,
        }
    }
}
