#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Random forest classifier training and inference.
//!
//! An ensemble of CART decision trees trained on bootstrapped rows with a
//! random candidate-feature subset per tree, class-balanced sample
//! weights, and a deterministic seed. Prediction is by majority vote;
//! per-class vote fractions double as prediction probabilities.

pub mod forest;
pub mod tree;

pub use forest::{RandomForest, RandomForestTrainer};
pub use tree::{DecisionTree, TreeParams};

/// Errors raised while training the classifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestError {
    /// The feature matrix has no rows.
    #[error("cannot train on an empty feature matrix")]
    EmptyTrainingSet,

    /// Feature matrix and label vector lengths differ.
    #[error("feature matrix has {rows} rows but {labels} labels")]
    LengthMismatch {
        /// Rows in the feature matrix.
        rows: usize,
        /// Entries in the label vector.
        labels: usize,
    },

    /// A row's feature count differs from the first row's.
    #[error("row {row} has {got} features, expected {expected}")]
    FeatureMismatch {
        /// Index of the offending row.
        row: usize,
        /// Features found in that row.
        got: usize,
        /// Features expected from the first row.
        expected: usize,
    },

    /// A label is outside the declared class range.
    #[error("label {label} is out of range for {n_classes} classes")]
    InvalidLabel {
        /// The offending label.
        label: usize,
        /// Declared number of classes.
        n_classes: usize,
    },

    /// Fewer than two distinct classes appear in the labels.
    #[error("training requires at least two distinct classes, found {found}")]
    TooFewClasses {
        /// Distinct classes observed.
        found: usize,
    },
}
