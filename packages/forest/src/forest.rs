//! Random forest ensemble: bootstrapped, feature-subsampled CART trees
//! with class-balanced weights and majority voting.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::tree::{DecisionTree, TreeParams};
use crate::ForestError;

/// Default number of trees in the ensemble.
pub const DEFAULT_N_TREES: usize = 100;

/// Default training seed.
pub const DEFAULT_SEED: u64 = 42;

/// Configures and fits a [`RandomForest`].
///
/// Each tree trains on a bootstrap sample of the rows and may split only
/// on a random ⌈√n⌉-sized feature subset. Sample weights follow the
/// class-balancing scheme `n_samples / (n_classes * class_count)`, so
/// rare (but not collapsed) classes are not starved during training.
#[derive(Debug, Clone)]
pub struct RandomForestTrainer {
    n_trees: usize,
    max_depth: Option<usize>,
    seed: u64,
}

impl Default for RandomForestTrainer {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            max_depth: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl RandomForestTrainer {
    /// Creates a trainer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of trees.
    #[must_use]
    pub const fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Caps the depth of every tree.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the deterministic training seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fits the ensemble on an encoded feature matrix and class-id
    /// labels.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError`] when the matrix is empty or ragged, when
    /// matrix and label lengths differ, when a label exceeds `n_classes`,
    /// or when fewer than two distinct classes are present.
    pub fn fit(
        &self,
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
    ) -> Result<RandomForest, ForestError> {
        validate(x, y, n_classes)?;

        let n_samples = x.len();
        let n_features = x[0].len();
        let n_candidates = candidate_count(n_features);
        let weights = balanced_weights(y, n_classes);
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: 2,
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);

        for _ in 0..self.n_trees {
            let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

            let mut candidates: Vec<usize> =
                rand::seq::index::sample(&mut rng, n_features, n_candidates).into_vec();
            candidates.sort_unstable();

            let tree =
                DecisionTree::fit(x, y, &weights, n_classes, sample, &candidates, params)?;
            trees.push(tree);
        }

        log::info!(
            "Trained random forest: {} trees, {n_features} features, {n_classes} classes",
            trees.len()
        );

        Ok(RandomForest {
            trees,
            n_features,
            n_classes,
        })
    }
}

/// A fitted, immutable random forest classifier.
///
/// Retraining means discarding this value and fitting a new one; nothing
/// is ever updated in place, so a fitted forest is safely shareable
/// across concurrent scoring calls.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    /// Predicts the class of one sample by majority vote; ties break
    /// toward the lowest class id.
    #[must_use]
    pub fn predict(&self, features: &[f64]) -> usize {
        let votes = self.votes(features);
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        best
    }

    /// Predicts every sample in a batch.
    #[must_use]
    pub fn predict_batch(&self, samples: &[Vec<f64>]) -> Vec<usize> {
        samples.iter().map(|sample| self.predict(sample)).collect()
    }

    /// Per-class vote fractions for one sample.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let total = self.trees.len() as f64;
        self.votes(features)
            .into_iter()
            .map(|count| count as f64 / total)
            .collect()
    }

    /// Raw vote counts per class for one sample.
    #[must_use]
    pub fn votes(&self, features: &[f64]) -> Vec<usize> {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            let class = tree.predict(features);
            if class < self.n_classes {
                votes[class] += 1;
            }
        }
        votes
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Expected number of features per sample.
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of output classes.
    #[must_use]
    pub const fn n_classes(&self) -> usize {
        self.n_classes
    }
}

/// ⌈√n⌉ candidate features per tree, at least one.
fn candidate_count(n_features: usize) -> usize {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (n_features as f64).sqrt().ceil() as usize;
    count.clamp(1, n_features)
}

/// Class-balanced sample weights: `n_samples / (n_classes_present *
/// class_count)`.
#[allow(clippy::cast_precision_loss)]
fn balanced_weights(y: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &label in y {
        counts[label] += 1;
    }
    let present = counts.iter().filter(|count| **count > 0).count();

    let n = y.len() as f64;
    y.iter()
        .map(|&label| n / (present as f64 * counts[label] as f64))
        .collect()
}

/// Shape and label validation shared by every fit.
fn validate(x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<(), ForestError> {
    if x.is_empty() {
        return Err(ForestError::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(ForestError::LengthMismatch {
            rows: x.len(),
            labels: y.len(),
        });
    }

    let expected = x[0].len();
    if expected == 0 {
        return Err(ForestError::EmptyTrainingSet);
    }
    for (row, features) in x.iter().enumerate() {
        if features.len() != expected {
            return Err(ForestError::FeatureMismatch {
                row,
                got: features.len(),
                expected,
            });
        }
    }

    let mut seen = vec![false; n_classes];
    for &label in y {
        if label >= n_classes {
            return Err(ForestError::InvalidLabel { label, n_classes });
        }
        seen[label] = true;
    }
    let distinct = seen.iter().filter(|s| **s).count();
    if distinct < 2 {
        return Err(ForestError::TooFewClasses { found: distinct });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well-separated spatial clusters, one per class.
    fn clustered(n_per_class: usize) -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..n_per_class {
            #[allow(clippy::cast_precision_loss)]
            let jitter = (i % 10) as f64 * 0.01;
            x.push(vec![0.0 + jitter, 0.0 + jitter]);
            y.push(0);
            x.push(vec![5.0 + jitter, 5.0 + jitter]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn separable_clusters_classify_correctly() {
        let (x, y) = clustered(30);
        let forest = RandomForestTrainer::new()
            .with_trees(25)
            .fit(&x, &y, 2)
            .unwrap();

        assert_eq!(forest.predict(&[0.05, 0.05]), 0);
        assert_eq!(forest.predict(&[5.05, 5.05]), 1);
        assert_eq!(forest.n_trees(), 25);
        assert_eq!(forest.n_features(), 2);
    }

    #[test]
    fn same_seed_reproduces_predictions() {
        let (x, y) = clustered(20);
        let probe = vec![vec![0.1, 0.1], vec![4.9, 4.9], vec![2.5, 2.5]];

        let a = RandomForestTrainer::new()
            .with_trees(15)
            .with_seed(7)
            .fit(&x, &y, 2)
            .unwrap();
        let b = RandomForestTrainer::new()
            .with_trees(15)
            .with_seed(7)
            .fit(&x, &y, 2)
            .unwrap();

        assert_eq!(a.predict_batch(&probe), b.predict_batch(&probe));
    }

    #[test]
    fn vote_fractions_sum_to_one() {
        let (x, y) = clustered(20);
        let forest = RandomForestTrainer::new()
            .with_trees(10)
            .fit(&x, &y, 2)
            .unwrap();

        let proba = forest.predict_proba(&[0.1, 0.1]);
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(proba[0] > proba[1]);
    }

    #[test]
    fn rare_class_survives_with_balanced_weights() {
        // Class 1 occupies a distinct region but is 20x rarer.
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..200 {
            #[allow(clippy::cast_precision_loss)]
            let jitter = (i % 10) as f64 * 0.01;
            x.push(vec![0.0 + jitter]);
            y.push(0);
        }
        for i in 0..10 {
            #[allow(clippy::cast_precision_loss)]
            let jitter = (i % 10) as f64 * 0.01;
            x.push(vec![9.0 + jitter]);
            y.push(1);
        }

        let forest = RandomForestTrainer::new()
            .with_trees(25)
            .fit(&x, &y, 2)
            .unwrap();
        assert_eq!(forest.predict(&[9.05]), 1);
    }

    #[test]
    fn single_class_training_is_fatal() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![0, 0];
        assert!(matches!(
            RandomForestTrainer::new().fit(&x, &y, 2),
            Err(ForestError::TooFewClasses { found: 1 })
        ));
    }

    #[test]
    fn empty_matrix_is_fatal() {
        assert!(matches!(
            RandomForestTrainer::new().fit(&[], &[], 2),
            Err(ForestError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn mismatched_lengths_are_fatal() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![0];
        assert!(matches!(
            RandomForestTrainer::new().fit(&x, &y, 2),
            Err(ForestError::LengthMismatch { rows: 2, labels: 1 })
        ));
    }

    #[test]
    fn ragged_matrix_is_fatal() {
        let x = vec![vec![0.0, 1.0], vec![1.0]];
        let y = vec![0, 1];
        assert!(matches!(
            RandomForestTrainer::new().fit(&x, &y, 2),
            Err(ForestError::FeatureMismatch { row: 1, .. })
        ));
    }

    #[test]
    fn out_of_range_label_is_fatal() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![0, 5];
        assert!(matches!(
            RandomForestTrainer::new().fit(&x, &y, 2),
            Err(ForestError::InvalidLabel { label: 5, .. })
        ));
    }

    #[test]
    fn balanced_weights_equalize_class_mass() {
        let y = vec![0, 0, 0, 1];
        let weights = balanced_weights(&y, 2);
        let class0: f64 = weights[..3].iter().sum();
        let class1 = weights[3];
        assert!((class0 - class1).abs() < 1e-12);
    }

    #[test]
    fn candidate_count_is_sqrt_ceil() {
        assert_eq!(candidate_count(1), 1);
        assert_eq!(candidate_count(4), 2);
        assert_eq!(candidate_count(5), 3);
        assert_eq!(candidate_count(9), 3);
    }
}
