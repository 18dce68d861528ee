//! CART decision tree: weighted-Gini training and arena-based inference.

use crate::ForestError;

/// Split-search parameters for one tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Maximum tree depth; `None` grows until pure.
    pub max_depth: Option<usize>,
    /// Minimum number of samples a node needs to be split further.
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// One node of the fitted tree, stored in an arena.
#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: usize,
    },
}

/// A fitted CART decision tree classifier.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

/// Shared training context: the full matrix plus per-sample weights.
struct FitContext<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    candidates: &'a [usize],
    params: TreeParams,
}

impl DecisionTree {
    /// Grows a tree over `sample_indices` (bootstrap rows, possibly
    /// repeated), splitting only on `candidate_features`.
    ///
    /// The caller (the forest trainer) validates matrix shape and labels;
    /// this constructor assumes consistent inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::EmptyTrainingSet`] when `sample_indices` is
    /// empty.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        sample_indices: Vec<usize>,
        candidate_features: &[usize],
        params: TreeParams,
    ) -> Result<Self, ForestError> {
        if sample_indices.is_empty() || x.is_empty() {
            return Err(ForestError::EmptyTrainingSet);
        }

        let mut tree = Self {
            nodes: Vec::new(),
            n_features: x[0].len(),
        };
        let ctx = FitContext {
            x,
            y,
            weights,
            n_classes,
            candidates: candidate_features,
            params,
        };
        tree.build(&ctx, sample_indices, 0);
        Ok(tree)
    }

    /// Recursively grows the subtree over `indices`, returning its arena
    /// index.
    fn build(&mut self, ctx: &FitContext<'_>, indices: Vec<usize>, depth: usize) -> usize {
        let class_weights = weight_per_class(ctx, &indices);
        let majority = argmax_class(&class_weights);

        let at_depth_limit = ctx.params.max_depth.is_some_and(|limit| depth >= limit);
        let pure = class_weights.iter().filter(|w| **w > 0.0).count() <= 1;

        if pure || at_depth_limit || indices.len() < ctx.params.min_samples_split {
            return self.push(Node::Leaf { class: majority });
        }

        let Some(split) = best_split(ctx, &indices, &class_weights) else {
            return self.push(Node::Leaf { class: majority });
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| ctx.x[i][split.feature] <= split.threshold);

        // A split that leaves either side empty never wins the gain
        // search, so both recursions see at least one sample.
        let node = self.push(Node::Leaf { class: majority });
        let left = self.build(ctx, left_indices, depth + 1);
        let right = self.build(ctx, right_indices, depth + 1);
        self.nodes[node] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Classifies a single sample by root-to-leaf traversal.
    #[must_use]
    pub fn predict(&self, features: &[f64]) -> usize {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Expected number of features per sample.
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }
}

/// A winning split candidate.
struct Split {
    feature: usize,
    threshold: f64,
}

/// Sums sample weights per class over `indices`.
fn weight_per_class(ctx: &FitContext<'_>, indices: &[usize]) -> Vec<f64> {
    let mut sums = vec![0.0; ctx.n_classes];
    for &i in indices {
        sums[ctx.y[i]] += ctx.weights[i];
    }
    sums
}

/// Index of the heaviest class; ties break toward the lowest class id.
fn argmax_class(class_weights: &[f64]) -> usize {
    let mut best = 0;
    for (class, &weight) in class_weights.iter().enumerate() {
        if weight > class_weights[best] {
            best = class;
        }
    }
    best
}

/// Gini impurity of a weighted class distribution.
fn gini(class_weights: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - class_weights
        .iter()
        .map(|&w| (w / total) * (w / total))
        .sum::<f64>()
}

/// Scans every candidate feature for the threshold with the best weighted
/// Gini gain. Returns `None` when no split improves on the parent.
fn best_split(
    ctx: &FitContext<'_>,
    indices: &[usize],
    parent_weights: &[f64],
) -> Option<Split> {
    const MIN_GAIN: f64 = 1e-12;

    if indices.len() < 2 {
        return None;
    }

    let total: f64 = parent_weights.iter().sum();
    let parent_gini = gini(parent_weights, total);

    let mut best: Option<(f64, Split)> = None;

    for &feature in ctx.candidates {
        // Sort samples by this feature's value, then walk the boundaries
        // between distinct values accumulating left-side class weights.
        let mut ordered: Vec<usize> = indices.to_vec();
        ordered.sort_by(|&a, &b| {
            ctx.x[a][feature]
                .partial_cmp(&ctx.x[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left = vec![0.0; ctx.n_classes];
        let mut left_total = 0.0;

        for pair in 0..ordered.len() - 1 {
            let i = ordered[pair];
            left[ctx.y[i]] += ctx.weights[i];
            left_total += ctx.weights[i];

            let value = ctx.x[i][feature];
            let next = ctx.x[ordered[pair + 1]][feature];
            if next <= value {
                continue;
            }

            let right: Vec<f64> = parent_weights
                .iter()
                .zip(&left)
                .map(|(p, l)| p - l)
                .collect();
            let right_total = total - left_total;

            let weighted = (left_total / total) * gini(&left, left_total)
                + (right_total / total) * gini(&right, right_total);
            let gain = parent_gini - weighted;

            if gain > MIN_GAIN && best.as_ref().is_none_or(|(g, _)| gain > *g) {
                best = Some((
                    gain,
                    Split {
                        feature,
                        threshold: f64::midpoint(value, next),
                    },
                ));
            }
        }
    }

    best.map(|(_, split)| split)
}
