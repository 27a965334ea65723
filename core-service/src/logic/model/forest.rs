//! Isolation Forest - unsupervised outlier ensemble
//!
//! Points that random axis-aligned splits isolate quickly (short paths) are
//! outliers. Scores follow the usual convention: `score_samples` is in
//! (-1, 0), more negative = more anomalous. The decision offset is the
//! `contamination` quantile of the training scores.
//!
//! Trees are stored as flat node arenas so the whole forest serializes as
//! plain data.

use ndarray::{Array2, ArrayView1, Axis};
use rand::seq::index;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Euler–Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestError {
    #[error("cannot fit an isolation forest on an empty training set")]
    EmptyTrainingSet,

    #[error("invalid forest configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed forest: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn fit(data: &Array2<f64>, rows: Vec<usize>, max_depth: usize, rng: &mut ChaCha8Rng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, rows, 0, max_depth, rng);
        tree
    }

    /// Appends the subtree for `rows` and returns its root index
    fn grow(
        &mut self,
        data: &Array2<f64>,
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: rows.len() });

        if depth >= max_depth || rows.len() <= 1 {
            return id;
        }

        let Some((feature, threshold)) = pick_split(data, &rows, rng) else {
            // every feature is constant on this node
            return id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| data[[r, feature]] <= threshold);

        let left = self.grow(data, left_rows, depth + 1, max_depth, rng);
        let right = self.grow(data, right_rows, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    /// Structural check for a deserialized tree. Children always come after
    /// their parent in the arena, which also rules out cycles.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no root node".to_string());
        }
        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= n_features {
                    return Err(format!("node {} splits on feature {} of {}", id, feature, n_features));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {} has a non-finite threshold", id));
                }
                for child in [*left, *right] {
                    if child <= id || child >= self.nodes.len() {
                        return Err(format!("node {} points to invalid child {}", id, child));
                    }
                }
            }
        }
        Ok(())
    }

    fn path_length(&self, x: ArrayView1<f64>) -> f64 {
        let mut node = 0;
        let mut depth = 0usize;
        loop {
            match &self.nodes[node] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold { *left } else { *right };
                    depth += 1;
                }
                Node::Leaf { size } => return depth as f64 + average_path_length(*size),
            }
        }
    }
}

/// Random non-constant feature and a threshold in `[min, max)` of that
/// feature over `rows`. Both sides of the split are non-empty.
fn pick_split(data: &Array2<f64>, rows: &[usize], rng: &mut ChaCha8Rng) -> Option<(usize, f64)> {
    let mut features: Vec<usize> = (0..data.ncols()).collect();
    features.shuffle(rng);

    for feature in features {
        let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
            let v = data[[r, feature]];
            (lo.min(v), hi.max(v))
        });
        if min < max {
            let mut threshold = min + rng.gen::<f64>() * (max - min);
            if !(threshold >= min && threshold < max) {
                threshold = min;
            }
            return Some((feature, threshold));
        }
    }
    None
}

/// Expected path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// numpy-style percentile with linear interpolation. `values` must be non-empty.
fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    /// Rows each tree was grown on
    sample_size: usize,
    /// `contamination` percentile of training scores
    offset: f64,
}

impl IsolationForest {
    pub fn fit(data: &Array2<f64>, params: &ForestParams) -> Result<Self, ForestError> {
        let n = data.nrows();
        if n == 0 {
            return Err(ForestError::EmptyTrainingSet);
        }
        if params.n_estimators == 0 || params.max_samples == 0 {
            return Err(ForestError::InvalidConfig(
                "n_estimators and max_samples must be positive".to_string(),
            ));
        }
        if !(params.contamination > 0.0 && params.contamination <= 0.5) {
            return Err(ForestError::InvalidConfig(format!(
                "contamination must be in (0, 0.5], got {}",
                params.contamination
            )));
        }

        let sample_size = params.max_samples.min(n);
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let rows = index::sample(&mut rng, n, sample_size).into_vec();
                IsolationTree::fit(data, rows, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.0,
        };

        let train_scores: Vec<f64> = data
            .axis_iter(Axis(0))
            .map(|row| forest.score_sample(row))
            .collect();
        forest.offset = percentile(&train_scores, 100.0 * params.contamination);

        Ok(forest)
    }

    /// Raw anomaly score in (-1, 0); more negative = more anomalous
    pub fn score_sample(&self, x: ArrayView1<f64>) -> f64 {
        let mean_depth =
            self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);
        let norm = if norm > 0.0 { norm } else { 1.0 };
        -(2f64.powf(-mean_depth / norm))
    }

    /// Signed distance to the decision boundary; negative = outlier
    pub fn decision_function(&self, x: ArrayView1<f64>) -> f64 {
        self.score_sample(x) - self.offset
    }

    pub fn is_outlier(&self, x: ArrayView1<f64>) -> bool {
        self.decision_function(x) < 0.0
    }

    /// Decision threshold on `score_sample`
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Check a forest that did not come from `fit` (e.g. loaded from disk)
    /// against inputs of `n_features` columns. Scoring a forest that passes
    /// never panics and never yields NaN.
    pub fn validate(&self, n_features: usize) -> Result<(), ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::Malformed("forest has no trees".to_string()));
        }
        if self.sample_size == 0 {
            return Err(ForestError::Malformed("sample size is zero".to_string()));
        }
        if !self.offset.is_finite() {
            return Err(ForestError::Malformed("decision offset is not finite".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|msg| ForestError::Malformed(format!("tree {}: {}", i, msg)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array2};

    fn params(seed: u64) -> ForestParams {
        ForestParams {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.1,
            seed,
        }
    }

    /// Uniform cluster in [-0.5, 0.5)^6
    fn cluster(n: usize) -> Array2<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        Array2::from_shape_fn((n, 6), |_| rng.gen_range(-0.5..0.5))
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) ≈ 10.24
        assert!((average_path_length(256) - 10.24).abs() < 0.01);
    }

    #[test]
    fn test_percentile_linear() {
        let v = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 50.0), 3.0);
        assert_eq!(percentile(&v, 100.0), 5.0);
        assert!((percentile(&v, 10.0) - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_empty() {
        let data = Array2::<f64>::zeros((0, 6));
        assert_eq!(
            IsolationForest::fit(&data, &params(42)),
            Err(ForestError::EmptyTrainingSet)
        );
    }

    #[test]
    fn test_fit_rejects_bad_contamination() {
        let mut p = params(42);
        p.contamination = 0.0;
        assert!(matches!(
            IsolationForest::fit(&cluster(10), &p),
            Err(ForestError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_scores_in_range() {
        let forest = IsolationForest::fit(&cluster(50), &params(42)).unwrap();
        assert_eq!(forest.trees.len(), 100);
        for row in cluster(50).axis_iter(Axis(0)) {
            let s = forest.score_sample(row);
            assert!(s < 0.0 && s > -1.0, "score {}", s);
        }
    }

    #[test]
    fn test_far_point_is_outlier() {
        let forest = IsolationForest::fit(&cluster(200), &params(42)).unwrap();
        let far = arr1(&[25.0, -30.0, 40.0, 25.0, -25.0, 30.0]);
        let center = arr1(&[0.0; 6]);

        assert!(forest.score_sample(far.view()) < forest.score_sample(center.view()));
        assert!(forest.is_outlier(far.view()));
    }

    #[test]
    fn test_deterministic_with_seed() {
        let data = cluster(40);
        let a = IsolationForest::fit(&data, &params(7)).unwrap();
        let b = IsolationForest::fit(&data, &params(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fitted_forest_validates() {
        let forest = IsolationForest::fit(&cluster(30), &params(42)).unwrap();
        assert!(forest.validate(6).is_ok());
        // narrower input than the forest was grown on
        assert!(matches!(forest.validate(1), Err(ForestError::Malformed(_))));
    }

    #[test]
    fn test_validate_rejects_broken_structure() {
        let fitted = IsolationForest::fit(&cluster(30), &params(42)).unwrap();

        let mut empty = fitted.clone();
        empty.trees.clear();
        assert!(matches!(empty.validate(6), Err(ForestError::Malformed(_))));

        let mut bad_feature = fitted.clone();
        bad_feature.trees[0].nodes[0] = Node::Split {
            feature: 9,
            threshold: 0.0,
            left: 1,
            right: 2,
        };
        assert!(bad_feature.validate(6).is_err());

        let mut cycle = fitted.clone();
        cycle.trees[0].nodes[0] = Node::Split {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 1,
        };
        assert!(cycle.validate(6).is_err());

        let mut no_root = fitted.clone();
        no_root.trees[0].nodes.clear();
        assert!(no_root.validate(6).is_err());

        let mut nan_offset = fitted;
        nan_offset.offset = f64::NAN;
        assert!(nan_offset.validate(6).is_err());
    }

    #[test]
    fn test_constant_data_does_not_split() {
        let data = Array2::<f64>::ones((5, 6));
        let forest = IsolationForest::fit(&data, &params(1)).unwrap();
        let s = forest.score_sample(arr1(&[1.0; 6]).view());
        // single leaf of size 5 → depth c(5) / c(5) = 1 → score -0.5
        assert!((s + 0.5).abs() < 1e-12);
        // every training score equals the offset, so nothing is below it
        assert!(!forest.is_outlier(arr1(&[1.0; 6]).view()));
    }
}
