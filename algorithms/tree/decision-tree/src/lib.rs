use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use ndarray::{Array1, ArrayView1};
use scenery_helpers::{Float, LengthMismatch, argmax, check_len};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Errors that can occur when building or querying a decision tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// The tree has no nodes.
    EmptyTree,
    /// The tree was built without any class.
    NoClasses,
    /// The input has the wrong number of features.
    DimensionMismatch(LengthMismatch),
    /// A split points at a child that does not exist or that precedes it.
    InvalidChild { node: usize, child: usize },
    /// A split tests a feature index outside the input.
    InvalidFeature { node: usize, feature: usize },
    /// A leaf holds a different number of class weights than there are classes.
    InvalidLeaf { node: usize, expected: usize, found: usize },
    /// Traversal visited more nodes than the tree holds.
    Cycle,
    /// The reached leaf carries no usable weight (all zero or NaN).
    DegenerateLeaf(usize),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::EmptyTree => write!(f, "Decision tree has no nodes"),
            TreeError::NoClasses => write!(f, "Decision tree has no classes"),
            TreeError::DimensionMismatch(m) => write!(f, "Dimension mismatch: {}", m),
            TreeError::InvalidChild { node, child } => {
                write!(f, "Node {} references invalid child {}", node, child)
            }
            TreeError::InvalidFeature { node, feature } => {
                write!(f, "Node {} splits on out-of-range feature {}", node, feature)
            }
            TreeError::InvalidLeaf {
                node,
                expected,
                found,
            } => write!(
                f,
                "Leaf {} holds {} class weights, expected {}",
                node, found, expected
            ),
            TreeError::Cycle => write!(f, "Tree traversal did not terminate"),
            TreeError::DegenerateLeaf(node) => write!(f, "Leaf {} has no usable weights", node),
        }
    }
}

impl Error for TreeError {}

impl From<LengthMismatch> for TreeError {
    fn from(m: LengthMismatch) -> Self {
        TreeError::DimensionMismatch(m)
    }
}

/// One node of a flattened classification tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum Node<F: Float> {
    /// Internal node: samples with `x[feature] <= threshold` go to `left`.
    Split {
        feature: usize,
        threshold: F,
        left: usize,
        right: usize,
    },
    /// Terminal node holding one weight per class (sample counts or fractions).
    Leaf { value: Vec<F> },
}

/// A trained CART classification tree stored as a flat node list.
///
/// Node `0` is the root. Children always have a larger index than their parent,
/// which is how trees exported from array-based implementations are laid out,
/// and what [`DecisionTree::validate`] enforces.
///
/// # Type Parameters
///
/// * `L`: The type of the class labels.
/// * `F`: The float type for the features and thresholds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct DecisionTree<L, F: Float> {
    classes: Vec<L>,
    n_features: usize,
    nodes: Vec<Node<F>>,
}

impl<L, F> DecisionTree<L, F>
where
    L: Clone + Debug,
    F: Float,
{
    /// Creates a tree and checks its structure.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found, see [`DecisionTree::validate`].
    pub fn new(classes: Vec<L>, n_features: usize, nodes: Vec<Node<F>>) -> Result<Self, TreeError> {
        let tree = Self {
            classes,
            n_features,
            nodes,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Checks that every split references in-range features and forward
    /// children, and that every leaf carries one weight per class.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.nodes.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        if self.classes.is_empty() {
            return Err(TreeError::NoClasses);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features {
                        return Err(TreeError::InvalidFeature {
                            node: i,
                            feature: *feature,
                        });
                    }
                    for &child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(TreeError::InvalidChild { node: i, child });
                        }
                    }
                }
                Node::Leaf { value } => {
                    if value.len() != self.classes.len() {
                        return Err(TreeError::InvalidLeaf {
                            node: i,
                            expected: self.classes.len(),
                            found: value.len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                let next = depths[i] + 1;
                for &child in [left, right] {
                    if let Some(d) = depths.get_mut(child) {
                        *d = next;
                        max = max.max(next);
                    }
                }
            }
        }
        max
    }

    /// Index of the leaf `features` ends up in.
    pub fn apply(&self, features: ArrayView1<F>) -> Result<usize, TreeError> {
        check_len(features, self.n_features)?;
        let mut index = 0;
        // Children index forward, so a valid path visits each node at most once.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index).ok_or(TreeError::EmptyTree)? {
                Node::Leaf { .. } => return Ok(index),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = *features.get(*feature).ok_or(TreeError::InvalidFeature {
                        node: index,
                        feature: *feature,
                    })?;
                    let next = if x <= *threshold { *left } else { *right };
                    if next >= self.nodes.len() {
                        return Err(TreeError::InvalidChild {
                            node: index,
                            child: next,
                        });
                    }
                    index = next;
                }
            }
        }
        Err(TreeError::Cycle)
    }

    fn leaf_value(&self, features: ArrayView1<F>) -> Result<(usize, &[F]), TreeError> {
        let leaf = self.apply(features)?;
        match &self.nodes[leaf] {
            Node::Leaf { value } => Ok((leaf, value)),
            Node::Split { .. } => Err(TreeError::Cycle),
        }
    }

    /// Class probabilities: the reached leaf's weights normalised to sum to one.
    pub fn predict_proba(&self, features: ArrayView1<F>) -> Result<Array1<F>, TreeError> {
        let (leaf, value) = self.leaf_value(features)?;
        let weights = Array1::from(value.to_vec());
        let total = weights.sum();
        if !(total > F::zero()) {
            return Err(TreeError::DegenerateLeaf(leaf));
        }
        Ok(weights / total)
    }

    /// Predicts the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::DimensionMismatch` if `features` has the wrong length,
    /// or a structural error if the tree was deserialized without validation.
    pub fn predict(&self, features: ArrayView1<F>) -> Result<L, TreeError> {
        let (leaf, value) = self.leaf_value(features)?;
        let best = argmax(ArrayView1::from(value)).ok_or(TreeError::DegenerateLeaf(leaf))?;
        if value[best] <= F::zero() {
            return Err(TreeError::DegenerateLeaf(leaf));
        }
        self.classes.get(best).cloned().ok_or(TreeError::InvalidLeaf {
            node: leaf,
            expected: self.classes.len(),
            found: value.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// x0 <= 0.5 -> "A", otherwise x1 <= 0.2 -> "B" else "C".
    fn small_tree() -> DecisionTree<&'static str, f64> {
        DecisionTree::new(
            vec!["A", "B", "C"],
            2,
            vec![
                Node::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                Node::Leaf {
                    value: vec![8.0, 1.0, 1.0],
                },
                Node::Split {
                    feature: 1,
                    threshold: 0.2,
                    left: 3,
                    right: 4,
                },
                Node::Leaf {
                    value: vec![0.0, 3.0, 1.0],
                },
                Node::Leaf {
                    value: vec![0.0, 0.0, 5.0],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_tree_routes_samples() {
        let tree = small_tree();
        assert_eq!(tree.predict(array![0.1, 0.9].view()).unwrap(), "A");
        assert_eq!(tree.predict(array![0.9, 0.1].view()).unwrap(), "B");
        assert_eq!(tree.predict(array![0.9, 0.9].view()).unwrap(), "C");
        // Equality goes left.
        assert_eq!(tree.predict(array![0.5, 0.9].view()).unwrap(), "A");
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_predict_proba_normalises_leaf() {
        let tree = small_tree();
        let p = tree.predict_proba(array![0.0, 0.0].view()).unwrap();
        assert_abs_diff_eq!(p, array![0.8, 0.1, 0.1], epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let tree = small_tree();
        let result = tree.predict(array![0.1].view());
        assert!(matches!(
            result,
            Err(TreeError::DimensionMismatch(LengthMismatch {
                expected: 2,
                found: 1
            }))
        ));
    }

    #[test]
    fn test_rejects_backward_child() {
        let result = DecisionTree::<u8, f64>::new(
            vec![0, 1],
            1,
            vec![
                Node::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 1,
                },
                Node::Leaf {
                    value: vec![1.0, 0.0],
                },
            ],
        );
        assert_eq!(result, Err(TreeError::InvalidChild { node: 0, child: 0 }));
    }

    #[test]
    fn test_rejects_bad_leaf_and_feature() {
        let leaf = DecisionTree::<u8, f64>::new(vec![0, 1], 1, vec![Node::Leaf { value: vec![1.0] }]);
        assert!(matches!(leaf, Err(TreeError::InvalidLeaf { node: 0, .. })));

        let feature = DecisionTree::<u8, f64>::new(
            vec![0],
            1,
            vec![
                Node::Split {
                    feature: 3,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: vec![1.0] },
                Node::Leaf { value: vec![1.0] },
            ],
        );
        assert!(matches!(
            feature,
            Err(TreeError::InvalidFeature { node: 0, feature: 3 })
        ));
    }

    #[test]
    fn test_empty_leaf_is_degenerate() {
        let tree = DecisionTree::<u8, f64>::new(vec![0, 1], 1, vec![Node::Leaf { value: vec![0.0, 0.0] }])
            .unwrap();
        assert_eq!(
            tree.predict(array![1.0].view()),
            Err(TreeError::DegenerateLeaf(0))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_layout() {
        let json = r#"{
            "classes": [0, 1],
            "n_features": 1,
            "nodes": [
                {"split": {"feature": 0, "threshold": 0.5, "left": 1, "right": 2}},
                {"leaf": {"value": [2.0, 0.0]}},
                {"leaf": {"value": [0.0, 2.0]}}
            ]
        }"#;
        let tree: DecisionTree<i64, f64> = serde_json::from_str(json).unwrap();
        tree.validate().unwrap();
        assert_eq!(tree.predict(array![0.7].view()).unwrap(), 1);
    }
}
