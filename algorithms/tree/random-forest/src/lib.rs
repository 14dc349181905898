use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use decision_tree::{DecisionTree, TreeError};
use ndarray::{Array1, ArrayView1};
use scenery_helpers::{Float, argmax};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Errors that can occur when building or querying a random forest.
#[derive(Debug, Clone, PartialEq)]
pub enum ForestError {
    /// The forest has no trees.
    NoTrees,
    /// The forest was built without any class.
    NoClasses,
    /// A tree disagrees with the forest on the number of classes or features.
    InconsistentTree(usize),
    /// A tree failed while building or predicting.
    Tree { index: usize, source: TreeError },
}

impl Display for ForestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ForestError::NoTrees => write!(f, "Random forest has no trees"),
            ForestError::NoClasses => write!(f, "Random forest has no classes"),
            ForestError::InconsistentTree(i) => write!(
                f,
                "Tree {} does not match the forest's classes or feature count",
                i
            ),
            ForestError::Tree { index, source } => write!(f, "Tree {}: {}", index, source),
        }
    }
}

impl Error for ForestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ForestError::Tree { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A forest of classification trees combined by soft voting.
///
/// Each tree votes with its class probability vector; the forest averages the
/// vectors and predicts the class with the highest mean probability. All trees
/// share the forest's class order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct RandomForest<L, F: Float> {
    classes: Vec<L>,
    n_features: usize,
    trees: Vec<DecisionTree<usize, F>>,
}

impl<L, F> RandomForest<L, F>
where
    L: Clone + Debug,
    F: Float,
{
    pub fn new(
        classes: Vec<L>,
        n_features: usize,
        trees: Vec<DecisionTree<usize, F>>,
    ) -> Result<Self, ForestError> {
        let forest = Self {
            classes,
            n_features,
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    /// Checks every tree individually and against the forest's shape.
    pub fn validate(&self) -> Result<(), ForestError> {
        if self.classes.is_empty() {
            return Err(ForestError::NoClasses);
        }
        if self.trees.is_empty() {
            return Err(ForestError::NoTrees);
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|source| ForestError::Tree { index, source })?;
            if tree.classes().len() != self.classes.len() || tree.n_features() != self.n_features {
                return Err(ForestError::InconsistentTree(index));
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

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    /// Mean of the trees' class probability vectors.
    pub fn predict_proba(&self, features: ArrayView1<F>) -> Result<Array1<F>, ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NoTrees);
        }
        let mut total = Array1::<F>::zeros(self.classes.len());
        for (index, tree) in self.trees.iter().enumerate() {
            let proba = tree
                .predict_proba(features)
                .map_err(|source| ForestError::Tree { index, source })?;
            if proba.len() != total.len() {
                return Err(ForestError::InconsistentTree(index));
            }
            total += &proba;
        }
        let n = F::from_usize(self.trees.len()).ok_or(ForestError::NoTrees)?;
        Ok(total / n)
    }

    pub fn predict(&self, features: ArrayView1<F>) -> Result<L, ForestError> {
        let proba = self.predict_proba(features)?;
        argmax(proba.view())
            .and_then(|best| self.classes.get(best).cloned())
            .ok_or(ForestError::NoClasses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use decision_tree::Node;
    use ndarray::array;

    fn stump(threshold: f64, left: Vec<f64>, right: Vec<f64>) -> DecisionTree<usize, f64> {
        DecisionTree::new(
            vec![0, 1, 2],
            1,
            vec![
                Node::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: left },
                Node::Leaf { value: right },
            ],
        )
        .unwrap()
    }

    fn forest() -> RandomForest<&'static str, f64> {
        RandomForest::new(
            vec!["buildings", "forest", "glacier"],
            1,
            vec![
                stump(0.3, vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]),
                stump(0.6, vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]),
                stump(0.6, vec![1.0, 1.0, 0.0], vec![0.0, 0.0, 4.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_soft_voting() {
        let rf = forest();
        let p = rf.predict_proba(array![0.1].view()).unwrap();
        assert_abs_diff_eq!(p, array![0.5, 0.5, 0.0], epsilon = 1e-12);
        // Tie between the first two classes resolves to the first.
        assert_eq!(rf.predict(array![0.1].view()).unwrap(), "buildings");
        assert_eq!(rf.predict(array![0.5].view()).unwrap(), "forest");
        assert_eq!(rf.predict(array![0.9].view()).unwrap(), "glacier");
        assert_eq!(rf.n_estimators(), 3);
    }

    #[test]
    fn test_tree_error_carries_index() {
        let rf = forest();
        let result = rf.predict(array![0.1, 0.2].view());
        assert!(matches!(
            result,
            Err(ForestError::Tree {
                index: 0,
                source: TreeError::DimensionMismatch(_)
            })
        ));
    }

    #[test]
    fn test_rejects_empty_and_inconsistent() {
        let empty = RandomForest::<u8, f64>::new(vec![0, 1, 2], 1, vec![]);
        assert_eq!(empty, Err(ForestError::NoTrees));

        let two_class = DecisionTree::new(vec![0, 1], 1, vec![Node::Leaf { value: vec![1.0, 0.0] }]).unwrap();
        let mixed = RandomForest::<u8, f64>::new(
            vec![0, 1, 2],
            1,
            vec![stump(0.5, vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]), two_class],
        );
        assert_eq!(mixed, Err(ForestError::InconsistentTree(1)));
    }
}
