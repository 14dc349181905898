use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use ndarray::{Array1, Array2, ArrayView1};
use scenery_helpers::{Float, LengthMismatch, argmax, check_len, softmax};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Errors that can occur when building or querying a logistic regression model.
#[derive(Debug, Clone, PartialEq)]
pub enum LogisticRegressionError {
    /// Fewer than two classes.
    TooFewClasses(usize),
    /// The input has the wrong number of features.
    DimensionMismatch(LengthMismatch),
    /// The coefficient matrix does not have one row per class (or a single row for two classes).
    CoefficientShape { rows: usize, classes: usize },
    /// The intercept does not have one entry per coefficient row.
    InterceptLength { expected: usize, found: usize },
    /// The decision values contain only NaN.
    InvalidScore,
}

impl Display for LogisticRegressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogisticRegressionError::TooFewClasses(n) => {
                write!(f, "Logistic regression needs at least two classes, got {}", n)
            }
            LogisticRegressionError::DimensionMismatch(m) => write!(f, "Dimension mismatch: {}", m),
            LogisticRegressionError::CoefficientShape { rows, classes } => write!(
                f,
                "{} coefficient rows do not fit {} classes",
                rows, classes
            ),
            LogisticRegressionError::InterceptLength { expected, found } => write!(
                f,
                "Intercept has {} entries, expected {}",
                found, expected
            ),
            LogisticRegressionError::InvalidScore => write!(f, "Decision values are all NaN"),
        }
    }
}

impl Error for LogisticRegressionError {}

impl From<LengthMismatch> for LogisticRegressionError {
    fn from(m: LengthMismatch) -> Self {
        LogisticRegressionError::DimensionMismatch(m)
    }
}

/// How class probabilities are derived from the per-row scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum MultiClass {
    /// One softmax over all rows.
    #[default]
    Multinomial,
    /// One independent sigmoid per row, normalised afterwards.
    Ovr,
}

/// A fitted linear classifier with a logistic link.
///
/// `coef` holds one row per class, except for two-class models which carry a
/// single row scoring the second class against the first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct LogisticRegression<L, F: Float> {
    classes: Vec<L>,
    coef: Array2<F>,
    intercept: Array1<F>,
    #[cfg_attr(feature = "serde", serde(default))]
    multi_class: MultiClass,
}

impl<L, F> LogisticRegression<L, F>
where
    L: Clone + Debug,
    F: Float,
{
    pub fn new(
        classes: Vec<L>,
        coef: Array2<F>,
        intercept: Array1<F>,
        multi_class: MultiClass,
    ) -> Result<Self, LogisticRegressionError> {
        let model = Self {
            classes,
            coef,
            intercept,
            multi_class,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), LogisticRegressionError> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(LogisticRegressionError::TooFewClasses(n_classes));
        }
        let expected_rows = if n_classes == 2 { 1 } else { n_classes };
        if self.coef.nrows() != expected_rows {
            return Err(LogisticRegressionError::CoefficientShape {
                rows: self.coef.nrows(),
                classes: n_classes,
            });
        }
        if self.intercept.len() != expected_rows {
            return Err(LogisticRegressionError::InterceptLength {
                expected: expected_rows,
                found: self.intercept.len(),
            });
        }
        Ok(())
    }

    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    fn is_binary(&self) -> bool {
        self.coef.nrows() == 1
    }

    /// Raw linear scores `coef · x + intercept`, one per coefficient row.
    pub fn decision_function(
        &self,
        features: ArrayView1<F>,
    ) -> Result<Array1<F>, LogisticRegressionError> {
        check_len(features, self.n_features())?;
        Ok(self.coef.dot(&features) + &self.intercept)
    }

    pub fn predict_proba(
        &self,
        features: ArrayView1<F>,
    ) -> Result<Array1<F>, LogisticRegressionError> {
        let scores = self.decision_function(features)?;
        if self.is_binary() {
            let p = sigmoid(scores[0]);
            return Ok(Array1::from(vec![F::one() - p, p]));
        }
        Ok(match self.multi_class {
            MultiClass::Multinomial => softmax(scores.view()),
            MultiClass::Ovr => {
                let p = scores.mapv(sigmoid);
                let total = p.sum();
                p / total
            }
        })
    }

    /// Predicts the class with the highest score. Both link functions are
    /// monotone, so this matches the argmax of [`Self::predict_proba`].
    pub fn predict(&self, features: ArrayView1<F>) -> Result<L, LogisticRegressionError> {
        let scores = self.decision_function(features)?;
        let best = if self.is_binary() {
            if scores[0].is_nan() {
                return Err(LogisticRegressionError::InvalidScore);
            }
            usize::from(scores[0] > F::zero())
        } else {
            argmax(scores.view()).ok_or(LogisticRegressionError::InvalidScore)?
        };
        self.classes
            .get(best)
            .cloned()
            .ok_or(LogisticRegressionError::TooFewClasses(self.classes.len()))
    }
}

fn sigmoid<F: Float>(x: F) -> F {
    F::one() / (F::one() + (-x).exp())
}
