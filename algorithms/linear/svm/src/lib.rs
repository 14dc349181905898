use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use ndarray::{Array1, Array2, ArrayView1};
use scenery_helpers::{Float, LengthMismatch, check_len};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Errors that can occur when building or querying a support vector classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum SvmError {
    /// Fewer than two classes.
    TooFewClasses(usize),
    /// The input has the wrong number of features.
    DimensionMismatch(LengthMismatch),
    /// `n_support` does not have one entry per class or does not add up to the support vectors.
    SupportCounts { classes: usize, counted: usize, vectors: usize },
    /// `dual_coef` is not `(n_classes - 1) x n_support_vectors`.
    DualCoefShape { expected: (usize, usize), found: (usize, usize) },
    /// `intercept` does not have one entry per class pair.
    InterceptLength { expected: usize, found: usize },
    /// Every pairwise decision value was NaN.
    InvalidDecision,
}

impl Display for SvmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SvmError::TooFewClasses(n) => write!(f, "SVM needs at least two classes, got {}", n),
            SvmError::DimensionMismatch(m) => write!(f, "Dimension mismatch: {}", m),
            SvmError::SupportCounts {
                classes,
                counted,
                vectors,
            } => write!(
                f,
                "Support counts for {} classes add up to {}, but there are {} support vectors",
                classes, counted, vectors
            ),
            SvmError::DualCoefShape { expected, found } => write!(
                f,
                "Dual coefficients have shape {:?}, expected {:?}",
                found, expected
            ),
            SvmError::InterceptLength { expected, found } => {
                write!(f, "Intercept has {} entries, expected {}", found, expected)
            }
            SvmError::InvalidDecision => write!(f, "Pairwise decision values are all NaN"),
        }
    }
}

impl Error for SvmError {}

impl From<LengthMismatch> for SvmError {
    fn from(m: LengthMismatch) -> Self {
        SvmError::DimensionMismatch(m)
    }
}

/// Kernel function used to compare a sample with the support vectors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum Kernel<F: Float> {
    /// `<u, v>`
    Linear,
    /// `exp(-gamma * |u - v|^2)`
    Rbf { gamma: F },
    /// `(gamma * <u, v> + coef0)^degree`
    Poly { gamma: F, coef0: F, degree: i32 },
    /// `tanh(gamma * <u, v> + coef0)`
    Sigmoid { gamma: F, coef0: F },
}

impl<F: Float> Kernel<F> {
    pub fn evaluate(&self, u: ArrayView1<F>, v: ArrayView1<F>) -> F {
        match self {
            Kernel::Linear => u.dot(&v),
            Kernel::Rbf { gamma } => {
                let sq: F = u.iter().zip(v.iter()).map(|(&a, &b)| (a - b) * (a - b)).sum();
                (-*gamma * sq).exp()
            }
            Kernel::Poly {
                gamma,
                coef0,
                degree,
            } => (*gamma * u.dot(&v) + *coef0).powi(*degree),
            Kernel::Sigmoid { gamma, coef0 } => (*gamma * u.dot(&v) + *coef0).tanh(),
        }
    }
}

/// A kernel support vector classifier using one-vs-one voting.
///
/// Support vectors are stored grouped by class, `n_support[c]` of them for
/// class `c`. For every class pair `(i, j)` with `i < j` the decision value is
///
/// ```text
/// sum_{k in SV(i)} dual_coef[j-1][k] * K(k, x) + sum_{k in SV(j)} dual_coef[i][k] * K(k, x) + intercept[p]
/// ```
///
/// where `p` enumerates the pairs in lexicographic order. A positive value is a
/// vote for `i`, otherwise for `j`. The class with most votes wins and ties
/// go to the lower class index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Svc<L, F: Float> {
    classes: Vec<L>,
    kernel: Kernel<F>,
    support_vectors: Array2<F>,
    n_support: Vec<usize>,
    dual_coef: Array2<F>,
    intercept: Array1<F>,
}

impl<L, F> Svc<L, F>
where
    L: Clone + Debug,
    F: Float,
{
    pub fn new(
        classes: Vec<L>,
        kernel: Kernel<F>,
        support_vectors: Array2<F>,
        n_support: Vec<usize>,
        dual_coef: Array2<F>,
        intercept: Array1<F>,
    ) -> Result<Self, SvmError> {
        let svc = Self {
            classes,
            kernel,
            support_vectors,
            n_support,
            dual_coef,
            intercept,
        };
        svc.validate()?;
        Ok(svc)
    }

    pub fn validate(&self) -> Result<(), SvmError> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(SvmError::TooFewClasses(n_classes));
        }
        let n_sv = self.support_vectors.nrows();
        let counted: usize = self.n_support.iter().sum();
        if self.n_support.len() != n_classes || counted != n_sv {
            return Err(SvmError::SupportCounts {
                classes: self.n_support.len(),
                counted,
                vectors: n_sv,
            });
        }
        let expected = (n_classes - 1, n_sv);
        if self.dual_coef.dim() != expected {
            return Err(SvmError::DualCoefShape {
                expected,
                found: self.dual_coef.dim(),
            });
        }
        let pairs = n_classes * (n_classes - 1) / 2;
        if self.intercept.len() != pairs {
            return Err(SvmError::InterceptLength {
                expected: pairs,
                found: self.intercept.len(),
            });
        }
        Ok(())
    }

    pub fn classes(&self) -> &[L] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.support_vectors.ncols()
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.nrows()
    }

    /// One decision value per class pair, in `(0,1), (0,2), .., (1,2), ..` order.
    pub fn decision_function(&self, features: ArrayView1<F>) -> Result<Array1<F>, SvmError> {
        check_len(features, self.n_features())?;

        let kernel_values: Array1<F> = self
            .support_vectors
            .rows()
            .into_iter()
            .map(|sv| self.kernel.evaluate(sv, features))
            .collect();

        // Offsets of each class's block of support vectors.
        let mut start = Vec::with_capacity(self.n_support.len());
        let mut offset = 0;
        for &n in &self.n_support {
            start.push(offset);
            offset += n;
        }

        let n_classes = self.classes.len();
        let mut decisions = Vec::with_capacity(self.intercept.len());
        let mut p = 0;
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                let block = |class: usize, row: usize| -> F {
                    let range = start[class]..start[class] + self.n_support[class];
                    range
                        .map(|k| self.dual_coef[[row, k]] * kernel_values[k])
                        .sum()
                };
                decisions.push(block(i, j - 1) + block(j, i) + self.intercept[p]);
                p += 1;
            }
        }
        Ok(Array1::from(decisions))
    }

    /// Predicts a label by one-vs-one majority vote.
    pub fn predict(&self, features: ArrayView1<F>) -> Result<L, SvmError> {
        let decisions = self.decision_function(features)?;
        if decisions.iter().all(|d| d.is_nan()) {
            return Err(SvmError::InvalidDecision);
        }

        let n_classes = self.classes.len();
        let mut votes = vec![0usize; n_classes];
        let mut p = 0;
        for i in 0..n_classes {
            for j in (i + 1)..n_classes {
                if decisions[p] > F::zero() {
                    votes[i] += 1;
                } else {
                    votes[j] += 1;
                }
                p += 1;
            }
        }

        // First maximum wins ties.
        let mut best = 0;
        for (c, &v) in votes.iter().enumerate() {
            if v > votes[best] {
                best = c;
            }
        }
        Ok(self.classes[best].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// Three classes around (0,0), (4,0) and (0,4), one support vector each.
    fn three_class(kernel: Kernel<f64>) -> Svc<i64, f64> {
        Svc::new(
            vec![0, 1, 2],
            kernel,
            array![[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]],
            vec![1, 1, 1],
            // Row 0 holds the coefficient of each SV against the first other class,
            // row 1 against the second.
            array![[1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
            array![0.0, 0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_rbf_votes_for_nearest_class() {
        let svc = three_class(Kernel::Rbf { gamma: 0.5 });
        assert_eq!(svc.predict(array![0.2, 0.1].view()).unwrap(), 0);
        assert_eq!(svc.predict(array![3.8, 0.3].view()).unwrap(), 1);
        assert_eq!(svc.predict(array![0.1, 4.2].view()).unwrap(), 2);
        assert_eq!(svc.decision_function(array![0.0, 0.0].view()).unwrap().len(), 3);
    }

    #[test]
    fn test_decision_function_binary_linear() {
        // Two support vectors on either side of x0 = 1.
        let svc = Svc::new(
            vec!["left", "right"],
            Kernel::Linear,
            array![[0.0], [2.0]],
            vec![1, 1],
            array![[-0.5, 0.5]],
            array![-1.0],
        )
        .unwrap();
        // decision = -0.5 * 0 * x + 0.5 * 2 * x - 1 = x - 1, positive votes for "left"
        let d = svc.decision_function(array![3.0].view()).unwrap();
        assert_abs_diff_eq!(d[0], 2.0, epsilon = 1e-12);
        assert_eq!(svc.predict(array![3.0].view()).unwrap(), "left");
        assert_eq!(svc.predict(array![0.5].view()).unwrap(), "right");
    }

    #[test]
    fn test_vote_tie_goes_to_lowest_class() {
        // Cyclic votes: 0 beats 1, 1 beats 2, 2 beats 0.
        let svc = Svc::new(
            vec![0, 1, 2],
            Kernel::Linear,
            array![[0.0], [0.0], [0.0]],
            vec![1, 1, 1],
            Array2::zeros((2, 3)),
            array![1.0, -1.0, 1.0],
        )
        .unwrap();
        assert_eq!(svc.predict(array![1.0].view()).unwrap(), 0);
    }

    #[test]
    fn test_kernels() {
        let u = array![1.0, 2.0];
        let v = array![3.0, 4.0];
        assert_abs_diff_eq!(Kernel::Linear.evaluate(u.view(), v.view()), 11.0);
        assert_abs_diff_eq!(
            Kernel::Rbf { gamma: 0.1 }.evaluate(u.view(), v.view()),
            (-0.8_f64).exp(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            Kernel::Poly {
                gamma: 1.0,
                coef0: 1.0,
                degree: 2
            }
            .evaluate(u.view(), v.view()),
            144.0
        );
        assert_abs_diff_eq!(
            Kernel::Sigmoid {
                gamma: 0.0,
                coef0: 0.0
            }
            .evaluate(u.view(), v.view()),
            0.0
        );
    }

    #[test]
    fn test_shape_validation() {
        let counts = Svc::<i64, f64>::new(
            vec![0, 1],
            Kernel::Linear,
            array![[0.0], [1.0]],
            vec![1, 2],
            array![[1.0, -1.0]],
            array![0.0],
        );
        assert!(matches!(counts, Err(SvmError::SupportCounts { counted: 3, vectors: 2, .. })));

        let intercept = Svc::<i64, f64>::new(
            vec![0, 1],
            Kernel::Linear,
            array![[0.0], [1.0]],
            vec![1, 1],
            array![[1.0, -1.0]],
            array![0.0, 0.0],
        );
        assert_eq!(
            intercept,
            Err(SvmError::InterceptLength { expected: 1, found: 2 })
        );
    }
}
