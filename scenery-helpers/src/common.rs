use ndarray::{Array1, ArrayView1};
use crate::Float;
use std::fmt::{Display, Formatter};

/// A feature vector whose length does not match what a model was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthMismatch {
    pub expected: usize,
    pub found: usize,
}

impl Display for LengthMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected {} features, found {}",
            self.expected, self.found
        )
    }
}

impl std::error::Error for LengthMismatch {}

/// Checks that `features` has exactly `expected` entries.
pub fn check_len<F: Float>(features: ArrayView1<F>, expected: usize) -> Result<(), LengthMismatch> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(LengthMismatch { expected, found: features.len() })
    }
}

/// Index of the largest value. Ties resolve to the first occurrence and NaN
/// entries are never selected. Returns `None` for an empty or all-NaN input.
pub fn argmax<F: Float>(values: ArrayView1<F>) -> Option<usize> {
    let mut best: Option<(usize, F)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Numerically stable softmax.
pub fn softmax<F: Float>(scores: ArrayView1<F>) -> Array1<F> {
    let max = scores
        .iter()
        .cloned()
        .fold(F::neg_infinity(), |a, b| if b > a { b } else { a });
    let exp = scores.mapv(|s| (s - max).exp());
    let total = exp.sum();
    exp / total
}
