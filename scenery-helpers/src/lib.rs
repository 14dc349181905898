//! Numeric plumbing shared by the model crates.

use ndarray::{NdFloat, ScalarOperand};

use num_traits::FromPrimitive;

use std::iter::Sum;

mod common;

pub use common::{LengthMismatch, argmax, check_len, softmax};

/// Element type every model is generic over.
pub trait Float: NdFloat + FromPrimitive + Default + Sum + ScalarOperand + Unpin {}

impl Float for f32 {}

impl Float for f64 {}
