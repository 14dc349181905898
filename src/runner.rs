use std::fmt::{Display, Formatter};

use tracing::debug;

use crate::bank::ModelBank;
use crate::error::RunError;
use crate::features::FeatureVector;
use crate::label::{ClassLabel, LEGEND};

/// One label per model, in the bank's report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    entries: Vec<(&'static str, ClassLabel)>,
}

impl PredictionResult {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ClassLabel)> {
        self.entries.iter().copied()
    }

    pub fn get(&self, model: &str) -> Option<ClassLabel> {
        self.entries
            .iter()
            .find(|(name, _)| *name == model)
            .map(|(_, label)| *label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `"<model>: <label>"`, one line per model.
impl Display for PredictionResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (name, label) in &self.entries {
            writeln!(f, "{}: {}", name, label)?;
        }
        Ok(())
    }
}

/// Runs every model in `bank` on `features`.
///
/// The pass stops at the first model that fails; labels from models that ran
/// before it are discarded.
pub fn run(bank: &ModelBank, features: &FeatureVector) -> Result<PredictionResult, RunError> {
    let mut entries = Vec::with_capacity(bank.len());
    for (model, predictor) in bank.for_each_model() {
        let label = predictor
            .predict(features.view())
            .map_err(|source| RunError { model, source })?;
        debug!(model, %label, "prediction");
        entries.push((model, label));
    }
    Ok(PredictionResult { entries })
}

/// The text block the front-ends show for a finished request.
pub fn render_report(result: &PredictionResult) -> String {
    let mut out = String::new();
    out.push_str(LEGEND);
    out.push('\n');
    out.push_str("Prediction Results:\n");
    for (name, label) in result.iter() {
        out.push_str(&format!("{} predicts: {}\n", name, label));
    }
    out
}
