//! Scene classification with four classical models.
//!
//! An uploaded image is reduced to a 64x64 grayscale [`FeatureVector`] and run
//! through every model in a [`ModelBank`] (SVM, decision tree, logistic
//! regression, random forest). The [`Pipeline`] ties these together for the
//! front-ends and turns every failure into a [`ClassifyError`].

pub mod bank;
pub mod config;
pub mod error;
pub mod features;
pub mod label;
pub mod model;
pub mod pipeline;
pub mod runner;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use bank::ModelBank;
pub use config::{BankConfig, Config};
pub use error::{
    ArtifactError, BankError, ClassifyError, ConfigError, ImageError, PredictError, RunError,
};
pub use features::{FEATURE_LEN, FeatureVector, IMAGE_SIDE, extract};
pub use label::{ClassLabel, LEGEND, Scene};
pub use model::{ArtifactFormat, Classifier, Model, ModelKind};
pub use pipeline::Pipeline;
pub use runner::{PredictionResult, render_report, run};
pub use upload::{SUPPORTED_EXTENSIONS, decode_image, is_supported_path, open_image};
