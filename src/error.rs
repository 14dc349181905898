use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::model::ModelKind;

/// Failures turning a user-supplied file or buffer into a decoded image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    Empty,

    #[error("Unsupported image format (expected JPEG or PNG)")]
    UnsupportedFormat,

    #[error("Unsupported file type: {} (expected .jpg, .jpeg or .png)", .0.display())]
    UnsupportedExtension(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Failures reading one serialized model.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("File not found")]
    NotFound,

    #[error(transparent)]
    Io(std::io::Error),

    #[error("Invalid JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid bincode model: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Unknown model file extension {0:?} (expected json, bin or bincode)")]
    UnknownFormat(String),

    #[error("Malformed model: {0}")]
    Malformed(String),
}

impl From<std::io::Error> for ArtifactError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound
        } else {
            ArtifactError::Io(e)
        }
    }
}

/// Reasons the model bank could not be built. Any of these leaves the
/// application without models.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("Failed to load {kind} model from {}: {source}", path.display())]
    Artifact {
        kind: ModelKind,
        path: PathBuf,
        source: ArtifactError,
    },

    #[error("No {0} model was supplied")]
    MissingModel(ModelKind),

    #[error("More than one {0} model was supplied")]
    DuplicateModel(ModelKind),
}

/// A single model failing to produce a label.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Svm(#[from] svm::SvmError),

    #[error(transparent)]
    LogisticRegression(#[from] logistic_regression::LogisticRegressionError),

    #[error(transparent)]
    DecisionTree(#[from] decision_tree::TreeError),

    #[error(transparent)]
    RandomForest(#[from] random_forest::ForestError),
}

/// The prediction pass stopped at `model`.
#[derive(Debug, Error)]
#[error("{model} failed: {source}")]
pub struct RunError {
    pub model: &'static str,
    pub source: PredictError,
}

/// Everything that can end one classification request.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Models not loaded: {0}")]
    ModelsUnavailable(#[source] Arc<BankError>),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Prediction(#[from] RunError),
}

impl ClassifyError {
    /// Text a front-end shows in its error dialog or banner.
    pub fn user_message(&self) -> String {
        match self {
            ClassifyError::ModelsUnavailable(_) => self.to_string(),
            _ => format!("Error processing image:\n{}", self),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
