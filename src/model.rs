use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use decision_tree::DecisionTree;
use logistic_regression::LogisticRegression;
use ndarray::ArrayView1;
use random_forest::RandomForest;
use serde::Serialize;
use serde::de::DeserializeOwned;
use svm::Svc;

use crate::error::{ArtifactError, PredictError};
use crate::features::FEATURE_LEN;
use crate::label::ClassLabel;

/// Anything that maps one feature vector to a class label.
///
/// The bank only needs this capability, so tests can stand in simple fakes
/// for the trained models.
pub trait Model: Send + Sync {
    fn predict(&self, features: ArrayView1<f64>) -> Result<ClassLabel, PredictError>;
}

/// The four model slots, in the order results are always reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelKind {
    Svm,
    DecisionTree,
    LogisticRegression,
    RandomForest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Svm,
        ModelKind::DecisionTree,
        ModelKind::LogisticRegression,
        ModelKind::RandomForest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Svm => "SVM",
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::RandomForest => "Random Forest",
        }
    }

    /// File name the artifact is looked up under when not configured otherwise.
    pub fn default_artifact(self) -> &'static str {
        match self {
            ModelKind::Svm => "svm.json",
            ModelKind::DecisionTree => "tree.json",
            ModelKind::LogisticRegression => "logistic.json",
            ModelKind::RandomForest => "rf.json",
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk encoding of a model artifact, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(ArtifactFormat::Json),
            "bin" | "bincode" => Ok(ArtifactFormat::Bincode),
            _ => Err(ArtifactError::UnknownFormat(ext)),
        }
    }

    fn decode<T: DeserializeOwned, R: Read>(self, reader: R) -> Result<T, ArtifactError> {
        Ok(match self {
            ArtifactFormat::Json => serde_json::from_reader(reader)?,
            ArtifactFormat::Bincode => bincode::deserialize_from(reader)?,
        })
    }

    fn encode<T: Serialize, W: Write>(self, value: &T, writer: W) -> Result<(), ArtifactError> {
        match self {
            ArtifactFormat::Json => serde_json::to_writer(writer, value)?,
            ArtifactFormat::Bincode => bincode::serialize_into(writer, value)?,
        }
        Ok(())
    }
}

/// One trained model of any of the four supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Classifier {
    Svm(Svc<i64, f64>),
    DecisionTree(DecisionTree<i64, f64>),
    LogisticRegression(LogisticRegression<i64, f64>),
    RandomForest(RandomForest<i64, f64>),
}

impl Classifier {
    pub fn kind(&self) -> ModelKind {
        match self {
            Classifier::Svm(_) => ModelKind::Svm,
            Classifier::DecisionTree(_) => ModelKind::DecisionTree,
            Classifier::LogisticRegression(_) => ModelKind::LogisticRegression,
            Classifier::RandomForest(_) => ModelKind::RandomForest,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Classifier::Svm(m) => m.n_features(),
            Classifier::DecisionTree(m) => m.n_features(),
            Classifier::LogisticRegression(m) => m.n_features(),
            Classifier::RandomForest(m) => m.n_features(),
        }
    }

    pub fn validate(&self) -> Result<(), PredictError> {
        match self {
            Classifier::Svm(m) => m.validate()?,
            Classifier::DecisionTree(m) => m.validate()?,
            Classifier::LogisticRegression(m) => m.validate()?,
            Classifier::RandomForest(m) => m.validate()?,
        }
        Ok(())
    }

    /// Reads a `kind` model encoded as `format` and checks its structure.
    pub fn from_reader<R: Read>(
        kind: ModelKind,
        format: ArtifactFormat,
        reader: R,
    ) -> Result<Self, ArtifactError> {
        let model = match kind {
            ModelKind::Svm => Classifier::Svm(format.decode(reader)?),
            ModelKind::DecisionTree => Classifier::DecisionTree(format.decode(reader)?),
            ModelKind::LogisticRegression => Classifier::LogisticRegression(format.decode(reader)?),
            ModelKind::RandomForest => Classifier::RandomForest(format.decode(reader)?),
        };
        model
            .validate()
            .map_err(|e| ArtifactError::Malformed(e.to_string()))?;
        Ok(model)
    }

    pub fn load(kind: ModelKind, path: &Path) -> Result<Self, ArtifactError> {
        let format = ArtifactFormat::from_path(path)?;
        let file = File::open(path)?;
        let model = Self::from_reader(kind, format, BufReader::new(file))?;
        if model.n_features() != FEATURE_LEN {
            tracing::warn!(
                model = kind.name(),
                n_features = model.n_features(),
                "model does not take {} features; predictions will fail",
                FEATURE_LEN
            );
        }
        Ok(model)
    }

    pub fn to_writer<W: Write>(&self, format: ArtifactFormat, writer: W) -> Result<(), ArtifactError> {
        match self {
            Classifier::Svm(m) => format.encode(m, writer),
            Classifier::DecisionTree(m) => format.encode(m, writer),
            Classifier::LogisticRegression(m) => format.encode(m, writer),
            Classifier::RandomForest(m) => format.encode(m, writer),
        }
    }

    /// Writes the model to `path`, encoded according to its extension.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let format = ArtifactFormat::from_path(path)?;
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(format, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl Model for Classifier {
    fn predict(&self, features: ArrayView1<f64>) -> Result<ClassLabel, PredictError> {
        let label = match self {
            Classifier::Svm(m) => m.predict(features)?,
            Classifier::DecisionTree(m) => m.predict(features)?,
            Classifier::LogisticRegression(m) => m.predict(features)?,
            Classifier::RandomForest(m) => m.predict(features)?,
        };
        Ok(ClassLabel(label))
    }
}
