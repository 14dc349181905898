use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::ModelKind;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "scenery.toml";

/// Application settings, read from TOML. Every field has a default so an
/// empty or partial file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bank: BankConfig,
}

/// Where the four model artifacts live.
///
/// Relative artifact paths are resolved against `model_dir`; absolute ones are
/// used as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    pub model_dir: PathBuf,
    pub svm: PathBuf,
    pub decision_tree: PathBuf,
    pub logistic_regression: PathBuf,
    pub random_forest: PathBuf,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl BankConfig {
    /// Default artifact names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: dir.into(),
            svm: ModelKind::Svm.default_artifact().into(),
            decision_tree: ModelKind::DecisionTree.default_artifact().into(),
            logistic_regression: ModelKind::LogisticRegression.default_artifact().into(),
            random_forest: ModelKind::RandomForest.default_artifact().into(),
        }
    }

    pub fn artifact(&self, kind: ModelKind) -> &Path {
        match kind {
            ModelKind::Svm => &self.svm,
            ModelKind::DecisionTree => &self.decision_tree,
            ModelKind::LogisticRegression => &self.logistic_regression,
            ModelKind::RandomForest => &self.random_forest,
        }
    }

    pub fn artifact_path(&self, kind: ModelKind) -> PathBuf {
        self.model_dir.join(self.artifact(kind))
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Reads `path` if given. Otherwise reads [`DEFAULT_CONFIG_FILE`] when it
    /// exists and falls back to defaults when it does not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }
}
