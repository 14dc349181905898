use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use tracing::{info, warn};

use crate::bank::ModelBank;
use crate::config::Config;
use crate::error::{BankError, ClassifyError};
use crate::features::extract;
use crate::runner::{PredictionResult, run};
use crate::upload::{decode_image, open_image};

/// The request path shared by the front-ends.
///
/// Holds the outcome of loading the model bank at startup. When loading
/// failed every request is refused with the load error and no model is
/// ever asked for a prediction.
#[derive(Debug)]
pub struct Pipeline {
    bank: Result<ModelBank, Arc<BankError>>,
}

impl Pipeline {
    pub fn new(bank: Result<ModelBank, BankError>) -> Self {
        Self {
            bank: bank.map_err(Arc::new),
        }
    }

    /// Loads the bank described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let bank = ModelBank::load(&config.bank);
        match &bank {
            Ok(bank) => info!(models = bank.len(), "model bank ready"),
            Err(e) => warn!(error = %e, "model bank unavailable, predictions are disabled"),
        }
        Self::new(bank)
    }

    pub fn is_available(&self) -> bool {
        self.bank.is_ok()
    }

    pub fn bank(&self) -> Result<&ModelBank, ClassifyError> {
        self.bank
            .as_ref()
            .map_err(|e| ClassifyError::ModelsUnavailable(Arc::clone(e)))
    }

    /// Classifies an already decoded image.
    pub fn classify_image(&self, image: &DynamicImage) -> Result<PredictionResult, ClassifyError> {
        let bank = self.bank()?;
        let features = extract(image);
        let result = run(bank, &features)?;
        info!(
            width = image.width(),
            height = image.height(),
            "classified image"
        );
        Ok(result)
    }

    /// Classifies the contents of an uploaded file.
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<PredictionResult, ClassifyError> {
        self.bank()?;
        let image = decode_image(bytes).inspect_err(|e| warn!(error = %e, "rejected upload"))?;
        self.classify_image(&image)
    }

    /// Classifies the image file at `path`.
    pub fn classify_path(&self, path: &Path) -> Result<PredictionResult, ClassifyError> {
        self.bank()?;
        let image = open_image(path)
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "rejected image file"))?;
        self.classify_image(&image)
    }
}
