use std::fmt::{Debug, Formatter};

use tracing::{error, info};

use crate::config::BankConfig;
use crate::error::BankError;
use crate::model::{Classifier, Model, ModelKind};

/// The set of trained models every request is run through.
///
/// A bank always holds exactly one model per [`ModelKind`], stored in
/// [`ModelKind::ALL`] order. It is never modified after construction and can be
/// shared between threads by reference.
pub struct ModelBank {
    models: Vec<(ModelKind, Box<dyn Model>)>,
}

impl ModelBank {
    /// Loads every artifact named by `config`.
    ///
    /// Loading is all-or-nothing: the first artifact that is missing, unreadable
    /// or malformed fails the whole bank.
    pub fn load(config: &BankConfig) -> Result<Self, BankError> {
        let mut models: Vec<(ModelKind, Box<dyn Model>)> = Vec::with_capacity(ModelKind::ALL.len());
        for kind in ModelKind::ALL {
            let path = config.artifact_path(kind);
            match Classifier::load(kind, &path) {
                Ok(model) => {
                    info!(model = kind.name(), path = %path.display(), "loaded model");
                    models.push((kind, Box::new(model)));
                }
                Err(source) => {
                    error!(model = kind.name(), path = %path.display(), %source, "failed to load model");
                    return Err(BankError::Artifact { kind, path, source });
                }
            }
        }
        Ok(Self { models })
    }

    /// Builds a bank from already constructed models, in any order.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateModel` if a kind appears twice and
    /// `BankError::MissingModel` for the first kind that is absent.
    pub fn from_models<I>(models: I) -> Result<Self, BankError>
    where
        I: IntoIterator<Item = (ModelKind, Box<dyn Model>)>,
    {
        let mut slots: [Option<Box<dyn Model>>; 4] = Default::default();
        for (kind, model) in models {
            let slot = &mut slots[kind as usize];
            if slot.is_some() {
                return Err(BankError::DuplicateModel(kind));
            }
            *slot = Some(model);
        }

        let mut ordered = Vec::with_capacity(slots.len());
        for (kind, slot) in ModelKind::ALL.into_iter().zip(slots) {
            let model = slot.ok_or(BankError::MissingModel(kind))?;
            ordered.push((kind, model));
        }
        Ok(Self { models: ordered })
    }

    /// Every model with its display name, in report order.
    pub fn for_each_model(&self) -> impl Iterator<Item = (&'static str, &dyn Model)> {
        self.models
            .iter()
            .map(|(kind, model)| (kind.name(), &**model))
    }

    pub fn kinds(&self) -> impl Iterator<Item = ModelKind> {
        self.models.iter().map(|(kind, _)| *kind)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Debug for ModelBank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
