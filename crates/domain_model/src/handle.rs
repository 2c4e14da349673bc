//! Shared serving model
//!
//! The handle loads the model on first use and hands out `Arc` clones.
//! Retraining swaps in a new `Arc`; requests already holding the old one
//! finish on it. The lock is held only to clone or replace the pointer, never
//! across a load or a prediction.

use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::error::ModelError;
use crate::loader::ModelLoader;

pub struct ModelHandle {
    loader: ModelLoader,
    current: RwLock<Option<Arc<dyn Classifier>>>,
}

impl ModelHandle {
    /// Creates an empty handle; nothing is read until first use
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            loader,
            current: RwLock::new(None),
        }
    }

    /// Creates a handle already holding `model`
    pub fn with_model(loader: ModelLoader, model: Arc<dyn Classifier>) -> Self {
        Self {
            loader,
            current: RwLock::new(Some(model)),
        }
    }

    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    /// The model currently served, if one has been loaded
    pub fn current(&self) -> Option<Arc<dyn Classifier>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the served model, loading it on first use
    ///
    /// A failed load leaves the handle empty so the next call retries.
    pub fn get_or_load(&self) -> Result<Arc<dyn Classifier>, ModelError> {
        if let Some(model) = self.current() {
            return Ok(model);
        }

        debug!(path = %self.loader.path().display(), "Model not loaded yet");
        let loaded = self.loader.load()?;

        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // a concurrent load or swap may have won
        Ok(slot.get_or_insert(loaded).clone())
    }

    /// Replaces the served model, returning the previous one
    pub fn swap(&self, model: Arc<dyn Classifier>) -> Option<Arc<dyn Classifier>> {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(model);
        info!(replaced = previous.is_some(), "Serving model swapped");
        previous
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("loader", &self.loader)
            .field("loaded", &self.current().is_some())
            .finish()
    }
}
