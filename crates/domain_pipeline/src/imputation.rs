//! Null imputation
//!
//! The imputation dictionary maps column names to the default value used to
//! fill that column's missing cells. It is a flat JSON object of scalars:
//!
//! ```json
//! { "marca_vehiculo_encoded": 0, "valor_vehiculo": 18000, "log_total_piezas": 0.0 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use core_kernel::{read_json, ArtifactError, Frame, FrameError, Scalar};

/// Column → default value mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImputationDictionary(BTreeMap<String, Scalar>);

impl ImputationDictionary {
    /// Loads the dictionary from a JSON file
    ///
    /// # Errors
    ///
    /// `NotFound` if the file is absent; `Deserialization` if the document
    /// is not an object of scalars.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let dictionary: Self = read_json(path)?;
        debug!(path = %path.display(), entries = dictionary.len(), "Loaded imputation dictionary");
        Ok(dictionary)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Scalar>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Scalar)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for ImputationDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Fills missing cells using the dictionary
///
/// Dictionary columns that the frame does not hold are skipped and reported
/// in a warning. Columns absent from the dictionary are untouched.
pub fn impute(mut frame: Frame, dictionary: &ImputationDictionary) -> Result<Frame, FrameError> {
    let mut skipped = Vec::new();

    for (column, value) in dictionary.iter() {
        if !frame.fill_missing(column, value)? {
            skipped.push(column.as_str());
        }
    }

    if !skipped.is_empty() {
        warn!(columns = ?skipped, "Imputation dictionary names columns missing from the record set");
    }

    Ok(frame)
}
