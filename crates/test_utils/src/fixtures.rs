//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the scoring service: the reference
//! claim, the shipped pipeline and model artifacts, and an on-disk artifact
//! workspace backed by a temporary directory.

use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use core_kernel::{ArtifactRoot, ColumnData, Frame};
use domain_claims::Claim;

/// Fixture for claim test data
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// The reference claim used across the suite
    pub fn ford() -> Claim {
        Claim {
            claim_id: 1,
            marca_vehiculo: "ford".to_string(),
            antiguedad_vehiculo: 5,
            tipo_poliza: 2,
            taller: 1,
            partes_a_reparar: 3,
            partes_a_reemplazar: 1,
        }
    }

    /// The reference claim under the excluded policy type
    pub fn excluded() -> Claim {
        Claim {
            tipo_poliza: 4,
            ..Self::ford()
        }
    }

    /// A brand the encoding step does not know
    pub fn unknown_brand() -> Claim {
        Claim {
            claim_id: 2,
            marca_vehiculo: "lada".to_string(),
            ..Self::ford()
        }
    }

    /// JSON body of the reference predict request
    pub fn ford_json() -> serde_json::Value {
        serde_json::json!({
            "claim_id": 1,
            "marca_vehiculo": "ford",
            "antiguedad_vehiculo": 5,
            "tipo_poliza": 2,
            "taller": 1,
            "partes_a_reparar": 3,
            "partes_a_reemplazar": 1
        })
    }
}

/// Fixture for the shipped artifacts
pub struct ArtifactFixtures;

impl ArtifactFixtures {
    pub const TOTAL_PIEZAS: &'static str = include_str!("../../../artifacts/pipelines/01_total_piezas.json");
    pub const MARCA_VEHICULO: &'static str = include_str!("../../../artifacts/pipelines/02_marca_vehiculo.json");
    pub const VALOR_VEHICULO: &'static str = include_str!("../../../artifacts/pipelines/03_valor_vehiculo.json");
    pub const IMPUTATION: &'static str = include_str!("../../../artifacts/imputation.json");
    pub const MODEL: &'static str = include_str!("../../../artifacts/model.json");

    pub const IMPUTATION_PATH: &'static str = "artifacts/imputation.json";
    pub const MODEL_PATH: &'static str = "artifacts/model.json";
    pub const RETRAINED_MODEL_PATH: &'static str = "artifacts/model_retrained.json";

    /// `(name, relative path)` of the configured steps, in order
    pub const STEPS: [(&'static str, &'static str); 3] = [
        ("total_piezas", "artifacts/pipelines/01_total_piezas.json"),
        ("marca_vehiculo", "artifacts/pipelines/02_marca_vehiculo.json"),
        ("valor_vehiculo", "artifacts/pipelines/03_valor_vehiculo.json"),
    ];

    /// Feature columns of the shipped model, in model order
    pub const MODEL_FEATURES: [&'static str; 5] = [
        "log_total_piezas",
        "marca_vehiculo_encoded",
        "valor_vehiculo",
        "valor_por_pieza",
        "antiguedad_vehiculo",
    ];

    /// Training target column of [`TRAINING_CSV`]
    pub const TARGET_COLUMN: &'static str = "reclamo_complejo";
}

/// One row of the training set: features in model order, then the target
fn training_rows() -> impl Iterator<Item = ([f64; 5], i64)> {
    (0..200i64).map(|i| {
        let antiguedad = i % 15;
        let encoded = i % 10;
        let partes = 1 + i % 7;
        let valor = (30_000 - antiguedad * 1_500).max(3_000);
        let log_total = (((1 + partes) as f64).ln() * 1e6).round() / 1e6;
        (
            [log_total, encoded as f64, valor as f64, (valor / partes) as f64, antiguedad as f64],
            i64::from(partes >= 4),
        )
    })
}

/// Linearly separable training set over the model features, as CSV
///
/// The target is 1 exactly when the claim involves four or more parts.
pub static TRAINING_CSV: Lazy<String> = Lazy::new(|| {
    let mut csv = ArtifactFixtures::MODEL_FEATURES.join(",");
    csv.push(',');
    csv.push_str(ArtifactFixtures::TARGET_COLUMN);
    csv.push('\n');
    for (features, target) in training_rows() {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            features[0], features[1] as i64, features[2] as i64, features[3] as i64, features[4] as i64, target
        ));
    }
    csv
});

/// The rows of [`TRAINING_CSV`] as a frame
pub fn training_frame() -> Frame {
    let (features, targets): (Vec<[f64; 5]>, Vec<i64>) = training_rows().unzip();
    let mut columns: Vec<(&str, ColumnData)> = vec![(
        ArtifactFixtures::MODEL_FEATURES[0],
        ColumnData::Float(features.iter().map(|f| Some(f[0])).collect()),
    )];
    for (j, name) in ArtifactFixtures::MODEL_FEATURES.iter().enumerate().skip(1) {
        columns.push((*name, ColumnData::Int(features.iter().map(|f| Some(f[j] as i64)).collect())));
    }
    columns.push((ArtifactFixtures::TARGET_COLUMN, ColumnData::Int(targets.into_iter().map(Some).collect())));
    Frame::from_columns(columns).expect("Training columns share a row count")
}

/// Temporary directory laid out like a deployment's artifact root
pub struct ArtifactWorkspace {
    dir: TempDir,
}

impl ArtifactWorkspace {
    /// Workspace holding every shipped artifact
    pub fn standard() -> Self {
        let workspace = Self::empty();
        for ((_, path), contents) in ArtifactFixtures::STEPS.iter().zip([
            ArtifactFixtures::TOTAL_PIEZAS,
            ArtifactFixtures::MARCA_VEHICULO,
            ArtifactFixtures::VALOR_VEHICULO,
        ]) {
            workspace.write(path, contents);
        }
        workspace.write(ArtifactFixtures::IMPUTATION_PATH, ArtifactFixtures::IMPUTATION);
        workspace.write(ArtifactFixtures::MODEL_PATH, ArtifactFixtures::MODEL);
        workspace
    }

    /// Workspace with no files
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> ArtifactRoot {
        ArtifactRoot::new(self.dir.path())
    }

    /// Absolute path of a workspace-relative file
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes a file, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.resolve(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create artifact dir");
        }
        fs::write(&path, contents).expect("Failed to write artifact");
        path
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.resolve(relative)).expect("Failed to remove artifact");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.resolve(relative)).expect("Failed to read artifact")
    }
}
