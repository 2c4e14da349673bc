//! API configuration
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. the TOML file at `$CONFIG_PATH` (default `config/settings.toml`), if present
//! 3. environment variables prefixed `CLAIMS`, sections separated by `__`,
//!    e.g. `CLAIMS__API__PORT=9000`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use core_kernel::ArtifactRoot;
use domain_model::TrainingSettings;
use domain_pipeline::{PipelineConfig, StepDescriptor};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config/settings.toml";

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiSettings {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// OpenAPI document served at `/openapi`
    #[serde(default)]
    pub doc: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            doc: Some("docs/openapi.yaml".to_string()),
        }
    }
}

/// Diagnostic and prediction log settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggerSettings {
    /// Rolling JSON diagnostic log; console only when unset
    #[serde(default)]
    pub log_file: Option<String>,
    #[validate(length(min = 1))]
    pub level: String,
    /// Rotated diagnostic files kept on disk
    #[validate(range(min = 1))]
    pub max_files: usize,
    /// Prediction log
    #[validate(length(min = 1))]
    pub csv_file: String,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            log_file: Some("logs/api.log".to_string()),
            level: "info".to_string(),
            max_files: 5,
            csv_file: "logs/predictions.csv".to_string(),
        }
    }
}

/// Root that relative artifact paths resolve against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    pub root: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModelSettings {
    #[validate(length(min = 1))]
    pub model_path: String,
    #[validate(length(min = 1))]
    pub retrained_model_path: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_path: "artifacts/model.json".to_string(),
            retrained_model_path: "artifacts/model_retrained.json".to_string(),
        }
    }
}

/// Complete service settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub api: ApiSettings,
    #[validate(nested)]
    pub logger: LoggerSettings,
    pub paths: PathSettings,
    #[validate(nested)]
    pub models: ModelSettings,
    pub pipeline: PipelineConfig,
    pub train: TrainingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            logger: LoggerSettings::default(),
            paths: PathSettings::default(),
            models: ModelSettings::default(),
            pipeline: PipelineConfig {
                steps: vec![
                    StepDescriptor::new("total_piezas", "artifacts/pipelines/01_total_piezas.json"),
                    StepDescriptor::new("marca_vehiculo", "artifacts/pipelines/02_marca_vehiculo.json"),
                    StepDescriptor::new("valor_vehiculo", "artifacts/pipelines/03_valor_vehiculo.json"),
                ],
                imputation_path: "artifacts/imputation.json".to_string(),
            },
            train: TrainingSettings {
                features: [
                    "log_total_piezas",
                    "marca_vehiculo_encoded",
                    "valor_vehiculo",
                    "valor_por_pieza",
                    "antiguedad_vehiculo",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
                target_column: "reclamo_complejo".to_string(),
                test_size: 0.2,
                random_state: 42,
                apply_pipeline: false,
            },
        }
    }
}

impl Settings {
    /// Loads settings from `$CONFIG_PATH` and the environment
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Loads settings from a specific file and the environment
    pub fn load_from(path: &str) -> Result<Self, SettingsError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings: Settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("CLAIMS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn artifact_root(&self) -> ArtifactRoot {
        ArtifactRoot::new(&self.paths.root)
    }

    /// Diagnostic log file under `paths.root`, if one is configured
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.logger.log_file.as_deref().map(|f| self.artifact_root().resolve(f))
    }

    /// Prediction log file under `paths.root`
    pub fn prediction_log_path(&self) -> PathBuf {
        self.artifact_root().resolve(&self.logger.csv_file)
    }
}
