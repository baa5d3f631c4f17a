use shared::Label;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const MODEL_FILE: &str = "best_model.pt";
const KERAS_MODEL_FILE: &str = "best_model.keras";
const PREP_FILE: &str = "preprocessing.json";
const CARD_FILE: &str = "model_card.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub model_path: PathBuf,
    pub prep_path: PathBuf,
    pub card_path: PathBuf,
    pub bind_address: String,
    /// Label assigned when the model score is at or above the threshold.
    pub positive_label: Label,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&executable_dir(), |key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, resolving default artifact paths
    /// under `<base_dir>/artifacts`.
    pub fn from_lookup<F>(base_dir: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let artifacts_dir = var("ARTIFACTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("artifacts"));
        let artifact = |key: &str, file: &str| {
            var(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| artifacts_dir.join(file))
        };

        let bind_address = match var("BIND_ADDRESS") {
            Some(address) => address,
            None => {
                let port = match var("PORT") {
                    Some(port) => port.trim().parse::<u16>().map_err(|_| {
                        ConfigError::InvalidValue {
                            name: "PORT",
                            value: port.clone(),
                        }
                    })?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{}", port)
            }
        };

        let positive_label = match var("POSITIVE_LABEL") {
            Some(value) => Label::from_str(value.trim()).map_err(|_| ConfigError::InvalidValue {
                name: "POSITIVE_LABEL",
                value: value.clone(),
            })?,
            None => Label::NoDamage,
        };

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    name: "MAX_UPLOAD_BYTES",
                    value: value.clone(),
                })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            model_path: artifact("MODEL_PATH", MODEL_FILE),
            prep_path: artifact("PREP_PATH", PREP_FILE),
            card_path: artifact("CARD_PATH", CARD_FILE),
            bind_address,
            positive_label,
            max_upload_bytes,
        })
    }
}

/// Startup hint for a missing default model file. Earlier deployments shipped
/// `best_model.keras`, which libtorch cannot read.
pub fn missing_model_hint(model_path: &Path) -> Option<String> {
    if model_path.is_file() || model_path.file_name() != Some(OsStr::new(MODEL_FILE)) {
        return None;
    }

    let keras_path = model_path.with_file_name(KERAS_MODEL_FILE);
    let found = if keras_path.is_file() {
        format!(" Found {}, but Keras models cannot be loaded.", keras_path.display())
    } else {
        String::new()
    };
    Some(format!(
        "Expected a TorchScript export at {} (replaces {}).{} Export the model to TorchScript or set MODEL_PATH.",
        model_path.display(),
        KERAS_MODEL_FILE,
        found
    ))
}

fn executable_dir() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        Err(e) => {
            log::warn!(
                "Could not resolve executable location ({}), using working directory",
                e
            );
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}
