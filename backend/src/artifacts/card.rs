use serde_json::Value;
use std::path::Path;

const UNKNOWN_MODEL: &str = "Unknown";

/// Descriptive metadata produced alongside the model. Purely informational.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCard {
    pub model_name: String,
    pub test_auc: Option<f64>,
}

impl Default for ModelCard {
    fn default() -> Self {
        Self {
            model_name: UNKNOWN_MODEL.to_string(),
            test_auc: None,
        }
    }
}

impl From<&Value> for ModelCard {
    /// Each field falls back on its own, so one bad entry keeps the rest.
    fn from(card: &Value) -> Self {
        let model_name = card.get("best_model_name").and_then(Value::as_str);
        let test_auc = card.get("test_auc").and_then(Value::as_f64);

        for (key, present, parsed) in [
            ("best_model_name", card.get("best_model_name"), model_name.is_some()),
            ("test_auc", card.get("test_auc"), test_auc.is_some()),
        ] {
            if let Some(value) = present.filter(|v| !v.is_null() && !parsed) {
                log::warn!("Ignoring model card field `{}`: {}", key, value);
            }
        }

        Self {
            model_name: model_name.unwrap_or(UNKNOWN_MODEL).to_string(),
            test_auc,
        }
    }
}

impl ModelCard {
    /// Reads the card at `path`. Absent or unreadable cards yield the default.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.is_file() {
            log::info!(
                "No model card at {}, using default metadata",
                path.display()
            );
            return Self::default();
        }

        let contents = match super::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Ignoring model card: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(card) => ModelCard::from(&card),
            Err(e) => {
                log::warn!("Ignoring malformed model card at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
