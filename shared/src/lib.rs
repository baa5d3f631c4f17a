use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Binary outcome of the damage classifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Label {
    NoDamage,
    Damage,
}

impl Label {
    /// The other label of the pair.
    pub fn opposite(self) -> Self {
        match self {
            Label::NoDamage => Label::Damage,
            Label::Damage => Label::NoDamage,
        }
    }

    /// Class names in the order the model was trained with.
    pub fn classes() -> Vec<String> {
        Label::iter().map(|label| label.to_string()).collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PreprocessingSummary {
    pub resize: [u32; 2],
    pub scale: serde_json::Number,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SummaryResponse {
    pub model_name: String,
    pub test_auc: Option<f64>,
    pub input_size: [u32; 3],
    pub classes: Vec<String>,
    pub preprocessing: PreprocessingSummary,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InferenceResponse {
    pub prediction: Label,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
