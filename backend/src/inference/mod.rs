pub mod model;
pub mod preprocess;

use ndarray::Array4;
use shared::Label;

/// Scores at or above this value map to the positive label.
pub const DECISION_THRESHOLD: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("{0}")]
    Decode(#[from] image::ImageError),
    #[error("{0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("{0}")]
    Model(String),
    #[error("{0}")]
    InvalidOutput(String),
}

/// Anything that turns a `[1, H, W, 3]` batch into a probability.
pub trait Scorer: Send + Sync {
    fn score(&self, batch: &Array4<f32>) -> Result<f32, InferenceError>;
}

/// Maps a probability onto a label. `positive` wins on the boundary.
pub fn classify(probability: f32, positive: Label) -> Result<Label, InferenceError> {
    if !probability.is_finite() {
        return Err(InferenceError::InvalidOutput(format!(
            "score is not finite: {}",
            probability
        )));
    }

    if probability >= DECISION_THRESHOLD {
        Ok(positive)
    } else {
        Ok(positive.opposite())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_default_polarity() {
        assert_eq!(classify(0.93, Label::NoDamage).unwrap(), Label::NoDamage);
        assert_eq!(classify(0.5, Label::NoDamage).unwrap(), Label::NoDamage);
        assert_eq!(classify(0.4999, Label::NoDamage).unwrap(), Label::Damage);
        assert_eq!(classify(0.0, Label::NoDamage).unwrap(), Label::Damage);
    }

    #[test]
    fn test_classify_inverted_polarity() {
        assert_eq!(classify(0.5, Label::Damage).unwrap(), Label::Damage);
        assert_eq!(classify(0.1, Label::Damage).unwrap(), Label::NoDamage);
    }

    #[test]
    fn test_error_text_is_passed_through() {
        let err = InferenceError::Model("expected input with 4 dimensions".into());
        assert_eq!(err.to_string(), "expected input with 4 dimensions");
        let err = InferenceError::InvalidOutput("model returned an empty tensor".into());
        assert_eq!(err.to_string(), "model returned an empty tensor");
    }

    #[test]
    fn test_classify_rejects_nan() {
        assert!(matches!(
            classify(f32::NAN, Label::NoDamage),
            Err(InferenceError::InvalidOutput(_))
        ));
        assert!(classify(f32::INFINITY, Label::NoDamage).is_err());
    }
}
