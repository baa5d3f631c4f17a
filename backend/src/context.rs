use std::sync::Arc;

use shared::{Label, PreprocessingSummary, SummaryResponse};

use crate::artifacts::card::ModelCard;
use crate::artifacts::preprocessing::PreprocessingConfig;
use crate::artifacts::{self, ArtifactError};
use crate::config::{ServiceConfig, missing_model_hint};
use crate::inference::model::TorchModel;
use crate::inference::{self, InferenceError, Scorer, preprocess};

/// Everything a request handler needs, built once at startup and never mutated.
pub struct ServiceContext {
    pub preprocessing: PreprocessingConfig,
    pub card: ModelCard,
    pub positive_label: Label,
    pub max_upload_bytes: usize,
    scorer: Arc<dyn Scorer>,
}

impl ServiceContext {
    pub fn new(
        preprocessing: PreprocessingConfig,
        card: ModelCard,
        positive_label: Label,
        max_upload_bytes: usize,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self {
            preprocessing,
            card,
            positive_label,
            max_upload_bytes,
            scorer,
        }
    }

    /// Validates and loads every artifact named by `config`.
    pub fn load(config: &ServiceConfig) -> Result<Self, ArtifactError> {
        log::info!(
            "Model path: {} (present: {})",
            config.model_path.display(),
            config.model_path.is_file()
        );
        log::info!(
            "Preprocessing path: {} (present: {})",
            config.prep_path.display(),
            config.prep_path.is_file()
        );
        log::info!(
            "Model card path: {} (present: {})",
            config.card_path.display(),
            config.card_path.is_file()
        );

        if let Some(hint) = missing_model_hint(&config.model_path) {
            log::warn!("{}", hint);
        }
        artifacts::require_file("model", &config.model_path)?;
        artifacts::require_file("preprocessing config", &config.prep_path)?;

        let preprocessing = PreprocessingConfig::load(&config.prep_path)?;
        let card = ModelCard::load_or_default(&config.card_path);

        log::info!("Loading model from: {}", config.model_path.display());
        let model = TorchModel::load(&config.model_path)?;

        log::info!("Loaded model: {}", card.model_name);
        match card.test_auc {
            Some(auc) => log::info!("Test AUC: {}", auc),
            None => log::info!("Test AUC: N/A"),
        }
        log::info!(
            "Input size: {}x{}, Scale: {}, positive label: {}",
            preprocessing.width,
            preprocessing.height,
            preprocessing.scale,
            config.positive_label
        );

        Ok(Self::new(
            preprocessing,
            card,
            config.positive_label,
            config.max_upload_bytes,
            Arc::new(model),
        ))
    }

    pub fn summary(&self) -> SummaryResponse {
        let PreprocessingConfig {
            width,
            height,
            ref scale,
        } = self.preprocessing;

        SummaryResponse {
            model_name: self.card.model_name.clone(),
            test_auc: self.card.test_auc,
            input_size: [width, height, 3],
            classes: Label::classes(),
            preprocessing: PreprocessingSummary {
                resize: [width, height],
                scale: scale.clone(),
            },
        }
    }

    /// Normalizes `image` and scores it. Blocking.
    pub fn predict(&self, image: &[u8]) -> Result<Label, InferenceError> {
        let batch = preprocess::to_batch(image, &self.preprocessing)?;
        let probability = self.scorer.score(&batch)?;
        log::debug!("Model score: {}", probability);
        inference::classify(probability, self.positive_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
    use crate::inference::preprocess::tests::png_bytes;
    use crate::inference::testing::StubScorer;
    use image::{DynamicImage, Rgb, RgbImage};
    use serde_json::Number;
    use std::path::Path;

    fn context(probability: f32) -> (ServiceContext, Arc<StubScorer>) {
        let scorer = Arc::new(StubScorer::new(probability));
        let context = ServiceContext::new(
            PreprocessingConfig {
                width: 8,
                height: 5,
                scale: Number::from_f64(0.25).unwrap(),
            },
            ModelCard::default(),
            Label::NoDamage,
            DEFAULT_MAX_UPLOAD_BYTES,
            scorer.clone(),
        );
        (context, scorer)
    }

    #[test]
    fn test_summary_reflects_preprocessing() {
        let (context, _) = context(0.9);
        let summary = context.summary();
        assert_eq!(summary.model_name, "Unknown");
        assert_eq!(summary.test_auc, None);
        assert_eq!(summary.input_size, [8, 5, 3]);
        assert_eq!(summary.preprocessing.resize, [8, 5]);
        assert_eq!(summary.preprocessing.scale.as_f64(), Some(0.25));
        assert_eq!(summary.classes, vec!["no_damage", "damage"]);
    }

    #[test]
    fn test_summary_echoes_integer_scale() {
        let preprocessing =
            PreprocessingConfig::from_json(r#"{"img_size": [2, 2], "scale": 1}"#).unwrap();
        let context = ServiceContext::new(
            preprocessing,
            ModelCard::default(),
            Label::NoDamage,
            DEFAULT_MAX_UPLOAD_BYTES,
            Arc::new(StubScorer::new(0.9)),
        );

        let body = serde_json::to_value(context.summary()).unwrap();
        assert_eq!(body["preprocessing"]["scale"], serde_json::json!(1));
        assert_eq!(body["preprocessing"]["scale"].to_string(), "1");
    }

    #[test]
    fn test_predict_passes_normalized_batch() {
        let (context, scorer) = context(0.2);
        let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            1,
            1,
            Rgb([40, 80, 120]),
        )));

        assert_eq!(context.predict(&bytes).unwrap(), Label::Damage);

        let batch = scorer.last_batch.lock().unwrap().clone().unwrap();
        assert_eq!(batch.shape(), &[1, 5, 8, 3]);
        for ((_, _, _, c), value) in batch.indexed_iter() {
            assert!((value - [10.0f32, 20.0, 30.0][c]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_predict_is_repeatable() {
        let (context, _) = context(0.7);
        let bytes = png_bytes(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            3,
            3,
            Rgb([200, 10, 10]),
        )));
        let first = context.predict(&bytes).unwrap();
        let second = context.predict(&bytes).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Label::NoDamage);
    }

    #[test]
    fn test_load_fails_without_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("preprocessing.json"),
            r#"{"img_size": [32, 32], "scale": 1.0}"#,
        )
        .unwrap();
        let config = ServiceConfig::from_lookup(Path::new("/unused"), |key| match key {
            "ARTIFACTS_DIR" => Some(dir.path().display().to_string()),
            _ => None,
        })
        .unwrap();

        let err = ServiceContext::load(&config).err().unwrap();
        assert!(matches!(err, ArtifactError::MissingArtifact { kind: "model", .. }));
    }

    #[test]
    fn test_load_fails_without_preprocessing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("best_model.pt"), b"weights").unwrap();
        let config = ServiceConfig::from_lookup(Path::new("/unused"), |key| match key {
            "ARTIFACTS_DIR" => Some(dir.path().display().to_string()),
            _ => None,
        })
        .unwrap();

        let err = ServiceContext::load(&config).err().unwrap();
        assert!(matches!(
            err,
            ArtifactError::MissingArtifact {
                kind: "preprocessing config",
                ..
            }
        ));
    }

    #[test]
    fn test_load_rejects_bad_preprocessing_before_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("best_model.pt"), b"weights").unwrap();
        std::fs::write(dir.path().join("preprocessing.json"), r#"{"img_size": [32, 32]}"#).unwrap();
        let config = ServiceConfig::from_lookup(Path::new("/unused"), |key| match key {
            "ARTIFACTS_DIR" => Some(dir.path().display().to_string()),
            _ => None,
        })
        .unwrap();

        let err = ServiceContext::load(&config).err().unwrap();
        assert!(matches!(err, ArtifactError::InvalidConfig(_)));
    }
}
