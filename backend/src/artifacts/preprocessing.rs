use serde::Deserialize;
use serde_json::{Number, Value};
use std::path::Path;

use super::ArtifactError;

/// Input contract the model was trained with: target size and pixel scale.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessingConfig {
    pub width: u32,
    pub height: u32,
    /// Kept as written in the file so `/summary` echoes it unchanged.
    pub scale: Number,
}

#[derive(Deserialize)]
struct RawPreprocessing {
    img_size: Option<Value>,
    scale: Option<Value>,
}

impl PreprocessingConfig {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let contents = super::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ArtifactError> {
        let raw: RawPreprocessing = serde_json::from_str(contents)
            .map_err(|e| ArtifactError::InvalidConfig(e.to_string()))?;

        let img_size = raw
            .img_size
            .ok_or_else(|| ArtifactError::InvalidConfig("missing `img_size`".into()))?;
        let (width, height) = parse_img_size(&img_size)?;

        let scale = raw
            .scale
            .ok_or_else(|| ArtifactError::InvalidConfig("missing `scale`".into()))?;
        let scale = match scale {
            Value::Number(number) => number,
            other => {
                return Err(ArtifactError::InvalidConfig(format!(
                    "`scale` must be a number, got {}",
                    other
                )));
            }
        };
        if !scale.as_f64().is_some_and(|s| s.is_finite() && s > 0.0) {
            return Err(ArtifactError::InvalidConfig(format!(
                "`scale` must be positive, got {}",
                scale
            )));
        }

        Ok(Self {
            width,
            height,
            scale,
        })
    }

    /// Multiplier applied to every pixel value.
    pub fn scale_factor(&self) -> f32 {
        self.scale.as_f64().unwrap_or(1.0) as f32
    }
}

fn parse_img_size(value: &Value) -> Result<(u32, u32), ArtifactError> {
    let invalid = || {
        ArtifactError::InvalidConfig(format!(
            "`img_size` must be [width, height] of positive integers, got {}",
            value
        ))
    };

    let dims = value.as_array().ok_or_else(invalid)?;
    if dims.len() != 2 {
        return Err(invalid());
    }

    let dim = |v: &Value| {
        v.as_u64()
            .filter(|d| *d > 0)
            .and_then(|d| u32::try_from(d).ok())
            .ok_or_else(invalid)
    };
    Ok((dim(&dims[0])?, dim(&dims[1])?))
}
