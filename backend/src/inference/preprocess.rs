use image::imageops::{self, FilterType};
use ndarray::Array4;

use super::InferenceError;
use crate::artifacts::preprocessing::PreprocessingConfig;

/// Decodes `bytes` and normalizes them into a `[1, height, width, 3]` batch.
pub fn to_batch(bytes: &[u8], config: &PreprocessingConfig) -> Result<Array4<f32>, InferenceError> {
    let image = image::load_from_memory(bytes)?;
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, config.width, config.height, FilterType::CatmullRom);

    let scale = config.scale_factor();
    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|value| f32::from(value) * scale)
        .collect();

    let shape = (1, config.height as usize, config.width as usize, 3);
    Ok(Array4::from_shape_vec(shape, data)?)
}
