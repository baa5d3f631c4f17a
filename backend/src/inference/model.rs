use ndarray::Array4;
use std::path::Path;
use std::sync::Mutex;
use tch::{CModule, Device, Kind, TchError, Tensor};

use super::{InferenceError, Scorer};
use crate::artifacts::ArtifactError;

impl From<TchError> for InferenceError {
    fn from(err: TchError) -> Self {
        InferenceError::Model(err.to_string())
    }
}

/// TorchScript classifier taking NHWC float input and returning one score.
pub struct TorchModel {
    module: Mutex<CModule>,
    device: Device,
}

impl TorchModel {
    pub fn load(model_path: &Path) -> Result<Self, ArtifactError> {
        let device = Device::cuda_if_available();
        let mut module = CModule::load_on_device(model_path, device)
            .map_err(|e| ArtifactError::ModelLoad(e.to_string()))?;
        module.set_eval();
        log::info!("Model loaded on {:?}", device);

        Ok(Self {
            module: Mutex::new(module),
            device,
        })
    }
}

impl Scorer for TorchModel {
    fn score(&self, batch: &Array4<f32>) -> Result<f32, InferenceError> {
        let data = batch
            .as_slice()
            .ok_or_else(|| InferenceError::Model("input batch is not contiguous".into()))?;
        let (n, h, w, c) = batch.dim();
        let input = Tensor::from_slice(data)
            .f_view([n as i64, h as i64, w as i64, c as i64])?
            .to_device(self.device);

        let output = {
            let module = self
                .module
                .lock()
                .map_err(|_| InferenceError::Model("model lock poisoned".into()))?;
            tch::no_grad(|| module.forward_ts(&[input]))?
        };

        let output_flat = output.f_to_kind(Kind::Float)?.f_view([-1])?;
        if output_flat.numel() == 0 {
            return Err(InferenceError::InvalidOutput(
                "model returned an empty tensor".into(),
            ));
        }
        let probability = output_flat.f_double_value(&[0])?;
        Ok(probability as f32)
    }
}
