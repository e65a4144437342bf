//! Model artifact: the classifier seam and its tract-onnx implementation.

use std::path::Path;

use log::info;
use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::error::ModelError;
use crate::preprocess::{CHANNELS, IMAGE_SIZE, INPUT_SHAPE};

/// A trained image classifier.
///
/// Implementations are immutable once loaded and shared between workers.
pub trait Classifier: Send + Sync {
    /// Per-class scores for a single-image batch of shape `INPUT_SHAPE`.
    fn predict(&self, batch: &Array4<f32>) -> Result<Vec<f32>, ModelError>;

    /// Length of the score vector, when the model declares it up front.
    fn num_classes(&self) -> Option<usize> {
        None
    }
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX export of the leaf classifier, optimized once at load time.
pub struct OnnxModel {
    plan: Plan,
}

impl OnnxModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let load_err = |e: anyhow::Error| ModelError::Load {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        };
        let size = IMAGE_SIZE as usize;

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, CHANNELS)),
            )
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)?;

        info!("Loaded ONNX model from {}", path.display());
        Ok(Self { plan })
    }
}

impl Classifier for OnnxModel {
    fn predict(&self, batch: &Array4<f32>) -> Result<Vec<f32>, ModelError> {
        if batch.shape() != INPUT_SHAPE {
            return Err(ModelError::Shape {
                expected: INPUT_SHAPE.to_vec(),
                actual: batch.shape().to_vec(),
            });
        }
        let data = batch
            .as_slice()
            .ok_or_else(|| ModelError::Inference("input batch is not contiguous".to_string()))?;

        let input = Tensor::from_shape(&INPUT_SHAPE, data)
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| ModelError::Inference(format!("{:#}", e)))?;

        let scores = outputs
            .first()
            .ok_or_else(|| ModelError::Inference("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        Ok(scores.iter().copied().collect())
    }

    fn num_classes(&self) -> Option<usize> {
        let fact = self.plan.model().output_fact(0).ok()?;
        fact.shape.as_concrete()?.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// ReduceMean over height and width, then Softmax: three scores, one per channel.
    const CHANNEL_MEAN_ONNX: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/channel_mean.onnx");

    fn solid(size: usize, color: [f32; 3]) -> Array4<f32> {
        Array4::from_shape_fn((1, size, size, CHANNELS), |(_, _, _, c)| color[c])
    }

    #[test]
    fn missing_model_file_is_reported() {
        let dir = tempdir().unwrap();
        let err = OnnxModel::load(dir.path().join("model.onnx")).err().unwrap();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn corrupt_model_file_fails_to_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, "not an onnx model").unwrap();

        let err = OnnxModel::load(&path).err().unwrap();
        assert!(matches!(err, ModelError::Load { .. }));
    }

    #[test]
    fn declares_output_width() {
        let model = OnnxModel::load(CHANNEL_MEAN_ONNX).unwrap();
        assert_eq!(model.num_classes(), Some(3));
    }

    #[test]
    fn predict_returns_one_score_per_class() {
        let model = OnnxModel::load(CHANNEL_MEAN_ONNX).unwrap();
        let scores = model
            .predict(&solid(IMAGE_SIZE as usize, [0.1, 0.8, 0.2]))
            .unwrap();

        assert_eq!(scores.len(), 3);
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(scores[1] > scores[0] && scores[1] > scores[2]);
    }

    #[test]
    fn wrong_batch_shape_is_rejected() {
        let model = OnnxModel::load(CHANNEL_MEAN_ONNX).unwrap();
        let err = model.predict(&solid(64, [0.5, 0.5, 0.5])).unwrap_err();
        match err {
            ModelError::Shape { expected, actual } => {
                assert_eq!(expected, INPUT_SHAPE.to_vec());
                assert_eq!(actual, vec![1, 64, 64, 3]);
            }
            other => panic!("expected shape error, got {other}"),
        }
    }
}
