//! Inference pipeline: raw upload bytes in, class label out.

use std::sync::Arc;

use crate::error::{ModelError, PredictError};
use crate::labels::LabelIndex;
use crate::model::Classifier;
use crate::preprocess;

/// Classifies images with a shared model and label index.
///
/// Holds no per-request state; one instance serves every worker.
pub struct InferencePipeline {
    model: Arc<dyn Classifier>,
    labels: Arc<LabelIndex>,
}

impl InferencePipeline {
    /// Fails when the model declares an output width that doesn't match the labels.
    pub fn new(model: Arc<dyn Classifier>, labels: Arc<LabelIndex>) -> Result<Self, ModelError> {
        if let Some(outputs) = model.num_classes() {
            if outputs != labels.len() {
                return Err(ModelError::ClassCount {
                    outputs,
                    labels: labels.len(),
                });
            }
        }
        Ok(Self { model, labels })
    }

    pub fn classify(&self, bytes: &[u8]) -> Result<String, PredictError> {
        let image = preprocess::decode(bytes)?;
        let batch = preprocess::to_batch(&preprocess::resize(&image));

        let scores = self.model.predict(&batch)?;
        if scores.len() != self.labels.len() {
            return Err(ModelError::ClassCount {
                outputs: scores.len(),
                labels: self.labels.len(),
            }
            .into());
        }

        let index = preprocess::argmax(&scores)
            .ok_or_else(|| ModelError::Inference("all scores are NaN".to_string()))?;
        Ok(self.labels.label_for(index)?.to_string())
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }
}
