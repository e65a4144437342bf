//! Prediction strategy selected at startup.

use std::sync::Arc;

use actix_web::web;
use anyhow::{Context, Result};
use log::info;
use serde_json::Value;

use crate::config::{BackendKind, ServeConfig};
use crate::error::PredictError;
use crate::labels::LabelIndex;
use crate::model::OnnxModel;
use crate::pipeline::InferencePipeline;
use crate::remote::RemoteModel;

/// Successful outcome of a prediction request.
#[derive(Debug)]
pub enum Prediction {
    /// Label resolved by the in-process pipeline.
    Label(String),
    /// Body returned verbatim by the remote service.
    Relayed(Value),
}

pub enum Backend {
    Local(Arc<InferencePipeline>),
    Remote(RemoteModel),
}

impl Backend {
    /// Build the configured backend. Any failure here is fatal to startup.
    pub fn from_config(config: &ServeConfig) -> Result<Self> {
        match config.backend {
            BackendKind::Local => {
                let labels = match &config.labels_file {
                    Some(path) => {
                        info!("Loading labels from {}", path.display());
                        LabelIndex::from_file(path)
                    }
                    None => {
                        info!("Deriving labels from {}", config.dataset_dir.display());
                        LabelIndex::from_dataset_dir(&config.dataset_dir)
                    }
                }
                .context("Failed to build label index")?;

                let model = OnnxModel::load(&config.model_path).context("Failed to load model")?;
                let pipeline = InferencePipeline::new(Arc::new(model), Arc::new(labels))
                    .context("Model does not match label index")?;
                info!("Serving {} classes in-process", pipeline.labels().len());
                Ok(Backend::Local(Arc::new(pipeline)))
            }
            BackendKind::Remote => {
                let url = config
                    .model_url
                    .as_deref()
                    .context("--model-url is required for the remote backend")?;
                let remote = RemoteModel::new(url, config.upstream_timeout())
                    .context("Failed to build HTTP client")?;
                info!("Forwarding predictions to {}", remote.url());
                Ok(Backend::Remote(remote))
            }
        }
    }

    pub async fn predict(&self, image: Vec<u8>) -> Result<Prediction, PredictError> {
        match self {
            Backend::Local(pipeline) => {
                let pipeline = Arc::clone(pipeline);
                let label = web::block(move || pipeline.classify(&image))
                    .await
                    .map_err(|_| PredictError::Worker)??;
                Ok(Prediction::Label(label))
            }
            Backend::Remote(remote) => remote.predict(image).await.map(Prediction::Relayed),
        }
    }
}
