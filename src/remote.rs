//! Forwarding client for an external prediction service.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use crate::error::PredictError;

/// Delegates classification to a remote HTTP endpoint.
///
/// The upload is re-sent as multipart field `file`; a 200 response body is
/// relayed as-is.
#[derive(Debug, Clone)]
pub struct RemoteModel {
    client: reqwest::Client,
    url: String,
}

impl RemoteModel {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn predict(&self, image: Vec<u8>) -> Result<serde_json::Value, PredictError> {
        let part = Part::bytes(image)
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let resp = self.client.post(&self.url).multipart(form).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(PredictError::Upstream(status.as_u16()));
        }
        Ok(resp.json().await?)
    }
}
