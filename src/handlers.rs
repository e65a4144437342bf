use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use log::{info, warn};
use uuid::Uuid;

use crate::backend::{Backend, Prediction};
use crate::error::PredictError;
use crate::models::{ErrorResponse, PredictionResponse, UploadLimits, WelcomeResponse};

const FILE_FIELD: &str = "file";

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(WelcomeResponse::default())
}

/// Classify the uploaded `file` field.
///
/// Failures are reported as `{"error": ...}` with status 200.
pub async fn predict(
    payload: Multipart,
    backend: web::Data<Backend>,
    limits: web::Data<UploadLimits>,
) -> HttpResponse {
    let request_id = Uuid::new_v4();

    let outcome = match read_upload(payload, limits.max_bytes).await {
        Ok(image) => {
            info!("[{}] Received {} byte upload", request_id, image.len());
            backend.predict(image).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(Prediction::Label(label)) => {
            info!("[{}] Predicted class: {}", request_id, label);
            HttpResponse::Ok().json(PredictionResponse { prediction: label })
        }
        Ok(Prediction::Relayed(body)) => {
            info!("[{}] Relayed remote prediction", request_id);
            HttpResponse::Ok().json(body)
        }
        Err(e) => {
            warn!("[{}] Prediction failed: {}", request_id, e);
            HttpResponse::Ok().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}

/// Buffer the first `file` field; any other fields are drained and ignored.
async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<Vec<u8>, PredictError> {
    while let Some(item) = payload.next().await {
        let mut field = item?;
        let is_file = field.content_disposition().get_name() == Some(FILE_FIELD);

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if !is_file {
                continue;
            }
            if data.len() + chunk.len() > max_bytes {
                return Err(PredictError::TooLarge(max_bytes));
            }
            data.extend_from_slice(&chunk);
        }

        if is_file {
            return Ok(data);
        }
    }
    Err(PredictError::MissingFile)
}
