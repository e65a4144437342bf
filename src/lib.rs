//! Plant disease image classifier served over HTTP.
//!
//! `GET /` answers with a welcome payload; `POST /predict` takes a multipart
//! `file` upload and returns `{"prediction": <label>}` or `{"error": <message>}`.
//! Predictions come from an in-process ONNX model or a remote service.

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod logging;
pub mod model;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod remote;
pub mod server;
