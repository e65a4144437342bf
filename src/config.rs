use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "plant-disease-api", version, about = "Plant disease image prediction API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeConfig,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a dataset directory and persist its class labels in index order.
    ExportLabels {
        #[arg(long, env = "PLANT_API_DATASET_DIR", default_value = "dataset/train")]
        dataset_dir: PathBuf,

        #[arg(long, short)]
        output: PathBuf,
    },
}

/// Where predictions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Load the ONNX model and classify in-process.
    Local,
    /// Forward uploads to an external prediction service.
    Remote,
}

#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    #[arg(long, env = "PLANT_API_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PLANT_API_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Number of HTTP workers (defaults to the number of CPUs).
    #[arg(long, env = "PLANT_API_WORKERS")]
    pub workers: Option<usize>,

    #[arg(long, value_enum, env = "PLANT_API_BACKEND", default_value_t = BackendKind::Local)]
    pub backend: BackendKind,

    #[arg(long, env = "PLANT_API_MODEL_PATH", default_value = "model.onnx")]
    pub model_path: PathBuf,

    /// Persisted label list; takes precedence over scanning `dataset_dir`.
    #[arg(long, env = "PLANT_API_LABELS_FILE")]
    pub labels_file: Option<PathBuf>,

    #[arg(long, env = "PLANT_API_DATASET_DIR", default_value = "dataset/train")]
    pub dataset_dir: PathBuf,

    /// Prediction endpoint used by the remote backend.
    #[arg(long, env = "PLANT_API_MODEL_URL")]
    pub model_url: Option<String>,

    #[arg(long, env = "PLANT_API_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    #[arg(long, env = "PLANT_API_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl ServeConfig {
    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}
