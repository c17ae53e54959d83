use std::sync::Arc;

use async_trait::async_trait;
use burn::backend::{libtorch::LibTorchDevice, LibTorch};
use serde_json::Value;

use crate::{pipelines::PipelineError, settings::Settings};

/// In-process inference through the text classification pipeline
pub mod local;

/// Inference through the hosted Hugging Face API
pub mod remote;

pub use local::LocalClassifier;
pub use remote::RemoteClassifier;

/// A text classifier returning the model's raw, unnormalized output
#[async_trait]
pub trait Classifier: Send + Sync {
    /// A short name for where inference happens (e.g., "local" or "remote")
    fn backend(&self) -> &str;

    /// Classify a single text
    async fn classify(&self, text: &str) -> Result<Value, ClassifierError>;
}

/// Classifier Error
#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    /// The hosted API could not be reached or its body could not be read
    #[error("request to the inference API failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The hosted API answered with an error status
    #[error("inference API returned {status}: {body}")]
    Status {
        /// The HTTP status code
        status: reqwest::StatusCode,

        /// The response body
        body: String,
    },

    /// The API token is not a valid header value
    #[error("invalid API token")]
    InvalidToken,

    /// The local pipeline failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Local predictions could not be serialized
    #[error("unable to serialize predictions: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The local inference task panicked or was cancelled
    #[error("inference task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Another request panicked while holding the local pipeline
    #[error("the local pipeline is unavailable after an earlier failure")]
    Poisoned,
}

/// Build the process-wide classifier: the hosted API when a token is configured, otherwise the
/// local pipeline on the configured device
pub async fn load_classifier(settings: &Settings) -> Result<Arc<dyn Classifier>, ClassifierError> {
    if settings.use_remote() {
        log::info!("Using the hosted inference API at {}", settings.model_url());

        return Ok(Arc::new(RemoteClassifier::from_settings(settings)?));
    }

    let device = match settings.cuda_device {
        Some(index) => LibTorchDevice::Cuda(index),
        None => LibTorchDevice::Cpu,
    };

    log::info!(
        "Loading {} for local inference on {:?}",
        settings.model_name,
        device
    );

    let classifier = LocalClassifier::<LibTorch>::from_pretrained(
        &settings.model_name,
        &settings.weights_file,
        device,
    )
    .await?;

    Ok(Arc::new(classifier))
}
