use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use burn::tensor::backend::Backend;
use serde_json::Value;

use crate::pipelines::text_classification::Pipeline;

use super::{Classifier, ClassifierError};

/// Runs the text classification pipeline in-process, on the blocking thread pool
pub struct LocalClassifier<B: Backend> {
    pipeline: Arc<Mutex<Pipeline<B>>>,
}

impl<B: Backend> LocalClassifier<B> {
    /// Wrap an already loaded pipeline
    pub fn new(pipeline: Pipeline<B>) -> Self {
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
        }
    }

    /// Load the pipeline for a model on the Hugging Face Hub
    pub async fn from_pretrained(
        model_name: &str,
        weights_file: &str,
        device: B::Device,
    ) -> Result<Self, ClassifierError> {
        let pipeline = Pipeline::from_pretrained(model_name, weights_file, device).await?;

        Ok(Self::new(pipeline))
    }
}

#[async_trait]
impl<B: Backend> Classifier for LocalClassifier<B> {
    fn backend(&self) -> &str {
        "local"
    }

    async fn classify(&self, text: &str) -> Result<Value, ClassifierError> {
        let pipeline = self.pipeline.clone();
        let text = text.to_string();

        let predictions = tokio::task::spawn_blocking(move || {
            let pipeline = pipeline.lock().map_err(|_| ClassifierError::Poisoned)?;

            Ok::<_, ClassifierError>(pipeline.classify(vec![text])?)
        })
        .await??;

        // One sample in, one list of label scores out
        let scores = serde_json::to_value(predictions.into_iter().next().unwrap_or_default())?;
        log::debug!("Local model raw output: {scores}");

        Ok(scores)
    }
}
