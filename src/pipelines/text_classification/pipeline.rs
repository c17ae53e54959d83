use std::collections::BTreeMap;

use burn::{data::dataloader::batcher::Batcher as _, tensor::backend::Backend};
use derive_new::new;
use tokenizers::Tokenizer;

use crate::{
    models::roberta::{Config, Model},
    pipelines::PipelineError,
    utils::hugging_face::{download_hf_model, ModelFiles},
};

use super::{Batcher, Prediction};

/// Text Classification Pipeline: tokenizer, encoder, and label table for one model
#[derive(new)]
pub struct Pipeline<B: Backend> {
    /// The classification model
    model: Model<B>,

    /// Batcher holding the tokenizer
    batcher: Batcher<B>,

    /// A map from class ids to class name labels
    id2label: BTreeMap<usize, String>,
}

impl<B: Backend> Pipeline<B> {
    /// Fetch a model from the Hugging Face Hub (or the local hub cache) and load it
    pub async fn from_pretrained(
        model_name: &str,
        weights_file: &str,
        device: B::Device,
    ) -> Result<Self, PipelineError> {
        let files = download_hf_model(model_name, weights_file).await?;

        Self::load(&files, device)
    }

    /// Load a pipeline from files already on disk
    pub fn load(files: &ModelFiles, device: B::Device) -> Result<Self, PipelineError> {
        let mut config = Config::load_pretrained(&files.config)?;

        // Dropout is not used for inference
        config.model.hidden_dropout_prob = 0.0;

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

        log::info!("Loading weights...");

        let model = Model::from_safetensors(&device, &files.weights, &config)?;

        log::info!("Model ready with {} classes", config.n_classes());

        let batcher = Batcher::new(tokenizer, &config, device);

        Ok(Self::new(model, batcher, config.id2label))
    }

    /// Score every class for each sample, in class id order
    pub fn classify(&self, samples: Vec<String>) -> Result<Vec<Vec<Prediction>>, PipelineError> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let token_ids = self.batcher.encode(samples)?;
        let item = self.batcher.batch(token_ids);

        let probabilities = self.model.infer(item);
        let [_batch_size, n_classes] = probabilities.dims();

        let values = probabilities.into_data().convert::<f32>().value;

        Ok(values
            .chunks(n_classes)
            .map(|row| label_scores(&self.id2label, row))
            .collect())
    }
}

/// Pair class probabilities with their labels. Ids missing from the table get the
/// `LABEL_<id>` name Hugging Face uses by default.
fn label_scores(id2label: &BTreeMap<usize, String>, row: &[f32]) -> Vec<Prediction> {
    row.iter()
        .enumerate()
        .map(|(id, score)| {
            let label = id2label
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("LABEL_{id}"));

            Prediction::new(label, f64::from(*score))
        })
        .collect()
}
