use std::path::PathBuf;

use hf_hub::api::tokio::{Api, ApiError};

/// Local paths of the files a text classification model needs
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// The Hugging Face `config.json`
    pub config: PathBuf,

    /// The `tokenizer.json` for the model's tokenizer
    pub tokenizer: PathBuf,

    /// The safetensors weights
    pub weights: PathBuf,
}

/// Download model config, tokenizer, and weights from Hugging Face Hub
/// If file exists in cache, it will not be downloaded again
pub async fn download_hf_model(
    model_name: &str,
    weights_file: &str,
) -> Result<ModelFiles, ApiError> {
    let api = Api::new()?;
    let repo = api.model(model_name.to_string());

    log::info!("Fetching {model_name} from the Hugging Face Hub...");

    let config = repo.get("config.json").await?;
    let tokenizer = repo.get("tokenizer.json").await?;
    let weights = repo.get(weights_file).await?;

    Ok(ModelFiles {
        config,
        tokenizer,
        weights,
    })
}
