use std::fmt::Display;

use crate::models::roberta;

/// Text Classification
pub mod text_classification;

/// The unique string token that identifies the text classification pipeline
pub static TEXT_CLASSIFICATION: &str = "text-classification";

/// Available Pipelines
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Pipeline {
    /// Text Classification
    TextClassification,
}

impl Pipeline {
    /// Get the default model for the given pipeline
    pub fn default_model(&self) -> &'static str {
        match self {
            Pipeline::TextClassification => roberta::DEFAULT_TEXT_CLASSIFICATION_MODEL,
        }
    }
}

impl TryFrom<&str> for Pipeline {
    type Error = PipelineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value == TEXT_CLASSIFICATION {
            Ok(Pipeline::TextClassification)
        } else {
            Err(PipelineError::Unknown(value.to_string()))
        }
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Pipeline::TextClassification => TEXT_CLASSIFICATION,
        };

        write!(f, "{}", name)
    }
}

/// Pipeline Error
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// No pipeline found for the given string
    #[error("no pipeline found for {0}")]
    Unknown(String),

    /// Model files could not be fetched from the Hugging Face Hub
    #[error("unable to download model files: {0}")]
    Download(#[from] hf_hub::api::tokio::ApiError),

    /// The tokenizer could not be loaded or failed to encode the input
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// The model could not be loaded
    #[error(transparent)]
    Model(#[from] crate::models::ModelError),
}
