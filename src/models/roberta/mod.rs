/// XLM-RoBERTa for Sequence Classification
pub mod model;

/// The model configuration
pub mod config;

pub use config::Config;
pub use model::{ClassificationHead, Model, ModelRecord};

/// Model Variants
/// --------------

/// The base model type, as understood by the `bert-burn` encoder
pub static MODEL_TYPE: &str = "roberta";

/// The multilingual model type reported by XLM-RoBERTa checkpoints
pub static XLM_MODEL_TYPE: &str = "xlm-roberta";

/// XLM-RoBERTa fine-tuned on Spanish tweets for emotion detection
pub static EMOTION_ES: &str = "daveni/twitter-xlm-roberta-emotion-es";

/// Text Classification
/// -------------------

/// The default model to use
pub static DEFAULT_TEXT_CLASSIFICATION_MODEL: &str = EMOTION_ES;
