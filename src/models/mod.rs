/// RoBERTa variants
pub mod roberta;

/// Model Error
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// The Hugging Face config file could not be read
    #[error("unable to load Hugging Face config file: {0}")]
    Config(String),

    /// The config declares no class labels
    #[error("classes are not defined in the model configuration")]
    NoClasses,

    /// A tensor expected in the weights file is absent
    #[error("missing tensor {0} in weights file")]
    MissingTensor(String),

    /// A tensor in the weights file could not be read
    #[error("unable to read weights: {0}")]
    Weights(#[from] candle_core::Error),
}
