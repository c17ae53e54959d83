/// Hugging Face utilities
pub mod hugging_face;

/// Tensor Utilities
pub mod tensors;
