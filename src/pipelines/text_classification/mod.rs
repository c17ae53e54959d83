/// Batcher
pub mod batcher;

/// Output shapes and normalization
pub mod output;

/// The local inference pipeline
pub mod pipeline;

pub use batcher::Batcher;
pub use output::{normalize_output, top_k, NormalizeError, Prediction};
pub use pipeline::Pipeline;
