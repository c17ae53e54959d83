//! # Emociones
//!
//! Spanish-language emotion classification over HTTP, backed either by a local Burn pipeline or
//! by the hosted Hugging Face inference API.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Classifiers
pub mod classifier;

/// HTTP service
pub mod server;

/// Service configuration
pub mod settings;

/// Utilities
pub mod utils;
