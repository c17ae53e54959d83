use std::{net::SocketAddr, path::Path};

use burn::config::{Config as _, ConfigError};

use crate::models::roberta::EMOTION_ES;

/// The default root of the hosted Hugging Face inference API
pub static HF_INFERENCE_API: &str = "https://api-inference.huggingface.co";

/// The environment variable holding the hosted API credential
pub static HF_API_TOKEN: &str = "HF_API_TOKEN";

/// Service configuration
#[derive(burn::config::Config)]
pub struct Settings {
    /// The address to bind to
    #[config(default = "\"0.0.0.0\".to_string()")]
    pub host: String,

    /// The port to bind to
    #[config(default = 8000)]
    pub port: u16,

    /// Model name on the Hugging Face Hub
    #[config(default = "EMOTION_ES.to_string()")]
    pub model_name: String,

    /// Root URL of the hosted inference API
    #[config(default = "HF_INFERENCE_API.to_string()")]
    pub api_base_url: String,

    /// Bearer token for the hosted inference API. When present, inference is remote.
    pub api_token: Option<String>,

    /// Timeout for hosted inference requests, in seconds
    #[config(default = 30)]
    pub request_timeout_secs: u64,

    /// The weights file to fetch from the model repo for local inference
    #[config(default = "\"model.safetensors\".to_string()")]
    pub weights_file: String,

    /// CUDA device ordinal for local inference; the CPU is used when unset
    pub cuda_device: Option<usize>,

    /// How many predictions to return per request
    #[config(default = 3)]
    pub top_k: usize,
}

/// Values given explicitly (on the command line) that replace whatever the settings hold
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model_name: Option<String>,
    pub api_token: Option<String>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub weights_file: Option<String>,
    pub cuda_device: Option<usize>,
    pub top_k: Option<usize>,
}

impl Settings {
    /// Build settings in layers: defaults, then the optional JSON file, then the explicit
    /// overrides, then `HF_API_TOKEN` when no token was given by either
    pub fn layered(file: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let settings = match file {
            Some(path) => Self::load(path)?,
            None => Self::new(),
        };

        Ok(settings.with_overrides(overrides).with_env_token())
    }

    /// Replace every field the overrides set
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        let Overrides {
            host,
            port,
            model_name,
            api_token,
            api_base_url,
            request_timeout_secs,
            weights_file,
            cuda_device,
            top_k,
        } = overrides;

        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(model_name) = model_name {
            self.model_name = model_name;
        }
        if api_token.is_some() {
            self.api_token = api_token;
        }
        if let Some(api_base_url) = api_base_url {
            self.api_base_url = api_base_url;
        }
        if let Some(timeout) = request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(weights_file) = weights_file {
            self.weights_file = weights_file;
        }
        if cuda_device.is_some() {
            self.cuda_device = cuda_device;
        }
        if let Some(top_k) = top_k {
            self.top_k = top_k;
        }

        self
    }

    /// Whether inference should go through the hosted API
    pub fn use_remote(&self) -> bool {
        self.api_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    /// The socket address to bind to
    pub fn address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// The hosted inference endpoint for the configured model
    pub fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.api_base_url.trim_end_matches('/'),
            self.model_name.trim_start_matches('/')
        )
    }

    /// Fill in the API token from the environment if none was given explicitly
    pub fn with_env_token(self) -> Self {
        self.with_fallback_token(std::env::var(HF_API_TOKEN).ok())
    }

    /// Use `token` only when no API token is set yet
    pub fn with_fallback_token(mut self, token: Option<String>) -> Self {
        if self.api_token.is_none() {
            self.api_token = token;
        }

        self
    }
}
