use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;

use crate::settings::Settings;

use super::{Classifier, ClassifierError};

/// The request body accepted by the hosted inference API
#[derive(Serialize)]
struct Inputs<'a> {
    inputs: &'a str,
}

/// A client for the hosted inference API, authorized once at construction
#[derive(Clone, Debug)]
pub struct RemoteClassifier {
    client: reqwest::Client,
    url: String,
}

impl RemoteClassifier {
    /// Create a client posting to `url` with a bearer token on every request
    pub fn new(url: String, token: &str, timeout: Duration) -> Result<Self, ClassifierError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| ClassifierError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, url })
    }

    /// Create a client for the configured model
    pub fn from_settings(settings: &Settings) -> Result<Self, ClassifierError> {
        Self::new(
            settings.model_url(),
            settings.api_token.as_deref().unwrap_or_default(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// The endpoint requests are sent to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn backend(&self) -> &str {
        "remote"
    }

    async fn classify(&self, text: &str) -> Result<Value, ClassifierError> {
        let response = self
            .client
            .post(&self.url)
            .json(&Inputs { inputs: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(ClassifierError::Status { status, body });
        }

        let scores: Value = response.json().await?;
        log::debug!("API response: {scores}");

        Ok(scores)
    }
}
