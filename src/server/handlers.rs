use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    classifier::{Classifier, ClassifierError},
    pipelines::text_classification::{
        normalize_output,
        output::{error_fallback, NormalizeError},
        top_k, Prediction,
    },
};

use super::{ApiError, AppState};

/// The request body for `/predict`
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputText {
    /// The text to classify
    pub text: String,
}

/// The response body for `/predict`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PredictResponse {
    /// The highest scored emotions, best first
    pub top_3: Vec<Prediction>,

    /// Why classification failed, when it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    /// A successful response
    pub fn predictions(top_3: Vec<Prediction>) -> Self {
        Self { top_3, error: None }
    }

    /// The fixed fallback response carrying an error message
    pub fn failure(error: impl ToString) -> Self {
        Self {
            top_3: error_fallback(),
            error: Some(error.to_string()),
        }
    }
}

/// Anything that can go wrong between accepting the text and ranking the emotions
#[derive(thiserror::Error, Debug)]
enum PredictError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Classify text into emotions, returning the top predictions
///
/// Classification failures are not HTTP errors: they answer with a fixed fallback and an
/// `error` message. Only empty text is rejected.
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<InputText>,
) -> Result<Json<PredictResponse>, ApiError> {
    if payload.text.is_empty() {
        return Err(ApiError::EmptyText);
    }

    log::info!("Input text: {}", payload.text);

    match rank(state.classifier.as_ref(), &payload.text, state.top_k).await {
        Ok(top) => {
            log::info!("Top {} emotions: {:?}", state.top_k, top);

            Ok(Json(PredictResponse::predictions(top)))
        }
        Err(e) => {
            log::error!(
                "Error processing prediction with the {} classifier: {e}",
                state.classifier.backend()
            );

            Ok(Json(PredictResponse::failure(e)))
        }
    }
}

async fn rank(
    classifier: &dyn Classifier,
    text: &str,
    k: usize,
) -> Result<Vec<Prediction>, PredictError> {
    let raw = classifier.classify(text).await?;
    let predictions = normalize_output(&raw)?;

    Ok(top_k(predictions, k))
}
