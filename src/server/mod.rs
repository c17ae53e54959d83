use std::sync::Arc;

use axum::{routing::post, Router};
use tower_http::cors::CorsLayer;

use crate::{classifier::Classifier, settings::Settings};

/// Route handlers
pub mod handlers;

/// Request rejections
pub mod error;

pub use error::ApiError;
pub use handlers::{predict, InputText, PredictResponse};

/// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    /// The process-wide classifier, created once at startup
    pub classifier: Arc<dyn Classifier>,

    /// How many predictions to return
    pub top_k: usize,
}

/// Server Error
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    /// The configured host and port do not form a socket address
    #[error("invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// Binding or serving failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Build the application router around an initialized classifier
pub fn router(classifier: Arc<dyn Classifier>, top_k: usize) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .with_state(AppState { classifier, top_k })
        .layer(CorsLayer::very_permissive())
}

/// Serve the application until Ctrl-C is received
pub async fn serve(
    settings: &Settings,
    classifier: Arc<dyn Classifier>,
) -> Result<(), ServerError> {
    let address = settings.address()?;
    let app = router(classifier, settings.top_k);

    let listener = tokio::net::TcpListener::bind(address).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Unable to listen for Ctrl-C: {e}");
    }
}
