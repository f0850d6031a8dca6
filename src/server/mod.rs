// file: src/server/mod.rs
// description: shared state, error mapping and startup for the HTTP JSON service
// reference: https://docs.rs/axum

mod routes;

pub use routes::create_router;

use crate::error::{PipelineError, Result};
use crate::pipeline::ProspectusPipeline;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

const NOT_FOUND_MESSAGE: &str = "Prospektüs bulunamadı";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ProspectusPipeline>,
    pub fallback_on_llm_error: bool,
}

impl AppState {
    pub fn new(pipeline: ProspectusPipeline, fallback_on_llm_error: bool) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            fallback_on_llm_error,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error type for HTTP handlers; renders as `{"error": "..."}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Maps a failed summary run: input problems are 400, a prospectus that
    /// could not be located or obtained is 404, anything else is 500.
    pub fn from_summary_failure(err: PipelineError) -> Self {
        error!("Summary request failed: {}", err);
        match err {
            PipelineError::Input(msg) => Self::bad_request(msg),
            e if e.is_not_found() => Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            e => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("İşlem başarısız: {}", e),
            ),
        }
    }

    pub fn from_answer_failure(err: PipelineError) -> Self {
        error!("Question request failed: {}", err);
        match err {
            PipelineError::Input(msg) => Self::bad_request(msg),
            e => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Cevap oluşturulamadı: {}", e),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Binds `addr` and serves until ctrl-c.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
