use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod error;
pub mod handlers;
pub mod request_id;
pub mod state;

pub use error::{error_mapper, HttpError};
pub use handlers::*;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub max_upload_bytes: usize,
}

pub fn create_router(state: AppState, settings: HttpSettings) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/inference", post(inference_handler))
        .route("/v1/audio/transcriptions", post(openai_transcriptions_handler))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .with_state(state)
}
