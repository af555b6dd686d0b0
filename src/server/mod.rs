//! HTTP surface of the two services.
//!
//! Each service gets its own [`Router`]; `main` binds them to separate
//! listeners.  Handlers only translate between HTTP and the analyzers in
//! [`crate::analysis`]; all failures funnel through [`ApiError`].

pub mod call;
pub mod complaint;
pub mod error;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::analysis::{CallAnalyzer, ComplaintAnalyzer};

pub use error::ApiError;

/// `POST /analyze` and `GET /health` for complaint analysis.
pub fn complaint_router(analyzer: Arc<ComplaintAnalyzer>) -> Router {
    Router::new()
        .route("/analyze", post(complaint::analyze))
        .route("/health", get(complaint::health))
        .with_state(analyzer)
}

/// `POST /analyze` (multipart) and `GET /` for call analysis.
pub fn call_router(analyzer: Arc<CallAnalyzer>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/analyze", post(call::analyze))
        .route("/", get(call::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(analyzer)
}
