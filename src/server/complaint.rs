//! Complaint service handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::analysis::{ComplaintAnalysisResult, ComplaintAnalyzer, ComplaintRequest};
use crate::server::ApiError;

pub async fn analyze(
    State(analyzer): State<Arc<ComplaintAnalyzer>>,
    payload: Result<Json<ComplaintRequest>, JsonRejection>,
) -> Result<Json<ComplaintAnalysisResult>, ApiError> {
    let started = Instant::now();
    let Json(request) = payload?;

    let outcome = analyzer.analyze(&request.customer_query, started).await;
    match &outcome {
        Ok(result) => log::info!(
            "POST /analyze complaint: {:?} / {:?} in {:.2}s",
            result.complaint_type.as_str().unwrap_or("-"),
            result.priority.as_str().unwrap_or("-"),
            result.metrics.response_time_seconds
        ),
        Err(e) => log::info!(
            "POST /analyze complaint failed after {:.2}s: {e}",
            started.elapsed().as_secs_f64()
        ),
    }
    Ok(Json(outcome?))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "Banking AI Engine Running" }))
}
