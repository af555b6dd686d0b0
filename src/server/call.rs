//! Call-analysis service handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};

use crate::analysis::{CallAnalysisResult, CallAnalyzer};
use crate::extract::{CallInput, Upload};
use crate::server::ApiError;

const TRANSCRIPT_FIELD: &str = "transcript";
const FILE_FIELD: &str = "file";

/// A request without a multipart body is treated as an empty form, so it
/// fails with the same missing-input error as a blank one.
pub async fn analyze(
    State(analyzer): State<Arc<CallAnalyzer>>,
    multipart: Result<Option<Multipart>, MultipartRejection>,
) -> Result<Json<CallAnalysisResult>, ApiError> {
    let started = Instant::now();
    let input = match multipart? {
        Some(multipart) => read_form(multipart).await?,
        None => CallInput::default(),
    };
    let source = match (&input.transcript, &input.file) {
        (Some(_), _) => "transcript",
        (None, Some(_)) => "file",
        (None, None) => "nothing",
    };

    let outcome = analyzer.analyze(input).await;
    let elapsed = started.elapsed().as_secs_f64();
    match &outcome {
        Ok(result) => log::info!(
            "POST /analyze call from {source}: {} chars in {elapsed:.2}s",
            result.transcript.len()
        ),
        Err(e) => log::info!("POST /analyze call from {source} failed after {elapsed:.2}s: {e}"),
    }
    Ok(Json(outcome?))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "AI service running" }))
}

/// Collect the `transcript` and `file` fields.  Browsers submit both even
/// when left blank, so an empty transcript or an empty unnamed file counts
/// as absent.  Unknown fields are skipped.
async fn read_form(mut multipart: Multipart) -> Result<CallInput, ApiError> {
    let mut input = CallInput::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            TRANSCRIPT_FIELD => {
                let text = field.text().await?;
                if !text.is_empty() {
                    input.transcript = Some(text);
                }
            }
            FILE_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !(file_name.is_empty() && bytes.is_empty()) {
                    input.file = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => log::debug!("Ignoring form field {other:?}"),
        }
    }
    Ok(input)
}
