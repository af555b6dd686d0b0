//! Mapping of every request failure to a status code and JSON body.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::extract::ExtractError;
use crate::stt::SttError;

/// Error returned by every handler.
///
/// The body is always `{"error": <message>}`; an unrecoverable model reply
/// additionally carries `raw_response`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The request body could not be read (bad JSON, malformed multipart,
    /// over the size limit).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rejected { status, .. } => *status,
            Self::Analysis(AnalysisError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            Self::Analysis(AnalysisError::UnrecoverableOutput { .. }) => StatusCode::BAD_GATEWAY,
            Self::Analysis(AnalysisError::Extract(e)) => extract_status(e),
        }
    }
}

fn extract_status(error: &ExtractError) -> StatusCode {
    match error {
        ExtractError::MissingInput | ExtractError::UnsupportedFileType { .. } => {
            StatusCode::BAD_REQUEST
        }
        ExtractError::InvalidText
        | ExtractError::Pdf(_)
        | ExtractError::Transcription(SttError::Decode(_) | SttError::EmptyAudio) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ExtractError::Transcription(_) | ExtractError::Io(_) | ExtractError::Task(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        Self::Analysis(e.into())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::Rejected {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        Self::Rejected {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::Rejected {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("Request failed with {status}: {self}");
        } else {
            log::debug!("Request rejected with {status}: {self}");
        }

        let body = match self {
            Self::Analysis(AnalysisError::UnrecoverableOutput { raw_response }) => json!({
                "error": "Model did not return valid JSON",
                "raw_response": raw_response,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::llm::LlmError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unrecoverable_output_carries_raw_response() {
        let err = ApiError::from(AnalysisError::UnrecoverableOutput {
            raw_response: "not json".into(),
        });
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Model did not return valid JSON");
        assert_eq!(body["raw_response"], "not json");
    }

    #[tokio::test]
    async fn upstream_error_message_is_surfaced() {
        let err = ApiError::from(AnalysisError::Upstream(LlmError::Timeout));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "LLM request timed out" }));
    }

    #[test]
    fn extraction_statuses() {
        let cases = [
            (ExtractError::MissingInput, StatusCode::BAD_REQUEST),
            (
                ExtractError::UnsupportedFileType {
                    file_name: "a.csv".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (ExtractError::InvalidText, StatusCode::UNPROCESSABLE_ENTITY),
            (ExtractError::Pdf("bad xref".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ExtractError::Transcription(SttError::Decode("eof".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ExtractError::Transcription(SttError::ModelNotFound("m.bin".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ExtractError::Task("panicked".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }

    #[tokio::test]
    async fn missing_input_body_matches_public_message() {
        let response = ApiError::from(ExtractError::MissingInput).into_response();
        let body = body_json(response).await;
        assert_eq!(body, json!({ "error": "Provide transcript text or file." }));
    }
}
