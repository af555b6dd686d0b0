//! The two analysis pipelines.
//!
//! * [`ComplaintAnalyzer`]: prompt → model → [`recover`](crate::llm::recover)
//!   → fixed-shape [`ComplaintAnalysisResult`].
//! * [`CallAnalyzer`]: [`Extractor`](crate::extract::Extractor) → prompt →
//!   model, with the reply returned as-is.
//!
//! Both hold their collaborators behind `Arc<dyn …>` so the HTTP layer and
//! tests share one instance.

pub mod call;
pub mod complaint;

use thiserror::Error;

use crate::extract::ExtractError;
use crate::llm::LlmError;

pub use call::{CallAnalysisResult, CallAnalyzer};
pub use complaint::{
    input_word_count, ComplaintAnalysisResult, ComplaintAnalyzer, ComplaintRequest, RequestMetrics,
};

/// Why an analysis request produced no result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The model call itself failed.
    #[error("{0}")]
    Upstream(#[from] LlmError),

    /// The model answered but no JSON object could be recovered.
    #[error("Model did not return valid JSON")]
    UnrecoverableOutput { raw_response: String },

    /// The call input could not be turned into text.
    #[error("{0}")]
    Extract(#[from] ExtractError),
}
