//! Banking AI services.
//!
//! Two HTTP services sharing one upstream chat model:
//!
//! * complaint analysis ([`analysis::ComplaintAnalyzer`]), which turns a
//!   free-text banking complaint into a fixed-shape triage record;
//! * call analysis ([`analysis::CallAnalyzer`]), which accepts a transcript
//!   or a `.txt/.pdf/.mp3/.wav/.mp4` upload and returns a quality review.

pub mod analysis;
pub mod config;
pub mod extract;
pub mod llm;
pub mod server;
pub mod stt;
