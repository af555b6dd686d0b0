//! STT (Speech-to-Text) for uploaded call recordings.
//!
//! # Architecture
//!
//! ```text
//! upload.{mp3,wav,mp4}
//!        │
//!        ▼
//!  decode_file()          symphonia → interleaved f32 @ native rate
//!        │
//!        ▼
//!  to_whisper_pcm()       downmix + resample → 16 kHz mono
//!        │
//!        ▼
//!  SttEngine::transcribe  LazyWhisperEngine (model loaded on first use)
//! ```
//!
//! [`AudioTranscriber`] is the seam the extraction dispatcher depends on;
//! [`FileTranscriber`] is the production implementation.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use banking_ai::stt::{AudioTranscriber, FileTranscriber, LazyWhisperEngine, TranscribeParams};
//!
//! let engine = LazyWhisperEngine::new("models/ggml-small.bin", TranscribeParams::default());
//! let transcriber = FileTranscriber::new(Arc::new(engine));
//! let text = transcriber.transcribe_file(Path::new("call.wav")).unwrap();
//! println!("{text}");
//! ```

pub mod decode;
pub mod engine;
pub mod resample;
pub mod transcribe;
pub mod transcriber;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use decode::{decode_file, DecodedAudio};
pub use engine::{LazyWhisperEngine, SttEngine, SttError, WhisperEngine};
pub use transcribe::{SamplingStrategy, TranscribeParams};
pub use transcriber::{AudioTranscriber, FileTranscriber};
