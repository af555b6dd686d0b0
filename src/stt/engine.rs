//! Speech-to-text engines.
//!
//! [`SttEngine`] turns 16 kHz mono `f32` PCM into text and is shared behind
//! `Arc<dyn SttEngine>`.  [`LazyWhisperEngine`] is what the service runs:
//! it loads a [`WhisperEngine`] on the first audio upload.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use thiserror::Error;
use whisper_rs::{FullParams, WhisperContext, WhisperContextParameters, WhisperState};

use crate::stt::resample::WHISPER_SAMPLE_RATE;
use crate::stt::transcribe::TranscribeParams;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// Failures while turning an upload into a transcript.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// No model file at the configured path.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Whisper context initialisation failed: {0}")]
    ContextInit(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    /// The decoded audio contained no samples.
    #[error("Audio contains no samples")]
    EmptyAudio,

    /// The uploaded file could not be decoded as audio.
    #[error("Audio decode failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// SttEngine trait
// ---------------------------------------------------------------------------

/// Input must be 16 kHz mono PCM; empty input is [`SttError::EmptyAudio`].
pub trait SttEngine: Send + Sync {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError>;
}

/// whisper.cpp rejects clips under one second; pad to 1.1 s of 16 kHz audio.
const MIN_WHISPER_SAMPLES: usize = 17_600;

fn padded(audio: &[f32]) -> Cow<'_, [f32]> {
    if audio.len() >= MIN_WHISPER_SAMPLES {
        return Cow::Borrowed(audio);
    }
    let mut owned = Vec::with_capacity(MIN_WHISPER_SAMPLES);
    owned.extend_from_slice(audio);
    owned.resize(MIN_WHISPER_SAMPLES, 0.0);
    Cow::Owned(owned)
}

// ---------------------------------------------------------------------------
// WhisperEngine
// ---------------------------------------------------------------------------

/// A loaded GGML model.  Each call decodes in its own `WhisperState`, so
/// concurrent uploads share the weights without locking.
pub struct WhisperEngine {
    ctx: WhisperContext,
    params: TranscribeParams,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl WhisperEngine {
    /// Load the model at `model_path`.  The GPU (and half precision with it)
    /// is only requested when `params.use_gpu` is set.
    pub fn load(model_path: impl AsRef<Path>, params: TranscribeParams) -> Result<Self, SttError> {
        let path = model_path.as_ref();
        if !path.is_file() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| SttError::ModelNotFound(format!("non-UTF-8 path: {}", path.display())))?;

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(params.use_gpu);

        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| SttError::ContextInit(e.to_string()))?;
        Ok(Self { ctx, params })
    }

    fn full_params(&self) -> FullParams<'_, '_> {
        let mut fp = FullParams::new(self.params.strategy.to_whisper());
        fp.set_language(self.params.language());
        fp.set_n_threads(self.params.n_threads);
        if self.params.suppress_progress {
            fp.set_print_progress(false);
            fp.set_print_realtime(false);
            fp.set_print_timestamps(false);
        }
        fp
    }
}

/// Concatenated segment text of a finished run.
fn collect_text(state: &WhisperState) -> Result<String, SttError> {
    let n_segments = state
        .full_n_segments()
        .map_err(|e| SttError::Transcription(e.to_string()))?;

    let mut text = String::new();
    for i in 0..n_segments {
        let segment = state
            .full_get_segment_text(i)
            .map_err(|e| SttError::Transcription(format!("segment {i}: {e}")))?;
        text.push_str(&segment);
    }
    Ok(text.trim().to_string())
}

impl SttEngine for WhisperEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        if audio.is_empty() {
            return Err(SttError::EmptyAudio);
        }
        let audio = padded(audio);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        let started = std::time::Instant::now();
        state
            .full(self.full_params(), &audio)
            .map_err(|e| SttError::Transcription(e.to_string()))?;
        log::debug!(
            "Whisper decoded {:.1}s of audio in {:.2}s",
            audio.len() as f64 / f64::from(WHISPER_SAMPLE_RATE),
            started.elapsed().as_secs_f64()
        );

        collect_text(&state)
    }
}

// ---------------------------------------------------------------------------
// LazyWhisperEngine
// ---------------------------------------------------------------------------

/// Loads the Whisper model on first use and keeps it for the life of the
/// process.  A failed load is not cached, so a model dropped into place
/// later is picked up by the next request.
pub struct LazyWhisperEngine {
    model_path: PathBuf,
    params: TranscribeParams,
    engine: OnceCell<WhisperEngine>,
}

impl LazyWhisperEngine {
    pub fn new(model_path: impl Into<PathBuf>, params: TranscribeParams) -> Self {
        Self {
            model_path: model_path.into(),
            params,
            engine: OnceCell::new(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.get().is_some()
    }

    fn engine(&self) -> Result<&WhisperEngine, SttError> {
        self.engine.get_or_try_init(|| {
            log::info!("Loading Whisper model: {}", self.model_path.display());
            let engine = WhisperEngine::load(&self.model_path, self.params.clone())?;
            log::info!("Whisper model loaded (gpu={})", self.params.use_gpu);
            Ok(engine)
        })
    }
}

impl SttEngine for LazyWhisperEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        self.engine()?.transcribe(audio)
    }
}

/// Canned engine for tests.
#[cfg(test)]
pub struct MockSttEngine {
    response: Result<String, SttError>,
}

#[cfg(test)]
impl MockSttEngine {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
        }
    }

    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
impl SttEngine for MockSttEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        if audio.is_empty() {
            return Err(SttError::EmptyAudio);
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
