//! File-level transcription: decode an upload, then run an [`SttEngine`].

use std::path::Path;
use std::sync::Arc;

use crate::stt::decode::decode_file;
use crate::stt::engine::{SttEngine, SttError};

/// Turns an audio/video file on disk into a transcript.
///
/// Blocking; callers on an async runtime wrap it in `spawn_blocking`.
pub trait AudioTranscriber: Send + Sync {
    fn transcribe_file(&self, path: &Path) -> Result<String, SttError>;
}

/// Decodes with symphonia and hands 16 kHz mono PCM to the wrapped engine.
pub struct FileTranscriber {
    engine: Arc<dyn SttEngine>,
}

impl FileTranscriber {
    pub fn new(engine: Arc<dyn SttEngine>) -> Self {
        Self { engine }
    }
}

impl AudioTranscriber for FileTranscriber {
    fn transcribe_file(&self, path: &Path) -> Result<String, SttError> {
        let decoded = decode_file(path)?;
        log::debug!(
            "Decoded {:.1}s of audio ({} Hz, {} ch)",
            decoded.duration_secs(),
            decoded.sample_rate,
            decoded.channels
        );
        let pcm = decoded.into_whisper_pcm();
        self.engine.transcribe(&pcm)
    }
}
