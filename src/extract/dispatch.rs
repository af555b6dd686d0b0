//! The extraction dispatcher.

use std::path::Path;
use std::sync::Arc;

use crate::extract::pdf::{join_pages, PdfTextExtractor};
use crate::extract::upload::ScratchDir;
use crate::extract::{CallInput, ExtractError, FileKind, Upload};
use crate::stt::AudioTranscriber;

/// Resolves a [`CallInput`] to text, staging uploads in a [`ScratchDir`].
///
/// Cheap to clone; the extractors are shared.
#[derive(Clone)]
pub struct Extractor {
    transcriber: Arc<dyn AudioTranscriber>,
    pdf: Arc<dyn PdfTextExtractor>,
    scratch: ScratchDir,
}

impl Extractor {
    pub fn new(
        transcriber: Arc<dyn AudioTranscriber>,
        pdf: Arc<dyn PdfTextExtractor>,
        scratch: ScratchDir,
    ) -> Self {
        Self {
            transcriber,
            pdf,
            scratch,
        }
    }

    /// Produce the text to analyse.
    ///
    /// An inline transcript always wins over a file.  File extraction runs
    /// on the blocking pool; the staged copy is removed before returning.
    pub async fn resolve(&self, input: CallInput) -> Result<String, ExtractError> {
        if let Some(transcript) = input.transcript {
            return Ok(transcript);
        }
        let upload = input.file.ok_or(ExtractError::MissingInput)?;
        self.extract_upload(upload).await
    }

    async fn extract_upload(&self, upload: Upload) -> Result<String, ExtractError> {
        let kind = FileKind::from_file_name(&upload.file_name)?;
        log::debug!("Dispatching {:?} upload ({} bytes)", kind, upload.bytes.len());

        let staged = self.scratch.persist(kind, &upload.bytes)?;
        let this = self.clone();

        tokio::task::spawn_blocking(move || {
            let text = this.extract_file(kind, staged.path());
            drop(staged);
            text
        })
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))?
    }

    fn extract_file(&self, kind: FileKind, path: &Path) -> Result<String, ExtractError> {
        match kind {
            FileKind::Text => {
                let bytes = std::fs::read(path)?;
                let text = String::from_utf8(bytes).map_err(|_| ExtractError::InvalidText)?;
                Ok(unix_newlines(text))
            }
            FileKind::Pdf => self.pdf.extract_pages(path).map(join_pages),
            FileKind::Mp3 | FileKind::Wav | FileKind::Mp4 => {
                Ok(self.transcriber.transcribe_file(path)?)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// `\r\n` and lone `\r` become `\n`.
fn unix_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
