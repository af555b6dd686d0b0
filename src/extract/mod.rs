//! Text extraction for the call-analysis service.
//!
//! [`Extractor::resolve`] turns a [`CallInput`] (inline transcript or an
//! uploaded file) into one string:
//!
//! | Input                         | Path                                  |
//! |-------------------------------|---------------------------------------|
//! | `transcript` field            | used verbatim, any file ignored       |
//! | `*.txt`                       | read as UTF-8                         |
//! | `*.pdf`                       | per-page text, joined with `\n`       |
//! | `*.mp3` / `*.wav` / `*.mp4`   | decoded and transcribed               |
//! | anything else                 | [`ExtractError::UnsupportedFileType`] |
//! | nothing                       | [`ExtractError::MissingInput`]        |

pub mod dispatch;
pub mod pdf;
pub mod upload;

use thiserror::Error;

use crate::stt::SttError;

pub use dispatch::Extractor;
pub use pdf::{join_pages, LopdfExtractor, PdfTextExtractor};
pub use upload::ScratchDir;

// ---------------------------------------------------------------------------
// ExtractError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Neither a transcript nor a file was supplied.
    #[error("Provide transcript text or file.")]
    MissingInput,

    /// The upload's extension is not one of the supported kinds.
    #[error("Unsupported file type.")]
    UnsupportedFileType { file_name: String },

    /// A `.txt` upload was not valid UTF-8.
    #[error("Uploaded text file is not valid UTF-8.")]
    InvalidText,

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Transcription failed: {0}")]
    Transcription(#[from] SttError),

    /// Staging the upload on disk failed.
    #[error("Failed to stage upload: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Task(String),
}

// ---------------------------------------------------------------------------
// FileKind
// ---------------------------------------------------------------------------

/// Supported upload types, keyed by filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Mp3,
    Wav,
    Mp4,
}

impl FileKind {
    pub const ALL: [FileKind; 5] = [Self::Text, Self::Pdf, Self::Mp3, Self::Wav, Self::Mp4];

    /// Suffix including the dot, lower case.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Text => ".txt",
            Self::Pdf => ".pdf",
            Self::Mp3 => ".mp3",
            Self::Wav => ".wav",
            Self::Mp4 => ".mp4",
        }
    }

    pub fn is_audio(self) -> bool {
        matches!(self, Self::Mp3 | Self::Wav | Self::Mp4)
    }

    /// Classify by case-insensitive filename suffix.
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        let lower = file_name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| lower.ends_with(kind.suffix()))
            .ok_or_else(|| ExtractError::UnsupportedFileType {
                file_name: file_name.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Request input
// ---------------------------------------------------------------------------

/// A file received in a multipart upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Raw inputs of one call-analysis request.
#[derive(Debug, Clone, Default)]
pub struct CallInput {
    pub transcript: Option<String>,
    pub file: Option<Upload>,
}

impl CallInput {
    pub fn transcript(text: impl Into<String>) -> Self {
        Self {
            transcript: Some(text.into()),
            file: None,
        }
    }

    pub fn file(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            transcript: None,
            file: Some(Upload {
                file_name: file_name.into(),
                bytes: bytes.into(),
            }),
        }
    }
}
