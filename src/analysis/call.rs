//! Call-quality analysis.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;
use crate::extract::{CallInput, Extractor};
use crate::llm::{ChatModel, PromptBuilder};

/// Resolved transcript plus the model's reply, unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallAnalysisResult {
    pub transcript: String,
    pub analysis: String,
}

pub struct CallAnalyzer {
    llm: Arc<dyn ChatModel>,
    prompts: PromptBuilder,
    extractor: Extractor,
}

impl CallAnalyzer {
    pub fn new(llm: Arc<dyn ChatModel>, prompts: PromptBuilder, extractor: Extractor) -> Self {
        Self {
            llm,
            prompts,
            extractor,
        }
    }

    /// Resolve the input to text and ask the model for a quality review.
    /// The model is not contacted when extraction fails.
    pub async fn analyze(&self, input: CallInput) -> Result<CallAnalysisResult, AnalysisError> {
        let transcript = self.extractor.resolve(input).await?;

        let prompt = self.prompts.call_quality(&transcript);
        let analysis = self.llm.complete(&prompt).await.map_err(|e| {
            log::warn!("Call analysis model call failed: {e}");
            e
        })?;

        Ok(CallAnalysisResult {
            transcript,
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;
    use std::sync::atomic::Ordering;

    use crate::analysis::complaint::tests::ScriptedModel;
    use crate::extract::{ExtractError, LopdfExtractor, ScratchDir};
    use crate::stt::{AudioTranscriber, SttError};

    struct NoAudio;

    impl AudioTranscriber for NoAudio {
        fn transcribe_file(&self, _path: &Path) -> Result<String, SttError> {
            Err(SttError::EmptyAudio)
        }
    }

    fn analyzer(model: Arc<ScriptedModel>, scratch: &Path) -> CallAnalyzer {
        let extractor = Extractor::new(
            Arc::new(NoAudio),
            Arc::new(LopdfExtractor),
            ScratchDir::new(scratch),
        );
        CallAnalyzer::new(model, PromptBuilder::default(), extractor)
    }

    #[tokio::test]
    async fn transcript_and_raw_reply_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        let reply = "```json\n{\"summary\": \"Card unblocked\"}\n```";
        let model = Arc::new(ScriptedModel::replying(reply));

        let result = analyzer(model.clone(), dir.path())
            .analyze(CallInput::transcript("Agent: Hello\nCustomer: My card is blocked"))
            .await
            .unwrap();

        assert_eq!(result.transcript, "Agent: Hello\nCustomer: My card is blocked");
        assert_eq!(result.analysis, reply);

        let prompt = model.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt.system, "You analyze call center conversations.");
        assert!(prompt.user.contains("Customer: My card is blocked"));
        assert_eq!(prompt.temperature, 0.2);
    }

    #[tokio::test]
    async fn txt_upload_is_analysed() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::replying("ok"));

        let result = analyzer(model, dir.path())
            .analyze(CallInput::file("call.txt", b"Agent: Good morning".to_vec()))
            .await
            .unwrap();
        assert_eq!(result.transcript, "Agent: Good morning");
    }

    #[tokio::test]
    async fn missing_input_never_reaches_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::replying("unused"));

        let err = analyzer(model.clone(), dir.path())
            .analyze(CallInput::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Extract(ExtractError::MissingInput)));
        assert_eq!(err.to_string(), "Provide transcript text or file.");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transcription_failure_never_reaches_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::replying("unused"));

        let err = analyzer(model.clone(), dir.path())
            .analyze(CallInput::file("call.mp3", vec![0u8; 8]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Extract(ExtractError::Transcription(SttError::EmptyAudio))
        ));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
