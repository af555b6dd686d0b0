//! Whisper run settings, derived from [`SttConfig`].

use crate::config::SttConfig;

// ---------------------------------------------------------------------------
// SamplingStrategy
// ---------------------------------------------------------------------------

/// Owned counterpart of `whisper_rs::SamplingStrategy`.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingStrategy {
    Greedy { best_of: i32 },
    BeamSearch { beam_size: i32, patience: f32 },
}

impl SamplingStrategy {
    pub(crate) fn to_whisper(&self) -> whisper_rs::SamplingStrategy {
        match *self {
            Self::Greedy { best_of } => whisper_rs::SamplingStrategy::Greedy { best_of },
            Self::BeamSearch {
                beam_size,
                patience,
            } => whisper_rs::SamplingStrategy::BeamSearch {
                beam_size,
                patience,
            },
        }
    }
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        Self::Greedy { best_of: 1 }
    }
}

impl SamplingStrategy {
    /// Beam search for a configured width of 2 or more, greedy otherwise.
    /// Patience is left to whisper.cpp.
    pub fn from_beam_size(beam_size: Option<i32>) -> Self {
        match beam_size {
            Some(beam_size) if beam_size > 1 => Self::BeamSearch {
                beam_size,
                patience: -1.0,
            },
            _ => Self::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// TranscribeParams
// ---------------------------------------------------------------------------

/// How the model is loaded and how every upload is decoded.
///
/// ```
/// use banking_ai::stt::TranscribeParams;
///
/// let params = TranscribeParams {
///     language: "en".into(),
///     ..TranscribeParams::default()
/// };
/// assert!(!params.use_gpu);
/// ```
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 code; `"auto"` lets Whisper detect it.
    pub language: String,

    pub strategy: SamplingStrategy,

    pub n_threads: i32,

    /// Keep whisper.cpp quiet on stderr.
    pub suppress_progress: bool,

    /// Load the model onto the GPU.  Half-precision kernels are only used on
    /// that path, so CPU hosts keep full `f32` arithmetic.
    pub use_gpu: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            strategy: SamplingStrategy::default(),
            n_threads: optimal_threads(),
            suppress_progress: true,
            use_gpu: false,
        }
    }
}

impl TranscribeParams {
    /// `None` for automatic detection.
    pub fn language(&self) -> Option<&str> {
        match self.language.trim() {
            "" | "auto" => None,
            code => Some(code),
        }
    }

    pub fn from_config(config: &SttConfig) -> Self {
        Self {
            language: config.language.clone(),
            strategy: SamplingStrategy::from_beam_size(config.beam_size),
            n_threads: config.n_threads.filter(|n| *n > 0).unwrap_or_else(optimal_threads),
            use_gpu: config.use_gpu,
            ..Self::default()
        }
    }
}

/// Available cores, at most 8.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimal_threads_is_positive_and_at_most_8() {
        let t = optimal_threads();
        assert!((1..=8).contains(&t));
    }

    #[test]
    fn from_config_copies_language_and_gpu_flag() {
        let config = SttConfig {
            language: "en".into(),
            use_gpu: true,
            n_threads: Some(3),
            ..SttConfig::default()
        };
        let params = TranscribeParams::from_config(&config);
        assert_eq!(params.language, "en");
        assert!(params.use_gpu);
        assert_eq!(params.n_threads, 3);
        assert_eq!(params.strategy, SamplingStrategy::Greedy { best_of: 1 });
    }

    #[test]
    fn beam_size_selects_beam_search() {
        let config = SttConfig {
            beam_size: Some(5),
            ..SttConfig::default()
        };
        assert_eq!(
            TranscribeParams::from_config(&config).strategy,
            SamplingStrategy::BeamSearch {
                beam_size: 5,
                patience: -1.0
            }
        );
        assert!(matches!(
            TranscribeParams::from_config(&config).strategy.to_whisper(),
            whisper_rs::SamplingStrategy::BeamSearch { beam_size: 5, .. }
        ));
    }

    #[test]
    fn beam_width_of_one_stays_greedy() {
        for beam_size in [None, Some(1), Some(0), Some(-3)] {
            assert_eq!(
                SamplingStrategy::from_beam_size(beam_size),
                SamplingStrategy::Greedy { best_of: 1 }
            );
        }
    }

    #[test]
    fn auto_language_means_detection() {
        let mut params = TranscribeParams::default();
        assert_eq!(params.language(), None);
        params.language = "en".into();
        assert_eq!(params.language(), Some("en"));
    }

    #[test]
    fn non_positive_thread_count_falls_back_to_auto() {
        let config = SttConfig {
            n_threads: Some(0),
            ..SttConfig::default()
        };
        assert_eq!(TranscribeParams::from_config(&config).n_threads, optimal_threads());
    }
}
