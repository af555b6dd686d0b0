//! Application settings structs, defaults, TOML loading and environment
//! overrides.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across
//! request handlers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AppPaths;

/// Environment variable carrying the upstream API key.
pub const ENV_API_KEY: &str = "API_KEY";
/// Environment variable carrying the upstream base URL.
pub const ENV_BASE_URL: &str = "BASE_URL";
/// Environment variable carrying the upstream model name.
pub const ENV_MODEL_NAME: &str = "MODEL_NAME";

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Fatal startup errors.  The process refuses to start on any of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent or empty.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// The settings file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`AppConfig`].
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the upstream chat-completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API, including any version prefix
    /// (e.g. `https://api.deepseek.com/v1`).  `/chat/completions` is
    /// appended.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature for complaint analysis.
    pub complaint_temperature: f32,
    /// Sampling temperature for call analysis.
    pub call_temperature: f32,
    /// Optional completion token cap.  `None` leaves it to the provider.
    pub max_tokens: Option<u32>,
    /// Maximum seconds to wait for an upstream response.
    pub timeout_secs: u64,
    /// Skip TLS certificate verification (self-signed demo gateways only).
    pub accept_invalid_certs: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: String::new(),
            complaint_temperature: 0.0,
            call_temperature: 0.2,
            max_tokens: None,
            timeout_secs: 120,
            accept_invalid_certs: false,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Whisper STT engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Path to the GGML model file, loaded on the first audio upload.
    pub model_path: PathBuf,
    /// ISO-639-1 language code, or `"auto"` for Whisper's detection.
    pub language: String,
    /// Run inference on the GPU (enables reduced-precision kernels).  Leave
    /// off on CPU-only hosts.
    pub use_gpu: bool,
    /// Inference threads; `None` picks a value from the available cores.
    pub n_threads: Option<i32>,
    /// Beam width for beam-search decoding.  `None` or anything below 2
    /// decodes greedily.
    pub beam_size: Option<i32>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_path: AppPaths::new().models_dir.join("ggml-small.bin"),
            language: "auto".into(),
            use_gpu: false,
            n_threads: None,
            beam_size: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Listener and upload settings for the two HTTP services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address of the complaint analyzer.
    pub complaint_addr: SocketAddr,
    /// Bind address of the call-analysis service.
    pub call_addr: SocketAddr,
    /// Directory for upload scratch files.
    pub upload_dir: PathBuf,
    /// Largest accepted multipart body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            complaint_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            call_addr: SocketAddr::from(([0, 0, 0, 0], 8001)),
            upload_dir: AppPaths::new().upload_dir,
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// The three upstream settings (`API_KEY`, `BASE_URL`, `MODEL_NAME`) are
/// normally supplied through the environment or a `.env` file and override
/// whatever the file says.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream model settings.
    pub llm: LlmConfig,
    /// STT engine settings.
    pub stt: SttConfig,
    /// HTTP listener settings.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Full startup load: `.env`, settings file, environment overrides,
    /// validation.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }

        let mut config = Self::load_from(&AppPaths::new().settings_file)?;
        config.apply_env_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path.  A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Override the upstream settings from `lookup` (normally the process
    /// environment).  Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.llm.api_key = key;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.llm.base_url = url;
        }
        if let Some(model) = get(ENV_MODEL_NAME) {
            self.llm.model = model;
        }
    }

    /// Reject a configuration that lacks any of the required upstream
    /// settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (ENV_API_KEY, &self.llm.api_key),
            (ENV_BASE_URL, &self.llm.base_url),
            (ENV_MODEL_NAME, &self.llm.model),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
