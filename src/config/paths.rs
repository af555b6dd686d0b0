//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\banking-ai\
//!   macOS:   ~/Library/Application Support/banking-ai/
//!   Linux:   ~/.config/banking-ai/
//!
//! Data dir (Whisper models):
//!   Windows: %LOCALAPPDATA%\banking-ai\
//!   macOS:   ~/Library/Application Support/banking-ai/
//!   Linux:   ~/.local/share/banking-ai/
//!
//! Upload scratch files live under the system temp dir so they never end up
//! next to user data.

use std::path::PathBuf;

/// Environment variable that points at an explicit `settings.toml`.
pub const CONFIG_PATH_ENV: &str = "BANKING_AI_CONFIG";

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for GGML model files.
    pub models_dir: PathBuf,
    /// Directory where uploads are staged before extraction.
    pub upload_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "banking-ai";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.  `$BANKING_AI_CONFIG` overrides the settings file.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join("settings.toml"));
        let models_dir = data_dir.join("models");
        let upload_dir = std::env::temp_dir().join(Self::APP_NAME).join("uploads");

        Self {
            config_dir,
            settings_file,
            models_dir,
            upload_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
