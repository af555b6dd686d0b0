//! Upstream language-model access.
//!
//! This module provides:
//! * [`ChatModel`]: async trait implemented by all chat backends.
//! * [`ApiChatModel`]: OpenAI-compatible REST implementation.
//! * [`PromptBuilder`] / [`ChatPrompt`]: the complaint and call-quality
//!   prompt templates.
//! * [`recover`] / [`Recovered`]: tolerant JSON extraction from replies.
//! * [`LlmError`]: error variants for model calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use banking_ai::config::AppConfig;
//! use banking_ai::llm::{recover, ApiChatModel, ChatModel, PromptBuilder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::load().unwrap();
//!     let model = ApiChatModel::from_config(&config.llm);
//!     let prompts = PromptBuilder::from_config(&config.llm);
//!
//!     let reply = model
//!         .complete(&prompts.complaint("My card was stolen"))
//!         .await
//!         .unwrap();
//!     let parsed = recover(&reply);
//!     println!("{}", parsed.path(&["priority", "level"]));
//! }
//! ```

pub mod client;
pub mod prompt;
pub mod recovery;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiChatModel, ChatModel, LlmError};
pub use prompt::{ChatPrompt, PromptBuilder};
pub use recovery::{recover, Recovered};
