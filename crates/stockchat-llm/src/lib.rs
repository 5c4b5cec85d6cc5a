//! Generative model layer for stockchat
//!
//! This crate provides the provider-agnostic pieces used to talk to a remote
//! text-generation service:
//!
//! - Message types for model communication
//! - Completion request/response types
//! - Provider trait for model implementations
//! - The Gemini generate-content provider (behind the `gemini` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
