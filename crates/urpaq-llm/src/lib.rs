//! urpaq-llm
//!
//! Client for an OpenAI-compatible chat-completion endpoint (LLM7 by default).
pub mod client;
pub mod error;
pub mod types;

pub use client::Llm7Client;
pub use error::LlmError;
