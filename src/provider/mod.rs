//! LLM provider backends for the salon assistant.
//!
//! Wraps rig-core's provider clients behind [`RigService`], the production
//! [`ModelService`](crate::service::ModelService). Supports Anthropic,
//! OpenAI, OpenRouter, and Ollama (local) via [`ProviderKind`].

mod client;
mod kind;
mod resolve;

pub use client::RigService;
pub use kind::ProviderKind;
pub use resolve::{resolve_model, ModelSelection};
