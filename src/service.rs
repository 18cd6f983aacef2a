//! The model service boundary.
//!
//! The orchestration loop talks to the language model only through
//! [`ModelService`]. A session handle is opaque to the loop: it is created by
//! [`ModelService::start_session`] and passed back into every
//! [`ModelService::send_turn`]. Input is always a string, either the user's
//! raw text or a JSON-encoded [`FunctionResponse`] envelope; telling the two
//! apart is the service's job.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolResult;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Untyped arguments, validated by the tool before use.
    #[serde(default)]
    pub args: Value,
}

/// What the model said in reply to one input.
///
/// `text` is ignored by the loop while `function_calls` is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub function_calls: Vec<FunctionCall>,
}

#[cfg(test)]
impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_calls: Vec::new(),
        }
    }

    pub fn call(name: impl Into<String>, args: Value) -> Self {
        Self {
            text: None,
            function_calls: vec![FunctionCall {
                name: name.into(),
                args,
            }],
        }
    }
}

/// The result of opening a session: the greeting (if any) and the handle.
pub struct Opening<S> {
    pub text: Option<String>,
    pub session: S,
}

/// A conversational model that may request tool calls.
#[async_trait::async_trait]
pub trait ModelService: Send + Sync {
    /// Per-conversation state held by the service, opaque to callers.
    type Session: Send;

    /// Opens a new conversation and returns the model's greeting.
    async fn start_session(&self) -> Result<Opening<Self::Session>>;

    /// Sends one input and waits for the model's reply.
    async fn send_turn(&self, session: &mut Self::Session, input: &str) -> Result<ModelResponse>;
}

/// Tool output fed back to the model, keyed by the tool that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    function_response: FunctionResponse,
}

impl FunctionResponse {
    pub fn new(name: &str, result: &ToolResult) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            response: serde_json::to_value(result)?,
        })
    }

    /// Encodes as `{"functionResponse":{"name":..,"response":..}}`.
    pub fn encode(self) -> Result<String> {
        Ok(serde_json::to_string(&Envelope {
            function_response: self,
        })?)
    }

    /// Parses an encoded envelope; `None` if `input` is plain user text.
    pub fn decode(input: &str) -> Option<Self> {
        serde_json::from_str::<Envelope>(input)
            .ok()
            .map(|e| e.function_response)
    }
}
