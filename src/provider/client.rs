//! rig-core backed implementation of [`ModelService`].
//!
//! [`RigService`] wraps a provider client behind enum dispatch and performs
//! exactly one completion request per [`ModelService::send_turn`]; tool
//! execution stays with the orchestration loop. Chat history lives in the
//! per-conversation [`RigSession`].

use anyhow::{Context, Result};
use rig::client::CompletionClient;
use rig::completion::{Completion, ToolDefinition as RigToolDefinition};
use rig::message::{AssistantContent, Message as RigMessage, Text, ToolCall as RigToolCall};
use rig::providers::{anthropic, openai, openrouter};
use rig::OneOrMany;

use super::kind::ProviderKind;
use super::resolve::ModelSelection;
use crate::config::Config;
use crate::constants::OPENING_PROMPT;
use crate::service::{FunctionCall, FunctionResponse, ModelResponse, ModelService, Opening};
use crate::store::ActionOutcome;
use crate::tools::ToolDefinition;

/// Internal enum wrapping provider-specific clients.
enum ClientKind {
    Anthropic(anthropic::Client),
    OpenAI(openai::Client),
    OpenRouter(openrouter::Client),
    Ollama(openai::Client),
}

/// A configured LLM provider ready to drive salon conversations.
///
/// Agents are constructed on each request since they are cheap to create.
pub struct RigService {
    client: ClientKind,
    model: String,
    system_prompt: String,
    tools: Vec<RigToolDefinition>,
}

/// Conversation state kept between requests.
#[derive(Default)]
pub struct RigSession {
    history: Vec<RigMessage>,
    /// The tool call the model is waiting on, if any.
    pending_call: Option<RigToolCall>,
}

/// Builds an agent from the given client, model, and system prompt, then
/// executes the provided block with the agent bound to `$agent`.
macro_rules! with_agent {
    ($client:expr, $model:expr, $sys:expr, |$agent:ident| $body:expr) => {{
        let $agent = $client
            .agent($model)
            .preamble($sys)
            .max_tokens(crate::constants::MAX_TOKENS)
            .build();
        $body
    }};
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`ClientKind`] and executes the same block for each variant,
/// letting the compiler monomorphize per provider.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::Anthropic($client) => $body,
            ClientKind::OpenAI($client) => $body,
            ClientKind::OpenRouter($client) => $body,
            ClientKind::Ollama($client) => $body,
        }
    };
}

impl RigService {
    /// Creates a new [`RigService`] from the loaded application config.
    ///
    /// Resolves the API key through the config precedence chain
    /// (env var → config file → substitution) and builds the appropriate
    /// provider client. `tools` are declared to the model on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is found for the selected provider
    /// or if client construction fails.
    pub fn from_config(
        config: &Config,
        selection: &ModelSelection,
        tools: Vec<ToolDefinition>,
    ) -> Result<Self> {
        let client = match selection.provider {
            ProviderKind::Anthropic => {
                let api_key = config
                    .resolve_api_key(ProviderKind::Anthropic)
                    .context("No API key found for Anthropic. Set ANTHROPIC_API_KEY or configure it in config.toml")?;
                ClientKind::Anthropic(
                    anthropic::Client::new(&api_key)
                        .context("Failed to create Anthropic client")?,
                )
            }
            ProviderKind::OpenAI => {
                let api_key = config
                    .resolve_api_key(ProviderKind::OpenAI)
                    .context("No API key found for OpenAI. Set OPENAI_API_KEY or configure it in config.toml")?;
                ClientKind::OpenAI(
                    openai::Client::new(&api_key).context("Failed to create OpenAI client")?,
                )
            }
            ProviderKind::OpenRouter => {
                let api_key = config
                    .resolve_api_key(ProviderKind::OpenRouter)
                    .context("No API key found for OpenRouter. Set OPENROUTER_API_KEY or configure it in config.toml")?;
                ClientKind::OpenRouter(
                    openrouter::Client::new(&api_key)
                        .context("Failed to create OpenRouter client")?,
                )
            }
            ProviderKind::Ollama => {
                let base_url = config
                    .provider
                    .ollama
                    .as_ref()
                    .and_then(|o| o.base_url.as_deref())
                    .unwrap_or(crate::constants::OLLAMA_DEFAULT_BASE_URL);
                ClientKind::Ollama(
                    openai::Client::builder()
                        .api_key("ollama")
                        .base_url(format!("{}/v1", base_url))
                        .build()
                        .context("Failed to create Ollama client")?,
                )
            }
        };

        Ok(Self {
            client,
            model: selection.model.clone(),
            system_prompt: config.system_prompt(),
            tools: tools
                .into_iter()
                .map(|t| RigToolDefinition {
                    name: t.name,
                    description: t.description,
                    parameters: t.parameters,
                })
                .collect(),
        })
    }

    /// Sends one completion request with the session history and tool
    /// declarations, returning the model's raw content items.
    async fn complete(
        &self,
        prompt: RigMessage,
        history: Vec<RigMessage>,
    ) -> Result<OneOrMany<AssistantContent>> {
        let tools = self.tools.clone();
        dispatch!(self, |client| {
            with_agent!(client, &self.model, &self.system_prompt, |agent| {
                let response = agent
                    .completion(prompt, history)
                    .await
                    .context("Failed to build completion request")?
                    .tools(tools)
                    .send()
                    .await
                    .context("Completion request failed")?;
                Ok(response.choice)
            })
        })
    }
}

#[async_trait::async_trait]
impl ModelService for RigService {
    type Session = RigSession;

    async fn start_session(&self) -> Result<Opening<RigSession>> {
        let mut session = RigSession::default();
        let response = self.send_turn(&mut session, OPENING_PROMPT).await?;
        if !response.function_calls.is_empty() {
            // Left pending; the next request closes it with a not-executed result
            tracing::warn!("model requested a tool in its greeting; ignoring");
        }
        Ok(Opening {
            text: response.text,
            session,
        })
    }

    async fn send_turn(&self, session: &mut RigSession, input: &str) -> Result<ModelResponse> {
        let (prompt, history) = session.begin_request(input);
        let choice = self.complete(prompt, history).await?;
        let response = session.record_reply(&choice);

        tracing::debug!(
            calls = response.function_calls.len(),
            history = session.history.len(),
            "model responded"
        );
        Ok(response)
    }
}

impl RigSession {
    /// Turns `input` into the next prompt and records it in history.
    ///
    /// Returns the prompt and the history that precedes it. An encoded
    /// [`FunctionResponse`] answers the pending call. Anything else is user
    /// text; a call still pending at that point is first closed with a
    /// not-executed result so every tool use in history has its result.
    fn begin_request(&mut self, input: &str) -> (RigMessage, Vec<RigMessage>) {
        let prompt = match (FunctionResponse::decode(input), self.pending_call.take()) {
            (Some(result), Some(call)) => {
                if result.name != call.function.name {
                    tracing::warn!(
                        expected = %call.function.name,
                        got = %result.name,
                        "tool result does not match the pending call"
                    );
                }
                tool_result_for(&call, result.response.to_string())
            }
            (_, pending) => {
                if let Some(call) = pending {
                    tracing::warn!(tool = %call.function.name, "pending tool call left unanswered");
                    self.history.push(tool_result_for(&call, not_executed()));
                }
                RigMessage::user(input)
            }
        };

        let history = self.history.clone();
        // Recorded before sending, so a failed request never leaves a call unanswered
        self.history.push(prompt.clone());
        (prompt, history)
    }

    /// Records the model's reply and extracts what the loop needs from it.
    ///
    /// Every requested call is returned, but only the first is kept in
    /// history and remembered as pending.
    fn record_reply(&mut self, choice: &OneOrMany<AssistantContent>) -> ModelResponse {
        let mut text = String::new();
        let mut function_calls = Vec::new();
        let mut first_call: Option<RigToolCall> = None;
        for item in choice.iter() {
            match item {
                AssistantContent::Text(Text { text: chunk, .. }) => text.push_str(chunk),
                AssistantContent::ToolCall(call) => {
                    function_calls.push(FunctionCall {
                        name: call.function.name.clone(),
                        args: call.function.arguments.clone(),
                    });
                    if first_call.is_none() {
                        first_call = Some(call.clone());
                    }
                }
                _ => {
                    // Reasoning and other content never reaches the customer
                }
            }
        }

        let mut items: Vec<AssistantContent> = Vec::new();
        if !text.is_empty() {
            items.push(AssistantContent::text(text.clone()));
        }
        if let Some(call) = &first_call {
            items.push(AssistantContent::ToolCall(call.clone()));
        }
        if let Ok(content) = OneOrMany::many(items) {
            self.history.push(RigMessage::Assistant { id: None, content });
        }
        self.pending_call = first_call;

        ModelResponse {
            text: (!text.is_empty()).then_some(text),
            function_calls,
        }
    }
}

/// A tool result addressed to `call`, carrying both ids providers match on.
fn tool_result_for(call: &RigToolCall, content: String) -> RigMessage {
    RigMessage::tool_result_with_call_id(call.id.clone(), call.call_id.clone(), content)
}

/// Result sent for a call the loop declined to run.
fn not_executed() -> String {
    serde_json::to_string(&ActionOutcome::failure("Not executed.".to_string())).unwrap_or_default()
}
