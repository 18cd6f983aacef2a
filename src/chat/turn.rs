//! The tool-calling orchestration loop.
//!
//! One user turn runs through these states:
//!
//! ```text
//! AwaitingUserInput -> ModelRequested -> ToolsPending -> ModelRequested -> ... -> Done
//! ```
//!
//! [`Conversation::submit`] sends the user's text, runs the first tool call
//! of each response against the store, feeds the result back and repeats
//! until the model answers with plain text. Only the user message and the
//! final reply reach the [`MessageLog`]. Every failure ends the turn with at
//! most one bot message; nothing is propagated to the caller.
//!
//! Store mutations are applied as each call resolves and are not rolled back
//! if a later model request in the same turn fails.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{
    INITIALIZATION_FAILURE, ITERATION_LIMIT_APOLOGY, MAX_TOOL_ITERATIONS,
    TOOL_CALLS_PER_ITERATION, TRANSPORT_APOLOGY, UNKNOWN_TOOL_APOLOGY,
};
use crate::message::{Message, MessageLog};
use crate::service::{FunctionCall, FunctionResponse, ModelResponse, ModelService};
use crate::store::AppointmentStore;
use crate::tools::ToolRegistry;

/// What to do when the model asks for a tool that is not registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownToolPolicy {
    /// End the turn with a short apology.
    #[default]
    Apologize,
    /// End the turn without any reply.
    Silent,
}

/// Tunables for the loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub max_tool_iterations: usize,
    pub unknown_tool: UnknownToolPolicy,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_tool_iterations: MAX_TOOL_ITERATIONS,
            unknown_tool: UnknownToolPolicy::default(),
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered in text after `tool_calls` tool executions.
    Replied { tool_calls: usize },
    /// Blank input; nothing was sent or logged.
    Ignored,
    /// The final response carried neither calls nor text.
    EmptyReply { tool_calls: usize },
    /// The model requested a tool outside the registry.
    UnknownTool { name: String },
    /// The model kept requesting tools past the iteration cap.
    IterationLimit,
    /// A model request failed.
    TransportFault,
}

/// A chat conversation: the store, the visible log and the tools that join them.
///
/// The model service and its session handle are not owned here; they are
/// passed into each call.
pub struct Conversation {
    store: AppointmentStore,
    log: MessageLog,
    tools: ToolRegistry,
    settings: LoopSettings,
}

impl Conversation {
    pub fn new(store: AppointmentStore, tools: ToolRegistry, settings: LoopSettings) -> Self {
        Self {
            store,
            log: MessageLog::new(),
            tools,
            settings,
        }
    }

    pub fn store(&self) -> &AppointmentStore {
        &self.store
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Opens a session and logs the model's greeting.
    ///
    /// On failure a single configuration hint is logged and `None` returned;
    /// the conversation cannot accept turns without a session.
    pub async fn initialize<M: ModelService>(&mut self, service: &M) -> Option<M::Session> {
        match service.start_session().await {
            Ok(opening) => {
                if let Some(text) = opening.text.filter(|t| !t.trim().is_empty()) {
                    self.log.append(Message::bot(text));
                }
                Some(opening.session)
            }
            Err(err) => {
                self.initialization_failed(&err);
                None
            }
        }
    }

    /// Records that no session could be opened.
    pub fn initialization_failed(&mut self, err: &anyhow::Error) {
        tracing::error!(error = %format!("{:#}", err), "failed to start chat session");
        self.log.append(Message::bot(INITIALIZATION_FAILURE));
    }

    /// Runs one user turn to completion.
    pub async fn submit<M: ModelService>(
        &mut self,
        service: &M,
        session: &mut M::Session,
        text: &str,
    ) -> TurnOutcome {
        if text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }
        self.log.append(Message::user(text));

        match self.drive(service, session, text).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "model request failed, turn aborted");
                self.log.append(Message::bot(TRANSPORT_APOLOGY));
                TurnOutcome::TransportFault
            }
        }
    }

    /// The request/tool/feedback cycle. Errors are model request failures.
    async fn drive<M: ModelService>(
        &mut self,
        service: &M,
        session: &mut M::Session,
        text: &str,
    ) -> Result<TurnOutcome> {
        let mut response = service.send_turn(session, text).await?;
        let mut tool_calls = 0;

        while let Some(call) = take_pending_call(&mut response) {
            if tool_calls >= self.settings.max_tool_iterations {
                tracing::warn!(
                    limit = self.settings.max_tool_iterations,
                    tool = %call.name,
                    "tool iteration limit reached, ending turn"
                );
                self.log.append(Message::bot(ITERATION_LIMIT_APOLOGY));
                return Ok(TurnOutcome::IterationLimit);
            }

            tracing::debug!(tool = %call.name, args = %call.args, "executing tool call");
            let Some(result) = self
                .tools
                .dispatch(&call.name, &call.args, &mut self.store)
                .await
            else {
                return Ok(self.unknown_tool(call.name));
            };
            tool_calls += 1;

            let payload = FunctionResponse::new(&call.name, &result)?.encode()?;
            response = service.send_turn(session, &payload).await?;
        }

        match response.text.filter(|t| !t.trim().is_empty()) {
            Some(reply) => {
                self.log.append(Message::bot(reply));
                Ok(TurnOutcome::Replied { tool_calls })
            }
            None => {
                tracing::warn!("model returned neither text nor tool calls");
                Ok(TurnOutcome::EmptyReply { tool_calls })
            }
        }
    }

    fn unknown_tool(&mut self, name: String) -> TurnOutcome {
        tracing::warn!(tool = %name, "model requested an unknown tool, ending turn");
        if self.settings.unknown_tool == UnknownToolPolicy::Apologize {
            self.log.append(Message::bot(UNKNOWN_TOOL_APOLOGY));
        }
        TurnOutcome::UnknownTool { name }
    }
}

/// Takes the call to execute from a response, discarding any extras.
fn take_pending_call(response: &mut ModelResponse) -> Option<FunctionCall> {
    let calls = std::mem::take(&mut response.function_calls);
    if calls.len() > TOOL_CALLS_PER_ITERATION {
        tracing::debug!(
            discarded = calls.len() - TOOL_CALLS_PER_ITERATION,
            "ignoring extra tool calls in one response"
        );
    }
    calls.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;
    use anyhow::anyhow;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed list of responses and records every input it receives.
    struct ScriptedService {
        opening: Option<Result<String, String>>,
        responses: Mutex<VecDeque<Result<ModelResponse, String>>>,
        inputs: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn new(responses: Vec<Result<ModelResponse, String>>) -> Self {
            Self {
                opening: Some(Ok("Welcome to Grandeur Salon!".into())),
                responses: Mutex::new(responses.into()),
                inputs: Mutex::new(Vec::new()),
            }
        }

        fn replies(responses: Vec<ModelResponse>) -> Self {
            Self::new(responses.into_iter().map(Ok).collect())
        }

        fn inputs(&self) -> Vec<String> {
            self.inputs.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ModelService for ScriptedService {
        type Session = usize;

        async fn start_session(&self) -> Result<crate::service::Opening<usize>> {
            match &self.opening {
                Some(Ok(text)) => Ok(crate::service::Opening {
                    text: Some(text.clone()),
                    session: 0,
                }),
                Some(Err(e)) => Err(anyhow!(e.clone())),
                None => Ok(crate::service::Opening {
                    text: None,
                    session: 0,
                }),
            }
        }

        async fn send_turn(&self, session: &mut usize, input: &str) -> Result<ModelResponse> {
            *session += 1;
            self.inputs.lock().unwrap().push(input.to_string());
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(response)) => Ok(response),
                Some(Err(e)) => Err(anyhow!(e)),
                None => Err(anyhow!("script exhausted")),
            }
        }
    }

    /// Requests `get_appointments` forever.
    struct LoopingService;

    #[async_trait::async_trait]
    impl ModelService for LoopingService {
        type Session = usize;

        async fn start_session(&self) -> Result<crate::service::Opening<usize>> {
            Ok(crate::service::Opening {
                text: None,
                session: 0,
            })
        }

        async fn send_turn(&self, session: &mut usize, _input: &str) -> Result<ModelResponse> {
            *session += 1;
            Ok(ModelResponse::call(
                "get_appointments",
                json!({"customer_name": "Jane Doe"}),
            ))
        }
    }

    fn conversation() -> Conversation {
        conversation_with(LoopSettings::default())
    }

    fn conversation_with(settings: LoopSettings) -> Conversation {
        Conversation::new(
            AppointmentStore::seeded(),
            ToolRegistry::with_builtins(),
            settings,
        )
    }

    fn bot_messages(conv: &Conversation) -> Vec<String> {
        conv.log()
            .all()
            .iter()
            .filter(|m| m.sender == Sender::Bot)
            .map(|m| m.text.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_logs_greeting() {
        let service = ScriptedService::replies(vec![]);
        let mut conv = conversation();
        let session = conv.initialize(&service).await;
        assert_eq!(session, Some(0));
        assert_eq!(bot_messages(&conv), vec!["Welcome to Grandeur Salon!"]);
    }

    #[tokio::test]
    async fn test_initialize_failure_logs_hint() {
        let mut service = ScriptedService::replies(vec![]);
        service.opening = Some(Err("401 unauthorized".into()));
        let mut conv = conversation();
        assert!(conv.initialize(&service).await.is_none());
        assert_eq!(bot_messages(&conv), vec![INITIALIZATION_FAILURE]);
    }

    #[tokio::test]
    async fn test_initialize_without_greeting_logs_nothing() {
        let mut service = ScriptedService::replies(vec![]);
        service.opening = None;
        let mut conv = conversation();
        assert!(conv.initialize(&service).await.is_some());
        assert!(conv.log().is_empty());
    }

    #[tokio::test]
    async fn test_plain_text_reply() {
        let service = ScriptedService::replies(vec![ModelResponse::text("Hi! How can I help?")]);
        let mut conv = conversation();
        let mut session = 0;
        let outcome = conv.submit(&service, &mut session, "hello").await;

        assert_eq!(outcome, TurnOutcome::Replied { tool_calls: 0 });
        assert_eq!(service.inputs(), vec!["hello"]);
        let log = conv.log().all();
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].sender, log[0].text.as_str()), (Sender::User, "hello"));
        assert_eq!(
            (log[1].sender, log[1].text.as_str()),
            (Sender::Bot, "Hi! How can I help?")
        );
    }

    #[tokio::test]
    async fn test_user_text_sent_and_logged_as_typed() {
        let service = ScriptedService::replies(vec![ModelResponse::text("Sure!")]);
        let mut conv = conversation();
        let mut session = 0;
        conv.submit(&service, &mut session, "  Cancel, please ").await;

        assert_eq!(service.inputs(), vec!["  Cancel, please "]);
        assert_eq!(conv.log().all()[0].text, "  Cancel, please ");
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let service = ScriptedService::replies(vec![]);
        let mut conv = conversation();
        let mut session = 0;
        assert_eq!(
            conv.submit(&service, &mut session, "   ").await,
            TurnOutcome::Ignored
        );
        assert!(conv.log().is_empty());
        assert!(service.inputs().is_empty());
    }

    #[tokio::test]
    async fn test_query_then_reschedule_then_reply() {
        let service = ScriptedService::replies(vec![
            ModelResponse::call("get_appointments", json!({"customer_name": "Jane Doe"})),
            ModelResponse::call(
                "reschedule_appointment",
                json!({
                    "customer_name": "Jane Doe",
                    "original_date": "2024-08-15",
                    "new_date": "2024-08-20",
                    "new_time": "11:00 AM"
                }),
            ),
            ModelResponse::text("Done!"),
        ]);
        let mut conv = conversation();
        let before = conv.store().clone();
        let mut session = 0;
        let outcome = conv
            .submit(&service, &mut session, "move my Aug 15 appointment")
            .await;

        assert_eq!(outcome, TurnOutcome::Replied { tool_calls: 2 });
        assert_eq!(session, 3);

        // exactly one record changed
        let changed: Vec<u32> = conv
            .store()
            .all()
            .iter()
            .filter(|&a| before.get(a.id) != Some(a))
            .map(|a| a.id)
            .collect();
        assert_eq!(changed, vec![1]);
        assert_eq!(conv.store().get(1).unwrap().date, "2024-08-20");

        // user message then a single bot reply
        let log = conv.log().all();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender, Sender::User);
        assert_eq!(log[1].text, "Done!");

        // tool results were fed back as envelopes, in order
        let inputs = service.inputs();
        let first = FunctionResponse::decode(&inputs[1]).unwrap();
        assert_eq!(first.name, "get_appointments");
        assert_eq!(first.response[0]["id"], 1);
        assert_eq!(first.response[1]["id"], 3);
        let second = FunctionResponse::decode(&inputs[2]).unwrap();
        assert_eq!(second.name, "reschedule_appointment");
        assert_eq!(second.response["success"], true);
    }

    #[tokio::test]
    async fn test_mutation_visible_to_next_query_in_same_turn() {
        let service = ScriptedService::replies(vec![
            ModelResponse::call(
                "cancel_appointment",
                json!({"customer_name": "John Smith", "appointment_date": "2024-08-16"}),
            ),
            ModelResponse::call("get_appointments", json!({"customer_name": "John Smith"})),
            ModelResponse::text("All cleared."),
        ]);
        let mut conv = conversation();
        let mut session = 0;
        conv.submit(&service, &mut session, "cancel please").await;

        let inputs = service.inputs();
        let listing = FunctionResponse::decode(&inputs[2]).unwrap();
        assert_eq!(listing.response, json!([]));
        assert_eq!(conv.store().len(), 4);
    }

    #[tokio::test]
    async fn test_only_first_call_runs() {
        let mut response = ModelResponse::call(
            "cancel_appointment",
            json!({"customer_name": "John Smith", "appointment_date": "2024-08-16"}),
        );
        response.function_calls.push(FunctionCall {
            name: "cancel_appointment".into(),
            args: json!({"customer_name": "Emily White", "appointment_date": "2024-08-16"}),
        });
        let service = ScriptedService::replies(vec![response, ModelResponse::text("Canceled.")]);
        let mut conv = conversation();
        let mut session = 0;
        let outcome = conv.submit(&service, &mut session, "cancel").await;

        assert_eq!(outcome, TurnOutcome::Replied { tool_calls: 1 });
        assert!(conv.store().get(2).is_none());
        assert!(conv.store().get(4).is_some());
        assert_eq!(TOOL_CALLS_PER_ITERATION, 1);
    }

    #[tokio::test]
    async fn test_text_alongside_calls_is_ignored() {
        let mut response = ModelResponse::call("get_appointments", json!({"customer_name": "Jane Doe"}));
        response.text = Some("Let me check...".into());
        let service = ScriptedService::replies(vec![response, ModelResponse::text("You have two.")]);
        let mut conv = conversation();
        let mut session = 0;
        conv.submit(&service, &mut session, "what do I have?").await;
        assert_eq!(bot_messages(&conv), vec!["You have two."]);
    }

    #[tokio::test]
    async fn test_unknown_tool_apologizes_by_default() {
        let service = ScriptedService::replies(vec![
            ModelResponse::call("book_appointment", json!({})),
            ModelResponse::text("never sent"),
        ]);
        let mut conv = conversation();
        let mut session = 0;
        let outcome = conv.submit(&service, &mut session, "book me in").await;

        assert_eq!(
            outcome,
            TurnOutcome::UnknownTool {
                name: "book_appointment".into()
            }
        );
        assert_eq!(service.inputs().len(), 1);
        assert_eq!(bot_messages(&conv), vec![UNKNOWN_TOOL_APOLOGY]);
        assert_eq!(conv.store().len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_tool_silent_policy() {
        let service = ScriptedService::replies(vec![ModelResponse::call("book_appointment", json!({}))]);
        let mut conv = conversation_with(LoopSettings {
            unknown_tool: UnknownToolPolicy::Silent,
            ..LoopSettings::default()
        });
        let mut session = 0;
        conv.submit(&service, &mut session, "book me in").await;

        assert_eq!(conv.log().len(), 1);
        assert_eq!(conv.log().last().unwrap().sender, Sender::User);
    }

    #[tokio::test]
    async fn test_iteration_limit_appends_one_fallback() {
        let service = LoopingService;
        let mut conv = conversation();
        let mut session = 0;
        let outcome = conv.submit(&service, &mut session, "loop forever").await;

        assert_eq!(outcome, TurnOutcome::IterationLimit);
        // the first request plus one per executed call
        assert_eq!(session, MAX_TOOL_ITERATIONS + 1);
        assert_eq!(bot_messages(&conv), vec![ITERATION_LIMIT_APOLOGY]);
    }

    #[tokio::test]
    async fn test_iteration_limit_is_configurable() {
        let mut conv = conversation_with(LoopSettings {
            max_tool_iterations: 2,
            ..LoopSettings::default()
        });
        let mut session = 0;
        let outcome = conv.submit(&LoopingService, &mut session, "loop").await;
        assert_eq!(outcome, TurnOutcome::IterationLimit);
        assert_eq!(session, 3);
    }

    #[tokio::test]
    async fn test_transport_fault_keeps_applied_mutations() {
        let service = ScriptedService::new(vec![
            Ok(ModelResponse::call(
                "cancel_appointment",
                json!({"customer_name": "John Smith", "appointment_date": "2024-08-16"}),
            )),
            Err("connection reset".into()),
        ]);
        let mut conv = conversation();
        let mut session = 0;
        let outcome = conv.submit(&service, &mut session, "cancel").await;

        assert_eq!(outcome, TurnOutcome::TransportFault);
        assert_eq!(conv.store().len(), 4);
        assert_eq!(bot_messages(&conv), vec![TRANSPORT_APOLOGY]);
    }

    #[tokio::test]
    async fn test_transport_fault_on_first_request() {
        let service = ScriptedService::new(vec![Err("quota exceeded".into())]);
        let mut conv = conversation();
        let mut session = 0;
        let outcome = conv.submit(&service, &mut session, "hello").await;

        assert_eq!(outcome, TurnOutcome::TransportFault);
        assert_eq!(conv.log().len(), 2);
        assert_eq!(conv.store().len(), 5);
    }

    #[tokio::test]
    async fn test_empty_reply_appends_nothing() {
        let service = ScriptedService::replies(vec![ModelResponse::default()]);
        let mut conv = conversation();
        let mut session = 0;
        let outcome = conv.submit(&service, &mut session, "hello").await;

        assert_eq!(outcome, TurnOutcome::EmptyReply { tool_calls: 0 });
        assert_eq!(conv.log().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_fed_back() {
        let service = ScriptedService::replies(vec![
            ModelResponse::call("cancel_appointment", json!({"customer_name": "John Smith"})),
            ModelResponse::text("Which date was that?"),
        ]);
        let mut conv = conversation();
        let mut session = 0;
        let outcome = conv.submit(&service, &mut session, "cancel mine").await;

        assert_eq!(outcome, TurnOutcome::Replied { tool_calls: 1 });
        let fed_back = FunctionResponse::decode(&service.inputs()[1]).unwrap();
        assert_eq!(fed_back.response["success"], false);
        assert_eq!(conv.store().len(), 5);
    }

    #[tokio::test]
    async fn test_turns_accumulate_in_order() {
        let service = ScriptedService::replies(vec![
            ModelResponse::text("first"),
            ModelResponse::text("second"),
        ]);
        let mut conv = conversation();
        let mut session = conv.initialize(&service).await.unwrap();
        conv.submit(&service, &mut session, "one").await;
        conv.submit(&service, &mut session, "two").await;

        let texts: Vec<&str> = conv.log().all().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Welcome to Grandeur Salon!", "one", "first", "two", "second"]
        );
    }
}
