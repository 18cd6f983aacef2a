//! Tools the model may call against the appointment store.
//!
//! Every tool implements [`Tool`]; [`ToolRegistry`] maps tool names to
//! handlers and turns argument errors into structured failure results so a
//! bad call never aborts the turn.

pub mod args;
pub mod cancel;
pub mod get_appointments;
pub mod reschedule;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use cancel::CancelTool;
use get_appointments::GetAppointmentsTool;
use reschedule::RescheduleTool;

use crate::store::{ActionOutcome, Appointment, AppointmentStore};

/// The payload handed back to the model after a tool runs.
///
/// Serializes untagged: a bare array for appointment listings, a
/// `{success, message}` object for everything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Appointments(Vec<Appointment>),
    Outcome(ActionOutcome),
}

impl ToolResult {
    pub fn invalid_arguments(tool: &str, err: &ToolError) -> Self {
        Self::Outcome(ActionOutcome::failure(format!(
            "Invalid arguments for {}: {}",
            tool, err
        )))
    }
}

/// Why a tool refused its arguments.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("arguments must be a JSON object")]
    NotAnObject,
    #[error("missing required argument `{0}`")]
    MissingArgument(String),
    #[error("argument `{0}` must be a string, number or boolean")]
    UnsupportedType(String),
    #[error("{0}")]
    Malformed(String),
}

/// Definition sent to the LLM so it knows what tools are available.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the LLM uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description sent with the tool declaration.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Run the tool against the store with the model's raw arguments.
    async fn execute(
        &self,
        store: &mut AppointmentStore,
        args: &Value,
    ) -> Result<ToolResult, ToolError>;
}

/// Holds all registered tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(Arc::from(tool));
    }

    /// Create a registry with the three appointment tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(GetAppointmentsTool));
        registry.register(Box::new(RescheduleTool));
        registry.register(Box::new(CancelTool));
        registry
    }

    /// Produce definitions for the LLM (sent in every request).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Look up a tool by name and execute it.
    ///
    /// Returns `None` for an unknown tool; nothing is executed in that case.
    /// Argument errors come back as a failed [`ToolResult`].
    pub async fn dispatch(
        &self,
        name: &str,
        args: &Value,
        store: &mut AppointmentStore,
    ) -> Option<ToolResult> {
        let tool = self.get(name)?;
        match tool.execute(store, args).await {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "rejected tool arguments");
                Some(ToolResult::invalid_arguments(name, &err))
            }
        }
    }

    /// How many tools are registered.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tools.len()
    }
}
