//! Struct definitions and serde defaults for salon-desk configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chat::UnknownToolPolicy;

/// Root configuration, deserialized from `config.toml`.
///
/// Fields use serde defaults so the assistant runs with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default model identifier (e.g. `"claude-sonnet-4-6"`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Default provider name (e.g., "anthropic", "openai").
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Overrides the built-in salon system instruction.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Orchestration loop settings.
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Appointment data settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Returns the default model identifier.
///
/// Used by serde's `#[serde(default)]` attribute during deserialization.
pub(super) fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

/// Provider-specific configuration map.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    pub openai: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
}

/// Connection details for a single LLM provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderEntry {
    /// API key for authentication. Can also be set via environment variables.
    pub api_key: Option<String>,
    /// Custom base URL (only honored for Ollama).
    pub base_url: Option<String>,
}

/// Tuning for the tool-calling loop.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct AssistantConfig {
    /// Maximum tool calls executed within one user turn.
    pub max_tool_iterations: Option<usize>,
    /// Reply behavior when the model requests an unregistered tool.
    pub unknown_tool: Option<UnknownToolPolicy>,
}

/// Where the starting appointments come from.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// TOML file with `[[appointments]]` entries. The built-in bookings are
    /// used when unset.
    pub seed_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            provider: ProviderConfig::default(),
            default_provider: None,
            system_prompt: None,
            assistant: AssistantConfig::default(),
            store: StoreConfig::default(),
        }
    }
}
