//! File loading and merging for salon-desk configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{default_model, AssistantConfig, Config, StoreConfig};

/// Written on first run so users have something to edit.
const DEFAULT_CONFIG_TOML: &str = r#"# default_provider = "anthropic"

[provider.anthropic]
api_key = "{env:ANTHROPIC_API_KEY}"

[provider.openai]
api_key = "{env:OPENAI_API_KEY}"

[provider.openrouter]
api_key = "{env:OPENROUTER_API_KEY}"

[provider.ollama]
base_url = "http://localhost:11434"

[assistant]
max_tool_iterations = 8
unknown_tool = "apologize"
"#;

impl Config {
    /// Loads the global config from `~/.config/salon-desk/config.toml`.
    ///
    /// If no config file exists, creates one with defaults (including
    /// `{env:VAR}` placeholders for API keys) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, DEFAULT_CONFIG_TOML)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!(path = %path.display(), "created default config");
            return Self::parse(DEFAULT_CONFIG_TOML).context("Failed to parse default config");
        }
        Self::read(&path)
    }

    /// Look for salon.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                return Self::read(&candidate).map(Some);
            }
            // Stop at git root or filesystem root
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    pub(super) fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            // API keys stay in the global file
            provider: global.provider,
            system_prompt: project.system_prompt.or(global.system_prompt),
            default_provider: project.default_provider.or(global.default_provider),
            assistant: AssistantConfig {
                max_tool_iterations: project
                    .assistant
                    .max_tool_iterations
                    .or(global.assistant.max_tool_iterations),
                unknown_tool: project.assistant.unknown_tool.or(global.assistant.unknown_tool),
            },
            store: StoreConfig {
                seed_file: project.store.seed_file.or(global.store.seed_file),
            },
        }
    }
}
