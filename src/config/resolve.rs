//! Environment variable substitution and derived settings.

use super::types::{Config, ProviderEntry};

use crate::chat::LoopSettings;
use crate::constants::SYSTEM_INSTRUCTION;
use crate::provider::ProviderKind;

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.model = Self::resolve_str(&self.model);
        if let Some(ref mut sp) = self.system_prompt {
            *sp = Self::resolve_str(sp);
        }
        if let Some(ref mut dp) = self.default_provider {
            *dp = Self::resolve_str(dp);
        }
        Self::resolve_provider_entry(&mut self.provider.openai);
        Self::resolve_provider_entry(&mut self.provider.anthropic);
        Self::resolve_provider_entry(&mut self.provider.ollama);
        Self::resolve_provider_entry(&mut self.provider.openrouter);
    }

    /// Resolves `{env:VAR}` patterns in a single provider entry's `api_key` and `base_url`.
    fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
        if let Some(ref mut e) = entry {
            if let Some(ref mut key) = e.api_key {
                *key = Self::resolve_str(key);
            }
            if let Some(ref mut url) = e.base_url {
                *url = Self::resolve_str(url);
            }
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        while let Some(start) = result.find("{env:") {
            if let Some(end) = result[start..].find('}') {
                let var_name = &result[start + 5..start + end];
                let value = std::env::var(var_name).unwrap_or_default();
                result = format!(
                    "{}{}{}",
                    &result[..start],
                    value,
                    &result[start + end + 1..]
                );
            } else {
                break;
            }
        }
        result
    }

    /// Resolve API key for a provider: env var first, then config value.
    ///
    /// Empty values (e.g. an unset `{env:VAR}` placeholder) count as missing.
    pub fn resolve_api_key(&self, provider: ProviderKind) -> Option<String> {
        let env_key = format!("{}_API_KEY", provider.key().to_uppercase());
        if let Ok(val) = std::env::var(&env_key) {
            if !val.is_empty() {
                return Some(val);
            }
        }

        let entry = match provider {
            ProviderKind::OpenAI => &self.provider.openai,
            ProviderKind::Anthropic => &self.provider.anthropic,
            ProviderKind::Ollama => &self.provider.ollama,
            ProviderKind::OpenRouter => &self.provider.openrouter,
        };
        entry
            .as_ref()
            .and_then(|e| e.api_key.clone())
            .filter(|k| !k.is_empty())
    }

    /// Get the configured default provider name, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// Get the model name from config, stripping provider prefix if present.
    /// Returns None if the model is the compile-time default (meaning user hasn't configured it).
    pub fn model_name(&self) -> Option<String> {
        let m = &self.model;
        if m == crate::constants::DEFAULT_MODEL {
            return None;
        }
        if let Some((_prov, model)) = m.split_once('/') {
            Some(model.to_string())
        } else {
            Some(m.to_string())
        }
    }

    /// The preamble sent to the model: the configured override or the
    /// built-in salon instruction.
    pub fn system_prompt(&self) -> String {
        self.system_prompt
            .clone()
            .unwrap_or_else(|| SYSTEM_INSTRUCTION.to_string())
    }

    /// Loop settings with built-in defaults filled in.
    pub fn loop_settings(&self) -> LoopSettings {
        let defaults = LoopSettings::default();
        LoopSettings {
            max_tool_iterations: self
                .assistant
                .max_tool_iterations
                .unwrap_or(defaults.max_tool_iterations),
            unknown_tool: self.assistant.unknown_tool.unwrap_or(defaults.unknown_tool),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::UnknownToolPolicy;

    #[test]
    fn test_resolve_str_substitutes_env() {
        std::env::set_var("SALON_DESK_TEST_VAR", "secret");
        assert_eq!(
            Config::resolve_str("key-{env:SALON_DESK_TEST_VAR}-end"),
            "key-secret-end"
        );
        assert_eq!(Config::resolve_str("{env:SALON_DESK_UNSET_VAR}"), "");
        assert_eq!(Config::resolve_str("{env:broken"), "{env:broken");
    }

    #[test]
    fn test_loop_settings_defaults() {
        let settings = Config::default().loop_settings();
        assert_eq!(settings.max_tool_iterations, crate::constants::MAX_TOOL_ITERATIONS);
        assert_eq!(settings.unknown_tool, UnknownToolPolicy::Apologize);
    }

    #[test]
    fn test_system_prompt_falls_back_to_instruction() {
        assert!(Config::default().system_prompt().contains("Grandeur Salon"));
        let config = Config {
            system_prompt: Some("Be brief.".into()),
            ..Config::default()
        };
        assert_eq!(config.system_prompt(), "Be brief.");
    }

    #[test]
    fn test_model_name_strips_prefix() {
        let config = Config {
            model: "openai/gpt-4.1".into(),
            ..Config::default()
        };
        assert_eq!(config.model_name().as_deref(), Some("gpt-4.1"));
        assert_eq!(Config::default().model_name(), None);
    }
}
