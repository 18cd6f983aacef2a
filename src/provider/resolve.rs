//! Picks the provider and model for a chat session.
//!
//! Priority: CLI flags > config (project over global) > built-in defaults.
//! A `provider/model` shorthand in `--model` selects both at once when
//! `--provider` is omitted.

use anyhow::Result;

use super::kind::ProviderKind;
use crate::config::Config;
use crate::constants::DEFAULT_PROVIDER;

/// Resolved provider + model pair.
#[derive(Debug, PartialEq)]
pub struct ModelSelection {
    pub provider: ProviderKind,
    pub model: String,
}

/// Resolve which provider and model to use.
///
/// Accepts these formats:
///   --model anthropic/claude-sonnet-4-5  (shorthand, only when --provider is omitted)
///   --provider openrouter --model "org/model-name"  (slash kept in the model name)
///   --provider openai  (uses the provider's default model)
///   (nothing)  (config, then built-in default)
pub fn resolve_model(
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
    config: &Config,
) -> Result<ModelSelection> {
    if cli_provider.is_none() {
        if let Some((prov, model)) = cli_model.and_then(|m| m.split_once('/')) {
            return Ok(ModelSelection {
                provider: prov.parse()?,
                model: model.to_string(),
            });
        }
    }

    let provider: ProviderKind = cli_provider
        .or(config.provider_name())
        .unwrap_or(DEFAULT_PROVIDER)
        .parse()?;

    let model = cli_model
        .map(String::from)
        .or_else(|| config.model_name())
        .unwrap_or_else(|| provider.default_model().to_string());

    Ok(ModelSelection { provider, model })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let selection = resolve_model(None, None, &Config::default()).unwrap();
        assert_eq!(selection.provider, ProviderKind::Anthropic);
        assert_eq!(selection.model, crate::constants::DEFAULT_MODEL);
    }

    #[test]
    fn test_shorthand() {
        let selection = resolve_model(None, Some("openai/gpt-4.1-mini"), &Config::default()).unwrap();
        assert_eq!(
            selection,
            ModelSelection {
                provider: ProviderKind::OpenAI,
                model: "gpt-4.1-mini".into()
            }
        );
    }

    #[test]
    fn test_explicit_provider_keeps_slash() {
        let selection =
            resolve_model(Some("openrouter"), Some("org/model"), &Config::default()).unwrap();
        assert_eq!(selection.provider, ProviderKind::OpenRouter);
        assert_eq!(selection.model, "org/model");
    }

    #[test]
    fn test_provider_default_model() {
        let selection = resolve_model(Some("ollama"), None, &Config::default()).unwrap();
        assert_eq!(selection.model, crate::constants::OLLAMA_DEFAULT_MODEL);
    }

    #[test]
    fn test_config_provider_used() {
        let config = Config {
            default_provider: Some("openai".into()),
            ..Config::default()
        };
        let selection = resolve_model(None, None, &config).unwrap();
        assert_eq!(selection.provider, ProviderKind::OpenAI);
        assert_eq!(selection.model, crate::constants::DEFAULT_OPENAI_MODEL);
    }
}
