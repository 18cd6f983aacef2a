//! Supported LLM backends.

use anyhow::{anyhow, Error};
use std::fmt;
use std::str::FromStr;

/// Identifies which LLM provider backs the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
    OpenRouter,
    /// Local models via Ollama's OpenAI-compatible API.
    Ollama,
}

impl ProviderKind {
    /// Config and env-var key for this provider (`anthropic`, `openai`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }

    /// The model used when neither the CLI nor the config names one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => crate::constants::DEFAULT_MODEL,
            Self::OpenAI => crate::constants::DEFAULT_OPENAI_MODEL,
            Self::OpenRouter => crate::constants::DEFAULT_OPENROUTER_MODEL,
            Self::Ollama => crate::constants::OLLAMA_DEFAULT_MODEL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!(
                "Unknown provider: {other}. Supported: anthropic, openai, openrouter, ollama"
            )),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
        assert_eq!("ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "gemini".parse::<ProviderKind>().unwrap_err();
        assert!(err.to_string().contains("Unknown provider: gemini"));
    }

    #[test]
    fn test_display_round_trips_key() {
        assert_eq!(ProviderKind::OpenRouter.to_string(), "openrouter");
    }
}
