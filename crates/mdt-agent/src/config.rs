//! Model configuration for LLM-backed agents.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the completion model.
pub const COMPLETION_MODEL_ENV: &str = "MDT_COMPLETION_MODEL";

/// Default completion model when talking to OpenAI directly.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Model configuration for one kind of call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier.
    pub model: String,

    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(default)]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    2048
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
        }
    }
}

impl ModelConfig {
    /// Create a configuration for `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Default configuration, honouring `MDT_COMPLETION_MODEL`.
    pub fn from_env() -> Self {
        std::env::var(COMPLETION_MODEL_ENV)
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Set the maximum tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_clamps_temperature() {
        let config = ModelConfig::new("m").with_temperature(5.0).with_max_tokens(300);
        assert_eq!(config.temperature, 2.0);
        assert_eq!(config.max_tokens, 300);
        assert_eq!(config.model, "m");
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ModelConfig = serde_json::from_str(r#"{"model": "x"}"#).unwrap();
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.temperature, 0.0);
    }
}
