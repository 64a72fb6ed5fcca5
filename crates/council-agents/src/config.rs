//! Configuration for a deliberation run

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for the deliberation stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Model identifier passed to the reasoning provider
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum LLM/tool iterations per stage (prevents infinite tool loops)
    pub max_tool_iterations: usize,

    /// Bull/bear research debate rounds
    pub debate_rounds: u32,

    /// Risky/safe/neutral risk debate rounds
    pub risk_rounds: u32,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            max_tool_iterations: 5,
            debate_rounds: 1,
            risk_rounds: 1,
        }
    }
}

impl CouncilConfig {
    /// Create a new configuration builder
    pub fn builder() -> CouncilConfigBuilder {
        CouncilConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.max_tool_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_tool_iterations must be greater than 0".to_string(),
            ));
        }
        if self.debate_rounds == 0 || self.risk_rounds == 0 {
            return Err(ConfigError::Invalid(
                "debate rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for CouncilConfig
#[derive(Debug, Default)]
pub struct CouncilConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    max_tool_iterations: Option<usize>,
    debate_rounds: Option<u32>,
    risk_rounds: Option<u32>,
}

impl CouncilConfigBuilder {
    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the per-stage tool iteration bound
    pub fn max_tool_iterations(mut self, iterations: usize) -> Self {
        self.max_tool_iterations = Some(iterations);
        self
    }

    /// Set the research debate round count
    pub fn debate_rounds(mut self, rounds: u32) -> Self {
        self.debate_rounds = Some(rounds);
        self
    }

    /// Set the risk debate round count
    pub fn risk_rounds(mut self, rounds: u32) -> Self {
        self.risk_rounds = Some(rounds);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<CouncilConfig, ConfigError> {
        let defaults = CouncilConfig::default();

        let config = CouncilConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tool_iterations: self
                .max_tool_iterations
                .unwrap_or(defaults.max_tool_iterations),
            debate_rounds: self.debate_rounds.unwrap_or(defaults.debate_rounds),
            risk_rounds: self.risk_rounds.unwrap_or(defaults.risk_rounds),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CouncilConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.debate_rounds, 1);
    }

    #[test]
    fn test_config_builder() {
        let config = CouncilConfig::builder()
            .model("gpt-4o-mini")
            .debate_rounds(2)
            .risk_rounds(3)
            .build()
            .unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.debate_rounds, 2);
        assert_eq!(config.risk_rounds, 3);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        assert!(CouncilConfig::builder().debate_rounds(0).build().is_err());
        assert!(CouncilConfig::builder().risk_rounds(0).build().is_err());
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        assert!(CouncilConfig::builder().temperature(2.5).build().is_err());
        assert!(CouncilConfig::builder().temperature(-0.1).build().is_err());
    }
}
