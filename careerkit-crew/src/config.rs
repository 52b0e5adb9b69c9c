//! Typed configuration for the provider connection and the crew.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration. Unknown keys are rejected so typos surface at startup.

use crate::credentials::DEFAULT_CREDENTIAL_VAR;
use crate::retry::RetryPolicy;
use crate::template::TemplateStore;
use careerkit_error::{Error, Result};
use careerkit_llm::{ProviderConfig, ProviderType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    pub kind: ProviderType,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    /// Overrides the provider's default model
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Name of the credential in the secret store / environment
    pub api_key_name: String,
    pub secrets_file: PathBuf,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderType::Groq,
            base_url: None,
            model: None,
            timeout_secs: None,
            api_key_name: DEFAULT_CREDENTIAL_VAR.to_string(),
            secrets_file: PathBuf::from(".careerkit/secrets.toml"),
        }
    }
}

impl ProviderSettings {
    pub fn validate(&self) -> Result<()> {
        if self.api_key_name.trim().is_empty() {
            return Err(Error::config_invalid("provider.api_key_name must not be empty"));
        }
        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::config_invalid("provider.base_url must be an http(s) URL")
                    .with_context("base_url", url.clone()));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::config_invalid("provider.timeout_secs must be positive"));
        }
        if matches!(&self.model, Some(m) if m.trim().is_empty()) {
            return Err(Error::config_invalid("provider.model must not be blank"));
        }
        Ok(())
    }

    pub fn to_provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::for_type(self.kind);
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(secs);
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrewConfig {
    pub temperature: f32,
    /// Output-token cap per stage; 0 leaves it to the provider
    pub max_tokens: usize,
    /// Feed earlier stage outputs into later prompts
    pub share_context: bool,
    pub retry: RetryPolicy,
    pub stages: TemplateStore,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
            share_context: true,
            retry: RetryPolicy::default(),
            stages: TemplateStore::default(),
        }
    }
}

impl CrewConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::config_invalid("crew.temperature must be within 0.0..=2.0")
                .with_context("temperature", self.temperature.to_string()));
        }
        self.retry.validate().map_err(|e| e.with_operation("config::validate"))?;
        self.stages.validate().map_err(|e| e.with_operation("config::validate"))
    }

    /// The cap to send with each request, if any
    pub fn token_cap(&self) -> Option<usize> {
        (self.max_tokens > 0).then_some(self.max_tokens)
    }
}
