//! API credential resolution.
//!
//! Resolution order: secret store, then environment, else a configuration
//! error. This runs once at startup; the resulting [`ApiKey`] is handed to the
//! crew explicitly.

use careerkit_error::{Error, Result};
use careerkit_llm::ApiKey;
use std::collections::HashMap;
use std::path::Path;

/// Default credential name, looked up in both the secret store and the environment
pub const DEFAULT_CREDENTIAL_VAR: &str = "GROQ_API_KEY";

/// Flat `KEY = "value"` TOML file holding secrets.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    values: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    SecretStore,
    Environment,
}

impl SecretStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let values: HashMap<String, String> = toml::from_str(content).map_err(|e| {
            Error::parse_failed("secret store must be a flat table of string values")
                .with_operation("secrets::parse")
                .set_source(e)
        })?;
        Ok(Self { values })
    }

    /// Load from `path`; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| e.with_context("path", path.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no secret store found");
                Ok(Self::empty())
            }
            Err(e) => Err(Error::from(e)
                .with_operation("secrets::load")
                .with_context("path", path.display().to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

/// Resolve credential `name`, preferring the secret store over `env`.
///
/// Blank values are skipped as if absent.
pub fn resolve_api_key<F>(name: &str, secrets: &SecretStore, env: F) -> Result<(ApiKey, CredentialSource)>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = secrets.get(name).map(ApiKey::new).filter(|k| !k.is_blank()) {
        return Ok((key, CredentialSource::SecretStore));
    }
    if let Some(key) = env(name).map(ApiKey::new).filter(|k| !k.is_blank()) {
        return Ok((key, CredentialSource::Environment));
    }
    Err(Error::missing_credential(name).with_operation("credentials::resolve"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerkit_error::ErrorCategory;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_secret_store_wins_over_env() {
        let secrets = SecretStore::from_toml_str(r#"GROQ_API_KEY = "from-secrets""#).unwrap();
        let (key, source) =
            resolve_api_key("GROQ_API_KEY", &secrets, |_| Some("from-env".into())).unwrap();
        assert_eq!(key.expose(), "from-secrets");
        assert_eq!(source, CredentialSource::SecretStore);
    }

    #[test]
    fn test_env_fallback_and_blank_secret() {
        let mut secrets = SecretStore::empty();
        secrets.insert("GROQ_API_KEY", "   ");
        let (key, source) = resolve_api_key("GROQ_API_KEY", &secrets, |name| {
            (name == "GROQ_API_KEY").then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(key.expose(), "from-env");
        assert_eq!(source, CredentialSource::Environment);
    }

    #[test]
    fn test_missing_everywhere_is_configuration_error() {
        let err = resolve_api_key("GROQ_API_KEY", &SecretStore::empty(), no_env).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.context_value("credential"), Some("GROQ_API_KEY"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SecretStore::load(&dir.path().join("secrets.toml")).unwrap();
        assert!(store.get("GROQ_API_KEY").is_none());
    }

    #[test]
    fn test_load_rejects_nested_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "[groq]\nkey = \"x\"\n").unwrap();
        let err = SecretStore::load(&path).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.context_value("path").is_some());
    }
}
