//! `careerkit.toml` loading.

use careerkit_crew::{CrewConfig, ProviderSettings};
use careerkit_error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "careerkit.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub provider: ProviderSettings,
    pub crew: CrewConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind.parse().map_err(|_| {
            Error::config_invalid("server.bind must be an ip:port address")
                .with_context("bind", self.bind.clone())
        })
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).map_err(|e| {
            Error::parse_failed("invalid configuration file")
                .with_operation("config::parse")
                .set_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or `careerkit.toml` in the working directory.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        match std::fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::from_toml_str(&content)
                    .map_err(|e| e.with_context("path", path.display().to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                tracing::debug!("no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::from(e)
                .with_operation("config::load")
                .with_context("path", path.display().to_string())),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        self.crew.validate()?;
        self.server.socket_addr().map(|_| ())
    }
}
