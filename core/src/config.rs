//! Where the NineML web application lives.
//!
//! Values come from, in increasing precedence: built-in defaults, an
//! optional JSON file, the `NINEML_SERVER` / `NINEML_PORT` environment
//! variables, and whatever the caller sets afterwards.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::ENDPOINT_PATH;

pub const SERVER_ENV: &str = "NINEML_SERVER";
pub const PORT_ENV: &str = "NINEML_PORT";

pub const DEFAULT_USER_AGENT: &str = "NineML WebService Application/1.0";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub server: String,
    pub port: u16,
    pub path: String,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: 80,
            path: ENDPOINT_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Override fields from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// Override fields from `lookup`, which maps variable names to values.
    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(server) = lookup(SERVER_ENV).filter(|s| !s.is_empty()) {
            self.server = server;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                value: port,
            })?;
        }
        Ok(self)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.server, self.port)
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.base_url(), self.path.trim_start_matches('/'))
    }
}
