// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::vault_core::constants::{config as keys, tokens};
use crate::vault_core::errors::VaultError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
    /// Tokenizer draws allowed per registration. 0 means no bound.
    pub max_token_attempts: u32,
    pub audit_enabled: bool,
}

impl Config {
    /// Load from `CARDVAULT_CONFIG` when set, then apply env overrides.
    pub fn load() -> Result<Self, VaultError> {
        let base = match env::var(keys::ENV_CONFIG_PATH) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    pub fn from_env() -> Result<Self, VaultError> {
        Self::default().with_env_overrides()
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, VaultError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VaultError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, VaultError> {
        let config: Self = serde_yaml_ng::from_str(content)
            .map_err(|e| VaultError::Configuration(format!("invalid YAML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, VaultError> {
        if let Ok(path) = env::var(keys::ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(level) = env::var(keys::ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Ok(format) = env::var(keys::ENV_LOG_FORMAT) {
            self.log_format = format;
        }
        if let Ok(raw) = env::var(keys::ENV_MAX_TOKEN_ATTEMPTS) {
            self.max_token_attempts = raw.trim().parse().map_err(|_| {
                VaultError::Configuration(format!(
                    "{} must be a non-negative integer, got '{}'",
                    keys::ENV_MAX_TOKEN_ATTEMPTS,
                    raw
                ))
            })?;
        }
        if let Ok(raw) = env::var(keys::ENV_AUDIT_ENABLED) {
            self.audit_enabled = parse_flag(&raw);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), VaultError> {
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => {
                return Err(VaultError::Configuration(format!(
                    "log_format must be 'json' or 'text', got '{}'",
                    other
                )))
            }
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(VaultError::Configuration(
                "database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The retry bound as an option; `None` means keep drawing forever.
    pub fn token_attempt_limit(&self) -> Option<u32> {
        (self.max_token_attempts > 0).then_some(self.max_token_attempts)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(keys::DEFAULT_DATABASE_PATH),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            max_token_attempts: tokens::DEFAULT_MAX_ATTEMPTS,
            audit_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.token_attempt_limit(), Some(tokens::DEFAULT_MAX_ATTEMPTS));
    }

    #[test]
    fn test_yaml_partial_uses_defaults() {
        let config = Config::from_yaml_str("max_token_attempts: 0\nlog_format: json\n").unwrap();
        assert_eq!(config.token_attempt_limit(), None);
        assert_eq!(config.log_format, "json");
        assert_eq!(config.log_level, "info");
        assert!(config.audit_enabled);
    }

    #[test]
    fn test_yaml_rejects_unknown_format() {
        let err = Config::from_yaml_str("log_format: xml\n").unwrap_err();
        assert!(matches!(err, VaultError::Configuration(_)));
    }

    #[test]
    fn test_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "database_path: /var/lib/cardvault/users.json\naudit_enabled: false\n").unwrap();

        let config = Config::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/cardvault/users.json"));
        assert!(!config.audit_enabled);
    }

    #[test]
    fn test_missing_yaml_file() {
        let err = Config::from_yaml_file("/nonexistent/cardvault.yaml").unwrap_err();
        assert!(matches!(err, VaultError::Configuration(_)));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("off"));
    }
}
