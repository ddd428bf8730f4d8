use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::error::{Result, ZepError};

pub const DEFAULT_API_URL: &str = "https://api.getzep.com/api/v2";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Client configuration loaded from ~/.zep/config.json
#[derive(Debug, Clone, Deserialize)]
pub struct ZepConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// Settings for the OpenAI side of the context-injection wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_follow_redirects() -> bool {
    true
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
        }
    }
}

impl Default for ZepConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            follow_redirects: default_follow_redirects(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl ZepConfig {
    /// Load config from the standard location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path(&Self::config_path())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults plus environment overrides, ignoring any config file
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| ZepError::Config(format!("Failed to read config file: {}", e)))?;
            let config: ZepConfig = serde_json::from_str(&content)
                .map_err(|e| ZepError::Config(format!("Failed to parse config JSON: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the standard config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".zep")
            .join("config.json")
    }

    /// Apply `ZEP_API_KEY`, `ZEP_API_URL`, `OPENAI_API_KEY` and `OPENAI_BASE_URL`.
    ///
    /// `ZEP_API_URL` names the server root; the versioned API path is appended.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("ZEP_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty("ZEP_API_URL") {
            self.api_url = format!("{}/api/v2", url.trim_end_matches('/'));
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
    }

    /// The API key, or a configuration error when none was provided
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ZepError::Config(
                    "The client must be instantiated by either passing in api_key or setting ZEP_API_KEY"
                        .to_string(),
                )
            })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ZepConfig::default();
        assert_eq!(config.api_url, "https://api.getzep.com/api/v2");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retries, 5);
        assert!(config.follow_redirects);
        assert!(config.api_key.is_none());
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_load_from_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{
                "api_key": "z_123",
                "api_url": "http://localhost:8000/api/v2",
                "timeout_secs": 5,
                "max_retries": 1,
                "openai": {{ "model": "gpt-4o" }}
            }}"#
        )
        .unwrap();

        let config = ZepConfig::load_from_path(&temp_file.path().to_path_buf()).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("z_123"));
        assert_eq!(config.api_url, "http://localhost:8000/api/v2");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/config.json");
        let config = ZepConfig::load_from_path(&path).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_load_invalid_json_returns_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "not valid json").unwrap();

        let result = ZepConfig::load_from_path(&temp_file.path().to_path_buf());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ZEP_API_KEY", "env-key"),
            ("ZEP_API_URL", "http://zep.internal:8000/"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
        .into_iter()
        .collect();

        let mut config = ZepConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.api_url, "http://zep.internal:8000/api/v2");
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.base_url, DEFAULT_OPENAI_BASE_URL);
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let mut config = ZepConfig {
            api_key: Some("file-key".to_string()),
            ..Default::default()
        };
        config.apply_env_overrides(|k| (k == "ZEP_API_KEY").then(|| "  ".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_require_api_key() {
        let config = ZepConfig::default();
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("ZEP_API_KEY"));

        let config = ZepConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "k");
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let config = ZepConfig {
            api_url: "http://localhost/api/v2/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "http://localhost/api/v2");
    }

    #[test]
    fn test_config_path_contains_expected_components() {
        let path = ZepConfig::config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.contains(".zep"));
        assert!(path_str.ends_with("config.json"));
    }
}
