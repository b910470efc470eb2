//! Runtime settings and model catalog.
//!
//! [`Settings`] is read once from the environment at startup and shared
//! read-only afterwards. [`ModelCatalog`] lists the candidate models offered
//! to users, either built in or loaded from a JSON file.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_JUDGE_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration parsing and loading errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// What to do when one model's evaluation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the failure next to the other models' results.
    #[default]
    Isolate,
    /// Fail the whole request on the first error.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "abort" => Ok(Self::Abort),
            other => Err(ConfigError::InvalidValue {
                key: "EZEVAL_FAILURE_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

/// A candidate model offered to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogModel {
    /// Provider model identifier sent in chat requests.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
}

impl CatalogModel {
    fn new(id: &str, name: &str) -> Self {
        Self { id: id.to_string(), name: name.to_string() }
    }
}

/// Ordered list of candidate models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<CatalogModel>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            models: vec![
                CatalogModel::new("gemma2-9b-it", "Gemma 2 9B"),
                CatalogModel::new("llama3-8b-8192", "Llama 3 8B"),
                CatalogModel::new("mixtral-8x7b-32768", "Mixtral 8x7B"),
            ],
        }
    }
}

impl ModelCatalog {
    /// Loads a JSON array of `{ "id", "name" }` objects.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let models: Vec<CatalogModel> = serde_json::from_str(&content)?;
        if let Some(m) = models.iter().find(|m| m.id.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "EZEVAL_MODELS_FILE",
                value: format!("blank model id (name: {})", m.name),
            });
        }
        Ok(Self { models })
    }

    /// Returns all models in catalog order.
    pub fn list(&self) -> &[CatalogModel] {
        &self.models
    }
}

/// Process-wide settings, built once at startup.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_base: String,
    pub judge_model: String,
    pub bind_addr: String,
    pub request_timeout: Duration,
    pub failure_policy: FailurePolicy,
    pub catalog: ModelCatalog,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("judge_model", &self.judge_model)
            .field("bind_addr", &self.bind_addr)
            .field("request_timeout", &self.request_timeout)
            .field("failure_policy", &self.failure_policy)
            .field("catalog", &self.catalog)
            .finish()
    }
}

impl Settings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GROQ_API_KEY")
            .or_else(|| get("EZEVAL_API_KEY"))
            .ok_or(ConfigError::Missing("GROQ_API_KEY"))?;

        let api_base = get("EZEVAL_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = match get("EZEVAL_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "EZEVAL_REQUEST_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "EZEVAL_REQUEST_TIMEOUT_SECS",
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let failure_policy = get("EZEVAL_FAILURE_POLICY")
            .map(|v| v.parse::<FailurePolicy>())
            .transpose()?
            .unwrap_or_default();

        let catalog = match get("EZEVAL_MODELS_FILE") {
            Some(path) => ModelCatalog::load_from_file(Path::new(&path))?,
            None => ModelCatalog::default(),
        };

        Ok(Self {
            api_key,
            api_base,
            judge_model: get("EZEVAL_JUDGE_MODEL").unwrap_or_else(|| DEFAULT_JUDGE_MODEL.to_string()),
            bind_addr: get("EZEVAL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            request_timeout,
            failure_policy,
            catalog,
        })
    }
}
