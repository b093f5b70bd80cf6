//! Stack configuration
//!
//! A stack configuration file names the deployment and carries the
//! caller context plus free-form configuration values:
//!
//! ```json
//! {
//!   "project": "network",
//!   "stack": "dev",
//!   "region": "us-east-2",
//!   "account_id": "123456789012",
//!   "config": { "subnetDefinitions": { "app": { "cidr": "10.0.1.0/24" } } }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::context::AwsContext;
use crate::error::ConfigError;

fn default_partition() -> String {
    "aws".to_string()
}

/// Parsed stack configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    pub project: String,
    pub stack: String,
    pub region: String,
    pub account_id: String,
    #[serde(default = "default_partition")]
    pub partition: String,
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl StackConfig {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::InvalidConfig {
            key: "<root>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Caller context derived from this configuration
    pub fn context(&self) -> AwsContext {
        AwsContext::new(&self.account_id, &self.region, &self.partition)
    }

    /// Deserialize a required structured configuration value
    pub fn require_object<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.get_object(key)?
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Deserialize an optional structured configuration value
    pub fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.config.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::InvalidConfig {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
        }
    }
}
