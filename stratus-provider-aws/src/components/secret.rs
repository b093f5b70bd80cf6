//! Secret Store - Secrets Manager metadata record plus value version

use std::collections::HashMap;
use std::path::PathBuf;

use log::debug;
use stratus_core::error::{ConfigError, StackResult};
use stratus_core::resource::{Resource, Value};
use stratus_core::stack::Stack;

use super::{ComponentScope, Source, exactly_one, read_file};
use crate::resources::{SECRET, SECRET_VERSION};

pub const TYPE_TOKEN: &str = "custom:aws:SecretManagerSecret";

/// Secret payload: plain text or a JSON object
#[derive(Debug, Clone, PartialEq)]
pub enum SecretValue {
    Text(String),
    Structured(serde_json::Map<String, serde_json::Value>),
}

impl SecretValue {
    /// Interpret file content: a JSON object or string is taken as such,
    /// JSON `null` is no value, anything else is the trimmed raw text
    pub fn from_file_content(content: &str) -> Option<Self> {
        match serde_json::from_str::<serde_json::Value>(content) {
            Ok(serde_json::Value::Object(map)) => Some(SecretValue::Structured(map)),
            Ok(serde_json::Value::String(text)) => Some(SecretValue::Text(text)),
            Ok(serde_json::Value::Null) => None,
            Ok(_) => Some(SecretValue::Text(content.trim().to_string())),
            Err(e) => {
                debug!("secret file is not JSON ({}), using it as text", e);
                Some(SecretValue::Text(content.trim().to_string()))
            }
        }
    }

    /// Flat text stored in the secret version
    pub fn to_secret_string(&self) -> String {
        match self {
            SecretValue::Text(text) => text.clone(),
            SecretValue::Structured(map) => serde_json::Value::Object(map.clone()).to_string(),
        }
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        SecretValue::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecretManagerSecretArgs {
    pub secret_value: Option<SecretValue>,
    pub secret_value_from_file: Option<PathBuf>,
    pub description: Option<String>,
    pub kms_key_id: Option<Value>,
    pub tags: HashMap<String, String>,
}

/// Outputs of a Secret Store instance
#[derive(Debug, Clone, PartialEq)]
pub struct SecretManagerSecret {
    pub arn: Value,
    pub secret_id: Value,
    pub version_id: Value,
}

impl SecretManagerSecret {
    pub fn new(stack: &mut Stack, name: &str, args: SecretManagerSecretArgs) -> StackResult<Self> {
        let label = format!("SecretManagerSecret {}", name);
        let source = exactly_one(
            &label,
            args.secret_value,
            "secret_value",
            args.secret_value_from_file.as_deref(),
            "secret_value_from_file",
        )?;
        let secret_value = match source {
            Source::Inline(value) => value,
            Source::File(path) => SecretValue::from_file_content(&read_file(&path)?)
                .ok_or_else(|| {
                    ConfigError::missing_value(&label, "secret_value", "secret_value_from_file")
                })?,
        };

        let mut scope = ComponentScope::new(stack, TYPE_TOKEN, name);
        let secret = scope.register(
            Resource::new(SECRET, format!("{}-metadata", name))
                .with_attribute("name", name)
                .with_optional("description", args.description)
                .with_optional("kms_key_id", args.kms_key_id)
                .with_optional(
                    "tags",
                    (!args.tags.is_empty()).then(|| Value::string_map(&args.tags)),
                ),
        )?;
        let arn = secret.output("arn");
        let secret_id = secret.output("id");

        let version_id = scope
            .register(
                Resource::new(SECRET_VERSION, format!("{}-version", name))
                    .with_attribute("secret_id", secret_id.clone())
                    .with_attribute("secret_string", secret_value.to_secret_string()),
            )?
            .output("version_id");

        scope.finish(&["secret", "version"]);
        Ok(Self {
            arn,
            secret_id,
            version_id,
        })
    }
}
