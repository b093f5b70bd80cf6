//! Secrets Manager and SSM Parameter Store schemas

use std::sync::LazyLock;

use regex::Regex;
use stratus_core::resource::Value;
use stratus_core::schema::{AttributeType, ResourceSchema};

use super::{attr, enum_type, int_range};
use crate::resources::{SECRET, SECRET_VERSION, SSM_PARAMETER};

static PARAMETER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/?[a-zA-Z0-9_.\-]+(/[a-zA-Z0-9_.\-]+)*$")
        .unwrap_or_else(|e| panic!("parameter name pattern: {e}"))
});

pub const PARAMETER_TYPES: &[&str] = &["String", "StringList", "SecureString"];

pub const PARAMETER_TIERS: &[&str] = &["Standard", "Advanced", "Intelligent-Tiering"];

/// Maximum length of a fully qualified parameter name
const PARAMETER_NAME_MAX: usize = 2048;

/// Validate an SSM parameter name (e.g., "/db-password")
pub fn validate_parameter_name(name: &str) -> Result<(), String> {
    if name.len() > PARAMETER_NAME_MAX {
        return Err(format!(
            "Parameter name is {} characters, at most {} allowed",
            name.len(),
            PARAMETER_NAME_MAX
        ));
    }
    if !PARAMETER_NAME.is_match(name) {
        return Err(format!(
            "Invalid parameter name '{}': expected a path of letters, digits, '_', '.' or '-'",
            name
        ));
    }
    let lower = name.trim_start_matches('/').to_lowercase();
    if lower.starts_with("aws") || lower.starts_with("ssm") {
        return Err(format!(
            "Invalid parameter name '{}': names beginning with aws or ssm are reserved",
            name
        ));
    }
    Ok(())
}

/// SSM parameter name type
pub fn parameter_name() -> AttributeType {
    AttributeType::Custom {
        name: "ParameterName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| {
            if let Value::String(s) = value {
                validate_parameter_name(s)
            } else {
                Err("Expected string".to_string())
            }
        },
    }
}

pub fn schema(resource_type: &str) -> Option<ResourceSchema> {
    match resource_type {
        SECRET => Some(secret()),
        SECRET_VERSION => Some(secret_version()),
        SSM_PARAMETER => Some(parameter()),
        _ => None,
    }
}

fn secret() -> ResourceSchema {
    ResourceSchema::new(SECRET)
        .with_description("Secret metadata record")
        .attribute(attr("name", AttributeType::String))
        .attribute(attr("description", AttributeType::String))
        .attribute(attr("kms_key_id", AttributeType::String))
        .attribute(attr(
            "recovery_window_in_days",
            int_range!("RecoveryWindow", 0, 30),
        ))
}

fn secret_version() -> ResourceSchema {
    ResourceSchema::new(SECRET_VERSION)
        .with_description("Secret value, replaceable independently of its metadata")
        .attribute(attr("secret_id", AttributeType::String).required())
        .attribute(attr("secret_string", AttributeType::String))
}

fn parameter() -> ResourceSchema {
    ResourceSchema::new(SSM_PARAMETER)
        .attribute(attr("name", parameter_name()))
        .attribute(attr("type", enum_type(PARAMETER_TYPES)).required())
        .attribute(attr("value", AttributeType::String))
        .attribute(attr("description", AttributeType::String))
        .attribute(
            attr("key_id", AttributeType::String)
                .with_description("KMS key, only used for SecureString parameters"),
        )
        .attribute(attr("overwrite", AttributeType::Bool))
        .attribute(attr("tier", enum_type(PARAMETER_TIERS)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_names() {
        assert!(validate_parameter_name("/db-password").is_ok());
        assert!(validate_parameter_name("/app/prod/db.url").is_ok());
        assert!(validate_parameter_name("plain_name").is_ok());
        assert!(validate_parameter_name("/has space").is_err());
        assert!(validate_parameter_name("/double//slash").is_err());
        assert!(validate_parameter_name("/aws-config").is_err());
        assert!(validate_parameter_name(&format!("/{}", "a".repeat(2048))).is_err());
    }

    #[test]
    fn secret_version_requires_secret_id() {
        let schema = schema(SECRET_VERSION).unwrap();
        assert!(schema.validate(&Default::default()).is_err());
    }
}
