//! KMS key and alias schemas

use std::sync::LazyLock;

use regex::Regex;
use stratus_core::resource::Value;
use stratus_core::schema::{AttributeType, ResourceSchema};

use super::{attr, enum_type, int_range};
use crate::resources::{KMS_ALIAS, KMS_KEY};

static ALIAS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^alias/[a-zA-Z0-9/_-]{1,250}$").unwrap_or_else(|e| panic!("alias pattern: {e}"))
});

const KEY_SPECS: &[&str] = &[
    "SYMMETRIC_DEFAULT",
    "RSA_2048",
    "RSA_3072",
    "RSA_4096",
    "HMAC_224",
    "HMAC_256",
    "HMAC_384",
    "HMAC_512",
    "ECC_NIST_P256",
    "ECC_NIST_P384",
    "ECC_NIST_P521",
    "ECC_SECG_P256K1",
];

const KEY_USAGES: &[&str] = &[
    "ENCRYPT_DECRYPT",
    "SIGN_VERIFY",
    "GENERATE_VERIFY_MAC",
    "KEY_AGREEMENT",
];

/// Validate a KMS alias name (e.g., "alias/myapp")
pub fn validate_alias_name(name: &str) -> Result<(), String> {
    if name.starts_with("alias/aws/") {
        return Err(format!(
            "Invalid alias '{}': the alias/aws/ prefix is reserved for AWS managed keys",
            name
        ));
    }
    if !ALIAS_NAME.is_match(name) {
        return Err(format!(
            "Invalid alias '{}': expected alias/ followed by letters, digits, '/', '_' or '-'",
            name
        ));
    }
    Ok(())
}

/// KMS alias name type
pub fn alias_name() -> AttributeType {
    AttributeType::Custom {
        name: "KmsAliasName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| {
            if let Value::String(s) = value {
                validate_alias_name(s)
            } else {
                Err("Expected string".to_string())
            }
        },
    }
}

pub fn schema(resource_type: &str) -> Option<ResourceSchema> {
    match resource_type {
        KMS_KEY => Some(key()),
        KMS_ALIAS => Some(alias()),
        _ => None,
    }
}

fn key() -> ResourceSchema {
    ResourceSchema::new(KMS_KEY)
        .with_description("Customer-managed KMS key")
        .attribute(attr("description", AttributeType::String))
        .attribute(
            attr("deletion_window_in_days", int_range!("DeletionWindow", 7, 30))
                .with_description("Waiting period before the key is deleted"),
        )
        .attribute(attr("enable_key_rotation", AttributeType::Bool))
        .attribute(attr(
            "rotation_period_in_days",
            int_range!("RotationPeriod", 90, 2560),
        ))
        .attribute(attr("customer_master_key_spec", enum_type(KEY_SPECS)))
        .attribute(attr("key_usage", enum_type(KEY_USAGES)))
        .attribute(
            attr("policy", AttributeType::String)
                .with_description("Key policy as a JSON document"),
        )
        .attribute(attr("is_enabled", AttributeType::Bool))
        .attribute(attr("multi_region", AttributeType::Bool))
}

fn alias() -> ResourceSchema {
    ResourceSchema::new(KMS_ALIAS)
        .attribute(attr("name", alias_name()).required())
        .attribute(attr("target_key_id", AttributeType::String).required())
}
