//! Error types raised while composing a stack

use std::path::PathBuf;

use thiserror::Error;

use crate::resource::ResourceId;

/// Errors from the CIDR allocator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CidrError {
    #[error("Invalid CIDR block '{cidr}': {message}")]
    Invalid { cidr: String, message: String },

    #[error("CIDR block '{base}' offset by {index} overflows the third octet ({octet} > 255)")]
    Overflow { base: String, index: u32, octet: u32 },
}

/// Configuration errors, raised before a component registers anything
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither of two alternative value sources was supplied
    #[error("{component}: either '{first}' or '{second}' must be provided")]
    MissingValue {
        component: String,
        first: &'static str,
        second: &'static str,
    },

    /// Two mutually exclusive value sources were both supplied
    #[error("{component}: '{first}' and '{second}' are mutually exclusive")]
    MutuallyExclusive {
        component: String,
        first: &'static str,
        second: &'static str,
    },

    /// Collections that must be index-aligned have different lengths
    #[error("{component}: length of {left} ({left_len}) and {right} ({right_len}) must match (1:1 mapping)")]
    LengthMismatch {
        component: String,
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("{component}: {source}")]
    Cidr {
        component: String,
        #[source]
        source: CidrError,
    },

    #[error("{component}: rule '{rule}' needs an ipv4_cidr or an ipv6_cidr")]
    MissingRuleCidr { component: String, rule: String },

    #[error("{component}: rules '{first}' and '{second}' both use {direction} rule number {number}")]
    DuplicateRuleNumber {
        component: String,
        first: String,
        second: String,
        direction: String,
        number: i64,
    },

    #[error("{component}: invalid value for '{field}': {message}")]
    InvalidValue {
        component: String,
        field: &'static str,
        message: String,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required configuration key '{0}'")]
    MissingKey(String),

    #[error("Invalid configuration for '{key}': {message}")]
    InvalidConfig { key: String, message: String },
}

impl ConfigError {
    pub fn missing_value(
        component: impl Into<String>,
        first: &'static str,
        second: &'static str,
    ) -> Self {
        Self::MissingValue {
            component: component.into(),
            first,
            second,
        }
    }

    pub fn mutually_exclusive(
        component: impl Into<String>,
        first: &'static str,
        second: &'static str,
    ) -> Self {
        Self::MutuallyExclusive {
            component: component.into(),
            first,
            second,
        }
    }

    pub fn cidr(component: impl Into<String>, source: CidrError) -> Self {
        Self::Cidr {
            component: component.into(),
            source,
        }
    }

    pub fn invalid_value(
        component: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            component: component.into(),
            field,
            message: message.into(),
        }
    }
}

/// Errors from building the resource graph itself
#[derive(Debug, Error)]
pub enum StackError {
    #[error("Duplicate resource name '{name}' (already declared as {existing})")]
    DuplicateName { name: String, existing: ResourceId },

    #[error("Duplicate output '{0}'")]
    DuplicateOutput(String),

    #[error("{from} references unknown resource '{target}'")]
    UnknownReference { from: ResourceId, target: String },

    #[error("Dependency cycle involving: {}", .0.join(", "))]
    Cycle(Vec<String>),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type StackResult<T> = Result<T, StackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::missing_value("SsmParameter db-password", "value", "value_from_file");
        assert_eq!(
            err.to_string(),
            "SsmParameter db-password: either 'value' or 'value_from_file' must be provided"
        );

        let err = ConfigError::LengthMismatch {
            component: "NatGateway my-nat".to_string(),
            left: "public_subnet_ids",
            left_len: 3,
            right: "private_route_table_ids",
            right_len: 2,
        };
        assert!(err.to_string().contains("(3)"));
        assert!(err.to_string().contains("(2)"));
    }

    #[test]
    fn config_error_converts_into_stack_error() {
        let err: StackError = ConfigError::MissingKey("subnetDefinitions".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Missing required configuration key 'subnetDefinitions'"
        );
    }
}
