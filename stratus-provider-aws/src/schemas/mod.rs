//! AWS resource schema definitions
//!
//! Attribute names are the provider's snake_case field names; the
//! engine-facing property name is the lowerCamelCase form.

pub mod ec2;
pub mod kms;
pub mod secrets;

use std::str::FromStr;

use heck::ToLowerCamelCase;
use ipnetwork::Ipv6Network;
use stratus_core::resource::Value;
use stratus_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::resources::{RESOURCE_CONFIGS, ResourceConfig};

/// AWS schema configuration
///
/// Combines the ResourceSchema with the provider metadata of its type.
pub struct AwsSchemaConfig {
    /// Provider type token (e.g., "aws:ec2/vpc:Vpc")
    pub provider_token: &'static str,
    /// Whether this resource type uses tags
    pub has_tags: bool,
    /// The resource schema with attribute definitions
    pub schema: ResourceSchema,
}

impl AwsSchemaConfig {
    fn new(config: &ResourceConfig, schema: ResourceSchema) -> Self {
        let schema = if config.has_tags {
            schema.attribute(attr("tags", tags_type()).with_description("Resource tags"))
        } else {
            schema
        };
        Self {
            provider_token: config.provider_token,
            has_tags: config.has_tags,
            schema,
        }
    }
}

/// Attribute with its provider property name filled in
pub(crate) fn attr(name: &str, attr_type: AttributeType) -> AttributeSchema {
    AttributeSchema::new(name, attr_type).with_provider_name(name.to_lower_camel_case())
}

/// Tags type for AWS resources
pub fn tags_type() -> AttributeType {
    AttributeType::Map(Box::new(AttributeType::String))
}

pub(crate) fn enum_type(values: &[&str]) -> AttributeType {
    AttributeType::Enum(values.iter().map(|s| s.to_string()).collect())
}

/// Integer in an inclusive range
macro_rules! int_range {
    ($name:expr, $min:expr, $max:expr) => {
        AttributeType::Custom {
            name: $name.to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| match value {
                Value::Int(n) if ($min..=$max).contains(n) => Ok(()),
                Value::Int(n) => Err(format!("{} is out of range {}..={}", n, $min, $max)),
                _ => Err("Expected integer".to_string()),
            },
        }
    };
}
pub(crate) use int_range;

/// Port number (0-65535)
pub fn port() -> AttributeType {
    int_range!("Port", 0, 65535)
}

/// IPv6 CIDR block type (e.g., "2600:1f16:abc:de00::/56")
pub fn ipv6_cidr() -> AttributeType {
    AttributeType::Custom {
        name: "Ipv6Cidr".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| {
            if let Value::String(s) = value {
                validate_ipv6_cidr(s)
            } else {
                Err("Expected string".to_string())
            }
        },
    }
}

pub fn validate_ipv6_cidr(cidr: &str) -> Result<(), String> {
    // ipnetwork reads a bare address as a /128, a block must spell out its prefix
    if !cidr.contains('/') {
        return Err(format!(
            "Invalid IPv6 CIDR '{}': expected address/prefix",
            cidr
        ));
    }
    Ipv6Network::from_str(cidr)
        .map(|_| ())
        .map_err(|e| format!("Invalid IPv6 CIDR '{}': {}", cidr, e))
}

/// Attribute schema of a resource type, without the tags attribute
fn base_schema(resource_type: &str) -> Option<ResourceSchema> {
    ec2::schema(resource_type)
        .or_else(|| kms::schema(resource_type))
        .or_else(|| secrets::schema(resource_type))
}

/// All schema configurations known to this provider
pub fn configs() -> Vec<AwsSchemaConfig> {
    RESOURCE_CONFIGS
        .iter()
        .filter_map(|config| base_schema(config.resource_type).map(|s| AwsSchemaConfig::new(config, s)))
        .collect()
}

/// All resource schemas known to this provider
pub fn schemas() -> Vec<ResourceSchema> {
    configs().into_iter().map(|c| c.schema).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::SUBNET;

    fn schema_for(resource_type: &str) -> Option<ResourceSchema> {
        schemas()
            .into_iter()
            .find(|s| s.resource_type == resource_type)
    }

    #[test]
    fn every_resource_type_has_a_schema() {
        for config in RESOURCE_CONFIGS {
            assert!(
                schema_for(config.resource_type).is_some(),
                "missing schema for {}",
                config.resource_type
            );
        }
        assert_eq!(configs().len(), RESOURCE_CONFIGS.len());
    }

    #[test]
    fn provider_names_are_lower_camel_case() {
        let subnet = schema_for(SUBNET).unwrap();
        assert_eq!(
            subnet.attributes["map_public_ip_on_launch"]
                .provider_name
                .as_deref(),
            Some("mapPublicIpOnLaunch")
        );
        assert!(subnet.attributes.contains_key("tags"));
    }

    #[test]
    fn tags_only_on_taggable_types() {
        for config in configs() {
            assert_eq!(
                config.schema.attributes.contains_key("tags"),
                config.has_tags,
                "{}",
                config.provider_token
            );
        }
    }

    #[test]
    fn validate_port_type() {
        let t = port();
        assert!(t.validate(&Value::Int(0)).is_ok());
        assert!(t.validate(&Value::Int(65535)).is_ok());
        assert!(t.validate(&Value::Int(65536)).is_err());
        assert!(t.validate(&Value::Int(-1)).is_err());
    }

    #[test]
    fn validate_ipv6_cidr_type() {
        let t = ipv6_cidr();
        assert!(t.validate(&Value::from("::/0")).is_ok());
        assert!(t.validate(&Value::from("2600:1f16:abc:de00:10::/64")).is_ok());
        assert!(t.validate(&Value::from("2600:1f16::")).is_err());
        assert!(t.validate(&Value::from("2600:1f16::/129")).is_err());
        assert!(t.validate(&Value::from("10.0.0.0/16")).is_err());
        assert!(t.validate(&Value::from("2600:1f16::/x")).is_err());
        assert!(
            validate_ipv6_cidr("2600:1f16::")
                .unwrap_err()
                .contains("expected address/prefix")
        );
    }
}
