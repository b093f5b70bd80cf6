//! VPC Core - the virtual network container

use std::collections::HashMap;

use stratus_core::error::{ConfigError, StackResult};
use stratus_core::resource::{Resource, Value};
use stratus_core::schema::validate_cidr;
use stratus_core::stack::Stack;

use super::ComponentScope;
use crate::resources::VPC;
use crate::utils::tags_with_name;

pub const TYPE_TOKEN: &str = "custom:aws:VpcOnly";

#[derive(Debug, Clone)]
pub struct VpcOnlyArgs {
    pub cidr_block: String,
    pub enable_dns_support: bool,
    pub enable_dns_hostnames: bool,
    /// "default" or "dedicated"
    pub instance_tenancy: String,
    pub tags: HashMap<String, String>,
}

impl VpcOnlyArgs {
    pub fn new(cidr_block: impl Into<String>) -> Self {
        Self {
            cidr_block: cidr_block.into(),
            enable_dns_support: true,
            enable_dns_hostnames: true,
            instance_tenancy: "default".to_string(),
            tags: HashMap::new(),
        }
    }
}

/// Outputs of a VPC Core instance
#[derive(Debug, Clone, PartialEq)]
pub struct VpcOnly {
    pub vpc_id: Value,
    pub cidr_block: Value,
}

impl VpcOnly {
    pub fn new(stack: &mut Stack, name: &str, args: VpcOnlyArgs) -> StackResult<Self> {
        validate_cidr(&args.cidr_block).map_err(|message| {
            ConfigError::invalid_value(format!("VpcOnly {}", name), "cidr_block", message)
        })?;

        let mut scope = ComponentScope::new(stack, TYPE_TOKEN, name);
        let vpc = scope.register(
            Resource::new(VPC, format!("{}-vpc", name))
                .with_attribute("cidr_block", args.cidr_block.as_str())
                .with_attribute("enable_dns_support", args.enable_dns_support)
                .with_attribute("enable_dns_hostnames", args.enable_dns_hostnames)
                .with_attribute("instance_tenancy", args.instance_tenancy.as_str())
                .with_attribute("tags", tags_with_name(&args.tags, name)),
        )?;
        let outputs = Self {
            vpc_id: vpc.output("id"),
            cidr_block: vpc.output("cidr_block"),
        };

        scope.finish(&["vpc"]);
        Ok(outputs)
    }
}
