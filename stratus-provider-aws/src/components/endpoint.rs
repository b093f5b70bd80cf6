//! VPC Endpoint - private connection from the VPC to a regional service
//!
//! Interface endpoints live in subnets behind their own security group;
//! gateway endpoints are wired into route tables.

use std::collections::HashMap;

use log::warn;
use stratus_core::context::AwsContext;
use stratus_core::error::StackResult;
use stratus_core::resource::{Resource, Value};
use stratus_core::stack::Stack;

use super::ComponentScope;
use crate::resources::{SECURITY_GROUP, VPC_ENDPOINT};
use crate::schemas::ec2::VPC_ENDPOINT_TYPES;
use crate::utils::{tags_with_default_name, title_case};

pub const TYPE_TOKEN: &str = "custom:network:VpcEndpoint";

/// Placeholder in service names replaced with the stack's region
pub const REGION_PLACEHOLDER: &str = "__REGION__";

#[derive(Debug, Clone)]
pub struct VpcEndpointArgs {
    pub vpc_id: Value,
    /// Service name, e.g. "com.amazonaws.__REGION__.s3"
    pub endpoint_service: String,
    /// "Interface" or "Gateway", compared case-insensitively
    pub endpoint_type: String,
    /// Subnets of an interface endpoint
    pub allowed_subnets: Vec<Value>,
    /// Route tables of a gateway endpoint
    pub gateway_route_tables: Vec<Value>,
    pub tags: HashMap<String, String>,
}

impl VpcEndpointArgs {
    pub fn new(
        vpc_id: Value,
        endpoint_service: impl Into<String>,
        endpoint_type: impl Into<String>,
    ) -> Self {
        Self {
            vpc_id,
            endpoint_service: endpoint_service.into(),
            endpoint_type: endpoint_type.into(),
            allowed_subnets: Vec::new(),
            gateway_route_tables: Vec::new(),
            tags: HashMap::new(),
        }
    }
}

/// Outputs of a VPC Endpoint instance
#[derive(Debug, Clone, PartialEq)]
pub struct VpcEndpoint {
    pub endpoint_id: Value,
    pub security_group_id: Option<Value>,
}

/// AWS spelling of an endpoint type given in any case
/// ("gatewayloadbalancer" -> "GatewayLoadBalancer"); unknown types are title-cased
fn endpoint_type_name(endpoint_type: &str) -> String {
    VPC_ENDPOINT_TYPES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(endpoint_type))
        .map(|known| known.to_string())
        .unwrap_or_else(|| title_case(endpoint_type))
}

impl VpcEndpoint {
    pub fn new(
        stack: &mut Stack,
        ctx: &AwsContext,
        name: &str,
        args: VpcEndpointArgs,
    ) -> StackResult<Self> {
        let lower_type = args.endpoint_type.to_lowercase();
        let is_interface = lower_type == "interface";
        let is_gateway = lower_type == "gateway";
        if !is_interface && !is_gateway {
            warn!(
                "VpcEndpoint {}: endpoint type '{}' is neither Interface nor Gateway, no subnets or route tables are attached",
                name, args.endpoint_type
            );
        }

        let mut scope = ComponentScope::new(stack, TYPE_TOKEN, name);

        let security_group_id = if is_interface {
            let sg_name = format!("{}-sg", name);
            let sg = scope.register(
                Resource::new(SECURITY_GROUP, &sg_name)
                    .with_attribute("name", sg_name.as_str())
                    .with_attribute(
                        "description",
                        format!("Security group for VPC endpoint {}", name),
                    )
                    .with_attribute("vpc_id", args.vpc_id.clone())
                    .with_attribute("tags", tags_with_default_name(&args.tags, &sg_name)),
            )?;
            Some(sg.output("id"))
        } else {
            None
        };

        let service_name = args
            .endpoint_service
            .replace(REGION_PLACEHOLDER, &ctx.region);

        let mut endpoint = Resource::new(VPC_ENDPOINT, format!("{}-endpoint", name))
            .with_attribute("vpc_id", args.vpc_id.clone())
            .with_attribute("vpc_endpoint_type", endpoint_type_name(&args.endpoint_type))
            .with_attribute("service_name", service_name)
            .with_attribute("private_dns_enabled", is_interface)
            .with_attribute("tags", tags_with_default_name(&args.tags, name));
        if is_interface {
            endpoint = endpoint.with_attribute("subnet_ids", args.allowed_subnets.clone());
        }
        if is_gateway {
            endpoint = endpoint.with_attribute("route_table_ids", args.gateway_route_tables.clone());
        }
        if let Some(sg_id) = &security_group_id {
            endpoint = endpoint.with_attribute("security_group_ids", vec![sg_id.clone()]);
        }

        let endpoint_id = scope.register(endpoint)?.output("id");

        scope.finish(&["endpoint", "security_group"]);
        Ok(Self {
            endpoint_id,
            security_group_id,
        })
    }
}
