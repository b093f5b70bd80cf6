//! NAT Gateway Set - one elastic IP and NAT gateway per public subnet
//!
//! The gateway at index i gets the default route of the private route
//! table at index i.

use std::collections::HashMap;

use stratus_core::error::{ConfigError, StackResult};
use stratus_core::resource::{Resource, Value};
use stratus_core::stack::Stack;

use super::ComponentScope;
use crate::resources::{EIP, NAT_GATEWAY, ROUTE};
use crate::utils::tags_with_name;

pub const TYPE_TOKEN: &str = "custom:aws:NatGateway";

#[derive(Debug, Clone, Default)]
pub struct NatGatewayArgs {
    pub public_subnet_ids: Vec<Value>,
    pub private_route_table_ids: Vec<Value>,
    pub tags: HashMap<String, String>,
}

/// Outputs of a NAT Gateway Set instance
#[derive(Debug, Clone, PartialEq)]
pub struct NatGateway {
    pub eip_ids: Vec<Value>,
    pub nat_gateway_ids: Vec<Value>,
}

impl NatGateway {
    pub fn new(stack: &mut Stack, name: &str, args: NatGatewayArgs) -> StackResult<Self> {
        if args.public_subnet_ids.len() != args.private_route_table_ids.len() {
            return Err(ConfigError::LengthMismatch {
                component: format!("NatGateway {}", name),
                left: "public_subnet_ids",
                left_len: args.public_subnet_ids.len(),
                right: "private_route_table_ids",
                right_len: args.private_route_table_ids.len(),
            }
            .into());
        }

        let mut scope = ComponentScope::new(stack, TYPE_TOKEN, name);
        let mut eip_ids = Vec::with_capacity(args.public_subnet_ids.len());
        let mut nat_gateway_ids = Vec::with_capacity(args.public_subnet_ids.len());

        for (i, (subnet_id, route_table_id)) in args
            .public_subnet_ids
            .iter()
            .zip(&args.private_route_table_ids)
            .enumerate()
        {
            let eip_name = format!("{}-eip-{}", name, i);
            let eip_id = scope
                .register(
                    Resource::new(EIP, &eip_name)
                        .with_attribute("tags", tags_with_name(&args.tags, &eip_name)),
                )?
                .output("id");

            let natgw_name = format!("{}-natgw-{}", name, i);
            let natgw_id = scope
                .register(
                    Resource::new(NAT_GATEWAY, &natgw_name)
                        .with_attribute("subnet_id", subnet_id.clone())
                        .with_attribute("allocation_id", eip_id.clone())
                        .with_attribute("tags", tags_with_name(&args.tags, &natgw_name)),
                )?
                .output("id");

            scope.register(
                Resource::new(ROUTE, format!("{}-nat-route-{}", name, i))
                    .with_attribute("route_table_id", route_table_id.clone())
                    .with_attribute("destination_cidr_block", "0.0.0.0/0")
                    .with_attribute("nat_gateway_id", natgw_id.clone()),
            )?;

            eip_ids.push(eip_id);
            nat_gateway_ids.push(natgw_id);
        }

        scope.finish(&["eip_ids", "nat_gateway_ids"]);
        Ok(Self {
            eip_ids,
            nat_gateway_ids,
        })
    }
}
