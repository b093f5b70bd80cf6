//! Subnet Fabric - per-zone subnets, gateways and route tables
//!
//! Public subnets share one route table with a default route to the
//! internet gateway. Every private subnet gets a route table of its own so
//! that each zone's NAT gateway can be wired into exactly one table.

use std::collections::{HashMap, HashSet};

use log::debug;
use stratus_core::cidr::{cidr_offset, ipv6_private_netnum, ipv6_public_netnum};
use stratus_core::error::{ConfigError, StackResult};
use stratus_core::resource::{Resource, Transform, Value};
use stratus_core::stack::Stack;

use super::ComponentScope;
use crate::resources::{
    INTERNET_GATEWAY, ROUTE_TABLE, ROUTE_TABLE_ASSOCIATION, SUBNET,
    VPC_IPV6_CIDR_BLOCK_ASSOCIATION,
};
use crate::utils::tags_with_name;

pub const TYPE_TOKEN: &str = "custom:aws:VpcSubnets";

#[derive(Debug, Clone)]
pub struct VpcSubnetsArgs {
    pub vpc_id: Value,
    /// Base block of the first public subnet; zone i is offset by i
    pub cidr_block_public: String,
    /// Base block of the first private subnet; zone i is offset by i
    pub cidr_block_private: String,
    pub azs: Vec<String>,
    pub create_public_subnets: bool,
    pub enable_ipv6: bool,
    pub tags: HashMap<String, String>,
}

impl VpcSubnetsArgs {
    pub fn new(
        vpc_id: Value,
        cidr_block_public: impl Into<String>,
        cidr_block_private: impl Into<String>,
        azs: Vec<String>,
    ) -> Self {
        Self {
            vpc_id,
            cidr_block_public: cidr_block_public.into(),
            cidr_block_private: cidr_block_private.into(),
            azs,
            create_public_subnets: true,
            enable_ipv6: false,
            tags: HashMap::new(),
        }
    }
}

/// Outputs of a Subnet Fabric instance
///
/// The three id lists are index-aligned with the zones, except that
/// `public_subnet_ids` is empty when public subnets are disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct VpcSubnets {
    pub public_subnet_ids: Vec<Value>,
    pub private_subnet_ids: Vec<Value>,
    pub private_route_table_ids: Vec<Value>,
    pub internet_gateway_id: Option<Value>,
    pub public_route_table_id: Option<Value>,
    pub ipv6_cidr_block: Option<Value>,
}

/// Address blocks of one zone, computed before anything is registered
struct ZonePlan<'a> {
    az: &'a str,
    index: u32,
    public_cidr: Option<String>,
    private_cidr: String,
}

fn plan_zones<'a>(label: &str, args: &'a VpcSubnetsArgs) -> Result<Vec<ZonePlan<'a>>, ConfigError> {
    let mut seen = HashSet::new();
    let mut zones = Vec::with_capacity(args.azs.len());

    for (i, az) in args.azs.iter().enumerate() {
        if !seen.insert(az.as_str()) {
            return Err(ConfigError::invalid_value(
                label,
                "azs",
                format!("availability zone '{}' is listed twice", az),
            ));
        }
        let index = u32::try_from(i).unwrap_or(u32::MAX);

        let public_cidr = if args.create_public_subnets {
            Some(
                cidr_offset(&args.cidr_block_public, index)
                    .map_err(|e| ConfigError::cidr(label, e))?,
            )
        } else {
            None
        };
        let private_cidr = cidr_offset(&args.cidr_block_private, index)
            .map_err(|e| ConfigError::cidr(label, e))?;

        zones.push(ZonePlan {
            az,
            index,
            public_cidr,
            private_cidr,
        });
    }
    Ok(zones)
}

fn ipv6_subnet(block: Option<&Value>, netnum: u32) -> Option<Value> {
    match block {
        Some(Value::ResourceRef(binding_name, attribute_name)) => Some(Value::Derived {
            binding_name: binding_name.clone(),
            attribute_name: attribute_name.clone(),
            transform: Transform::Ipv6Subnet { netnum },
        }),
        _ => None,
    }
}

impl VpcSubnets {
    pub fn new(stack: &mut Stack, name: &str, args: VpcSubnetsArgs) -> StackResult<Self> {
        let label = format!("VpcSubnets {}", name);
        let zones = plan_zones(&label, &args)?;

        let mut scope = ComponentScope::new(stack, TYPE_TOKEN, name);
        let tags = &args.tags;

        let ipv6_cidr_block = if args.enable_ipv6 {
            let assoc = scope.register(
                Resource::new(VPC_IPV6_CIDR_BLOCK_ASSOCIATION, format!("{}-ipv6-assoc", name))
                    .with_attribute("vpc_id", args.vpc_id.clone())
                    .with_attribute("assign_generated_ipv6_cidr_block", true),
            )?;
            Some(assoc.output("ipv6_cidr_block"))
        } else {
            None
        };

        let mut internet_gateway_id = None;
        let mut public_route_table_id = None;
        if args.create_public_subnets {
            let igw_name = format!("{}-igw", name);
            let igw_id = scope
                .register(
                    Resource::new(INTERNET_GATEWAY, &igw_name)
                        .with_attribute("vpc_id", args.vpc_id.clone())
                        .with_attribute("tags", tags_with_name(tags, &igw_name)),
                )?
                .output("id");

            let mut routes = vec![Value::Map(HashMap::from([
                ("cidr_block".to_string(), Value::from("0.0.0.0/0")),
                ("gateway_id".to_string(), igw_id.clone()),
            ]))];
            if args.enable_ipv6 {
                routes.push(Value::Map(HashMap::from([
                    ("ipv6_cidr_block".to_string(), Value::from("::/0")),
                    ("gateway_id".to_string(), igw_id.clone()),
                ])));
            }

            let rt_name = format!("{}-public-rt", name);
            let rt_id = scope
                .register(
                    Resource::new(ROUTE_TABLE, &rt_name)
                        .with_attribute("vpc_id", args.vpc_id.clone())
                        .with_attribute("routes", Value::List(routes))
                        .with_attribute("tags", tags_with_name(tags, &rt_name)),
                )?
                .output("id");

            internet_gateway_id = Some(igw_id);
            public_route_table_id = Some(rt_id);
        }

        let mut public_subnet_ids = Vec::new();
        let mut private_subnet_ids = Vec::with_capacity(zones.len());
        let mut private_route_table_ids = Vec::with_capacity(zones.len());

        for zone in &zones {
            let az = zone.az;
            debug!("{}: zone {} ({})", label, az, zone.index);

            if let (Some(cidr), Some(rt_id)) = (&zone.public_cidr, &public_route_table_id) {
                let subnet_id = scope
                    .register(
                        Resource::new(SUBNET, format!("{}-public-subnet-{}", name, az))
                            .with_attribute("vpc_id", args.vpc_id.clone())
                            .with_attribute("cidr_block", cidr.as_str())
                            .with_attribute("availability_zone", az)
                            .with_attribute("map_public_ip_on_launch", true)
                            .with_attribute("assign_ipv6_address_on_creation", args.enable_ipv6)
                            .with_optional(
                                "ipv6_cidr_block",
                                ipv6_subnet(ipv6_cidr_block.as_ref(), ipv6_public_netnum(zone.index)),
                            )
                            .with_attribute(
                                "tags",
                                tags_with_name(tags, &format!("{}-public-{}", name, az)),
                            ),
                    )?
                    .output("id");

                scope.register(
                    Resource::new(
                        ROUTE_TABLE_ASSOCIATION,
                        format!("{}-public-rt-assoc-{}", name, az),
                    )
                    .with_attribute("subnet_id", subnet_id.clone())
                    .with_attribute("route_table_id", rt_id.clone()),
                )?;
                public_subnet_ids.push(subnet_id);
            }

            let subnet_id = scope
                .register(
                    Resource::new(SUBNET, format!("{}-private-subnet-{}", name, az))
                        .with_attribute("vpc_id", args.vpc_id.clone())
                        .with_attribute("cidr_block", zone.private_cidr.as_str())
                        .with_attribute("availability_zone", az)
                        .with_attribute("map_public_ip_on_launch", false)
                        .with_attribute("assign_ipv6_address_on_creation", args.enable_ipv6)
                        .with_optional(
                            "ipv6_cidr_block",
                            ipv6_subnet(ipv6_cidr_block.as_ref(), ipv6_private_netnum(zone.index)),
                        )
                        .with_attribute(
                            "tags",
                            tags_with_name(tags, &format!("{}-private-{}", name, az)),
                        ),
                )?
                .output("id");

            let rt_name = format!("{}-private-rt-{}", name, az);
            let rt_id = scope
                .register(
                    Resource::new(ROUTE_TABLE, &rt_name)
                        .with_attribute("vpc_id", args.vpc_id.clone())
                        .with_attribute("tags", tags_with_name(tags, &rt_name)),
                )?
                .output("id");

            scope.register(
                Resource::new(
                    ROUTE_TABLE_ASSOCIATION,
                    format!("{}-private-rt-assoc-{}", name, az),
                )
                .with_attribute("subnet_id", subnet_id.clone())
                .with_attribute("route_table_id", rt_id.clone()),
            )?;

            private_subnet_ids.push(subnet_id);
            private_route_table_ids.push(rt_id);
        }

        scope.finish(&[
            "public_subnet_ids",
            "private_subnet_ids",
            "private_route_table_ids",
        ]);

        Ok(Self {
            public_subnet_ids,
            private_subnet_ids,
            private_route_table_ids,
            internet_gateway_id,
            public_route_table_id,
            ipv6_cidr_block,
        })
    }
}
