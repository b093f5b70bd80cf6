//! EC2 network resource schemas

use stratus_core::resource::Value;
use stratus_core::schema::{AttributeType, ResourceSchema, types};

use super::{attr, enum_type, int_range, ipv6_cidr, port};
use crate::resources::*;

const INSTANCE_TENANCY: &[&str] = &["default", "dedicated", "host"];

pub const VPC_ENDPOINT_TYPES: &[&str] = &[
    "Gateway",
    "GatewayLoadBalancer",
    "Interface",
    "Resource",
    "ServiceNetwork",
];

/// Network ACL rule number (1-32766)
pub fn rule_number() -> AttributeType {
    int_range!("RuleNumber", 1, 32766)
}

/// One entry of a route table's inline routes
fn route_entry() -> AttributeType {
    AttributeType::Map(Box::new(AttributeType::String))
}

pub fn schema(resource_type: &str) -> Option<ResourceSchema> {
    let schema = match resource_type {
        VPC => vpc(),
        VPC_IPV6_CIDR_BLOCK_ASSOCIATION => vpc_ipv6_cidr_block_association(),
        SUBNET => subnet(),
        INTERNET_GATEWAY => internet_gateway(),
        ROUTE_TABLE => route_table(),
        ROUTE_TABLE_ASSOCIATION => route_table_association(),
        ROUTE => route(),
        EIP => eip(),
        NAT_GATEWAY => nat_gateway(),
        NETWORK_ACL => network_acl(),
        NETWORK_ACL_RULE => network_acl_rule(),
        SECURITY_GROUP => security_group(),
        VPC_ENDPOINT => vpc_endpoint(),
        _ => return None,
    };
    Some(schema)
}

fn vpc() -> ResourceSchema {
    ResourceSchema::new(VPC)
        .with_description("Virtual network container")
        .attribute(
            attr("cidr_block", types::cidr())
                .required()
                .with_description("The IPv4 CIDR block for the VPC"),
        )
        .attribute(attr("enable_dns_support", AttributeType::Bool))
        .attribute(attr("enable_dns_hostnames", AttributeType::Bool))
        .attribute(attr("instance_tenancy", enum_type(INSTANCE_TENANCY)))
        .attribute(attr("assign_generated_ipv6_cidr_block", AttributeType::Bool))
}

fn vpc_ipv6_cidr_block_association() -> ResourceSchema {
    ResourceSchema::new(VPC_IPV6_CIDR_BLOCK_ASSOCIATION)
        .with_description("Associates an IPv6 CIDR block with a VPC")
        .attribute(attr("vpc_id", AttributeType::String).required())
        .attribute(
            attr("assign_generated_ipv6_cidr_block", AttributeType::Bool)
                .with_description("Request an Amazon-provided /56 IPv6 CIDR block"),
        )
        .attribute(attr("ipv6_cidr_block", ipv6_cidr()))
        .attribute(attr("ipv6_ipam_pool_id", AttributeType::String))
}

fn subnet() -> ResourceSchema {
    ResourceSchema::new(SUBNET)
        .with_description("Subnet in one availability zone of a VPC")
        .attribute(attr("vpc_id", AttributeType::String).required())
        .attribute(attr("cidr_block", types::cidr()))
        .attribute(attr("availability_zone", AttributeType::String))
        .attribute(attr("map_public_ip_on_launch", AttributeType::Bool))
        .attribute(attr("assign_ipv6_address_on_creation", AttributeType::Bool))
        .attribute(attr("ipv6_cidr_block", ipv6_cidr()))
}

fn internet_gateway() -> ResourceSchema {
    ResourceSchema::new(INTERNET_GATEWAY).attribute(attr("vpc_id", AttributeType::String))
}

fn route_table() -> ResourceSchema {
    ResourceSchema::new(ROUTE_TABLE)
        .attribute(attr("vpc_id", AttributeType::String).required())
        .attribute(
            attr("routes", AttributeType::List(Box::new(route_entry())))
                .with_description("Inline routes (cidr_block or ipv6_cidr_block with a target)"),
        )
}

fn route_table_association() -> ResourceSchema {
    ResourceSchema::new(ROUTE_TABLE_ASSOCIATION)
        .attribute(attr("route_table_id", AttributeType::String).required())
        .attribute(attr("subnet_id", AttributeType::String))
        .attribute(attr("gateway_id", AttributeType::String))
}

fn route() -> ResourceSchema {
    ResourceSchema::new(ROUTE)
        .attribute(attr("route_table_id", AttributeType::String).required())
        .attribute(attr("destination_cidr_block", types::cidr()))
        .attribute(attr("destination_ipv6_cidr_block", ipv6_cidr()))
        .attribute(attr("gateway_id", AttributeType::String))
        .attribute(attr("nat_gateway_id", AttributeType::String))
}

fn eip() -> ResourceSchema {
    ResourceSchema::new(EIP)
        .with_description("Elastic IP address")
        .attribute(attr("domain", enum_type(&["vpc", "standard"])))
}

fn nat_gateway() -> ResourceSchema {
    ResourceSchema::new(NAT_GATEWAY)
        .attribute(attr("subnet_id", AttributeType::String).required())
        .attribute(attr("allocation_id", AttributeType::String))
        .attribute(attr("connectivity_type", enum_type(&["public", "private"])))
}

fn network_acl() -> ResourceSchema {
    ResourceSchema::new(NETWORK_ACL)
        .attribute(attr("vpc_id", AttributeType::String).required())
        .attribute(attr("subnet_ids", types::string_list()))
}

fn network_acl_rule() -> ResourceSchema {
    ResourceSchema::new(NETWORK_ACL_RULE)
        .attribute(attr("network_acl_id", AttributeType::String).required())
        .attribute(
            attr("rule_number", rule_number())
                .required()
                .with_description("Rules are evaluated in ascending rule number order"),
        )
        .attribute(attr("rule_action", enum_type(&["allow", "deny"])).required())
        .attribute(
            attr("protocol", AttributeType::String)
                .required()
                .with_description("Protocol number or name; -1 means all protocols"),
        )
        .attribute(attr("egress", AttributeType::Bool))
        .attribute(attr("from_port", port()))
        .attribute(attr("to_port", port()))
        .attribute(attr("cidr_block", types::cidr()))
        .attribute(attr("ipv6_cidr_block", ipv6_cidr()))
        .attribute(attr("icmp_type", AttributeType::Int))
        .attribute(attr("icmp_code", AttributeType::Int))
}

fn security_group() -> ResourceSchema {
    ResourceSchema::new(SECURITY_GROUP)
        .attribute(attr("name", AttributeType::String))
        .attribute(attr("description", AttributeType::String))
        .attribute(attr("vpc_id", AttributeType::String))
}

fn vpc_endpoint() -> ResourceSchema {
    ResourceSchema::new(VPC_ENDPOINT)
        .with_description("Private connection from a VPC to a regional service")
        .attribute(attr("vpc_id", AttributeType::String).required())
        .attribute(attr("service_name", AttributeType::String).required())
        .attribute(attr("vpc_endpoint_type", enum_type(VPC_ENDPOINT_TYPES)))
        .attribute(attr("private_dns_enabled", AttributeType::Bool))
        .attribute(attr("subnet_ids", types::string_list()))
        .attribute(attr("route_table_ids", types::string_list()))
        .attribute(attr("security_group_ids", types::string_list()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn network_acl_rule_requires_core_fields() {
        let schema = schema(NETWORK_ACL_RULE).unwrap();
        let errors = schema.validate(&HashMap::new()).unwrap_err();
        let missing: Vec<_> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            missing,
            vec![
                "Required attribute 'network_acl_id' is missing",
                "Required attribute 'protocol' is missing",
                "Required attribute 'rule_action' is missing",
                "Required attribute 'rule_number' is missing",
            ]
        );
    }

    #[test]
    fn rule_number_range() {
        let t = rule_number();
        assert!(t.validate(&Value::Int(100)).is_ok());
        assert!(t.validate(&Value::Int(0)).is_err());
        assert!(t.validate(&Value::Int(32767)).is_err());
    }

    #[test]
    fn subnet_accepts_derived_ipv6_block() {
        let schema = schema(SUBNET).unwrap();
        let mut attrs = HashMap::new();
        attrs.insert("vpc_id".to_string(), Value::reference("vpc", "id"));
        attrs.insert(
            "ipv6_cidr_block".to_string(),
            Value::Derived {
                binding_name: "assoc".to_string(),
                attribute_name: "ipv6_cidr_block".to_string(),
                transform: stratus_core::resource::Transform::Ipv6Subnet { netnum: 10 },
            },
        );
        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn unknown_type_has_no_schema() {
        assert!(schema(KMS_KEY).is_none());
        assert!(schema("aws.ec2.instance").is_none());
    }
}
