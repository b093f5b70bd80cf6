//! Resource type names and their provider type tokens
//!
//! Stratus resource types are dotted (`aws.ec2.subnet`); the orchestration
//! engine addresses the same types by provider token
//! (`aws:ec2/subnet:Subnet`).

pub const VPC: &str = "aws.ec2.vpc";
pub const VPC_IPV6_CIDR_BLOCK_ASSOCIATION: &str = "aws.ec2.vpc_ipv6_cidr_block_association";
pub const SUBNET: &str = "aws.ec2.subnet";
pub const INTERNET_GATEWAY: &str = "aws.ec2.internet_gateway";
pub const ROUTE_TABLE: &str = "aws.ec2.route_table";
pub const ROUTE_TABLE_ASSOCIATION: &str = "aws.ec2.route_table_association";
pub const ROUTE: &str = "aws.ec2.route";
pub const EIP: &str = "aws.ec2.eip";
pub const NAT_GATEWAY: &str = "aws.ec2.nat_gateway";
pub const NETWORK_ACL: &str = "aws.ec2.network_acl";
pub const NETWORK_ACL_RULE: &str = "aws.ec2.network_acl_rule";
pub const SECURITY_GROUP: &str = "aws.ec2.security_group";
pub const VPC_ENDPOINT: &str = "aws.ec2.vpc_endpoint";
pub const KMS_KEY: &str = "aws.kms.key";
pub const KMS_ALIAS: &str = "aws.kms.alias";
pub const SECRET: &str = "aws.secretsmanager.secret";
pub const SECRET_VERSION: &str = "aws.secretsmanager.secret_version";
pub const SSM_PARAMETER: &str = "aws.ssm.parameter";

/// Resource type configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Stratus resource type (e.g., "aws.ec2.vpc")
    pub resource_type: &'static str,
    /// Provider type token (e.g., "aws:ec2/vpc:Vpc")
    pub provider_token: &'static str,
    /// Whether this resource type uses tags
    pub has_tags: bool,
}

const fn config(
    resource_type: &'static str,
    provider_token: &'static str,
    has_tags: bool,
) -> ResourceConfig {
    ResourceConfig {
        resource_type,
        provider_token,
        has_tags,
    }
}

pub const RESOURCE_CONFIGS: &[ResourceConfig] = &[
    config(VPC, "aws:ec2/vpc:Vpc", true),
    config(
        VPC_IPV6_CIDR_BLOCK_ASSOCIATION,
        "aws:ec2/vpcIpv6CidrBlockAssociation:VpcIpv6CidrBlockAssociation",
        false,
    ),
    config(SUBNET, "aws:ec2/subnet:Subnet", true),
    config(INTERNET_GATEWAY, "aws:ec2/internetGateway:InternetGateway", true),
    config(ROUTE_TABLE, "aws:ec2/routeTable:RouteTable", true),
    config(
        ROUTE_TABLE_ASSOCIATION,
        "aws:ec2/routeTableAssociation:RouteTableAssociation",
        false,
    ),
    config(ROUTE, "aws:ec2/route:Route", false),
    config(EIP, "aws:ec2/eip:Eip", true),
    config(NAT_GATEWAY, "aws:ec2/natGateway:NatGateway", true),
    config(NETWORK_ACL, "aws:ec2/networkAcl:NetworkAcl", true),
    config(NETWORK_ACL_RULE, "aws:ec2/networkAclRule:NetworkAclRule", false),
    config(SECURITY_GROUP, "aws:ec2/securityGroup:SecurityGroup", true),
    config(VPC_ENDPOINT, "aws:ec2/vpcEndpoint:VpcEndpoint", true),
    config(KMS_KEY, "aws:kms/key:Key", true),
    config(KMS_ALIAS, "aws:kms/alias:Alias", false),
    config(SECRET, "aws:secretsmanager/secret:Secret", true),
    config(
        SECRET_VERSION,
        "aws:secretsmanager/secretVersion:SecretVersion",
        false,
    ),
    config(SSM_PARAMETER, "aws:ssm/parameter:Parameter", true),
];

/// Get resource configuration by Stratus type name
pub fn get_resource_config(resource_type: &str) -> Option<&'static ResourceConfig> {
    RESOURCE_CONFIGS
        .iter()
        .find(|c| c.resource_type == resource_type)
}
