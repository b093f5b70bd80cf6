//! Reference composition: KMS key, SSM parameter, secret and a three-zone
//! network with NAT, ACL and endpoints

use std::collections::{BTreeMap, HashMap};

use log::info;
use stratus_core::config::StackConfig;
use stratus_core::error::StackResult;
use stratus_core::resource::Value;
use stratus_core::stack::Stack;
use stratus_provider_aws::components::acl::Direction;
use stratus_provider_aws::components::{
    AclRule, KmsModule, KmsModuleArgs, NatGateway, NatGatewayArgs, SecretManagerSecret,
    SecretManagerSecretArgs, SecretValue, SsmParameter, SsmParameterArgs, VpcAcl, VpcAclArgs,
    VpcEndpoint, VpcEndpointArgs, VpcOnly, VpcOnlyArgs, VpcSubnets, VpcSubnetsArgs,
};

fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Zones to spread subnets over: `azs` from the configuration, or zones
/// a, b and c of the stack's region
fn availability_zones(config: &StackConfig) -> StackResult<Vec<String>> {
    Ok(config
        .get_object::<Vec<String>>("azs")?
        .unwrap_or_else(|| {
            ["a", "b", "c"]
                .iter()
                .map(|suffix| format!("{}{}", config.region, suffix))
                .collect()
        }))
}

/// Build the stack described by a configuration
pub fn compose(config: &StackConfig) -> StackResult<Stack> {
    let ctx = config.context();
    let mut stack = Stack::new(&config.stack);

    let subnet_definitions: serde_json::Map<String, serde_json::Value> =
        config.require_object("subnetDefinitions")?;
    info!(
        "subnetDefinitions has {} entries; reserved, not yet wired into the network",
        subnet_definitions.len()
    );

    let kms = KmsModule::new(
        &mut stack,
        &ctx,
        "myapp",
        KmsModuleArgs {
            enable_iam_permissions: true,
            enable_key_rotation: true,
            ..Default::default()
        },
    )?;
    stack.export("kms_key_arn", kms.key_arn.clone())?;

    let param = SsmParameter::new(
        &mut stack,
        "db-password",
        SsmParameterArgs {
            value: Some("super-secret-password".to_string()),
            parameter_type: "SecureString".to_string(),
            key_id: Some(kms.key_id.clone()),
            tags: tags(&[("App", "backend")]),
            ..Default::default()
        },
    )?;
    stack.export("ssm_param_name", param.name)?;
    stack.export("ssm_param_version", param.version)?;

    let credentials = serde_json::Map::from_iter([
        ("username".to_string(), serde_json::Value::from("admin")),
        ("password".to_string(), serde_json::Value::from("super-secret")),
    ]);
    let secret = SecretManagerSecret::new(
        &mut stack,
        "db-credentialsv2",
        SecretManagerSecretArgs {
            secret_value: Some(SecretValue::Structured(credentials)),
            description: Some("Database credentials for app".to_string()),
            kms_key_id: Some(kms.key_arn.clone()),
            tags: tags(&[("App", "backend"), ("Env", "prod")]),
            ..Default::default()
        },
    )?;
    stack.export("secret_arn", secret.arn)?;

    let vpc = VpcOnly::new(
        &mut stack,
        "core-vpc",
        VpcOnlyArgs {
            tags: tags(&[("Environment", "dev"), ("Owner", "team-network")]),
            ..VpcOnlyArgs::new("10.0.0.0/16")
        },
    )?;
    stack.export("vpc_id", vpc.vpc_id.clone())?;
    stack.export("vpc_cidr", vpc.cidr_block.clone())?;

    let subnets = VpcSubnets::new(
        &mut stack,
        "app-network",
        VpcSubnetsArgs {
            create_public_subnets: true,
            enable_ipv6: false,
            tags: tags(&[("Environment", "dev")]),
            ..VpcSubnetsArgs::new(
                vpc.vpc_id.clone(),
                "10.0.1.0/24",
                "10.0.101.0/24",
                availability_zones(config)?,
            )
        },
    )?;
    stack.export("public_subnet_ids", Value::List(subnets.public_subnet_ids.clone()))?;
    stack.export("private_subnet_ids", Value::List(subnets.private_subnet_ids.clone()))?;

    NatGateway::new(
        &mut stack,
        "my-nat",
        NatGatewayArgs {
            public_subnet_ids: subnets.public_subnet_ids.clone(),
            private_route_table_ids: subnets.private_route_table_ids.clone(),
            tags: tags(&[("Environment", "dev")]),
        },
    )?;

    VpcAcl::new(
        &mut stack,
        &format!("{}-public-acl", config.stack),
        VpcAclArgs {
            vpc_id: vpc.vpc_id.clone(),
            subnets: subnets
                .public_subnet_ids
                .iter()
                .enumerate()
                .map(|(i, id)| (format!("subnet-{}", i), id.clone()))
                .collect(),
            rules: BTreeMap::from([
                (
                    "allow_all_egress".to_string(),
                    AclRule::allow_all(100, Direction::Egress, "0.0.0.0/0"),
                ),
                (
                    "allow_all_ingress".to_string(),
                    AclRule::allow_all(100, Direction::Ingress, "0.0.0.0/0"),
                ),
            ]),
            tags: tags(&[("Environment", "dev")]),
        },
    )?;

    VpcEndpoint::new(
        &mut stack,
        &ctx,
        "s3-gateway",
        VpcEndpointArgs {
            gateway_route_tables: subnets.private_route_table_ids.clone(),
            tags: tags(&[("Environment", "dev")]),
            ..VpcEndpointArgs::new(vpc.vpc_id.clone(), "com.amazonaws.__REGION__.s3", "Gateway")
        },
    )?;

    VpcEndpoint::new(
        &mut stack,
        &ctx,
        "ssm-endpoint",
        VpcEndpointArgs {
            allowed_subnets: subnets.private_subnet_ids.clone(),
            tags: tags(&[("Environment", "dev")]),
            ..VpcEndpointArgs::new(
                vpc.vpc_id.clone(),
                "com.amazonaws.__REGION__.ssm",
                "Interface",
            )
        },
    )?;

    info!("composed stack {} with {} resources", stack.name(), stack.len());
    Ok(stack)
}
