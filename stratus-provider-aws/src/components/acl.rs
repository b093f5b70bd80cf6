//! Network ACL - one ACL over a set of subnets plus one entry per rule

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use stratus_core::error::{ConfigError, StackResult};
use stratus_core::resource::{Resource, Value};
use stratus_core::schema::validate_cidr;
use stratus_core::stack::Stack;

use super::ComponentScope;
use crate::resources::{NETWORK_ACL, NETWORK_ACL_RULE};
use crate::schemas::validate_ipv6_cidr;
use crate::utils::tags_with_name;

pub const TYPE_TOKEN: &str = "custom:aws:VpcAcl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Deny,
}

impl RuleAction {
    fn as_str(self) -> &'static str {
        match self {
            RuleAction::Allow => "allow",
            RuleAction::Deny => "deny",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ingress,
    Egress,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ingress => write!(f, "ingress"),
            Direction::Egress => write!(f, "egress"),
        }
    }
}

/// Rule descriptor, as written in configuration
///
/// ```json
/// { "number": 100, "action": "allow", "direction": "egress",
///   "protocol": "-1", "ipv4_cidr": "0.0.0.0/0" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub number: i64,
    pub action: RuleAction,
    pub direction: Direction,
    pub protocol: String,
    #[serde(default)]
    pub from_port: i64,
    #[serde(default)]
    pub to_port: i64,
    #[serde(default)]
    pub icmp_type: i64,
    #[serde(default)]
    pub icmp_code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_cidr: Option<String>,
}

impl AclRule {
    /// Rule matching all traffic from or to an IPv4 block
    pub fn allow_all(number: i64, direction: Direction, ipv4_cidr: &str) -> Self {
        Self {
            number,
            action: RuleAction::Allow,
            direction,
            protocol: "-1".to_string(),
            from_port: 0,
            to_port: 0,
            icmp_type: 0,
            icmp_code: 0,
            ipv4_cidr: Some(ipv4_cidr.to_string()),
            ipv6_cidr: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VpcAclArgs {
    pub vpc_id: Value,
    /// Subnet name -> subnet id, in association order
    pub subnets: Vec<(String, Value)>,
    /// Rule name -> descriptor; rules are created in key order
    pub rules: BTreeMap<String, AclRule>,
    pub tags: HashMap<String, String>,
}

/// Outputs of a Network ACL instance
#[derive(Debug, Clone, PartialEq)]
pub struct VpcAcl {
    pub network_acl_id: Value,
}

fn validate_rules(label: &str, rules: &BTreeMap<String, AclRule>) -> Result<(), ConfigError> {
    let mut numbers: HashMap<(i64, Direction), &str> = HashMap::new();

    for (key, rule) in rules {
        if rule.ipv4_cidr.is_none() && rule.ipv6_cidr.is_none() {
            return Err(ConfigError::MissingRuleCidr {
                component: label.to_string(),
                rule: key.clone(),
            });
        }
        if let Some(cidr) = &rule.ipv4_cidr {
            validate_cidr(cidr).map_err(|message| {
                ConfigError::invalid_value(label, "ipv4_cidr", format!("rule '{}': {}", key, message))
            })?;
        }
        if let Some(cidr) = &rule.ipv6_cidr {
            validate_ipv6_cidr(cidr).map_err(|message| {
                ConfigError::invalid_value(label, "ipv6_cidr", format!("rule '{}': {}", key, message))
            })?;
        }
        if let Some(first) = numbers.insert((rule.number, rule.direction), key.as_str()) {
            return Err(ConfigError::DuplicateRuleNumber {
                component: label.to_string(),
                first: first.to_string(),
                second: key.clone(),
                direction: rule.direction.to_string(),
                number: rule.number,
            });
        }
    }
    Ok(())
}

impl VpcAcl {
    pub fn new(stack: &mut Stack, name: &str, args: VpcAclArgs) -> StackResult<Self> {
        let label = format!("VpcAcl {}", name);
        validate_rules(&label, &args.rules)?;

        let mut seen = HashSet::new();
        if let Some((dup, _)) = args.subnets.iter().find(|(k, _)| !seen.insert(k.as_str())) {
            return Err(ConfigError::invalid_value(
                &label,
                "subnets",
                format!("subnet '{}' is listed twice", dup),
            )
            .into());
        }

        let mut scope = ComponentScope::new(stack, TYPE_TOKEN, name);
        let subnet_ids: Vec<Value> = args.subnets.iter().map(|(_, id)| id.clone()).collect();

        let network_acl_id = scope
            .register(
                Resource::new(NETWORK_ACL, format!("{}-nacl", name))
                    .with_attribute("vpc_id", args.vpc_id.clone())
                    .with_attribute("subnet_ids", subnet_ids)
                    .with_attribute("tags", tags_with_name(&args.tags, name)),
            )?
            .output("id");

        for (key, rule) in &args.rules {
            scope.register(
                Resource::new(NETWORK_ACL_RULE, format!("{}-rule-{}", name, key))
                    .with_attribute("network_acl_id", network_acl_id.clone())
                    .with_attribute("rule_number", rule.number)
                    .with_attribute("rule_action", rule.action.as_str())
                    .with_attribute("protocol", rule.protocol.as_str())
                    .with_attribute("from_port", rule.from_port)
                    .with_attribute("to_port", rule.to_port)
                    .with_optional("cidr_block", rule.ipv4_cidr.clone())
                    .with_optional("ipv6_cidr_block", rule.ipv6_cidr.clone())
                    .with_attribute("icmp_type", rule.icmp_type)
                    .with_attribute("icmp_code", rule.icmp_code)
                    .with_attribute("egress", rule.direction == Direction::Egress),
            )?;
        }

        scope.finish(&["network_acl_id"]);
        Ok(Self { network_acl_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rules: BTreeMap<String, AclRule>) -> VpcAclArgs {
        VpcAclArgs {
            vpc_id: Value::reference("core-vpc-vpc", "id"),
            subnets: vec![
                ("subnet-0".to_string(), Value::reference("public-0", "id")),
                ("subnet-1".to_string(), Value::reference("public-1", "id")),
            ],
            rules,
            tags: HashMap::new(),
        }
    }

    fn allow_all() -> BTreeMap<String, AclRule> {
        BTreeMap::from([
            (
                "allow_all_egress".to_string(),
                AclRule::allow_all(100, Direction::Egress, "0.0.0.0/0"),
            ),
            (
                "allow_all_ingress".to_string(),
                AclRule::allow_all(100, Direction::Ingress, "0.0.0.0/0"),
            ),
        ])
    }

    #[test]
    fn creates_acl_and_rules() {
        let mut stack = Stack::new("dev");
        let acl = VpcAcl::new(&mut stack, "dev-public-acl", args(allow_all())).unwrap();
        assert_eq!(acl.network_acl_id, Value::reference("dev-public-acl-nacl", "id"));

        let nacl = stack.get("dev-public-acl-nacl").unwrap();
        assert_eq!(
            nacl.get("subnet_ids"),
            Some(&Value::List(vec![
                Value::reference("public-0", "id"),
                Value::reference("public-1", "id"),
            ]))
        );

        let egress = stack.get("dev-public-acl-rule-allow_all_egress").unwrap();
        assert_eq!(egress.get("egress"), Some(&Value::Bool(true)));
        assert_eq!(egress.get("rule_number"), Some(&Value::Int(100)));
        assert_eq!(egress.get("cidr_block"), Some(&Value::from("0.0.0.0/0")));
        assert!(egress.get("ipv6_cidr_block").is_none());

        let ingress = stack.get("dev-public-acl-rule-allow_all_ingress").unwrap();
        assert_eq!(ingress.get("egress"), Some(&Value::Bool(false)));
        assert_eq!(stack.count_of_type(NETWORK_ACL_RULE), 2);
    }

    #[test]
    fn rule_descriptor_defaults() {
        let rule: AclRule = serde_json::from_str(
            r#"{"number": 200, "action": "deny", "direction": "ingress",
                "protocol": "6", "ipv6_cidr": "::/0"}"#,
        )
        .unwrap();
        assert_eq!(rule.action, RuleAction::Deny);
        assert_eq!(rule.from_port, 0);
        assert_eq!(rule.icmp_code, 0);
        assert!(rule.ipv4_cidr.is_none());
    }

    #[test]
    fn rule_without_cidr_is_rejected() {
        let mut rules = allow_all();
        let mut rule = AclRule::allow_all(110, Direction::Ingress, "0.0.0.0/0");
        rule.ipv4_cidr = None;
        rules.insert("no_cidr".to_string(), rule);

        let mut stack = Stack::new("dev");
        let err = VpcAcl::new(&mut stack, "acl", args(rules)).unwrap_err();
        assert!(err.to_string().contains("'no_cidr'"));
        assert!(stack.is_empty());
    }

    #[test]
    fn duplicate_rule_number_in_one_direction_is_rejected() {
        let mut rules = allow_all();
        rules.insert(
            "another_egress".to_string(),
            AclRule::allow_all(100, Direction::Egress, "10.0.0.0/8"),
        );

        let mut stack = Stack::new("dev");
        let err = VpcAcl::new(&mut stack, "acl", args(rules)).unwrap_err();
        match err {
            stratus_core::error::StackError::Config(ConfigError::DuplicateRuleNumber {
                first,
                second,
                direction,
                number,
                ..
            }) => {
                assert_eq!(first, "allow_all_egress");
                assert_eq!(second, "another_egress");
                assert_eq!(direction, "egress");
                assert_eq!(number, 100);
            }
            other => panic!("Expected DuplicateRuleNumber, got {other:?}"),
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn ipv6_only_rule() {
        let mut rule = AclRule::allow_all(120, Direction::Ingress, "0.0.0.0/0");
        rule.ipv4_cidr = None;
        rule.ipv6_cidr = Some("::/0".to_string());
        let rules = BTreeMap::from([("allow_ipv6_ingress".to_string(), rule)]);

        let mut stack = Stack::new("dev");
        VpcAcl::new(&mut stack, "acl", args(rules)).unwrap();

        let entry = stack.get("acl-rule-allow_ipv6_ingress").unwrap();
        assert_eq!(entry.get("ipv6_cidr_block"), Some(&Value::from("::/0")));
        assert!(entry.get("cidr_block").is_none());
        assert_eq!(entry.get("egress"), Some(&Value::Bool(false)));
        assert_eq!(entry.get("rule_number"), Some(&Value::Int(120)));
    }

    #[test]
    fn malformed_rule_cidr_is_rejected() {
        let mut rules = BTreeMap::new();
        rules.insert(
            "bad".to_string(),
            AclRule::allow_all(100, Direction::Egress, "0.0.0.0"),
        );
        let mut stack = Stack::new("dev");
        assert!(VpcAcl::new(&mut stack, "acl", args(rules)).is_err());
        assert!(stack.is_empty());
    }
}
