//! KMS Module - customer-managed key, alias and key policy
//!
//! Account, region and partition for the policy ARNs come from the
//! [`AwsContext`] passed in by the caller.

use std::ops::RangeInclusive;

use log::{info, warn};
use stratus_core::context::AwsContext;
use stratus_core::error::{ConfigError, StackResult};
use stratus_core::resource::{Resource, Value};
use stratus_core::stack::Stack;

use super::policy::{PolicyDocument, Statement};
use crate::resources::{KMS_ALIAS, KMS_KEY};
use crate::schemas::kms::validate_alias_name;

const DELETION_WINDOW_DAYS: RangeInclusive<i64> = 7..=30;
const ROTATION_PERIOD_DAYS: RangeInclusive<i64> = 90..=2560;

const CLOUDWATCH_ACTIONS: &[&str] = &[
    "kms:Encrypt*",
    "kms:Decrypt*",
    "kms:ReEncrypt*",
    "kms:GenerateDataKey*",
    "kms:Describe*",
];

#[derive(Debug, Clone)]
pub struct KmsModuleArgs {
    pub enable_iam_permissions: bool,
    pub enable_key_rotation: bool,
    pub key_rotation_days: i64,
    /// Deletion window in days
    pub delete_hold: i64,
    pub key_spec: String,
    pub key_usage: String,
    pub enabled_cloudwatch_log_delivery: bool,
    /// Reserved, not yet wired into the policy
    pub enabled_route53_dnssec: bool,
    pub enabled_route53_dnssec_cloudwatch_logs: bool,
    /// Reserved, not yet wired into the policy
    pub enabled_service_identifiers: Vec<String>,
    pub additional_cloudwatch_log_delivery_arns: Vec<String>,
    /// Reserved, not yet wired into the policy
    pub custom_key_policy: Option<serde_json::Value>,
}

impl Default for KmsModuleArgs {
    fn default() -> Self {
        Self {
            enable_iam_permissions: true,
            enable_key_rotation: true,
            key_rotation_days: 365,
            delete_hold: 7,
            key_spec: "SYMMETRIC_DEFAULT".to_string(),
            key_usage: "ENCRYPT_DECRYPT".to_string(),
            enabled_cloudwatch_log_delivery: false,
            enabled_route53_dnssec: false,
            enabled_route53_dnssec_cloudwatch_logs: false,
            enabled_service_identifiers: Vec::new(),
            additional_cloudwatch_log_delivery_arns: Vec::new(),
            custom_key_policy: None,
        }
    }
}

/// Outputs of a KMS Module
#[derive(Debug, Clone, PartialEq)]
pub struct KmsModule {
    pub key_id: Value,
    pub key_arn: Value,
    pub alias_arn: Value,
    pub policy: PolicyDocument,
}

/// Build the key policy; statements only ever get appended
pub fn key_policy(ctx: &AwsContext, name: &str, args: &KmsModuleArgs) -> PolicyDocument {
    let mut policy = PolicyDocument::default();

    if args.enable_iam_permissions {
        policy.push(
            Statement::allow("EnableIAMUserPermissions")
                .principal("AWS", vec![ctx.root_arn()])
                .actions(&["kms:*"])
                .resources(&["*"]),
        );
    }

    if args.enabled_cloudwatch_log_delivery {
        let logs = ctx.service_arn_prefix("logs");
        let mut arns = vec![format!("{}:*{}*", logs, name)];
        if args.enabled_route53_dnssec_cloudwatch_logs {
            arns.push(format!("{}:log-group:/aws/route53/*", logs));
        }
        arns.extend(args.additional_cloudwatch_log_delivery_arns.iter().cloned());

        policy.push(
            Statement::allow("CloudWatchAccess")
                .principal("Service", vec![ctx.service_principal("logs")])
                .actions(CLOUDWATCH_ACTIONS)
                .resources(&["*"])
                .condition("ArnLike", "kms:EncryptionContext:aws:logs:arn", arns),
        );
    }

    policy
}

fn warn_reserved(name: &str, args: &KmsModuleArgs) {
    if args.custom_key_policy.is_some() {
        warn!("KmsModule {}: custom_key_policy is reserved and not yet applied", name);
    }
    if args.enabled_route53_dnssec {
        warn!("KmsModule {}: enabled_route53_dnssec is reserved and not yet applied", name);
    }
    if !args.enabled_service_identifiers.is_empty() {
        warn!(
            "KmsModule {}: enabled_service_identifiers is reserved and not yet applied",
            name
        );
    }
}

impl KmsModule {
    pub fn new(
        stack: &mut Stack,
        ctx: &AwsContext,
        name: &str,
        args: KmsModuleArgs,
    ) -> StackResult<Self> {
        let label = format!("KmsModule {}", name);
        let alias_name = format!("alias/{}", name);
        validate_alias_name(&alias_name)
            .map_err(|message| ConfigError::invalid_value(&label, "name", message))?;
        if !DELETION_WINDOW_DAYS.contains(&args.delete_hold) {
            return Err(ConfigError::invalid_value(
                &label,
                "delete_hold",
                format!("{} days is outside {:?}", args.delete_hold, DELETION_WINDOW_DAYS),
            )
            .into());
        }
        if args.enable_key_rotation && !ROTATION_PERIOD_DAYS.contains(&args.key_rotation_days) {
            return Err(ConfigError::invalid_value(
                &label,
                "key_rotation_days",
                format!(
                    "{} days is outside {:?}",
                    args.key_rotation_days, ROTATION_PERIOD_DAYS
                ),
            )
            .into());
        }
        warn_reserved(name, &args);

        let policy = key_policy(ctx, name, &args);
        let policy_json = policy
            .to_json()
            .map_err(|e| ConfigError::invalid_value(&label, "policy", e.to_string()))?;

        let key = stack.register(
            Resource::new(KMS_KEY, format!("{}-key", name))
                .with_attribute("description", format!("CMK for stack {}", name))
                .with_attribute("deletion_window_in_days", args.delete_hold)
                .with_attribute("enable_key_rotation", args.enable_key_rotation)
                .with_optional(
                    "rotation_period_in_days",
                    args.enable_key_rotation.then_some(args.key_rotation_days),
                )
                .with_attribute("customer_master_key_spec", args.key_spec.as_str())
                .with_attribute("key_usage", args.key_usage.as_str())
                .with_attribute("policy", policy_json)
                .with_attribute(
                    "tags",
                    Value::Map([("Name".to_string(), Value::from(name))].into()),
                ),
        )?;
        let key_id = key.output("id");
        let key_arn = key.output("arn");
        let target_key_id = key.output("key_id");

        let alias_arn = stack
            .register(
                Resource::new(KMS_ALIAS, format!("{}-alias", name))
                    .with_attribute("name", alias_name)
                    .with_attribute("target_key_id", target_key_id),
            )?
            .output("arn");

        info!(
            "{}: key with {} policy statements",
            label,
            policy.statement.len()
        );
        Ok(Self {
            key_id,
            key_arn,
            alias_arn,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AwsContext {
        AwsContext::new("123456789012", "us-east-2", "aws")
    }

    #[test]
    fn default_policy_has_root_statement_only() {
        let mut stack = Stack::new("dev");
        let kms = KmsModule::new(&mut stack, &ctx(), "myapp", KmsModuleArgs::default()).unwrap();

        assert_eq!(kms.policy.statement.len(), 1);
        let root = &kms.policy.statement[0];
        assert_eq!(root.sid.as_deref(), Some("EnableIAMUserPermissions"));
        assert_eq!(
            root.principal["AWS"],
            vec!["arn:aws:iam::123456789012:root".to_string()]
        );
        assert_eq!(root.action, vec!["kms:*".to_string()]);
    }

    #[test]
    fn cloudwatch_delivery_adds_one_statement() {
        let args = KmsModuleArgs {
            enabled_cloudwatch_log_delivery: true,
            ..Default::default()
        };
        let policy = key_policy(&ctx(), "myapp", &args);

        assert_eq!(policy.statement.len(), 2);
        let cw = &policy.statement[1];
        assert_eq!(cw.sid.as_deref(), Some("CloudWatchAccess"));
        assert_eq!(
            cw.principal["Service"],
            vec!["logs.us-east-2.amazonaws.com".to_string()]
        );
        let values = &cw.condition["ArnLike"]["kms:EncryptionContext:aws:logs:arn"];
        assert_eq!(
            values,
            &vec!["arn:aws:logs:us-east-2:123456789012:*myapp*".to_string()]
        );
    }

    #[test]
    fn cloudwatch_arns_keep_order() {
        let args = KmsModuleArgs {
            enable_iam_permissions: false,
            enabled_cloudwatch_log_delivery: true,
            enabled_route53_dnssec_cloudwatch_logs: true,
            additional_cloudwatch_log_delivery_arns: vec!["arn:aws:logs:us-east-2:1:extra".to_string()],
            ..Default::default()
        };
        let policy = key_policy(&AwsContext::new("123456789012", "us-east-2", "aws-cn"), "myapp", &args);

        assert_eq!(policy.statement.len(), 1);
        let values = &policy.statement[0].condition["ArnLike"]["kms:EncryptionContext:aws:logs:arn"];
        assert_eq!(
            values,
            &vec![
                "arn:aws-cn:logs:us-east-2:123456789012:*myapp*".to_string(),
                "arn:aws-cn:logs:us-east-2:123456789012:log-group:/aws/route53/*".to_string(),
                "arn:aws:logs:us-east-2:1:extra".to_string(),
            ]
        );
    }

    #[test]
    fn reserved_parameters_do_not_change_policy() {
        let args = KmsModuleArgs {
            enabled_route53_dnssec: true,
            enabled_service_identifiers: vec!["ec2".to_string()],
            custom_key_policy: Some(serde_json::json!({"Statement": []})),
            ..Default::default()
        };
        assert_eq!(
            key_policy(&ctx(), "myapp", &args),
            key_policy(&ctx(), "myapp", &KmsModuleArgs::default())
        );
    }

    #[test]
    fn key_and_alias_attributes() {
        let mut stack = Stack::new("dev");
        let kms = KmsModule::new(&mut stack, &ctx(), "myapp", KmsModuleArgs::default()).unwrap();
        assert_eq!(kms.key_arn, Value::reference("myapp-key", "arn"));

        let key = stack.get("myapp-key").unwrap();
        assert_eq!(key.get("description"), Some(&Value::from("CMK for stack myapp")));
        assert_eq!(key.get("rotation_period_in_days"), Some(&Value::Int(365)));
        assert_eq!(key.get("deletion_window_in_days"), Some(&Value::Int(7)));
        let policy: PolicyDocument =
            serde_json::from_str(key.get("policy").and_then(Value::as_str).unwrap()).unwrap();
        assert_eq!(policy, kms.policy);

        let alias = stack.get("myapp-alias").unwrap();
        assert_eq!(alias.get("name"), Some(&Value::from("alias/myapp")));
        assert_eq!(
            alias.get("target_key_id"),
            Some(&Value::reference("myapp-key", "key_id"))
        );
        assert!(alias.source.is_root());
    }

    #[test]
    fn rotation_period_only_when_rotating() {
        let mut stack = Stack::new("dev");
        let args = KmsModuleArgs {
            enable_key_rotation: false,
            key_rotation_days: 0,
            ..Default::default()
        };
        KmsModule::new(&mut stack, &ctx(), "myapp", args).unwrap();
        assert!(stack.get("myapp-key").unwrap().get("rotation_period_in_days").is_none());
    }

    #[test]
    fn invalid_deletion_window_registers_nothing() {
        let mut stack = Stack::new("dev");
        let args = KmsModuleArgs {
            delete_hold: 3,
            ..Default::default()
        };
        let err = KmsModule::new(&mut stack, &ctx(), "myapp", args).unwrap_err();
        assert!(err.to_string().contains("delete_hold"));
        assert!(stack.is_empty());
    }
}
