//! SSM Parameter - one Parameter Store value

use std::collections::HashMap;
use std::path::PathBuf;

use stratus_core::error::{ConfigError, StackResult};
use stratus_core::resource::{Resource, Value};
use stratus_core::stack::Stack;

use super::{ComponentScope, Source, exactly_one, read_file};
use crate::resources::SSM_PARAMETER;
use crate::schemas::secrets::{PARAMETER_TIERS, PARAMETER_TYPES, validate_parameter_name};

pub const TYPE_TOKEN: &str = "custom:aws:SsmParameter";

#[derive(Debug, Clone)]
pub struct SsmParameterArgs {
    pub value: Option<String>,
    /// Read at composition time, surrounding whitespace trimmed
    pub value_from_file: Option<PathBuf>,
    /// String, SecureString or StringList
    pub parameter_type: String,
    /// KMS key, only applied to SecureString parameters
    pub key_id: Option<Value>,
    pub description: Option<String>,
    pub tags: HashMap<String, String>,
    pub overwrite: bool,
    /// Standard or Advanced
    pub tier: String,
}

impl Default for SsmParameterArgs {
    fn default() -> Self {
        Self {
            value: None,
            value_from_file: None,
            parameter_type: "String".to_string(),
            key_id: None,
            description: None,
            tags: HashMap::new(),
            overwrite: true,
            tier: "Standard".to_string(),
        }
    }
}

/// Outputs of an SSM Parameter instance
#[derive(Debug, Clone, PartialEq)]
pub struct SsmParameter {
    pub name: Value,
    pub version: Value,
    pub arn: Value,
}

fn one_of(label: &str, field: &'static str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            label,
            field,
            format!("'{}' is not one of {}", value, allowed.join(", ")),
        ))
    }
}

impl SsmParameter {
    pub fn new(stack: &mut Stack, name: &str, args: SsmParameterArgs) -> StackResult<Self> {
        let label = format!("SsmParameter {}", name);
        let source = exactly_one(
            &label,
            args.value.as_deref(),
            "value",
            args.value_from_file.as_deref(),
            "value_from_file",
        )?;
        let value = match source {
            Source::Inline(value) => value.to_string(),
            Source::File(path) => read_file(&path)?.trim().to_string(),
        };
        if value.is_empty() {
            return Err(ConfigError::missing_value(&label, "value", "value_from_file").into());
        }

        let parameter_name = format!("/{}", name);
        validate_parameter_name(&parameter_name)
            .map_err(|message| ConfigError::invalid_value(&label, "name", message))?;
        one_of(&label, "type", &args.parameter_type, PARAMETER_TYPES)?;
        one_of(&label, "tier", &args.tier, PARAMETER_TIERS)?;

        let key_id = if args.parameter_type == "SecureString" {
            args.key_id
        } else {
            None
        };

        let mut scope = ComponentScope::new(stack, TYPE_TOKEN, name);
        let parameter = scope.register(
            Resource::new(SSM_PARAMETER, format!("{}-param", name))
                .with_attribute("name", parameter_name)
                .with_attribute("type", args.parameter_type.as_str())
                .with_attribute("value", value)
                .with_optional("description", args.description)
                .with_optional("key_id", key_id)
                .with_optional(
                    "tags",
                    (!args.tags.is_empty()).then(|| Value::string_map(&args.tags)),
                )
                .with_attribute("overwrite", args.overwrite)
                .with_attribute("tier", args.tier.as_str()),
        )?;
        let outputs = Self {
            name: parameter.output("name"),
            version: parameter.output("version"),
            arn: parameter.output("arn"),
        };

        scope.finish(&["parameter"]);
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn secure_string_keeps_key() {
        let mut stack = Stack::new("dev");
        let args = SsmParameterArgs {
            value: Some("super-secret-password".to_string()),
            parameter_type: "SecureString".to_string(),
            key_id: Some(Value::reference("myapp-key", "id")),
            tags: HashMap::from([("App".to_string(), "backend".to_string())]),
            ..Default::default()
        };
        let param = SsmParameter::new(&mut stack, "db-password", args).unwrap();
        assert_eq!(param.name, Value::reference("db-password-param", "name"));
        assert_eq!(param.version, Value::reference("db-password-param", "version"));

        let resource = stack.get("db-password-param").unwrap();
        assert_eq!(resource.get("name"), Some(&Value::from("/db-password")));
        assert_eq!(resource.get("key_id"), Some(&Value::reference("myapp-key", "id")));
        assert_eq!(resource.get("overwrite"), Some(&Value::Bool(true)));
        assert_eq!(resource.get("tier"), Some(&Value::from("Standard")));
        assert!(resource.get("description").is_none());
    }

    #[test]
    fn plain_string_drops_key() {
        let mut stack = Stack::new("dev");
        let args = SsmParameterArgs {
            value: Some("v".to_string()),
            key_id: Some(Value::reference("myapp-key", "id")),
            ..Default::default()
        };
        SsmParameter::new(&mut stack, "app-flag", args).unwrap();
        let resource = stack.get("app-flag-param").unwrap();
        assert!(resource.get("key_id").is_none());
        assert!(resource.get("tags").is_none());
    }

    #[test]
    fn missing_value_creates_nothing() {
        let mut stack = Stack::new("dev");
        let err = SsmParameter::new(&mut stack, "db-password", SsmParameterArgs::default())
            .unwrap_err();
        assert!(matches!(
            err,
            stratus_core::error::StackError::Config(ConfigError::MissingValue { .. })
        ));
        assert!(stack.is_empty());
    }

    #[test]
    fn value_and_file_are_mutually_exclusive() {
        let file = NamedTempFile::new().unwrap();
        let mut stack = Stack::new("dev");
        let args = SsmParameterArgs {
            value: Some("inline".to_string()),
            value_from_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let err = SsmParameter::new(&mut stack, "db-password", args).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
        assert!(stack.is_empty());
    }

    #[test]
    fn file_value_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  from-file  ").unwrap();

        let mut stack = Stack::new("dev");
        let args = SsmParameterArgs {
            value_from_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        SsmParameter::new(&mut stack, "db-password", args).unwrap();
        assert_eq!(
            stack.get("db-password-param").unwrap().get("value"),
            Some(&Value::from("from-file"))
        );
    }

    #[test]
    fn blank_file_is_a_missing_value() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();

        let mut stack = Stack::new("dev");
        let args = SsmParameterArgs {
            value_from_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert!(SsmParameter::new(&mut stack, "db-password", args).is_err());
        assert!(stack.is_empty());
    }

    #[test]
    fn unreadable_file_is_reported() {
        let mut stack = Stack::new("dev");
        let args = SsmParameterArgs {
            value_from_file: Some(PathBuf::from("/nonexistent/stratus/value.txt")),
            ..Default::default()
        };
        let err = SsmParameter::new(&mut stack, "db-password", args).unwrap_err();
        assert!(matches!(
            err,
            stratus_core::error::StackError::Config(ConfigError::ReadFile { .. })
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut stack = Stack::new("dev");
        let args = SsmParameterArgs {
            value: Some("v".to_string()),
            parameter_type: "Secret".to_string(),
            ..Default::default()
        };
        assert!(SsmParameter::new(&mut stack, "db-password", args).is_err());
        assert!(stack.is_empty());
    }
}
