//! Components - Reusable groups of AWS resources
//!
//! Each component validates its whole input before registering anything,
//! so a configuration error leaves the stack untouched.

pub mod acl;
pub mod endpoint;
pub mod kms;
pub mod nat;
pub mod policy;
pub mod secret;
pub mod ssm;
pub mod subnets;
pub mod vpc;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use stratus_core::error::{ConfigError, StackResult};
use stratus_core::resource::{ComponentSource, Resource};
use stratus_core::stack::Stack;

pub use acl::{AclRule, VpcAcl, VpcAclArgs};
pub use endpoint::{VpcEndpoint, VpcEndpointArgs};
pub use kms::{KmsModule, KmsModuleArgs};
pub use nat::{NatGateway, NatGatewayArgs};
pub use secret::{SecretManagerSecret, SecretManagerSecretArgs, SecretValue};
pub use ssm::{SsmParameter, SsmParameterArgs};
pub use subnets::{VpcSubnets, VpcSubnetsArgs};
pub use vpc::{VpcOnly, VpcOnlyArgs};

/// Registers resources on behalf of one component instance
pub(crate) struct ComponentScope<'a> {
    stack: &'a mut Stack,
    source: ComponentSource,
}

impl<'a> ComponentScope<'a> {
    pub(crate) fn new(stack: &'a mut Stack, type_token: &str, name: &str) -> Self {
        Self {
            stack,
            source: ComponentSource::component(type_token, name),
        }
    }

    pub(crate) fn register(&mut self, resource: Resource) -> StackResult<&Resource> {
        self.stack.register(resource.with_source(self.source.clone()))
    }

    /// Record the component and the outputs it exposes
    pub(crate) fn finish(self, outputs: &[&str]) {
        let count = self.stack.resources_of_component(&self.source).count();
        info!("{}: {} resources", self.source, count);
        self.stack.register_component(self.source, outputs);
    }
}

/// Exactly one of an inline value or a file path
pub(crate) fn exactly_one<T>(
    component: &str,
    inline: Option<T>,
    inline_name: &'static str,
    file: Option<&Path>,
    file_name: &'static str,
) -> Result<Source<T>, ConfigError> {
    match (inline, file) {
        (Some(_), Some(_)) => Err(ConfigError::mutually_exclusive(
            component,
            inline_name,
            file_name,
        )),
        (Some(value), None) => Ok(Source::Inline(value)),
        (None, Some(path)) => Ok(Source::File(path.to_path_buf())),
        (None, None) => Err(ConfigError::missing_value(component, inline_name, file_name)),
    }
}

/// Where a leaf component's value comes from
pub(crate) enum Source<T> {
    Inline(T),
    File(PathBuf),
}

pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_source() {
        let path = Path::new("/tmp/value.txt");

        assert!(matches!(
            exactly_one("C x", Some(1), "value", None, "value_from_file"),
            Ok(Source::Inline(1))
        ));
        assert!(matches!(
            exactly_one::<i32>("C x", None, "value", Some(path), "value_from_file"),
            Ok(Source::File(p)) if p == path
        ));
        assert!(matches!(
            exactly_one("C x", Some(1), "value", Some(path), "value_from_file"),
            Err(ConfigError::MutuallyExclusive { .. })
        ));
        assert!(matches!(
            exactly_one::<i32>("C x", None, "value", None, "value_from_file"),
            Err(ConfigError::MissingValue { .. })
        ));
    }

    #[test]
    fn scope_tags_resources_with_component() {
        let mut stack = Stack::new("dev");
        let mut scope = ComponentScope::new(&mut stack, "custom:aws:Test", "t");
        scope
            .register(Resource::new("aws.ec2.eip", "t-eip"))
            .unwrap();
        scope.finish(&["eip_ids"]);

        assert_eq!(
            stack.get("t-eip").unwrap().source,
            ComponentSource::component("custom:aws:Test", "t")
        );
        assert_eq!(stack.components()[0].outputs, vec!["eip_ids"]);
    }
}
