//! Document - Serialized desired-state graph handed to the orchestration engine
//!
//! Resources appear in dependency order. References are rendered as
//! `${name.attribute}` and derived values as
//! `${name.attribute | transform}` so the engine can substitute them once
//! the referenced resources exist.
//!
//! Rendered through a [`ProviderNaming`], every entry carries the provider
//! type token and property and attribute names are the provider's.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StackResult;
use crate::resource::{ComponentSource, Resource, Value};
use crate::stack::Stack;

/// Current document format version
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDocument {
    pub version: u32,
    pub stack: String,
    pub resources: Vec<ResourceEntry>,
    pub outputs: BTreeMap<String, serde_json::Value>,
}

/// Provider vocabulary for resource types and attribute names
pub trait ProviderNaming {
    /// Type token the engine addresses a resource type by
    fn type_token(&self, resource_type: &str) -> Option<String>;

    /// Provider name of an attribute of a resource type
    fn property_name(&self, resource_type: &str, attribute: &str) -> Option<String>;
}

/// Keeps Stratus type and attribute names
struct StratusNaming;

impl ProviderNaming for StratusNaming {
    fn type_token(&self, _resource_type: &str) -> Option<String> {
        None
    }

    fn property_name(&self, _resource_type: &str, _attribute: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_token: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl StackDocument {
    /// Document in Stratus names
    pub fn from_stack(stack: &Stack) -> StackResult<Self> {
        Self::from_stack_with(stack, &StratusNaming)
    }

    /// Document in the provider's vocabulary
    pub fn from_stack_with(stack: &Stack, naming: &dyn ProviderNaming) -> StackResult<Self> {
        let renderer = Renderer { stack, naming };
        let resources = stack
            .topological_order()?
            .into_iter()
            .map(|resource| renderer.entry(resource))
            .collect();

        let outputs = stack
            .outputs()
            .iter()
            .map(|(k, v)| (k.clone(), renderer.value(v)))
            .collect();

        Ok(Self {
            version: DOCUMENT_VERSION,
            stack: stack.name().to_string(),
            resources,
            outputs,
        })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self).map(|s| s + "\n")
    }
}

struct Renderer<'a> {
    stack: &'a Stack,
    naming: &'a dyn ProviderNaming,
}

impl Renderer<'_> {
    fn entry(&self, resource: &Resource) -> ResourceEntry {
        let resource_type = &resource.id.resource_type;
        let parent = match &resource.source {
            ComponentSource::Root => None,
            ComponentSource::Component { type_token, name } => {
                Some(format!("{}::{}", type_token, name))
            }
        };

        let mut depends_on: Vec<_> = resource.dependencies().into_iter().collect();
        depends_on.sort();

        ResourceEntry {
            resource_type: resource_type.clone(),
            provider_token: self.naming.type_token(resource_type),
            name: resource.id.name.clone(),
            parent,
            depends_on,
            properties: resource
                .attributes
                .iter()
                .map(|(k, v)| (self.property(resource_type, k), self.value(v)))
                .collect(),
        }
    }

    fn property(&self, resource_type: &str, attribute: &str) -> String {
        self.naming
            .property_name(resource_type, attribute)
            .unwrap_or_else(|| attribute.to_string())
    }

    /// Attribute name of a reference, in the vocabulary of the referenced type
    fn target_attribute(&self, binding: &str, attribute: &str) -> String {
        match self.stack.get(binding) {
            Some(target) => self.property(&target.id.resource_type, attribute),
            None => attribute.to_string(),
        }
    }

    fn value(&self, value: &Value) -> serde_json::Value {
        match value {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(n) => serde_json::Value::Number((*n).into()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| self.value(v)).collect())
            }
            // Map keys are data (tag keys, route fields), never renamed
            Value::Map(map) => {
                let obj: serde_json::Map<_, _> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.value(v)))
                    .collect();
                serde_json::Value::Object(obj)
            }
            Value::ResourceRef(binding, attr) => serde_json::Value::String(format!(
                "${{{}.{}}}",
                binding,
                self.target_attribute(binding, attr)
            )),
            Value::Derived {
                binding_name,
                attribute_name,
                transform,
            } => serde_json::Value::String(format!(
                "${{{}.{} | {}}}",
                binding_name,
                self.target_attribute(binding_name, attribute_name),
                transform.describe()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Transform;

    fn sample_stack() -> Stack {
        let source = ComponentSource::component("custom:aws:VpcOnly", "core-vpc");
        let mut stack = Stack::new("dev");
        stack
            .register(
                Resource::new("aws.ec2.subnet", "subnet-a")
                    .with_attribute("vpc_id", Value::reference("core-vpc-vpc", "id"))
                    .with_attribute(
                        "ipv6_cidr_block",
                        Value::Derived {
                            binding_name: "assoc".to_string(),
                            attribute_name: "ipv6_cidr_block".to_string(),
                            transform: Transform::Ipv6Subnet { netnum: 10 },
                        },
                    ),
            )
            .unwrap();
        stack
            .register(
                Resource::new("aws.ec2.vpc", "core-vpc-vpc")
                    .with_attribute("cidr_block", "10.0.0.0/16")
                    .with_attribute("enable_dns_support", true)
                    .with_source(source),
            )
            .unwrap();
        stack
            .register(Resource::new("aws.ec2.vpc_ipv6_cidr_block_association", "assoc"))
            .unwrap();
        stack
            .export("vpc_id", Value::reference("core-vpc-vpc", "id"))
            .unwrap();
        stack
    }

    #[test]
    fn document_orders_and_renders_references() {
        let doc = StackDocument::from_stack(&sample_stack()).unwrap();

        let names: Vec<_> = doc.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["core-vpc-vpc", "assoc", "subnet-a"]);

        let subnet = &doc.resources[2];
        assert_eq!(subnet.properties["vpc_id"], "${core-vpc-vpc.id}");
        assert_eq!(
            subnet.properties["ipv6_cidr_block"],
            "${assoc.ipv6_cidr_block | ipv6_subnet(10)}"
        );
        assert_eq!(subnet.depends_on, vec!["assoc", "core-vpc-vpc"]);

        let vpc = &doc.resources[0];
        assert_eq!(vpc.parent.as_deref(), Some("custom:aws:VpcOnly::core-vpc"));
        assert_eq!(vpc.properties["enable_dns_support"], true);
        assert_eq!(doc.outputs["vpc_id"], "${core-vpc-vpc.id}");
    }

    struct PrefixNaming;

    impl ProviderNaming for PrefixNaming {
        fn type_token(&self, resource_type: &str) -> Option<String> {
            (resource_type == "aws.ec2.vpc").then(|| "aws:ec2/vpc:Vpc".to_string())
        }

        fn property_name(&self, _resource_type: &str, attribute: &str) -> Option<String> {
            (attribute != "id").then(|| format!("p_{}", attribute))
        }
    }

    #[test]
    fn document_in_provider_vocabulary() {
        let doc = StackDocument::from_stack_with(&sample_stack(), &PrefixNaming).unwrap();

        let vpc = &doc.resources[0];
        assert_eq!(vpc.provider_token.as_deref(), Some("aws:ec2/vpc:Vpc"));
        assert_eq!(vpc.properties["p_cidr_block"], "10.0.0.0/16");
        assert!(!vpc.properties.contains_key("cidr_block"));

        let subnet = &doc.resources[2];
        assert!(subnet.provider_token.is_none());
        assert_eq!(subnet.properties["p_vpc_id"], "${core-vpc-vpc.id}");
        assert_eq!(
            subnet.properties["p_ipv6_cidr_block"],
            "${assoc.p_ipv6_cidr_block | ipv6_subnet(10)}"
        );

        let json = doc.to_json_pretty().unwrap();
        assert!(json.contains("\"provider_token\": \"aws:ec2/vpc:Vpc\""));
    }

    #[test]
    fn document_json_is_stable() {
        let first = StackDocument::from_stack(&sample_stack())
            .unwrap()
            .to_json_pretty()
            .unwrap();
        let second = StackDocument::from_stack(&sample_stack())
            .unwrap()
            .to_json_pretty()
            .unwrap();
        assert_eq!(first, second);

        let parsed: StackDocument = serde_json::from_str(&first).unwrap();
        assert_eq!(parsed.stack, "dev");
        assert_eq!(parsed.resources[0].resource_type, "aws.ec2.vpc");
    }
}
