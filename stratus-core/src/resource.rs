//! Resource - Declared resources and the values flowing between them

use std::collections::{HashMap, HashSet};

use crate::cidr;

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// Resource type (e.g., "aws.ec2.vpc", "aws.kms.key")
    pub resource_type: String,
    /// Logical name, unique within a stack (e.g., "core-vpc-vpc")
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Pure transformation applied to a referenced attribute once the engine knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Carve a /64 out of a VPC-assigned IPv6 block at the given subnet number
    Ipv6Subnet { netnum: u32 },
}

impl Transform {
    /// Compute the derived value from the referenced attribute, as the
    /// engine does once that attribute is known
    pub fn apply(&self, input: &str) -> String {
        match self {
            Transform::Ipv6Subnet { netnum } => cidr::ipv6_subnet_block(input, *netnum),
        }
    }

    /// Short form used when rendering a derived value (e.g., "ipv6_subnet(10)")
    pub fn describe(&self) -> String {
        match self {
            Transform::Ipv6Subnet { netnum } => format!("ipv6_subnet({})", netnum),
        }
    }
}

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    /// Reference to another resource's attribute (binding_name, attribute_name)
    ResourceRef(String, String),
    /// Value computed from another resource's attribute, known only at apply time
    Derived {
        binding_name: String,
        attribute_name: String,
        transform: Transform,
    },
}

impl Value {
    pub fn reference(binding_name: impl Into<String>, attribute_name: impl Into<String>) -> Self {
        Value::ResourceRef(binding_name.into(), attribute_name.into())
    }

    /// Build a string map value, typically for tags
    pub fn string_map(map: &HashMap<String, String>) -> Self {
        Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true for values only the orchestration engine can resolve
    pub fn is_deferred(&self) -> bool {
        matches!(self, Value::ResourceRef(..) | Value::Derived { .. })
    }

    /// Collect binding names this value refers to
    pub fn collect_references(&self, deps: &mut HashSet<String>) {
        match self {
            Value::ResourceRef(binding_name, _) => {
                deps.insert(binding_name.clone());
            }
            Value::Derived { binding_name, .. } => {
                deps.insert(binding_name.clone());
            }
            Value::List(items) => {
                for item in items {
                    item.collect_references(deps);
                }
            }
            Value::Map(map) => {
                for v in map.values() {
                    v.collect_references(deps);
                }
            }
            _ => {}
        }
    }

    /// Substitute references whose targets are known, leaving the rest as-is
    ///
    /// Nothing in this workspace knows attribute values; this is the
    /// reference behavior for an engine filling in the `${name.attr}` and
    /// `${name.attr | transform}` placeholders of an exported document.
    pub fn resolve(&self, known: &HashMap<String, HashMap<String, Value>>) -> Value {
        match self {
            Value::ResourceRef(binding_name, attr_name) => {
                if let Some(attr_value) = known.get(binding_name).and_then(|a| a.get(attr_name)) {
                    return attr_value.resolve(known);
                }
                self.clone()
            }
            Value::Derived {
                binding_name,
                attribute_name,
                transform,
            } => {
                if let Some(Value::String(s)) = known
                    .get(binding_name)
                    .and_then(|a| a.get(attribute_name))
                    .map(|v| v.resolve(known))
                {
                    return Value::String(transform.apply(&s));
                }
                self.clone()
            }
            Value::List(items) => Value::List(items.iter().map(|v| v.resolve(known)).collect()),
            Value::Map(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.resolve(known)))
                    .collect(),
            ),
            _ => self.clone(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Component that declared a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentSource {
    /// Resource declared directly by the composition
    Root,
    /// Resource declared by a component instance
    Component {
        /// Component type token (e.g., "custom:aws:VpcSubnets")
        type_token: String,
        /// Instance name (e.g., "app-network")
        name: String,
    },
}

impl ComponentSource {
    pub fn component(type_token: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Component {
            type_token: type_token.into(),
            name: name.into(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl std::fmt::Display for ComponentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentSource::Root => write!(f, "root"),
            ComponentSource::Component { type_token, name } => write!(f, "{} ({})", name, type_token),
        }
    }
}

/// Desired state of a single provider resource
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub attributes: HashMap<String, Value>,
    pub source: ComponentSource,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            attributes: HashMap::new(),
            source: ComponentSource::Root,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the attribute only when a value is present
    pub fn with_optional(mut self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_source(mut self, source: ComponentSource) -> Self {
        self.source = source;
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Reference to one of this resource's attributes
    pub fn output(&self, attribute: &str) -> Value {
        Value::reference(self.id.name.clone(), attribute)
    }

    /// Binding names of the resources this one depends on
    pub fn dependencies(&self) -> HashSet<String> {
        let mut deps = HashSet::new();
        for value in self.attributes.values() {
            value.collect_references(&mut deps);
        }
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_follow_nested_references() {
        let mut route = HashMap::new();
        route.insert("gateway_id".to_string(), Value::reference("igw", "id"));
        let resource = Resource::new("aws.ec2.route_table", "rt")
            .with_attribute("vpc_id", Value::reference("vpc", "id"))
            .with_attribute("routes", Value::List(vec![Value::Map(route)]));

        let deps = resource.dependencies();
        assert_eq!(deps.len(), 2);
        assert!(deps.contains("vpc"));
        assert!(deps.contains("igw"));
    }

    #[test]
    fn with_optional_skips_none() {
        let resource = Resource::new("aws.kms.key", "k")
            .with_optional("rotation_period_in_days", None::<i64>)
            .with_optional("description", Some("cmk"));
        assert!(resource.get("rotation_period_in_days").is_none());
        assert_eq!(resource.get("description"), Some(&Value::from("cmk")));
    }

    #[test]
    fn resolve_substitutes_known_references() {
        let mut known = HashMap::new();
        let mut vpc = HashMap::new();
        vpc.insert("id".to_string(), Value::from("vpc-123"));
        known.insert("vpc".to_string(), vpc);

        let value = Value::List(vec![
            Value::reference("vpc", "id"),
            Value::reference("subnet", "id"),
        ]);
        assert_eq!(
            value.resolve(&known),
            Value::List(vec![Value::from("vpc-123"), Value::reference("subnet", "id")])
        );
    }

    #[test]
    fn resolve_applies_derived_transform() {
        let mut known = HashMap::new();
        let mut assoc = HashMap::new();
        assoc.insert(
            "ipv6_cidr_block".to_string(),
            Value::from("2600:1f16:abc:de00::/56"),
        );
        known.insert("assoc".to_string(), assoc);

        let value = Value::Derived {
            binding_name: "assoc".to_string(),
            attribute_name: "ipv6_cidr_block".to_string(),
            transform: Transform::Ipv6Subnet { netnum: 110 },
        };
        assert_eq!(
            value.resolve(&known),
            Value::from("2600:1f16:abc:de00:110::/64")
        );
    }

    #[test]
    fn output_refers_to_logical_name() {
        let vpc = Resource::new("aws.ec2.vpc", "core-vpc-vpc");
        assert_eq!(vpc.output("id"), Value::reference("core-vpc-vpc", "id"));
        assert!(vpc.output("id").is_deferred());
    }
}
