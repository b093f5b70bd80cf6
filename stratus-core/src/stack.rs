//! Stack - The desired-state resource graph under construction
//!
//! Components register resources into a [`Stack`]. Each resource has a
//! logical name unique within the stack; references between resources
//! form the dependency graph the orchestration engine applies in order.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use crate::error::{StackError, StackResult};
use crate::resource::{ComponentSource, Resource, ResourceId, Value};

/// A component instance that declared resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub source: ComponentSource,
    /// Names of the outputs the component registered
    pub outputs: Vec<String>,
}

/// Desired-state graph for one deployment
#[derive(Debug, Clone, Default)]
pub struct Stack {
    name: String,
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
    components: Vec<ComponentRecord>,
    outputs: BTreeMap<String, Value>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a resource, returning a handle to it
    ///
    /// Logical names are unique across resource types so that references
    /// can be expressed by name alone.
    pub fn register(&mut self, resource: Resource) -> StackResult<&Resource> {
        if let Some(&existing) = self.index.get(&resource.id.name) {
            return Err(StackError::DuplicateName {
                name: resource.id.name.clone(),
                existing: self.resources[existing].id.clone(),
            });
        }

        debug!("register {} ({})", resource.id, resource.source);
        let position = self.resources.len();
        self.index.insert(resource.id.name.clone(), position);
        self.resources.push(resource);
        Ok(&self.resources[position])
    }

    /// Record a component instance and the outputs it exposes
    pub fn register_component(&mut self, source: ComponentSource, outputs: &[&str]) {
        self.components.push(ComponentRecord {
            source,
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
        });
    }

    /// Export a stack output for consumers of this deployment
    pub fn export(&mut self, name: impl Into<String>, value: Value) -> StackResult<()> {
        let name = name.into();
        if self.outputs.contains_key(&name) {
            return Err(StackError::DuplicateOutput(name));
        }
        self.outputs.insert(name, value);
        Ok(())
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn components(&self) -> &[ComponentRecord] {
        &self.components
    }

    pub fn outputs(&self) -> &BTreeMap<String, Value> {
        &self.outputs
    }

    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.index.get(name).map(|&i| &self.resources[i])
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources of one type, in registration order
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .iter()
            .filter(move |r| r.id.resource_type == resource_type)
    }

    pub fn count_of_type(&self, resource_type: &str) -> usize {
        self.resources_of_type(resource_type).count()
    }

    /// Resources declared by one component instance
    pub fn resources_of_component<'a>(
        &'a self,
        source: &'a ComponentSource,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.iter().filter(move |r| &r.source == source)
    }

    /// Check that every reference points at a registered resource
    pub fn check_references(&self) -> StackResult<()> {
        for resource in &self.resources {
            let mut deps: Vec<_> = resource.dependencies().into_iter().collect();
            deps.sort();
            for target in deps {
                if !self.index.contains_key(&target) {
                    return Err(StackError::UnknownReference {
                        from: resource.id.clone(),
                        target,
                    });
                }
            }
        }

        let mut output_deps = HashSet::new();
        for value in self.outputs.values() {
            value.collect_references(&mut output_deps);
        }
        let mut output_deps: Vec<_> = output_deps.into_iter().collect();
        output_deps.sort();
        if let Some(target) = output_deps
            .into_iter()
            .find(|t| !self.index.contains_key(t))
        {
            return Err(StackError::UnknownReference {
                from: ResourceId::new("output", self.name.clone()),
                target,
            });
        }
        Ok(())
    }

    /// Resources ordered so that every resource follows its dependencies
    ///
    /// Ties keep registration order. Fails on a dependency cycle.
    pub fn topological_order(&self) -> StackResult<Vec<&Resource>> {
        self.check_references()?;

        let mut sorted = Vec::with_capacity(self.resources.len());
        let mut visited: HashSet<&str> = HashSet::new();
        let mut visiting: Vec<&str> = Vec::new();

        fn visit<'a>(
            stack: &'a Stack,
            resource: &'a Resource,
            visited: &mut HashSet<&'a str>,
            visiting: &mut Vec<&'a str>,
            sorted: &mut Vec<&'a Resource>,
        ) -> StackResult<()> {
            let name = resource.id.name.as_str();
            if visited.contains(name) {
                return Ok(());
            }
            if let Some(start) = visiting.iter().position(|n| *n == name) {
                let mut cycle: Vec<String> = visiting[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(name.to_string());
                return Err(StackError::Cycle(cycle));
            }

            visiting.push(name);

            let mut deps: Vec<&Resource> = resource
                .dependencies()
                .iter()
                .filter_map(|d| stack.get(d))
                .collect();
            deps.sort_by_key(|d| stack.index[&d.id.name]);
            for dep in deps {
                visit(stack, dep, visited, visiting, sorted)?;
            }

            visiting.pop();
            visited.insert(name);
            sorted.push(resource);
            Ok(())
        }

        for resource in &self.resources {
            visit(self, resource, &mut visited, &mut visiting, &mut sorted)?;
        }

        Ok(sorted)
    }
}
