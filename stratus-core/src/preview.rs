//! Preview - Summaries of a composed stack for display
//!
//! Every resource in a freshly composed stack is a creation; the
//! orchestration engine decides later what actually changes.

use std::collections::{BTreeMap, HashMap};

use crate::resource::{ComponentSource, Resource};
use crate::stack::Stack;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PreviewSummary {
    pub resources: usize,
    pub components: usize,
    pub outputs: usize,
    /// Resource type -> count
    pub by_type: BTreeMap<String, usize>,
}

impl std::fmt::Display for PreviewSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Preview: {} resources in {} components, {} outputs",
            self.resources, self.components, self.outputs
        )
    }
}

/// Resources of a stack grouped by the component that declared them
#[derive(Debug)]
pub struct Preview<'a> {
    stack: &'a Stack,
    groups: HashMap<ComponentSource, Vec<usize>>,
}

impl<'a> Preview<'a> {
    pub fn new(stack: &'a Stack) -> Self {
        let mut groups: HashMap<ComponentSource, Vec<usize>> = HashMap::new();
        for (idx, resource) in stack.resources().iter().enumerate() {
            groups.entry(resource.source.clone()).or_default().push(idx);
        }
        Self { stack, groups }
    }

    pub fn summary(&self) -> PreviewSummary {
        let mut by_type = BTreeMap::new();
        for resource in self.stack.resources() {
            *by_type.entry(resource.id.resource_type.clone()).or_insert(0) += 1;
        }
        PreviewSummary {
            resources: self.stack.len(),
            components: self.stack.components().len(),
            outputs: self.stack.outputs().len(),
            by_type,
        }
    }

    /// Groups in display order: root first, then components by registration
    pub fn groups(&self) -> Vec<(&ComponentSource, Vec<&'a Resource>)> {
        let mut order: Vec<&ComponentSource> = self.groups.keys().collect();
        order.sort_by_key(|source| {
            (
                !source.is_root(),
                self.groups[*source].first().copied().unwrap_or(usize::MAX),
            )
        });

        order
            .into_iter()
            .map(|source| {
                let resources = self.groups[source]
                    .iter()
                    .map(|&i| &self.stack.resources()[i])
                    .collect();
                (source, resources)
            })
            .collect()
    }

    /// Plain-text rendering grouped by component
    pub fn display(&self) -> String {
        let mut output = String::new();

        for (source, resources) in self.groups() {
            match source {
                ComponentSource::Root => output.push_str("Root:\n"),
                ComponentSource::Component { type_token, name } => {
                    output.push_str(&format!("Component: {} ({})\n", name, type_token))
                }
            }
            for resource in resources {
                output.push_str(&format!("  + {}\n", resource.id));
            }
            output.push('\n');
        }

        output.push_str(&format!("{}\n", self.summary()));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> Stack {
        let vpc = ComponentSource::component("custom:aws:VpcOnly", "core-vpc");
        let mut stack = Stack::new("dev");
        stack
            .register(Resource::new("aws.ec2.vpc", "core-vpc-vpc").with_source(vpc.clone()))
            .unwrap();
        stack.register_component(vpc, &["vpc"]);
        stack.register(Resource::new("aws.kms.key", "myapp-key")).unwrap();
        stack.register(Resource::new("aws.kms.alias", "myapp-alias")).unwrap();
        stack
    }

    #[test]
    fn summary_counts_by_type() {
        let stack = stack();
        let summary = Preview::new(&stack).summary();
        assert_eq!(summary.resources, 3);
        assert_eq!(summary.components, 1);
        assert_eq!(summary.by_type["aws.kms.key"], 1);
        assert_eq!(
            summary.to_string(),
            "Preview: 3 resources in 1 components, 0 outputs"
        );
    }

    #[test]
    fn groups_put_root_first() {
        let stack = stack();
        let preview = Preview::new(&stack);
        let groups = preview.groups();
        assert!(groups[0].0.is_root());
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1[0].id.name, "core-vpc-vpc");
    }

    #[test]
    fn display_lists_resources() {
        let stack = stack();
        let text = Preview::new(&stack).display();
        assert!(text.starts_with("Root:\n  + aws.kms.key.myapp-key\n"));
        assert!(text.contains("Component: core-vpc (custom:aws:VpcOnly)\n  + aws.ec2.vpc.core-vpc-vpc\n"));
    }
}
