//! Stack validation against the provider schemas

use std::collections::HashMap;

use stratus_core::schema::ResourceSchema;
use stratus_core::stack::Stack;

use crate::schemas;

/// Validate every resource of a stack against its provider schema
///
/// Returns one message per problem, prefixed with the resource it concerns.
pub fn validate_stack(stack: &Stack) -> Result<(), Vec<String>> {
    let schemas: HashMap<String, ResourceSchema> = schemas::schemas()
        .into_iter()
        .map(|s| (s.resource_type.clone(), s))
        .collect();

    let mut errors = Vec::new();
    for resource in stack.resources() {
        match schemas.get(&resource.id.resource_type) {
            Some(schema) => {
                if let Err(type_errors) = schema.validate(&resource.attributes) {
                    errors.extend(
                        type_errors
                            .into_iter()
                            .map(|e| format!("{}: {}", resource.id, e)),
                    );
                }
            }
            None => errors.push(format!(
                "{}: unknown resource type '{}'",
                resource.id, resource.id.resource_type
            )),
        }
    }

    if let Err(e) = stack.check_references() {
        errors.push(e.to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
