//! Provider vocabulary of exported documents
//!
//! The engine addresses resource types by provider token and reads
//! properties by their lowerCamelCase provider names.

use std::collections::HashMap;

use heck::ToLowerCamelCase;
use stratus_core::document::ProviderNaming;
use stratus_core::schema::ResourceSchema;

use crate::resources::get_resource_config;
use crate::schemas;

pub struct AwsNaming {
    schemas: HashMap<String, ResourceSchema>,
}

impl AwsNaming {
    pub fn new() -> Self {
        Self {
            schemas: schemas::schemas()
                .into_iter()
                .map(|s| (s.resource_type.clone(), s))
                .collect(),
        }
    }
}

impl Default for AwsNaming {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderNaming for AwsNaming {
    fn type_token(&self, resource_type: &str) -> Option<String> {
        get_resource_config(resource_type).map(|c| c.provider_token.to_string())
    }

    fn property_name(&self, resource_type: &str, attribute: &str) -> Option<String> {
        let schema = self.schemas.get(resource_type)?;
        match schema.attributes.get(attribute) {
            Some(attr) => attr.provider_name.clone(),
            // Read-only outputs (id, arn, key_id, ...) are not in the schema
            None => Some(attribute.to_lower_camel_case()),
        }
    }
}
