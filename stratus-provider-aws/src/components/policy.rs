//! IAM policy documents for resource policies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One condition block: operator -> context key -> allowed values
pub type Conditions = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    /// Principal type ("AWS", "Service") -> identifiers
    pub principal: BTreeMap<String, Vec<String>>,
    pub action: Vec<String>,
    pub resource: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub condition: Conditions,
}

impl Statement {
    pub fn allow(sid: &str) -> Self {
        Self {
            sid: Some(sid.to_string()),
            effect: Effect::Allow,
            principal: BTreeMap::new(),
            action: Vec::new(),
            resource: Vec::new(),
            condition: BTreeMap::new(),
        }
    }

    pub fn principal(mut self, principal_type: &str, identifiers: Vec<String>) -> Self {
        self.principal
            .entry(principal_type.to_string())
            .or_default()
            .extend(identifiers);
        self
    }

    pub fn actions(mut self, actions: &[&str]) -> Self {
        self.action.extend(actions.iter().map(|a| a.to_string()));
        self
    }

    pub fn resources(mut self, resources: &[&str]) -> Self {
        self.resource.extend(resources.iter().map(|r| r.to_string()));
        self
    }

    pub fn condition(mut self, test: &str, variable: &str, values: Vec<String>) -> Self {
        self.condition
            .entry(test.to_string())
            .or_default()
            .insert(variable.to_string(), values);
        self
    }
}

/// Policy document; statements keep the order they were added in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: Vec::new(),
        }
    }
}

impl PolicyDocument {
    pub fn push(&mut self, statement: Statement) {
        self.statement.push(statement);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
