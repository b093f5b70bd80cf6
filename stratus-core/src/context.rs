//! Caller context passed explicitly into components that build ARNs

use serde::{Deserialize, Serialize};

/// Account, region and partition the stack is deployed into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsContext {
    pub account_id: String,
    pub region: String,
    pub partition: String,
}

impl AwsContext {
    pub fn new(
        account_id: impl Into<String>,
        region: impl Into<String>,
        partition: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
            partition: partition.into(),
        }
    }

    /// ARN of the account root principal
    pub fn root_arn(&self) -> String {
        format!("arn:{}:iam::{}:root", self.partition, self.account_id)
    }

    /// Regional ARN prefix for a service, e.g. `arn:aws:logs:us-east-2:123456789012`
    pub fn service_arn_prefix(&self, service: &str) -> String {
        format!(
            "arn:{}:{}:{}:{}",
            self.partition, service, self.region, self.account_id
        )
    }

    /// Regional service principal, e.g. `logs.us-east-2.amazonaws.com`
    pub fn service_principal(&self, service: &str) -> String {
        format!("{}.{}.amazonaws.com", service, self.region)
    }
}
