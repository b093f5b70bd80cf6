//! Stratus AWS Provider
//!
//! AWS network and secret-management components for Stratus stacks.
//!
//! ## Module Structure
//!
//! - `resources` - Resource type names and provider type tokens
//! - `schemas` - Resource schemas with the provider's field names
//! - `components` - VPC, subnets, NAT, ACL, endpoints, KMS, SSM, secrets
//! - `validation` - Schema validation of a composed stack
//! - `naming` - Provider type tokens and property names for export
//! - `utils` - Tag merging and value helpers

pub mod components;
pub mod naming;
pub mod resources;
pub mod schemas;
pub mod utils;
pub mod validation;

pub use naming::AwsNaming;
pub use validation::validate_stack;
