//! Stratus Core
//!
//! Provider-agnostic model for composing infrastructure as a desired-state
//! resource graph. Nothing here talks to a cloud API: the graph is exported
//! and an orchestration engine applies it.

pub mod cidr;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod preview;
pub mod resource;
pub mod schema;
pub mod stack;
