//! Declarative manifest model shared by the construct crates
//!
//! This crate provides the assembly boundary constructs write into: a
//! resource tree keyed by logical id, deferred-value tokens for attributes
//! resolved by the provisioning engine, and a validated Data Pipeline
//! object graph.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Error types for manifest assembly
pub mod error;
/// Data Pipeline definition graph
pub mod pipeline;
/// Resource tree and deferred-value tokens
pub mod stack;

pub use error::{ManifestError, ManifestResult};
pub use pipeline::{PipelineDefinition, PipelineField, PipelineObject};
pub use stack::{Resource, Stack};
