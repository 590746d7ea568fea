//! Core data model: dependency descriptors, the built-in catalog,
//! the manifest schema, and link plans.

pub mod catalog;
pub mod descriptor;
pub mod link_plan;
pub mod manifest;

pub use descriptor::{ArchiveFormat, BuildFlag, BuildKind, DependencyDescriptor};
pub use link_plan::LinkPlan;
pub use manifest::Manifest;
