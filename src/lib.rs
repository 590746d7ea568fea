//! Quay - an idempotent fetch-build-cache tool for C/C++ dependencies
//!
//! This crate provides the core library functionality for Quay: the
//! dependency descriptor model, source acquisition with mirror fallback,
//! per-build-kind configure/build/install steps, and the cache-aware
//! resolver that turns a descriptor into a link plan.

pub mod build;
pub mod core;
pub mod fetch;
pub mod resolver;
pub mod util;

pub use crate::core::{
    descriptor::{ArchiveFormat, BuildFlag, BuildKind, DependencyDescriptor},
    link_plan::LinkPlan,
    manifest::Manifest,
};

pub use crate::resolver::{errors::ResolveError, Resolver};
pub use crate::util::config::GlobalContext;
