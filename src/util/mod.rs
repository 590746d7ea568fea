//! Shared utilities: filesystem helpers, hashing, process execution,
//! configuration, and user-facing diagnostics.

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod hash;
pub mod process;
