//! Shared types for the nodetls workspace.

pub mod error;
pub mod paths;
