//! Shared types for the Kanopi tree-inventory pipeline.

pub mod config;
pub mod submission;
pub mod tree;
pub mod vision;
