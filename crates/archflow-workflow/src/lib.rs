//! Archflow Workflow
//!
//! This crate provides the validated workflow representation for archflow.
//! A [`Workflow`] is built from a [`archflow_config::WorkflowDef`] once its
//! shape has been checked, and is ready to be handed to the engine.
//!
//! Key differences from `archflow-config`:
//! - The node set is non-empty and node ids are unique
//! - Every edge references nodes that exist
//! - Adjacency is precomputed, in declaration order
//! - A deterministic execution order is available via Kahn's algorithm

mod error;
mod graph;
mod workflow;

pub use error::WorkflowError;
pub use graph::{Graph, execution_order};
pub use workflow::Workflow;
