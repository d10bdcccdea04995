//! Archflow Config
//!
//! This crate contains the serializable workflow definition types for archflow.
//! These types mirror what the visual editor saves: a list of typed blocks, each
//! carrying a free-form `config` object, and the edges that connect them.
//!
//! Definitions can be loaded from:
//! - JSON files (via CLI with `archflow run workflow workflow.json`)
//! - Any external store that hands back the editor's JSON document
//!
//! A block's `config` stays untyped here. [`BlockConfig::parse`] turns it into
//! the typed payload for its [`BlockKind`] at dispatch time, so a malformed
//! block fails on its own instead of rejecting the whole workflow.

mod block;
mod edge;
mod enums;
mod error;
mod node;
mod workflow;

pub use block::{
  BlockConfig, ConditionConfig, GenerateConfig, InputConfig, PersistConfig, RouteConfig,
  ScheduleConfig,
};
pub use edge::EdgeDef;
pub use enums::{BlockKind, ConditionOperator, PersistAction, RouteMode, ScheduleMode};
pub use error::ConfigError;
pub use node::NodeDef;
pub use workflow::WorkflowDef;
