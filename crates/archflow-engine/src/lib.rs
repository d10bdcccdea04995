//! Workflow execution for archflow.
//!
//! [`WorkflowEngine`] walks a validated workflow in topological order, gates
//! each node on its live incoming edges, dispatches it to the matching block
//! handler and records the outcome in a write-once [`Ledger`].

mod branch;
pub mod blocks;
mod engine;
mod error;
mod events;
mod input;
mod ledger;
mod result;

pub use blocks::Services;
pub use branch::BranchState;
pub use engine::{WorkflowEngine, order_of};
pub use error::{BlockError, EngineError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use input::{NodeInputs, TRIGGER_SOURCE, inputs_for};
pub use ledger::Ledger;
pub use result::{BlockOutput, ExecutionResult, RunReport, RunSummary, summary_of};
