//! Execution events and notifiers.
//!
//! The engine emits an event at each step of a run so callers can stream
//! progress without waiting for the final report.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::result::{ExecutionResult, RunSummary};

/// Events emitted during workflow execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecutionEvent {
  WorkflowStarted {
    execution_id: String,
    workflow_id: String,
  },

  NodeStarted {
    execution_id: String,
    node_id: String,
  },

  /// A node finished and its result was recorded.
  NodeCompleted {
    execution_id: String,
    node_id: String,
    result: ExecutionResult,
  },

  /// A node's handler failed. The failure entry is still recorded.
  NodeFailed {
    execution_id: String,
    node_id: String,
    error: String,
  },

  /// A node had incoming edges but none of them were live.
  NodeSkipped {
    execution_id: String,
    node_id: String,
  },

  WorkflowCompleted {
    execution_id: String,
    summary: RunSummary,
  },
}

/// Receives execution events.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Sends events to an unbounded channel.
///
/// Unbounded so a slow consumer never stalls the engine; volume is a few
/// events per node.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}
