//! Input aggregation.
//!
//! A node's inputs are the ledger entries of the sources on its live incoming
//! edges, in edge declaration order. When several edges share a source only
//! the first one counts.

use archflow_workflow::Workflow;

use crate::branch::BranchState;
use crate::ledger::Ledger;
use crate::result::{BlockOutput, ExecutionResult};

/// Source id used for the synthetic upstream of a single-node run.
pub const TRIGGER_SOURCE: &str = "trigger";

/// Upstream results a node receives, keyed by source node id.
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
  entries: Vec<(String, ExecutionResult)>,
}

impl NodeInputs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inputs for a node run in isolation: one successful upstream carrying
  /// `content`.
  pub fn from_payload(content: impl Into<String>) -> Self {
    let mut inputs = Self::new();
    inputs.push(
      TRIGGER_SOURCE,
      ExecutionResult::completed(BlockOutput::Input {
        content: content.into(),
      }),
    );
    inputs
  }

  /// Add a source unless it is already present.
  pub fn push(&mut self, source: impl Into<String>, result: ExecutionResult) {
    let source = source.into();
    if self.get(&source).is_none() {
      self.entries.push((source, result));
    }
  }

  pub fn get(&self, source: &str) -> Option<&ExecutionResult> {
    self
      .entries
      .iter()
      .find(|(id, _)| id == source)
      .map(|(_, result)| result)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &ExecutionResult)> {
    self.entries.iter().map(|(id, result)| (id.as_str(), result))
  }

  /// Non-empty textual payloads, in input order.
  pub fn texts(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().filter_map(|(_, result)| result.text())
  }

  pub fn joined_text(&self, separator: &str) -> String {
    self.texts().collect::<Vec<_>>().join(separator)
  }
}

/// Collect the inputs a node receives from its live incoming edges.
pub fn inputs_for(
  workflow: &Workflow,
  node_id: &str,
  ledger: &Ledger,
  branches: &BranchState,
) -> NodeInputs {
  let mut inputs = NodeInputs::new();
  for edge in workflow.incoming_edges(node_id) {
    let Some(source) = workflow.get_node(&edge.source) else {
      continue;
    };
    if !branches.is_live(edge, source, ledger) {
      continue;
    }
    if let Some(result) = ledger.get(&edge.source) {
      inputs.push(edge.source.clone(), result.clone());
    }
  }
  inputs
}
