use std::collections::HashMap;

use archflow_config::{EdgeDef, NodeDef};

use crate::ledger::Ledger;
use crate::result::ExecutionResult;

/// Branch keys chosen by branching nodes so far in a run.
#[derive(Debug, Clone, Default)]
pub struct BranchState {
  selected: HashMap<String, String>,
}

impl BranchState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Remember the branch a node selected. Results without a branch key
  /// (non-branching outputs and failures) leave no trace.
  pub fn record(&mut self, node_id: &str, result: &ExecutionResult) {
    if let Some(key) = result.branch_key() {
      self.selected.insert(node_id.to_string(), key.to_string());
    }
  }

  pub fn selected(&self, node_id: &str) -> Option<&str> {
    self.selected.get(node_id).map(String::as_str)
  }

  /// Whether an edge carries data in this run.
  ///
  /// The source must have a ledger entry. Edges out of non-branching sources
  /// are always live, including when the source failed. Edges out of a
  /// branching source are live only when their handle equals the branch the
  /// source selected, so a failed or handle-less branching edge is dead.
  pub fn is_live(&self, edge: &EdgeDef, source: &NodeDef, ledger: &Ledger) -> bool {
    if !ledger.contains(&edge.source) {
      return false;
    }
    if !source.kind.is_branching() {
      return true;
    }
    match (self.selected(&edge.source), edge.source_handle.as_deref()) {
      (Some(selected), Some(handle)) => selected == handle,
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::result::BlockOutput;
  use archflow_config::{BlockKind, ConditionOperator};

  fn condition(result: bool) -> ExecutionResult {
    ExecutionResult::completed(BlockOutput::Condition {
      operator: ConditionOperator::Contains,
      value: "x".to_string(),
      result,
      output: String::new(),
    })
  }

  #[test]
  fn test_condition_selects_matching_handle() {
    let check = NodeDef::new("check", BlockKind::Condition);
    let mut ledger = Ledger::new();
    let mut branches = BranchState::new();
    let result = condition(false);
    branches.record("check", &result);
    ledger.record("check", result);

    let yes = EdgeDef::new("e1", "check", "yes").with_handle("true");
    let no = EdgeDef::new("e2", "check", "no").with_handle("false");
    let bare = EdgeDef::new("e3", "check", "other");

    assert!(!branches.is_live(&yes, &check, &ledger));
    assert!(branches.is_live(&no, &check, &ledger));
    assert!(!branches.is_live(&bare, &check, &ledger));
  }

  #[test]
  fn test_failed_sources() {
    let mut ledger = Ledger::new();
    let branches = BranchState::new();
    ledger.record("gen", ExecutionResult::failed("down"));
    ledger.record("route", ExecutionResult::failed("down"));

    let generate = NodeDef::new("gen", BlockKind::Generate);
    let route = NodeDef::new("route", BlockKind::Route);

    assert!(branches.is_live(&EdgeDef::new("e1", "gen", "next"), &generate, &ledger));
    assert!(!branches.is_live(
      &EdgeDef::new("e2", "route", "next").with_handle("billing"),
      &route,
      &ledger
    ));
  }

  #[test]
  fn test_unexecuted_source_is_dead() {
    let ledger = Ledger::new();
    let input = NodeDef::new("a", BlockKind::Input);
    assert!(!BranchState::new().is_live(&EdgeDef::new("e1", "a", "b"), &input, &ledger));
  }
}
