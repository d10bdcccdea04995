use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::result::ExecutionResult;

/// Per-run record of node results.
///
/// Entries are write-once and keep the order nodes executed in. A node that
/// was skipped or excluded by a cycle has no entry.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
  entries: Vec<(String, ExecutionResult)>,
  index: HashMap<String, usize>,
}

impl Ledger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a node's result.
  ///
  /// Returns `false` and leaves the existing entry untouched if the node
  /// already has one.
  pub fn record(&mut self, node_id: impl Into<String>, result: ExecutionResult) -> bool {
    let node_id = node_id.into();
    if self.index.contains_key(&node_id) {
      return false;
    }
    self.index.insert(node_id.clone(), self.entries.len());
    self.entries.push((node_id, result));
    true
  }

  pub fn get(&self, node_id: &str) -> Option<&ExecutionResult> {
    self
      .index
      .get(node_id)
      .and_then(|i| self.entries.get(*i))
      .map(|(_, result)| result)
  }

  pub fn contains(&self, node_id: &str) -> bool {
    self.index.contains_key(node_id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Entries in execution order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &ExecutionResult)> {
    self.entries.iter().map(|(id, result)| (id.as_str(), result))
  }

  pub fn node_ids(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(id, _)| id.as_str())
  }
}

impl Serialize for Ledger {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (node_id, result) in &self.entries {
      map.serialize_entry(node_id, result)?;
    }
    map.end()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::result::BlockOutput;

  fn input(content: &str) -> ExecutionResult {
    ExecutionResult::completed(BlockOutput::Input {
      content: content.to_string(),
    })
  }

  #[test]
  fn test_entries_are_write_once() {
    let mut ledger = Ledger::new();
    assert!(ledger.record("a", input("first")));
    assert!(!ledger.record("a", input("second")));

    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.get("a").and_then(|r| r.text()), Some("first"));
  }

  #[test]
  fn test_iteration_keeps_execution_order() {
    let mut ledger = Ledger::new();
    ledger.record("z", input("1"));
    ledger.record("a", input("2"));
    ledger.record("m", ExecutionResult::failed("x"));

    let ids: Vec<&str> = ledger.node_ids().collect();
    assert_eq!(ids, vec!["z", "a", "m"]);
    assert!(ledger.contains("m"));
    assert!(!ledger.contains("q"));
  }

  #[test]
  fn test_serializes_as_map_in_order() {
    let mut ledger = Ledger::new();
    ledger.record("second", input("b"));
    ledger.record("first", input("a"));

    let text = serde_json::to_string(&ledger).unwrap();
    let second = text.find("\"second\"").unwrap();
    let first = text.find("\"first\"").unwrap();
    assert!(second < first);
  }
}
