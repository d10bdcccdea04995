use serde::{Deserialize, Serialize};

/// A directed connection from one block's output to another block's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDef {
  #[serde(default)]
  pub id: String,
  pub source: String,
  pub target: String,
  /// Branch name on the source block ("true"/"false" or a route category).
  /// Absent for single-output blocks.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
}

impl EdgeDef {
  pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      source: source.into(),
      target: target.into(),
      source_handle: None,
    }
  }

  /// Attach a branch handle to this edge.
  pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
    self.source_handle = Some(handle.into());
    self
  }
}
