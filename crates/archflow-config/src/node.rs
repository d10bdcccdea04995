use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::BlockKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: BlockKind,
  /// Raw block settings as saved by the editor. Parsed per kind at dispatch.
  #[serde(default, alias = "data")]
  pub config: Map<String, Value>,
}

impl NodeDef {
  pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
    Self {
      id: id.into(),
      kind,
      config: Map::new(),
    }
  }

  /// Replace the config with the entries of a JSON object.
  ///
  /// Non-object values leave the config empty.
  pub fn with_config(mut self, config: Value) -> Self {
    self.config = match config {
      Value::Object(map) => map,
      _ => Map::new(),
    };
    self
  }
}
