use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDef {
  #[serde(default, alias = "id")]
  pub workflow_id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
}
