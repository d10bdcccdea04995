use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("workflow has no nodes")]
  Empty,

  #[error("node at position {0} has an empty id")]
  EmptyNodeId(usize),

  #[error("duplicate node id: {0}")]
  DuplicateNode(String),

  #[error("edge '{edge_id}' references unknown node: from={from}, to={to}")]
  InvalidEdge {
    edge_id: String,
    from: String,
    to: String,
  },
}
