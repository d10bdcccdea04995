use std::collections::HashMap;

use archflow_config::{EdgeDef, NodeDef, WorkflowDef};

use crate::error::WorkflowError;
use crate::graph::Graph;

/// A validated workflow ready for execution.
#[derive(Debug, Clone)]
pub struct Workflow {
  pub workflow_id: String,
  pub name: String,
  nodes: Vec<NodeDef>,
  edges: Vec<EdgeDef>,
  index: HashMap<String, usize>,
  graph: Graph,
}

impl Workflow {
  /// Validate a definition and build the workflow.
  ///
  /// Fails when the node set is empty, a node id is blank or repeated, or an
  /// edge points at a node that does not exist.
  pub fn from_def(def: WorkflowDef) -> Result<Self, WorkflowError> {
    if def.nodes.is_empty() {
      return Err(WorkflowError::Empty);
    }

    let mut index = HashMap::with_capacity(def.nodes.len());
    for (position, node) in def.nodes.iter().enumerate() {
      if node.id.trim().is_empty() {
        return Err(WorkflowError::EmptyNodeId(position));
      }
      if index.insert(node.id.clone(), position).is_some() {
        return Err(WorkflowError::DuplicateNode(node.id.clone()));
      }
    }

    for edge in &def.edges {
      if !index.contains_key(&edge.source) || !index.contains_key(&edge.target) {
        return Err(WorkflowError::InvalidEdge {
          edge_id: edge.id.clone(),
          from: edge.source.clone(),
          to: edge.target.clone(),
        });
      }
    }

    let graph = Graph::new(&def.nodes, &def.edges);

    Ok(Self {
      workflow_id: def.workflow_id,
      name: def.name,
      nodes: def.nodes,
      edges: def.edges,
      index,
      graph,
    })
  }

  /// Nodes in declaration order.
  pub fn nodes(&self) -> &[NodeDef] {
    &self.nodes
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&NodeDef> {
    self.index.get(node_id).and_then(|i| self.nodes.get(*i))
  }

  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  /// Edges entering a node, in declaration order.
  pub fn incoming_edges(&self, node_id: &str) -> impl Iterator<Item = &EdgeDef> {
    self
      .graph
      .incoming(node_id)
      .iter()
      .filter_map(|i| self.edges.get(*i))
  }

  /// Topological execution order. See [`Graph::execution_order`].
  pub fn execution_order(&self) -> Vec<String> {
    self.graph.execution_order()
  }
}
