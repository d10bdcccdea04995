use std::collections::{HashMap, VecDeque};

use archflow_config::{EdgeDef, NodeDef};

/// Graph structure for ordering and input lookup.
///
/// Node ids keep their declaration order and every edge is addressed by its
/// position in the workflow's edge list, so iteration is deterministic.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Node ids in declaration order.
  node_ids: Vec<String>,
  /// node_id -> indices of edges leaving it.
  outgoing: HashMap<String, Vec<usize>>,
  /// node_id -> indices of edges entering it.
  incoming: HashMap<String, Vec<usize>>,
  /// edge index -> (source, target).
  endpoints: Vec<(String, String)>,
}

impl Graph {
  /// Build a graph from nodes and edges.
  ///
  /// Edges whose endpoints are not declared nodes are kept in the edge index
  /// but never attached to adjacency.
  pub fn new(nodes: &[NodeDef], edges: &[EdgeDef]) -> Self {
    let node_ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
    let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
    let mut incoming: HashMap<String, Vec<usize>> = HashMap::new();

    for id in &node_ids {
      outgoing.entry(id.clone()).or_default();
      incoming.entry(id.clone()).or_default();
    }

    let mut endpoints = Vec::with_capacity(edges.len());
    for (index, edge) in edges.iter().enumerate() {
      endpoints.push((edge.source.clone(), edge.target.clone()));
      if !(outgoing.contains_key(&edge.source) && incoming.contains_key(&edge.target)) {
        continue;
      }
      if let Some(out) = outgoing.get_mut(&edge.source) {
        out.push(index);
      }
      if let Some(inc) = incoming.get_mut(&edge.target) {
        inc.push(index);
      }
    }

    Self {
      node_ids,
      outgoing,
      incoming,
      endpoints,
    }
  }

  /// Indices of edges entering a node.
  pub fn incoming(&self, node_id: &str) -> &[usize] {
    self
      .incoming
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Indices of edges leaving a node.
  pub fn outgoing(&self, node_id: &str) -> &[usize] {
    self
      .outgoing
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get downstream node ids for a node, one entry per edge.
  pub fn downstream(&self, node_id: &str) -> Vec<&str> {
    self
      .outgoing(node_id)
      .iter()
      .filter_map(|i| self.endpoints.get(*i).map(|(_, to)| to.as_str()))
      .collect()
  }

  /// Compute the execution order with Kahn's algorithm.
  ///
  /// Every edge counts toward in-degree regardless of its branch handle.
  /// Ties between ready nodes are broken FIFO by declaration order. Nodes on
  /// or behind a cycle never reach in-degree zero and are left out, so the
  /// result may be shorter than the node list.
  pub fn execution_order(&self) -> Vec<String> {
    let mut in_degree: HashMap<&str, usize> = self
      .node_ids
      .iter()
      .map(|id| (id.as_str(), self.incoming(id).len()))
      .collect();

    let mut queue: VecDeque<&str> = self
      .node_ids
      .iter()
      .map(|id| id.as_str())
      .filter(|id| in_degree.get(id) == Some(&0))
      .collect();

    let mut order = Vec::with_capacity(self.node_ids.len());
    while let Some(current) = queue.pop_front() {
      order.push(current.to_string());
      for next in self.downstream(current) {
        if let Some(degree) = in_degree.get_mut(next) {
          *degree -= 1;
          if *degree == 0 {
            queue.push_back(next);
          }
        }
      }
    }

    order
  }

  /// Node ids left out of the execution order (cycle members and anything
  /// only reachable through a cycle), in declaration order.
  pub fn unordered(&self, order: &[String]) -> Vec<String> {
    self
      .node_ids
      .iter()
      .filter(|id| !order.contains(id))
      .cloned()
      .collect()
  }
}

/// Compute the execution order for a raw node and edge list.
pub fn execution_order(nodes: &[NodeDef], edges: &[EdgeDef]) -> Vec<String> {
  Graph::new(nodes, edges).execution_order()
}

#[cfg(test)]
mod tests {
  use super::*;
  use archflow_config::BlockKind;

  fn nodes(ids: &[&str]) -> Vec<NodeDef> {
    ids
      .iter()
      .map(|id| NodeDef::new(*id, BlockKind::Input))
      .collect()
  }

  fn edge(from: &str, to: &str) -> EdgeDef {
    EdgeDef::new(format!("{}-{}", from, to), from, to)
  }

  #[test]
  fn test_linear_order() {
    let order = execution_order(
      &nodes(&["a", "b", "c"]),
      &[edge("b", "c"), edge("a", "b")],
    );
    assert_eq!(order, vec!["a", "b", "c"]);
  }

  #[test]
  fn test_ties_follow_declaration_order() {
    let order = execution_order(
      &nodes(&["z", "m", "a", "join"]),
      &[edge("z", "join"), edge("m", "join"), edge("a", "join")],
    );
    assert_eq!(order, vec!["z", "m", "a", "join"]);
  }

  #[test]
  fn test_branch_handles_do_not_affect_order() {
    let order = execution_order(
      &nodes(&["check", "yes", "no"]),
      &[
        edge("check", "no").with_handle("false"),
        edge("check", "yes").with_handle("true"),
      ],
    );
    assert_eq!(order, vec!["check", "no", "yes"]);
  }

  #[test]
  fn test_cycle_members_are_excluded() {
    let graph = Graph::new(
      &nodes(&["a", "b", "c", "d"]),
      &[edge("a", "b"), edge("b", "c"), edge("c", "b"), edge("c", "d")],
    );
    let order = graph.execution_order();
    assert_eq!(order, vec!["a"]);
    assert_eq!(graph.unordered(&order), vec!["b", "c", "d"]);
  }

  #[test]
  fn test_self_loop_is_never_resolved() {
    let order = execution_order(&nodes(&["a", "b"]), &[edge("b", "b")]);
    assert_eq!(order, vec!["a"]);
  }

  #[test]
  fn test_adjacency_is_indexed_by_edge_position() {
    let graph = Graph::new(
      &nodes(&["a", "b", "c"]),
      &[edge("a", "c"), edge("b", "c")],
    );
    assert_eq!(graph.incoming("c"), &[0, 1]);
    assert_eq!(graph.outgoing("b"), &[1]);
    assert_eq!(graph.downstream("a"), vec!["c"]);
    assert!(graph.downstream("c").is_empty());
  }

  #[test]
  fn test_unknown_endpoints_are_ignored() {
    let order = execution_order(&nodes(&["a"]), &[edge("a", "ghost")]);
    assert_eq!(order, vec!["a"]);
  }
}
