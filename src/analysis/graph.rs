//! petgraph view over a `GraphDocument`
//!
//! `OrgGraph` is built on demand from a borrowed document and never mutates
//! it. Edges whose endpoints are missing are skipped.

// Use petgraph from rustworkx-core to ensure version compatibility
use rustworkx_core::petgraph::graph::{DiGraph, EdgeIndex, NodeIndex, UnGraph};
use rustworkx_core::petgraph::visit::EdgeRef;
use rustworkx_core::petgraph::Direction;
use std::collections::HashMap;

use crate::document::{EdgeId, GraphDocument, NodeId, RelationshipType};

// =============================================================================
// Types
// =============================================================================

/// Edge weight stored in the petgraph structure
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInfo {
    pub edge_id: EdgeId,
    pub relationship: RelationshipType,
}

/// One undirected hop out of a node
#[derive(Debug, Clone, Copy)]
pub struct Hop {
    pub neighbor: NodeIndex,
    pub edge: EdgeIndex,
}

// =============================================================================
// OrgGraph
// =============================================================================

/// Directed graph of every node and every (non-dangling) edge
pub struct OrgGraph {
    graph: DiGraph<NodeId, EdgeInfo>,
    /// Fast lookup: node ID → petgraph NodeIndex
    id_to_index: HashMap<NodeId, NodeIndex>,
}

impl OrgGraph {
    pub fn from_document(doc: &GraphDocument) -> Self {
        let mut graph = DiGraph::with_capacity(doc.nodes.len(), doc.edges.len());
        let mut id_to_index = HashMap::with_capacity(doc.nodes.len());

        for node in &doc.nodes {
            if id_to_index.contains_key(node.id()) {
                continue;
            }
            let idx = graph.add_node(node.id().to_string());
            id_to_index.insert(node.id().to_string(), idx);
        }

        for edge in &doc.edges {
            let (Some(&src), Some(&tgt)) = (id_to_index.get(&edge.source), id_to_index.get(&edge.target)) else {
                continue;
            };
            graph.add_edge(
                src,
                tgt,
                EdgeInfo {
                    edge_id: edge.id.clone(),
                    relationship: edge.relationship(),
                },
            );
        }

        Self { graph, id_to_index }
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    pub fn id_of(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn edge_info(&self, edge: EdgeIndex) -> &EdgeInfo {
        &self.graph[edge]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Every edge incident to `idx`, seen from `idx`, in edge insertion order
    pub fn hops(&self, idx: NodeIndex) -> Vec<Hop> {
        let mut hops: Vec<Hop> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| Hop { neighbor: e.target(), edge: e.id() })
            .chain(
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .map(|e| Hop { neighbor: e.source(), edge: e.id() }),
            )
            .collect();
        hops.sort_by_key(|hop| hop.edge.index());
        hops
    }

    /// Number of incident edges, any type, any direction
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
            + self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// Undirected simple-graph copy with `excluded` left out
    ///
    /// Returned indices are dense; only the component structure is meaningful.
    pub fn undirected_without(&self, excluded: Option<NodeIndex>) -> UnGraph<(), ()> {
        let mut undirected: UnGraph<(), ()> = UnGraph::new_undirected();

        let node_map: HashMap<NodeIndex, NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| Some(*idx) != excluded)
            .map(|idx| (idx, undirected.add_node(())))
            .collect();

        for edge_ref in self.graph.edge_references() {
            if let (Some(&src), Some(&tgt)) = (node_map.get(&edge_ref.source()), node_map.get(&edge_ref.target())) {
                if src != tgt && !undirected.contains_edge(src, tgt) {
                    undirected.add_edge(src, tgt, ());
                }
            }
        }

        undirected
    }

    /// Count connected components, treating edges as undirected
    pub fn connected_component_count(&self) -> usize {
        component_count(&self.undirected_without(None))
    }
}

pub(crate) fn component_count(graph: &UnGraph<(), ()>) -> usize {
    use rustworkx_core::connectivity::number_connected_components;

    if graph.node_count() == 0 {
        return 0;
    }
    number_connected_components(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{create_empty_document, GraphEdge, GraphNode, PersonNode};

    fn doc(nodes: &[&str], edges: &[(&str, &str, &str)]) -> GraphDocument {
        let mut doc = create_empty_document();
        for id in nodes {
            doc.nodes.push(GraphNode::Person(PersonNode::new(*id, *id, "", 0)));
        }
        for (id, s, t) in edges {
            doc.edges.push(GraphEdge::new(*id, *s, *t, RelationshipType::Manager));
        }
        doc
    }

    #[test]
    fn test_builds_nodes_and_edges() {
        let graph = OrgGraph::from_document(&doc(&["a", "b", "c"], &[("e1", "a", "b"), ("e2", "b", "c")]));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let b = graph.index_of("b").unwrap();
        assert_eq!(graph.degree(b), 2);
        assert_eq!(graph.id_of(b), "b");
    }

    #[test]
    fn test_skips_dangling_edges() {
        let graph = OrgGraph::from_document(&doc(&["a"], &[("e1", "a", "ghost")]));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_hops_follow_insertion_order() {
        let graph = OrgGraph::from_document(&doc(
            &["a", "b", "c"],
            &[("e1", "a", "b"), ("e2", "c", "a")],
        ));
        let a = graph.index_of("a").unwrap();
        let hops = graph.hops(a);
        let ids: Vec<&str> = hops.iter().map(|h| graph.edge_info(h.edge).edge_id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn test_component_count() {
        let graph = OrgGraph::from_document(&doc(&["a", "b", "c", "d"], &[("e1", "a", "b"), ("e2", "c", "d")]));
        assert_eq!(graph.connected_component_count(), 2);

        let empty = OrgGraph::from_document(&create_empty_document());
        assert_eq!(empty.connected_component_count(), 0);
    }

    #[test]
    fn test_undirected_without_removes_node() {
        let graph = OrgGraph::from_document(&doc(&["a", "b", "c"], &[("e1", "a", "b"), ("e2", "b", "c")]));
        let b = graph.index_of("b");
        let without = graph.undirected_without(b);
        assert_eq!(without.node_count(), 2);
        assert_eq!(component_count(&without), 2);
    }
}
