//! Centrality, bridge nodes and per-node network analysis

use rustworkx_core::petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::BTreeSet;

use super::graph::{component_count, OrgGraph};
use super::paths::sphere_of_influence;
use crate::document::{GraphDocument, NodeId};

/// Summary of one node's position in the network
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAnalysis {
    pub node_id: NodeId,
    /// Normalized degree centrality in [0, 1] for simple graphs
    pub centrality: f64,
    pub direct_connections: usize,
    pub sphere_of_influence: BTreeSet<NodeId>,
    pub sphere_depth: usize,
    /// Removing this node splits a connected component
    pub is_bridge: bool,
}

// =============================================================================
// Centrality
// =============================================================================

/// Incident edge count divided by (node count - 1); 0 for unknown ids and
/// single-node graphs
pub fn degree_centrality(doc: &GraphDocument, node_id: &str) -> f64 {
    let graph = OrgGraph::from_document(doc);
    graph
        .index_of(node_id)
        .map_or(0.0, |idx| centrality_of(&graph, idx))
}

fn centrality_of(graph: &OrgGraph, idx: NodeIndex) -> f64 {
    let n = graph.node_count();
    if n <= 1 {
        return 0.0;
    }
    graph.degree(idx) as f64 / (n - 1) as f64
}

// =============================================================================
// Bridges
// =============================================================================

/// Nodes whose removal increases the connected component count
///
/// Brute force: one component count per node, O(n * (n + m)). Returned in
/// document order.
pub fn bridge_nodes(doc: &GraphDocument) -> Vec<NodeId> {
    let graph = OrgGraph::from_document(doc);
    let baseline = graph.connected_component_count();

    graph
        .node_indices()
        .filter(|idx| is_bridge(&graph, *idx, baseline))
        .map(|idx| graph.id_of(idx).to_string())
        .collect()
}

fn is_bridge(graph: &OrgGraph, idx: NodeIndex, baseline: usize) -> bool {
    // an isolated node disappears with its own component, never a bridge
    if graph.degree(idx) == 0 {
        return false;
    }
    component_count(&graph.undirected_without(Some(idx))) > baseline
}

// =============================================================================
// Network analysis
// =============================================================================

/// Centrality, connections, sphere and bridge flag for one node
pub fn network_analysis(doc: &GraphDocument, node_id: &str, sphere_depth: usize) -> Option<NetworkAnalysis> {
    let graph = OrgGraph::from_document(doc);
    let idx = graph.index_of(node_id)?;
    let baseline = graph.connected_component_count();

    let direct: BTreeSet<NodeIndex> = graph.hops(idx).into_iter().map(|hop| hop.neighbor).collect();

    Some(NetworkAnalysis {
        node_id: node_id.to_string(),
        centrality: centrality_of(&graph, idx),
        direct_connections: direct.len(),
        sphere_of_influence: sphere_of_influence(doc, node_id, sphere_depth),
        sphere_depth,
        is_bridge: is_bridge(&graph, idx, baseline),
    })
}
