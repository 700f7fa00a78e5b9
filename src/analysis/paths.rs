//! Path analysis: shortest path, bounded all-paths, sphere of influence
//!
//! Every routine treats edges as undirected and counts any relationship type
//! as connectivity.

use rustworkx_core::petgraph::graph::{EdgeIndex, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::graph::OrgGraph;
use crate::document::{EdgeId, GraphDocument, NodeId, RelationshipType};

// =============================================================================
// Types
// =============================================================================

/// One node on a path and the edge used to reach it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStep {
    pub node_id: NodeId,
    /// `None` for the first step
    pub via_edge_id: Option<EdgeId>,
    pub relationship_type: Option<RelationshipType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    pub steps: Vec<PathStep>,
    pub hops: usize,
}

impl PathResult {
    pub fn node_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.node_id.as_str()).collect()
    }
}

// =============================================================================
// Shortest path
// =============================================================================

/// Unweighted BFS between two nodes
///
/// Same-node queries return a zero-hop path; unknown ids or disconnected
/// nodes return `None`.
pub fn find_shortest_path(doc: &GraphDocument, from: &str, to: &str) -> Option<PathResult> {
    let graph = OrgGraph::from_document(doc);
    let source = graph.index_of(from)?;
    let target = graph.index_of(to)?;

    if source == target {
        return Some(build_path(&graph, source, &[]));
    }

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut parent: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> = HashMap::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();

    queue.push_back(source);
    visited.insert(source);

    while let Some(current) = queue.pop_front() {
        for hop in graph.hops(current) {
            if !visited.insert(hop.neighbor) {
                continue;
            }
            parent.insert(hop.neighbor, (current, hop.edge));

            if hop.neighbor == target {
                return Some(reconstruct_path(&graph, source, target, &parent));
            }
            queue.push_back(hop.neighbor);
        }
    }

    None
}

fn reconstruct_path(
    graph: &OrgGraph,
    source: NodeIndex,
    target: NodeIndex,
    parent: &HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
) -> PathResult {
    let mut trail: Vec<(NodeIndex, EdgeIndex)> = Vec::new();
    let mut current = target;

    while let Some(&(prev, edge)) = parent.get(&current) {
        trail.push((current, edge));
        current = prev;
    }
    trail.reverse();

    build_path(graph, source, &trail)
}

fn build_path(graph: &OrgGraph, start: NodeIndex, trail: &[(NodeIndex, EdgeIndex)]) -> PathResult {
    let mut steps = Vec::with_capacity(trail.len() + 1);
    steps.push(PathStep {
        node_id: graph.id_of(start).to_string(),
        via_edge_id: None,
        relationship_type: None,
    });
    for &(node, edge) in trail {
        let info = graph.edge_info(edge);
        steps.push(PathStep {
            node_id: graph.id_of(node).to_string(),
            via_edge_id: Some(info.edge_id.clone()),
            relationship_type: Some(info.relationship),
        });
    }
    PathResult {
        hops: trail.len(),
        steps,
    }
}

// =============================================================================
// All paths
// =============================================================================

/// Enumerate every simple path of at most `max_depth` hops, shortest first
///
/// Exponential in `max_depth`; keep the bound small on large charts.
pub fn find_all_paths(doc: &GraphDocument, from: &str, to: &str, max_depth: usize) -> Vec<PathResult> {
    let graph = OrgGraph::from_document(doc);
    let (Some(source), Some(target)) = (graph.index_of(from), graph.index_of(to)) else {
        return vec![];
    };

    if source == target {
        return vec![build_path(&graph, source, &[])];
    }

    let mut search = PathSearch {
        graph: &graph,
        source,
        target,
        max_depth,
        on_path: HashSet::from([source]),
        trail: Vec::new(),
        results: Vec::new(),
    };
    search.walk(source);

    let mut results = search.results;
    // stable: equal-length paths keep discovery order
    results.sort_by_key(|p| p.hops);
    results
}

/// Top `limit` shortest simple paths (the caller-facing all-paths API)
pub fn find_top_paths(
    doc: &GraphDocument,
    from: &str,
    to: &str,
    max_depth: usize,
    limit: usize,
) -> Vec<PathResult> {
    let mut paths = find_all_paths(doc, from, to, max_depth);
    paths.truncate(limit);
    paths
}

struct PathSearch<'g> {
    graph: &'g OrgGraph,
    source: NodeIndex,
    target: NodeIndex,
    max_depth: usize,
    on_path: HashSet<NodeIndex>,
    trail: Vec<(NodeIndex, EdgeIndex)>,
    results: Vec<PathResult>,
}

impl PathSearch<'_> {
    fn walk(&mut self, current: NodeIndex) {
        if self.trail.len() >= self.max_depth {
            return;
        }

        for hop in self.graph.hops(current) {
            if self.on_path.contains(&hop.neighbor) {
                continue;
            }
            self.trail.push((hop.neighbor, hop.edge));

            if hop.neighbor == self.target {
                self.results.push(build_path(self.graph, self.source, &self.trail));
            } else {
                self.on_path.insert(hop.neighbor);
                self.walk(hop.neighbor);
                self.on_path.remove(&hop.neighbor);
            }

            self.trail.pop();
        }
    }
}

// =============================================================================
// Sphere of influence
// =============================================================================

/// Nodes reachable from `origin` within `depth` undirected hops (origin excluded)
pub fn sphere_of_influence(doc: &GraphDocument, origin: &str, depth: usize) -> BTreeSet<NodeId> {
    influence_distances(doc, origin, depth).into_keys().collect()
}

/// Like `sphere_of_influence`, keeping the hop distance of each node
pub fn influence_distances(doc: &GraphDocument, origin: &str, depth: usize) -> HashMap<NodeId, usize> {
    let graph = OrgGraph::from_document(doc);
    let Some(start) = graph.index_of(origin) else {
        return HashMap::new();
    };

    let mut distance: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let d = distance[&current];
        if d >= depth {
            continue;
        }
        for hop in graph.hops(current) {
            if !distance.contains_key(&hop.neighbor) {
                distance.insert(hop.neighbor, d + 1);
                queue.push_back(hop.neighbor);
            }
        }
    }

    distance
        .into_iter()
        .filter(|(idx, _)| *idx != start)
        .map(|(idx, d)| (graph.id_of(idx).to_string(), d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{create_empty_document, GraphEdge, GraphNode, PersonNode};

    fn build(nodes: &[&str], edges: &[(&str, &str, &str, RelationshipType)]) -> GraphDocument {
        let mut doc = create_empty_document();
        for id in nodes {
            doc.nodes.push(GraphNode::Person(PersonNode::new(*id, *id, "", 0)));
        }
        for (id, s, t, rel) in edges {
            doc.edges.push(GraphEdge::new(*id, *s, *t, *rel));
        }
        doc
    }

    /// a manages b, b manages c; d sponsors c; e is isolated
    fn sample() -> GraphDocument {
        use RelationshipType::*;
        build(
            &["a", "b", "c", "d", "e"],
            &[("e1", "a", "b", Manager), ("e2", "b", "c", Manager), ("e3", "d", "c", Sponsor)],
        )
    }

    // -------------------------------------------------------------------------
    // Shortest path
    // -------------------------------------------------------------------------

    #[test]
    fn test_shortest_path_chain() {
        let doc = sample();
        let path = find_shortest_path(&doc, "a", "c").unwrap();
        assert_eq!(path.hops, 2);
        assert_eq!(path.node_ids(), vec!["a", "b", "c"]);
        assert_eq!(path.steps[0].via_edge_id, None);
        assert_eq!(path.steps[1].via_edge_id.as_deref(), Some("e1"));
        assert_eq!(path.steps[2].relationship_type, Some(RelationshipType::Manager));
    }

    #[test]
    fn test_shortest_path_ignores_direction() {
        let doc = sample();
        let path = find_shortest_path(&doc, "c", "a").unwrap();
        assert_eq!(path.node_ids(), vec!["c", "b", "a"]);

        let path = find_shortest_path(&doc, "a", "d").unwrap();
        assert_eq!(path.hops, 3);
        assert_eq!(path.steps[3].relationship_type, Some(RelationshipType::Sponsor));
    }

    #[test]
    fn test_shortest_path_same_node() {
        let doc = sample();
        let path = find_shortest_path(&doc, "b", "b").unwrap();
        assert_eq!(path.hops, 0);
        assert_eq!(path.node_ids(), vec!["b"]);
    }

    #[test]
    fn test_shortest_path_disconnected_or_unknown() {
        let doc = sample();
        assert!(find_shortest_path(&doc, "a", "e").is_none());
        assert!(find_shortest_path(&doc, "a", "nobody").is_none());
    }

    // -------------------------------------------------------------------------
    // All paths
    // -------------------------------------------------------------------------

    #[test]
    fn test_all_paths_sorted_by_hops() {
        use RelationshipType::*;
        // a-b-d and a-c-x-d and a-d directly
        let doc = build(
            &["a", "b", "c", "x", "d"],
            &[
                ("e1", "a", "b", Manager),
                ("e2", "b", "d", Manager),
                ("e3", "a", "c", Dotted),
                ("e4", "c", "x", Dotted),
                ("e5", "x", "d", Dotted),
                ("e6", "a", "d", Sponsor),
            ],
        );
        let paths = find_all_paths(&doc, "a", "d", 4);
        let hops: Vec<usize> = paths.iter().map(|p| p.hops).collect();
        assert_eq!(hops, vec![1, 2, 3]);

        let bounded = find_all_paths(&doc, "a", "d", 2);
        assert_eq!(bounded.len(), 2);
    }

    #[test]
    fn test_all_paths_are_simple() {
        use RelationshipType::*;
        // triangle plus tail
        let doc = build(
            &["a", "b", "c", "d"],
            &[("e1", "a", "b", Manager), ("e2", "b", "c", Manager), ("e3", "c", "a", Dotted), ("e4", "c", "d", Manager)],
        );
        for path in find_all_paths(&doc, "a", "d", 4) {
            let ids = path.node_ids();
            let unique: HashSet<&str> = ids.iter().copied().collect();
            assert_eq!(unique.len(), ids.len(), "path repeats a node: {:?}", ids);
        }
    }

    #[test]
    fn test_top_paths_limit() {
        use RelationshipType::*;
        // six parallel two-hop routes from s to t
        let mut nodes = vec!["s", "t"];
        let mids = ["m1", "m2", "m3", "m4", "m5", "m6"];
        nodes.extend(mids);
        let ids: Vec<(String, String)> = (0..6).map(|i| (format!("in{}", i), format!("out{}", i))).collect();
        let mut edges = Vec::new();
        for (i, m) in mids.iter().enumerate() {
            edges.push((ids[i].0.as_str(), "s", *m, Dotted));
            edges.push((ids[i].1.as_str(), *m, "t", Dotted));
        }
        let doc = build(&nodes, &edges);
        assert_eq!(find_all_paths(&doc, "s", "t", 4).len(), 6);
        assert_eq!(find_top_paths(&doc, "s", "t", 4, 5).len(), 5);
    }

    // -------------------------------------------------------------------------
    // Sphere of influence
    // -------------------------------------------------------------------------

    #[test]
    fn test_sphere_of_influence_depths() {
        let doc = sample();
        let one: Vec<NodeId> = sphere_of_influence(&doc, "b", 1).into_iter().collect();
        assert_eq!(one, vec!["a", "c"]);

        let two = sphere_of_influence(&doc, "b", 2);
        assert!(two.contains("d"));
        assert!(!two.contains("b"), "origin is excluded");
        assert!(!two.contains("e"));
    }

    #[test]
    fn test_sphere_of_unknown_node_is_empty() {
        assert!(sphere_of_influence(&sample(), "ghost", 3).is_empty());
    }

    #[test]
    fn test_influence_distances() {
        let distances = influence_distances(&sample(), "a", 3);
        assert_eq!(distances["b"], 1);
        assert_eq!(distances["c"], 2);
        assert_eq!(distances["d"], 3);
    }
}
