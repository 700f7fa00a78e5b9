//! Span-of-control metrics and the organization health summary

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::graph::OrgGraph;
use super::hierarchy::build_child_map;
use super::influence::bridge_nodes;
use crate::config::SpanThresholds;
use crate::document::{GraphDocument, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    /// No direct reports
    None,
    Healthy,
    High,
    Critical,
}

impl SpanStatus {
    pub fn classify(direct_reports: usize, thresholds: &SpanThresholds) -> Self {
        match direct_reports {
            0 => SpanStatus::None,
            n if n <= thresholds.healthy_max => SpanStatus::Healthy,
            n if n <= thresholds.high_max => SpanStatus::High,
            _ => SpanStatus::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanMetrics {
    pub node_id: NodeId,
    pub direct_reports: usize,
    pub total_team_size: usize,
    /// Longest manager chain below this node, in edges
    pub depth: usize,
    pub status: SpanStatus,
}

// =============================================================================
// Span of control
// =============================================================================

/// Span metrics for `manager_id`, following manager edges only
///
/// Unknown ids yield all-zero metrics with status `none`. Reporting cycles
/// stop contributing once a node is revisited.
pub fn calculate_span_metrics(doc: &GraphDocument, manager_id: &str, thresholds: &SpanThresholds) -> SpanMetrics {
    let children = build_child_map(doc);

    let direct_reports = children.get(manager_id).map_or(0, Vec::len);

    let mut visited = HashSet::new();
    let total_team_size = team_size(&children, manager_id, &mut visited);

    let mut on_path = HashSet::new();
    let mut finished = HashMap::new();
    let depth = chain_depth(&children, manager_id, &mut on_path, &mut finished);

    SpanMetrics {
        node_id: manager_id.to_string(),
        direct_reports,
        total_team_size,
        depth,
        status: SpanStatus::classify(direct_reports, thresholds),
    }
}

/// direct reports + every report's own team size
fn team_size<'a>(children: &HashMap<&'a str, Vec<&'a str>>, id: &'a str, visited: &mut HashSet<&'a str>) -> usize {
    if !visited.insert(id) {
        return 0;
    }
    let Some(reports) = children.get(id) else {
        return 0;
    };
    reports.len()
        + reports
            .iter()
            .map(|report| team_size(children, *report, visited))
            .sum::<usize>()
}

/// Longest manager chain below `id`; finished depths are memoized so shared
/// reports in a multi-manager lattice are walked once
fn chain_depth<'a>(
    children: &HashMap<&'a str, Vec<&'a str>>,
    id: &'a str,
    on_path: &mut HashSet<&'a str>,
    finished: &mut HashMap<&'a str, usize>,
) -> usize {
    if let Some(depth) = finished.get(id) {
        return *depth;
    }
    let Some(reports) = children.get(id) else {
        return 0;
    };
    on_path.insert(id);
    let mut deepest = 0;
    for report in reports {
        if !on_path.contains(report) {
            deepest = deepest.max(1 + chain_depth(children, *report, on_path, finished));
        }
    }
    on_path.remove(id);
    finished.insert(id, deepest);
    deepest
}

// =============================================================================
// Organization health
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgHealth {
    pub total_people: usize,
    /// People with at least one direct report
    pub manager_count: usize,
    /// Mean direct reports across managers (0 with no managers)
    pub average_span: f64,
    pub healthy_spans: usize,
    pub high_spans: usize,
    pub critical_spans: usize,
    pub component_count: usize,
    /// Nodes without any edge
    pub orphan_count: usize,
    pub bridge_nodes: Vec<NodeId>,
}

pub fn org_health(doc: &GraphDocument, thresholds: &SpanThresholds) -> OrgHealth {
    let children = build_child_map(doc);
    let graph = OrgGraph::from_document(doc);

    let mut manager_count = 0;
    let mut report_total = 0;
    let (mut healthy_spans, mut high_spans, mut critical_spans) = (0, 0, 0);

    for person in doc.people() {
        let direct = children.get(person.id.as_str()).map_or(0, Vec::len);
        match SpanStatus::classify(direct, thresholds) {
            SpanStatus::None => continue,
            SpanStatus::Healthy => healthy_spans += 1,
            SpanStatus::High => high_spans += 1,
            SpanStatus::Critical => critical_spans += 1,
        }
        manager_count += 1;
        report_total += direct;
    }

    let orphan_count = graph.node_indices().filter(|idx| graph.degree(*idx) == 0).count();

    OrgHealth {
        total_people: doc.people().count(),
        manager_count,
        average_span: if manager_count == 0 {
            0.0
        } else {
            report_total as f64 / manager_count as f64
        },
        healthy_spans,
        high_spans,
        critical_spans,
        component_count: graph.connected_component_count(),
        orphan_count,
        bridge_nodes: bridge_nodes(doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{create_empty_document, GraphEdge, GraphNode, PersonNode, RelationshipType};

    fn build(nodes: &[&str], edges: &[(&str, &str, RelationshipType)]) -> GraphDocument {
        let mut doc = create_empty_document();
        for id in nodes {
            doc.nodes.push(GraphNode::Person(PersonNode::new(*id, *id, "", 0)));
        }
        for (i, (s, t, rel)) in edges.iter().enumerate() {
            doc.edges.push(GraphEdge::new(format!("e{}", i), *s, *t, *rel));
        }
        doc
    }

    fn chain() -> GraphDocument {
        use RelationshipType::Manager;
        build(&["a", "b", "c"], &[("a", "b", Manager), ("b", "c", Manager)])
    }

    // -------------------------------------------------------------------------
    // Span metrics
    // -------------------------------------------------------------------------

    #[test]
    fn test_span_on_chain() {
        let metrics = calculate_span_metrics(&chain(), "a", &SpanThresholds::default());
        assert_eq!(metrics.direct_reports, 1);
        assert_eq!(metrics.total_team_size, 2);
        assert_eq!(metrics.depth, 2);
        assert_eq!(metrics.status, SpanStatus::Healthy);

        let leaf = calculate_span_metrics(&chain(), "c", &SpanThresholds::default());
        assert_eq!(leaf.direct_reports, 0);
        assert_eq!(leaf.depth, 0);
        assert_eq!(leaf.status, SpanStatus::None);
    }

    #[test]
    fn test_span_ignores_non_manager_edges() {
        use RelationshipType::*;
        let doc = build(&["a", "b", "c"], &[("a", "b", Manager), ("a", "c", Dotted)]);
        let metrics = calculate_span_metrics(&doc, "a", &SpanThresholds::default());
        assert_eq!(metrics.direct_reports, 1);
        assert_eq!(metrics.total_team_size, 1);
    }

    #[test]
    fn test_status_thresholds() {
        let t = SpanThresholds::default();
        assert_eq!(SpanStatus::classify(0, &t), SpanStatus::None);
        assert_eq!(SpanStatus::classify(8, &t), SpanStatus::Healthy);
        assert_eq!(SpanStatus::classify(9, &t), SpanStatus::High);
        assert_eq!(SpanStatus::classify(10, &t), SpanStatus::High);
        assert_eq!(SpanStatus::classify(11, &t), SpanStatus::Critical);
    }

    #[test]
    fn test_wide_team_is_critical() {
        let ids: Vec<String> = (0..11).map(|i| format!("r{}", i)).collect();
        let mut nodes: Vec<&str> = ids.iter().map(String::as_str).collect();
        nodes.push("boss");
        let edges: Vec<(&str, &str, RelationshipType)> =
            ids.iter().map(|r| ("boss", r.as_str(), RelationshipType::Manager)).collect();
        let doc = build(&nodes, &edges);

        let metrics = calculate_span_metrics(&doc, "boss", &SpanThresholds::default());
        assert_eq!(metrics.direct_reports, 11);
        assert_eq!(metrics.status, SpanStatus::Critical);
    }

    #[test]
    fn test_span_terminates_on_cycle() {
        use RelationshipType::Manager;
        let doc = build(&["a", "b"], &[("a", "b", Manager), ("b", "a", Manager)]);
        let metrics = calculate_span_metrics(&doc, "a", &SpanThresholds::default());
        assert_eq!(metrics.direct_reports, 1);
        assert!(metrics.total_team_size >= metrics.direct_reports);
        assert_eq!(metrics.depth, 1);
    }

    #[test]
    fn test_depth_of_deep_shared_lattice() {
        // two people per level, each managed by both people of the level above
        let levels = 60;
        let ids: Vec<Vec<String>> = (0..levels)
            .map(|l| (0..2).map(|i| format!("n{}_{}", l, i)).collect())
            .collect();
        let mut nodes: Vec<&str> = vec!["root"];
        nodes.extend(ids.iter().flatten().map(String::as_str));

        let mut edges: Vec<(&str, &str, RelationshipType)> = Vec::new();
        for id in &ids[0] {
            edges.push(("root", id.as_str(), RelationshipType::Manager));
        }
        for pair in ids.windows(2) {
            for manager in &pair[0] {
                for report in &pair[1] {
                    edges.push((manager.as_str(), report.as_str(), RelationshipType::Manager));
                }
            }
        }
        let doc = build(&nodes, &edges);

        let metrics = calculate_span_metrics(&doc, "root", &SpanThresholds::default());
        assert_eq!(metrics.depth, levels);
        assert_eq!(metrics.direct_reports, 2);

        let health = org_health(&doc, &SpanThresholds::default());
        assert_eq!(health.manager_count, 1 + 2 * (levels - 1));
    }

    #[test]
    fn test_unknown_manager() {
        let metrics = calculate_span_metrics(&chain(), "ghost", &SpanThresholds::default());
        assert_eq!(metrics.direct_reports, 0);
        assert_eq!(metrics.total_team_size, 0);
        assert_eq!(metrics.status, SpanStatus::None);
    }

    // -------------------------------------------------------------------------
    // Org health
    // -------------------------------------------------------------------------

    #[test]
    fn test_org_health_summary() {
        let mut doc = chain();
        doc.nodes.push(GraphNode::Person(PersonNode::new("loner", "Loner", "", 0)));

        let health = org_health(&doc, &SpanThresholds::default());
        assert_eq!(health.total_people, 4);
        assert_eq!(health.manager_count, 2);
        assert!((health.average_span - 1.0).abs() < 1e-9);
        assert_eq!(health.healthy_spans, 2);
        assert_eq!(health.component_count, 2);
        assert_eq!(health.orphan_count, 1);
        assert_eq!(health.bridge_nodes, vec!["b"]);
    }

    #[test]
    fn test_org_health_empty() {
        let health = org_health(&create_empty_document(), &SpanThresholds::default());
        assert_eq!(health.total_people, 0);
        assert_eq!(health.average_span, 0.0);
        assert_eq!(health.component_count, 0);
    }
}
