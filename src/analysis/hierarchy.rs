//! Reporting-line helpers over `manager` edges only
//!
//! A manager edge `source → target` means source manages target.

use std::collections::{HashMap, HashSet};

use crate::document::{GraphDocument, NodeId};

/// manager id → direct report ids, in edge order
pub fn build_child_map(doc: &GraphDocument) -> HashMap<&str, Vec<&str>> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in doc.manager_edges() {
        children.entry(edge.source.as_str()).or_default().push(edge.target.as_str());
    }
    children
}

/// report id → manager ids, in edge order
pub fn build_parent_map(doc: &GraphDocument) -> HashMap<&str, Vec<&str>> {
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in doc.manager_edges() {
        parents.entry(edge.target.as_str()).or_default().push(edge.source.as_str());
    }
    parents
}

/// Every node above `id` in the reporting structure (cycle-safe)
pub fn ancestors(doc: &GraphDocument, id: &str) -> Vec<NodeId> {
    let parents = build_parent_map(doc);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = parents.get(id).cloned().unwrap_or_default();
    let mut result = Vec::new();

    while let Some(current) = stack.pop() {
        if current == id || !seen.insert(current) {
            continue;
        }
        result.push(current.to_string());
        if let Some(next) = parents.get(current) {
            stack.extend(next.iter().copied());
        }
    }
    result
}

/// Every node below `id` in the reporting structure (cycle-safe)
pub fn descendants(doc: &GraphDocument, id: &str) -> Vec<NodeId> {
    let children = build_child_map(doc);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = children.get(id).cloned().unwrap_or_default();
    let mut result = Vec::new();

    while let Some(current) = stack.pop() {
        if current == id || !seen.insert(current) {
            continue;
        }
        result.push(current.to_string());
        if let Some(next) = children.get(current) {
            stack.extend(next.iter().copied());
        }
    }
    result
}

/// True if `ancestor` manages `id` directly or transitively
pub fn is_ancestor(doc: &GraphDocument, ancestor: &str, id: &str) -> bool {
    let children = build_child_map(doc);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![ancestor];

    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        if let Some(next) = children.get(current) {
            for child in next {
                if *child == id {
                    return true;
                }
                stack.push(*child);
            }
        }
    }
    false
}

/// Would a new manager edge `manager → report` close a reporting loop?
pub fn would_create_cycle(doc: &GraphDocument, manager: &str, report: &str) -> bool {
    manager == report || is_ancestor(doc, report, manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{create_empty_document, GraphEdge, GraphNode, PersonNode, RelationshipType};

    fn chain() -> GraphDocument {
        // a manages b, b manages c; d is a dotted-line peer of c
        let mut doc = create_empty_document();
        for id in ["a", "b", "c", "d"] {
            doc.nodes.push(GraphNode::Person(PersonNode::new(id, id, "", 0)));
        }
        doc.edges.push(GraphEdge::new("e1", "a", "b", RelationshipType::Manager));
        doc.edges.push(GraphEdge::new("e2", "b", "c", RelationshipType::Manager));
        doc.edges.push(GraphEdge::new("e3", "c", "d", RelationshipType::Dotted));
        doc
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let doc = chain();
        let mut up = ancestors(&doc, "c");
        up.sort();
        assert_eq!(up, vec!["a", "b"]);

        let mut down = descendants(&doc, "a");
        down.sort();
        assert_eq!(down, vec!["b", "c"], "dotted edges are not reporting lines");
    }

    #[test]
    fn test_is_ancestor() {
        let doc = chain();
        assert!(is_ancestor(&doc, "a", "c"));
        assert!(!is_ancestor(&doc, "c", "a"));
        assert!(!is_ancestor(&doc, "c", "d"));
    }

    #[test]
    fn test_closing_the_loop_is_detected() {
        let doc = chain();
        assert!(would_create_cycle(&doc, "c", "a"));
        assert!(would_create_cycle(&doc, "b", "b"));
        assert!(!would_create_cycle(&doc, "a", "d"));
        assert!(!would_create_cycle(&doc, "d", "a"));
    }

    #[test]
    fn test_helpers_terminate_on_existing_cycle() {
        let mut doc = chain();
        doc.edges.push(GraphEdge::new("e4", "c", "a", RelationshipType::Manager));
        assert_eq!(ancestors(&doc, "a").len(), 2);
        assert_eq!(descendants(&doc, "a").len(), 2);
        assert!(is_ancestor(&doc, "c", "b"));
    }
}
