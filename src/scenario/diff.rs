//! Structural diff between two documents
//!
//! Every node and edge id present in either side lands in exactly one
//! status bucket. Assignment lists (departments, brands, channels, group
//! members) compare as sets: reordering alone is not a change.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::document::{EdgeId, GraphDocument, GraphEdge, GraphNode, Lens, NodeId, RelationshipType};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Removed,
    Modified,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeChange {
    pub node_id: NodeId,
    pub name: String,
    pub status: DiffStatus,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeChange {
    pub edge_id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub relationship_type: RelationshipType,
    pub status: DiffStatus,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffCounts {
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub nodes_modified: usize,
    pub nodes_unchanged: usize,
    pub edges_added: usize,
    pub edges_removed: usize,
    pub edges_modified: usize,
    pub edges_unchanged: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    People,
    Relationships,
    Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// One human-readable line of the change list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeItem {
    pub category: ChangeCategory,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDiff {
    pub nodes: Vec<NodeChange>,
    pub edges: Vec<EdgeChange>,
    pub counts: DiffCounts,
    pub changes: Vec<ChangeItem>,
}

impl ScenarioDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Change list entries of one category
    pub fn changes_in(&self, category: ChangeCategory) -> impl Iterator<Item = &ChangeItem> {
        self.changes.iter().filter(move |c| c.category == category)
    }
}

// =============================================================================
// Diff
// =============================================================================

pub fn compute_scenario_diff(base: &GraphDocument, target: &GraphDocument) -> ScenarioDiff {
    let mut counts = DiffCounts::default();
    let mut changes = Vec::new();

    let nodes = diff_nodes(base, target, &mut counts, &mut changes);
    let edges = diff_edges(base, target, &mut counts, &mut changes);

    ScenarioDiff {
        nodes,
        edges,
        counts,
        changes,
    }
}

fn diff_nodes(
    base: &GraphDocument,
    target: &GraphDocument,
    counts: &mut DiffCounts,
    changes: &mut Vec<ChangeItem>,
) -> Vec<NodeChange> {
    let before = index_by_id(&base.nodes, |n| n.id());
    let after = index_by_id(&target.nodes, |n| n.id());

    let mut result = Vec::new();
    for id in union_ids(&base.nodes, &target.nodes, |n| n.id()) {
        let change = match (before.get(id).copied(), after.get(id).copied()) {
            (Some(old), None) => {
                counts.nodes_removed += 1;
                changes.push(ChangeItem {
                    category: ChangeCategory::People,
                    severity: Severity::High,
                    description: format!("Removed {}", old.display_name()),
                });
                node_change(old, DiffStatus::Removed, vec![])
            }
            (None, Some(new)) => {
                counts.nodes_added += 1;
                changes.push(ChangeItem {
                    category: ChangeCategory::People,
                    severity: Severity::Medium,
                    description: format!("Added {}", new.display_name()),
                });
                node_change(new, DiffStatus::Added, vec![])
            }
            (Some(old), Some(new)) => {
                let fields = node_fields(old, new);
                if fields.is_empty() {
                    counts.nodes_unchanged += 1;
                    node_change(new, DiffStatus::Unchanged, fields)
                } else {
                    counts.nodes_modified += 1;
                    let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                    changes.push(ChangeItem {
                        category: ChangeCategory::Attributes,
                        severity: Severity::Low,
                        description: format!("{}: changed {}", new.display_name(), names.join(", ")),
                    });
                    node_change(new, DiffStatus::Modified, fields)
                }
            }
            (None, None) => continue,
        };
        result.push(change);
    }
    result
}

fn node_change(node: &GraphNode, status: DiffStatus, changes: Vec<FieldChange>) -> NodeChange {
    NodeChange {
        node_id: node.id().to_string(),
        name: node.display_name().to_string(),
        status,
        changes,
    }
}

fn node_fields(old: &GraphNode, new: &GraphNode) -> Vec<FieldChange> {
    let mut fields = Vec::new();
    match (old, new) {
        (GraphNode::Person(a), GraphNode::Person(b)) => {
            compare(&mut fields, "name", &a.name, &b.name);
            compare(&mut fields, "title", &a.title, &b.title);
            compare(&mut fields, "tier", &a.tier, &b.tier);
            compare_sets(&mut fields, "departments", &a.departments, &b.departments);
            compare_sets(&mut fields, "brands", &a.brands, &b.brands);
            compare_sets(&mut fields, "channels", &a.channels, &b.channels);
        }
        (GraphNode::Group(a), GraphNode::Group(b)) => {
            compare(&mut fields, "label", &a.label, &b.label);
            compare(&mut fields, "color", &a.color, &b.color);
            compare_sets(&mut fields, "memberIds", &a.member_ids, &b.member_ids);
        }
        _ => fields.push(FieldChange {
            field: "type".to_string(),
            old: json!(kind(old)),
            new: json!(kind(new)),
        }),
    }
    fields
}

fn kind(node: &GraphNode) -> &'static str {
    match node {
        GraphNode::Person(_) => "person",
        GraphNode::Group(_) => "group",
    }
}

fn diff_edges(
    base: &GraphDocument,
    target: &GraphDocument,
    counts: &mut DiffCounts,
    changes: &mut Vec<ChangeItem>,
) -> Vec<EdgeChange> {
    let before = index_by_id(&base.edges, |e| e.id.as_str());
    let after = index_by_id(&target.edges, |e| e.id.as_str());

    // names resolve against whichever side still has the node
    let name_of = |id: &str| -> String {
        target
            .node(id)
            .or_else(|| base.node(id))
            .map_or_else(|| id.to_string(), |n| n.display_name().to_string())
    };
    let describe = |verb: &str, edge: &GraphEdge| {
        format!(
            "{} {} relationship {} → {}",
            verb,
            edge.relationship().as_str(),
            name_of(&edge.source),
            name_of(&edge.target)
        )
    };

    let mut result = Vec::new();
    for id in union_ids(&base.edges, &target.edges, |e| e.id.as_str()) {
        let (edge, status, fields) = match (before.get(id).copied(), after.get(id).copied()) {
            (Some(old), None) => {
                counts.edges_removed += 1;
                changes.push(relationship_item(old.is_manager(), describe("Removed", old)));
                (old, DiffStatus::Removed, vec![])
            }
            (None, Some(new)) => {
                counts.edges_added += 1;
                changes.push(relationship_item(new.is_manager(), describe("Added", new)));
                (new, DiffStatus::Added, vec![])
            }
            (Some(old), Some(new)) => {
                let fields = edge_fields(old, new);
                if fields.is_empty() {
                    counts.edges_unchanged += 1;
                    (new, DiffStatus::Unchanged, fields)
                } else {
                    counts.edges_modified += 1;
                    changes.push(relationship_item(
                        old.is_manager() || new.is_manager(),
                        describe("Changed", new),
                    ));
                    (new, DiffStatus::Modified, fields)
                }
            }
            (None, None) => continue,
        };
        result.push(EdgeChange {
            edge_id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            relationship_type: edge.relationship(),
            status,
            changes: fields,
        });
    }
    result
}

fn relationship_item(manager: bool, description: String) -> ChangeItem {
    ChangeItem {
        category: ChangeCategory::Relationships,
        severity: if manager { Severity::High } else { Severity::Medium },
        description,
    }
}

fn edge_fields(old: &GraphEdge, new: &GraphEdge) -> Vec<FieldChange> {
    let mut fields = Vec::new();
    compare(&mut fields, "source", &old.source, &new.source);
    compare(&mut fields, "target", &old.target, &new.target);
    compare(&mut fields, "type", &old.metadata.relationship, &new.metadata.relationship);
    compare(&mut fields, "weight", &old.metadata.weight, &new.metadata.weight);
    compare(&mut fields, "label", &old.metadata.label, &new.metadata.label);
    compare_lenses(&mut fields, old.metadata.lenses.as_deref(), new.metadata.lenses.as_deref());
    compare(&mut fields, "ghost", &old.metadata.ghost, &new.metadata.ghost);
    fields
}

// =============================================================================
// Helpers
// =============================================================================

fn compare<T: PartialEq + Serialize>(fields: &mut Vec<FieldChange>, field: &str, old: &T, new: &T) {
    if old != new {
        fields.push(FieldChange {
            field: field.to_string(),
            old: json!(old),
            new: json!(new),
        });
    }
}

fn compare_sets(fields: &mut Vec<FieldChange>, field: &str, old: &[String], new: &[String]) {
    let a: BTreeSet<&String> = old.iter().collect();
    let b: BTreeSet<&String> = new.iter().collect();
    if a != b {
        fields.push(FieldChange {
            field: field.to_string(),
            old: json!(old),
            new: json!(new),
        });
    }
}

/// `None` (every lens) only equals `None`; lists compare as sets
fn compare_lenses(fields: &mut Vec<FieldChange>, old: Option<&[Lens]>, new: Option<&[Lens]>) {
    let as_set = |lenses: Option<&[Lens]>| lenses.map(|l| l.iter().copied().collect::<BTreeSet<Lens>>());
    if as_set(old) != as_set(new) {
        fields.push(FieldChange {
            field: "lenses".to_string(),
            old: json!(old),
            new: json!(new),
        });
    }
}

/// First occurrence wins, matching validation's duplicate-id rule
fn index_by_id<'a, T>(items: &'a [T], id: impl Fn(&'a T) -> &'a str) -> HashMap<&'a str, &'a T> {
    let mut map = HashMap::with_capacity(items.len());
    for item in items {
        map.entry(id(item)).or_insert(item);
    }
    map
}

/// Base ids in order, then target-only ids in order, each once
fn union_ids<'a, T>(base: &'a [T], target: &'a [T], id: impl Fn(&'a T) -> &'a str) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    base.iter()
        .chain(target.iter())
        .map(id)
        .filter(|i| seen.insert(*i))
        .collect()
}
