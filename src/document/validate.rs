//! Structural validation, sanitize step and advisory conflicts
//!
//! Validation never mutates and reports every violation it finds. It runs in
//! two stages: `validate_value` checks the raw JSON shape (so that one bad lens
//! state or node does not hide the others), then `validate_document` checks the
//! typed invariants (unique ids, no dangling edges, sane lens states).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use super::model::{
    Dimension, DocumentMetadata, GraphDocument, GraphEdge, GraphNode, Lens, LensState, NodeId,
    SCHEMA_VERSION,
};
use crate::error::{Endpoint, OrgError, Result, Violation};

// =============================================================================
// Raw-shape validation
// =============================================================================

/// Validate an untyped JSON value and build the typed document from it
///
/// Fails with `OrgError::Validation` carrying every violation found.
pub fn validate_value(value: &Value) -> Result<GraphDocument> {
    let mut violations = Vec::new();

    let Some(obj) = value.as_object() else {
        return Err(OrgError::Validation(vec![Violation::MalformedDocument {
            reason: "expected a JSON object".to_string(),
        }]));
    };

    match obj.get("schemaVersion").and_then(Value::as_str) {
        Some(SCHEMA_VERSION) => {}
        Some(other) => violations.push(Violation::SchemaVersion {
            found: other.to_string(),
            expected: SCHEMA_VERSION.to_string(),
        }),
        None => violations.push(Violation::SchemaVersion {
            found: String::new(),
            expected: SCHEMA_VERSION.to_string(),
        }),
    }

    let metadata = match obj.get("metadata") {
        Some(raw) => match DocumentMetadata::deserialize(raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                violations.push(Violation::MalformedDocument {
                    reason: format!("metadata: {}", e),
                });
                None
            }
        },
        None => {
            violations.push(Violation::MalformedDocument {
                reason: "metadata is missing".to_string(),
            });
            None
        }
    };

    let nodes: Vec<GraphNode> = parse_array(obj.get("nodes"), "nodes", &mut violations);
    let edges: Vec<GraphEdge> = parse_array(obj.get("edges"), "edges", &mut violations);

    let active_lens = match obj.get("activeLens") {
        None => Lens::default(),
        Some(raw) => match raw.as_str().and_then(Lens::parse) {
            Some(lens) => lens,
            None => {
                violations.push(Violation::MalformedDocument {
                    reason: format!("activeLens: unknown lens {}", raw),
                });
                Lens::default()
            }
        },
    };

    let mut lens_states = BTreeMap::new();
    match obj.get("lensStates") {
        None | Some(Value::Null) => {}
        Some(Value::Object(entries)) => {
            for (key, raw) in entries {
                let Some(lens) = Lens::parse(key) else {
                    violations.push(Violation::MalformedLensState {
                        lens: key.clone(),
                        reason: "unknown lens".to_string(),
                    });
                    continue;
                };
                match LensState::deserialize(raw) {
                    Ok(state) => {
                        lens_states.insert(lens, state);
                    }
                    Err(e) => violations.push(Violation::MalformedLensState {
                        lens: key.clone(),
                        reason: e.to_string(),
                    }),
                }
            }
        }
        Some(other) => violations.push(Violation::MalformedDocument {
            reason: format!("lensStates: expected an object, found {}", json_kind(other)),
        }),
    }

    let doc = GraphDocument {
        schema_version: SCHEMA_VERSION.to_string(),
        metadata: metadata.unwrap_or_else(|| DocumentMetadata {
            name: String::new(),
            description: None,
            created_at: 0,
            updated_at: 0,
        }),
        nodes,
        edges,
        active_lens,
        lens_states,
    };

    violations.extend(validate_document(&doc));

    if violations.is_empty() {
        Ok(doc)
    } else {
        Err(OrgError::Validation(violations))
    }
}

fn parse_array<T: DeserializeOwned>(
    raw: Option<&Value>,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Vec<T> {
    let items = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            violations.push(Violation::MalformedDocument {
                reason: format!("{}: expected an array, found {}", field, json_kind(other)),
            });
            return Vec::new();
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match T::deserialize(item) {
            Ok(value) => parsed.push(value),
            Err(e) => violations.push(Violation::MalformedDocument {
                reason: format!("{}[{}]: {}", field, i, e),
            }),
        }
    }
    parsed
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Typed validation
// =============================================================================

/// Check typed invariants; returns every violation (empty = valid)
///
/// Manager-edge cycles are deliberately not checked here; they are refused
/// at mutation time.
pub fn validate_document(doc: &GraphDocument) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut node_ids: HashSet<&str> = HashSet::new();
    for node in &doc.nodes {
        if !node_ids.insert(node.id()) {
            violations.push(Violation::DuplicateNodeId { id: node.id().to_string() });
        }
    }

    let mut edge_ids: HashSet<&str> = HashSet::new();
    for edge in &doc.edges {
        if !edge_ids.insert(edge.id.as_str()) {
            violations.push(Violation::DuplicateEdgeId { id: edge.id.clone() });
        }
        if !node_ids.contains(edge.source.as_str()) {
            violations.push(Violation::DanglingReference {
                edge_id: edge.id.clone(),
                endpoint: Endpoint::Source,
                node_id: edge.source.clone(),
            });
        }
        if !node_ids.contains(edge.target.as_str()) {
            violations.push(Violation::DanglingReference {
                edge_id: edge.id.clone(),
                endpoint: Endpoint::Target,
                node_id: edge.target.clone(),
            });
        }
    }

    for (lens, state) in &doc.lens_states {
        let viewport = state.layout.viewport;
        if !(viewport.zoom.is_finite() && viewport.zoom > 0.0) {
            violations.push(Violation::MalformedLensState {
                lens: lens.as_str().to_string(),
                reason: format!("viewport zoom must be a positive number, found {}", viewport.zoom),
            });
        }
        if !(viewport.x.is_finite() && viewport.y.is_finite()) {
            violations.push(Violation::MalformedLensState {
                lens: lens.as_str().to_string(),
                reason: "viewport offset is not finite".to_string(),
            });
        }
        for (node_id, position) in &state.layout.positions {
            if !position.is_finite() {
                violations.push(Violation::MalformedLensState {
                    lens: lens.as_str().to_string(),
                    reason: format!("position of '{}' is not finite", node_id),
                });
            }
        }
    }

    violations
}

// =============================================================================
// Sanitize
// =============================================================================

/// Fill optional defaults on an already validated document
///
/// Adds a default `LensState` for every missing lens, removes lens-scoped
/// references (positions, focus, hidden) to nodes that do not exist, and
/// drops repeated entries from people's assignment and tag lists.
pub fn sanitize(mut doc: GraphDocument) -> GraphDocument {
    for lens in Lens::ALL {
        doc.lens_states.entry(lens).or_default();
    }

    for node in &mut doc.nodes {
        if let Some(person) = node.as_person_mut() {
            dedupe_in_place(&mut person.departments);
            dedupe_in_place(&mut person.brands);
            dedupe_in_place(&mut person.channels);
            dedupe_in_place(&mut person.tags);
        }
    }

    let live: HashSet<NodeId> = doc.nodes.iter().map(|n| n.id().to_string()).collect();
    for state in doc.lens_states.values_mut() {
        state.layout.positions.retain(|id, _| live.contains(id));
        state.filters.focus.retain(|id| live.contains(id));
        state.filters.hidden.retain(|id| live.contains(id));
    }

    if doc.metadata.updated_at < doc.metadata.created_at {
        doc.metadata.updated_at = doc.metadata.created_at;
    }

    doc
}

/// Keep the first occurrence of every entry
fn dedupe_in_place(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
}

// =============================================================================
// Advisory conflicts
// =============================================================================

/// Semantic problems that do not block import but should be surfaced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Conflict {
    /// A primary selection that is not in the matching assignment list
    #[serde(rename_all = "camelCase")]
    PrimaryNotAssigned {
        node_id: NodeId,
        dimension: Dimension,
        value: String,
    },
    /// A group lists a member id that no longer exists
    #[serde(rename_all = "camelCase")]
    MissingGroupMember { group_id: NodeId, member_id: NodeId },
}

/// List advisory conflicts in document order
pub fn conflicts(doc: &GraphDocument) -> Vec<Conflict> {
    let mut found = Vec::new();
    for node in &doc.nodes {
        match node {
            GraphNode::Person(person) => {
                for dimension in Dimension::ALL {
                    if let Some(primary) = person.primary(dimension) {
                        if !person.assignments(dimension).iter().any(|v| v == primary) {
                            found.push(Conflict::PrimaryNotAssigned {
                                node_id: person.id.clone(),
                                dimension,
                                value: primary.to_string(),
                            });
                        }
                    }
                }
            }
            GraphNode::Group(group) => {
                for member in &group.member_ids {
                    if !doc.contains_node(member) {
                        found.push(Conflict::MissingGroupMember {
                            group_id: group.id.clone(),
                            member_id: member.clone(),
                        });
                    }
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{create_empty_document, PersonNode, Position, RelationshipType};
    use serde_json::json;

    fn doc_with_people(ids: &[&str]) -> GraphDocument {
        let mut doc = create_empty_document();
        for id in ids {
            doc.nodes.push(GraphNode::Person(PersonNode::new(*id, id.to_uppercase(), "", 0)));
        }
        doc
    }

    // -------------------------------------------------------------------------
    // Typed validation
    // -------------------------------------------------------------------------

    #[test]
    fn test_valid_document_has_no_violations() {
        let mut doc = doc_with_people(&["a", "b"]);
        doc.edges.push(GraphEdge::new("e1", "a", "b", RelationshipType::Manager));
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn test_reports_every_violation() {
        let mut doc = doc_with_people(&["a", "a"]);
        doc.edges.push(GraphEdge::new("e1", "a", "x", RelationshipType::Manager));
        doc.edges.push(GraphEdge::new("e1", "y", "a", RelationshipType::Dotted));

        let violations = validate_document(&doc);
        assert_eq!(violations.len(), 4, "{:?}", violations);
        assert!(violations.contains(&Violation::DuplicateNodeId { id: "a".into() }));
        assert!(violations.contains(&Violation::DuplicateEdgeId { id: "e1".into() }));
        assert_eq!(violations.iter().filter(|v| v.is_reference_error()).count(), 2);
    }

    #[test]
    fn test_manager_cycles_are_not_validation_failures() {
        let mut doc = doc_with_people(&["a", "b"]);
        doc.edges.push(GraphEdge::new("e1", "a", "b", RelationshipType::Manager));
        doc.edges.push(GraphEdge::new("e2", "b", "a", RelationshipType::Manager));
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn test_non_positive_zoom_is_malformed() {
        let mut doc = doc_with_people(&[]);
        doc.lens_state_mut(Lens::Brand).layout.viewport.zoom = 0.0;
        let violations = validate_document(&doc);
        assert!(matches!(
            &violations[..],
            [Violation::MalformedLensState { lens, .. }] if lens == "brand"
        ));
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let mut doc = doc_with_people(&["a"]);
        doc.edges.push(GraphEdge::new("e1", "a", "ghost", RelationshipType::Manager));
        let before = doc.clone();
        let _ = validate_document(&doc);
        assert_eq!(doc, before);
    }

    // -------------------------------------------------------------------------
    // Raw-shape validation
    // -------------------------------------------------------------------------

    #[test]
    fn test_value_with_dangling_edge_is_rejected() {
        let value = json!({
            "schemaVersion": SCHEMA_VERSION,
            "metadata": { "name": "Org" },
            "nodes": [{ "type": "person", "id": "a", "name": "A" }],
            "edges": [{ "id": "e1", "source": "a", "target": "x", "metadata": { "type": "manager" } }],
        });
        let err = validate_value(&value).unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::DanglingReference {
                edge_id: "e1".into(),
                endpoint: Endpoint::Target,
                node_id: "x".into(),
            }]
        );
    }

    #[test]
    fn test_value_collects_shape_and_lens_errors() {
        let value = json!({
            "schemaVersion": "0.1",
            "metadata": { "name": "Org" },
            "nodes": [{ "type": "robot", "id": "r" }],
            "edges": [],
            "lensStates": {
                "hierarchy": { "layout": { "viewport": { "zoom": "big" } } },
                "planet": {}
            }
        });
        let err = validate_value(&value).unwrap_err();
        let violations = err.violations();
        assert!(violations.iter().any(|v| matches!(v, Violation::SchemaVersion { .. })));
        assert!(violations.iter().any(|v| matches!(v, Violation::MalformedDocument { reason } if reason.starts_with("nodes[0]"))));
        assert!(violations.iter().any(|v| matches!(v, Violation::MalformedLensState { lens, .. } if lens == "hierarchy")));
        assert!(violations.iter().any(|v| matches!(v, Violation::MalformedLensState { lens, .. } if lens == "planet")));
    }

    #[test]
    fn test_value_missing_lens_states_is_accepted() {
        let value = json!({
            "schemaVersion": SCHEMA_VERSION,
            "metadata": { "name": "Org" },
            "nodes": [],
            "edges": []
        });
        let doc = validate_value(&value).unwrap();
        assert!(doc.lens_states.is_empty());
        let doc = sanitize(doc);
        assert_eq!(doc.lens_states.len(), Lens::ALL.len());
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = validate_value(&json!([1, 2])).unwrap_err();
        assert!(matches!(err.violations(), [Violation::MalformedDocument { .. }]));
    }

    // -------------------------------------------------------------------------
    // Sanitize & conflicts
    // -------------------------------------------------------------------------

    #[test]
    fn test_sanitize_drops_positions_of_missing_nodes() {
        let mut doc = doc_with_people(&["a"]);
        let state = doc.lens_state_mut(Lens::Hierarchy);
        state.layout.positions.insert("a".into(), Position::new(1.0, 2.0));
        state.layout.positions.insert("gone".into(), Position::new(3.0, 4.0));
        state.filters.hidden.insert("gone".into());

        let doc = sanitize(doc);
        let state = doc.lens_state(Lens::Hierarchy).unwrap();
        assert_eq!(state.layout.positions.len(), 1);
        assert!(state.filters.hidden.is_empty());
    }

    #[test]
    fn test_sanitize_drops_repeated_assignments() {
        let mut doc = doc_with_people(&["a"]);
        if let Some(p) = doc.person_mut("a") {
            p.brands = vec!["Acme".into(), "Zed".into(), "Acme".into()];
            p.departments = vec!["Sales".into(), "Sales".into()];
            p.tags = vec!["remote".into(), "remote".into(), "lead".into()];
        }

        let doc = sanitize(doc);
        let person = doc.person("a").unwrap();
        assert_eq!(person.brands, vec!["Acme", "Zed"]);
        assert_eq!(person.departments, vec!["Sales"]);
        assert_eq!(person.tags, vec!["remote", "lead"]);
    }

    #[test]
    fn test_primary_outside_assignments_is_conflict() {
        let mut doc = doc_with_people(&["a"]);
        let person = doc.person_mut("a").unwrap();
        person.brands = vec!["Acme".into()];
        person.primary_brand = Some("Globex".into());
        person.primary_department = None;

        let found = conflicts(&doc);
        assert_eq!(
            found,
            vec![Conflict::PrimaryNotAssigned {
                node_id: "a".into(),
                dimension: Dimension::Brand,
                value: "Globex".into(),
            }]
        );
        // advisory only
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn test_missing_group_member_is_conflict() {
        let mut doc = doc_with_people(&["a"]);
        let mut group = crate::document::model::GroupNode::new("g", "Team", 0);
        group.member_ids = vec!["a".into(), "b".into()];
        doc.nodes.push(GraphNode::Group(group));

        let found = conflicts(&doc);
        assert_eq!(found.len(), 1);
        assert!(matches!(&found[0], Conflict::MissingGroupMember { member_id, .. } if member_id == "b"));
    }
}
