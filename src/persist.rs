//! Persisted state and load-time migration
//!
//! The persisted unit is the live document, the selection, every scenario
//! and the active scenario id. Loading never trusts the stored JSON: each
//! document goes back through validation and sanitizing. A rejected live
//! document is replaced by an empty one, and a rejected scenario is dropped.
//! Everything that was discarded is reported as a `LoadWarning`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::document::{create_empty_document, import_value, GraphDocument, NodeId};
use crate::engine::OrgEngine;
use crate::error::Result;
use crate::scenario::{Scenario, ScenarioStore};

/// Serialized engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub document: GraphDocument,
    #[serde(default)]
    pub selection: Vec<NodeId>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_scenario_id: Option<String>,
}

/// Loosely typed mirror of `PersistedState`; documents stay raw until validated
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StoredState {
    document: Option<Value>,
    selection: Vec<NodeId>,
    scenarios: Vec<StoredScenario>,
    active_scenario_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredScenario {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    parent_id: Option<String>,
    document: Value,
}

/// Something discarded while loading persisted state
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LoadWarning {
    #[error("persisted state unreadable, starting empty: {reason}")]
    UnreadableState { reason: String },

    #[error("live document rejected, replaced with an empty document: {reason}")]
    DocumentReplaced { reason: String },

    #[error("scenario '{id}' dropped: {reason}")]
    ScenarioDropped { id: String, reason: String },

    #[error("{count} selected id(s) no longer exist")]
    SelectionPruned { count: usize },
}

/// Result of migrating persisted state
#[derive(Debug, Clone)]
pub struct LoadedState {
    pub document: GraphDocument,
    pub selection: Vec<NodeId>,
    pub scenarios: ScenarioStore,
    pub warnings: Vec<LoadWarning>,
}

// =============================================================================
// Export
// =============================================================================

/// Snapshot an engine into its persisted form
pub fn persisted_state(engine: &OrgEngine) -> PersistedState {
    PersistedState {
        document: engine.document().clone(),
        selection: engine.selection().to_vec(),
        scenarios: engine.scenarios().scenarios().to_vec(),
        active_scenario_id: engine.active_scenario_id().map(str::to_string),
    }
}

pub fn export_state(engine: &OrgEngine) -> Result<String> {
    Ok(serde_json::to_string(&persisted_state(engine))?)
}

// =============================================================================
// Load
// =============================================================================

/// Parse and migrate persisted state; never fails
pub fn load_state(json: &str) -> LoadedState {
    let mut warnings = Vec::new();
    let stored: StoredState = match serde_json::from_str(json) {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "Persisted state unreadable");
            warnings.push(LoadWarning::UnreadableState { reason: e.to_string() });
            StoredState::default()
        }
    };

    let document = match stored.document.as_ref().map(import_value) {
        Some(Ok(doc)) => doc,
        Some(Err(e)) => {
            warn!(error = %e, "Persisted document rejected");
            warnings.push(LoadWarning::DocumentReplaced { reason: e.to_string() });
            create_empty_document()
        }
        None => create_empty_document(),
    };

    let mut scenarios = Vec::with_capacity(stored.scenarios.len());
    for raw in stored.scenarios {
        match import_value(&raw.document) {
            Ok(doc) => scenarios.push(Scenario {
                id: raw.id,
                name: raw.name,
                description: raw.description,
                created_at: raw.created_at,
                parent_id: raw.parent_id,
                document: doc,
            }),
            Err(e) => {
                warn!(id = %raw.id, error = %e, "Persisted scenario dropped");
                warnings.push(LoadWarning::ScenarioDropped {
                    id: raw.id,
                    reason: e.to_string(),
                });
            }
        }
    }
    let scenarios = ScenarioStore::from_parts(scenarios, stored.active_scenario_id);

    let total = stored.selection.len();
    let selection: Vec<NodeId> = stored
        .selection
        .into_iter()
        .filter(|id| document.contains_node(id))
        .collect();
    if selection.len() < total {
        warnings.push(LoadWarning::SelectionPruned {
            count: total - selection.len(),
        });
    }

    info!(
        nodes = document.nodes.len(),
        scenarios = scenarios.len(),
        warnings = warnings.len(),
        "Loaded persisted state"
    );
    LoadedState {
        document,
        selection,
        scenarios,
        warnings,
    }
}

impl OrgEngine {
    /// Replace the whole engine state with migrated persisted state
    pub fn load_state(&mut self, json: &str) -> Vec<LoadWarning> {
        let loaded = load_state(json);
        self.restore(loaded.document, loaded.selection, loaded.scenarios);
        loaded.warnings
    }

    pub fn export_state(&self) -> Result<String> {
        export_state(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RelationshipType;
    use crate::engine::PersonPayload;
    use serde_json::json;

    fn populated() -> OrgEngine {
        let mut engine = OrgEngine::new();
        let a = engine.add_person(PersonPayload::new("Ada", "CEO"));
        let b = engine.add_person(PersonPayload::new("Bob", "CTO"));
        engine.add_relationship(&a, &b, RelationshipType::Manager).unwrap();
        engine.create_scenario("Baseline", None, true);
        engine.create_scenario("Blank", None, false);
        engine.select(&[a]);
        engine
    }

    #[test]
    fn test_state_round_trip() {
        let engine = populated();
        let json = engine.export_state().unwrap();

        let mut restored = OrgEngine::new();
        let warnings = restored.load_state(&json);
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(restored.document(), engine.document());
        assert_eq!(restored.selection(), engine.selection());
        assert_eq!(restored.list_scenarios(), engine.list_scenarios());
        assert!(!restored.can_undo());
    }

    #[test]
    fn test_garbage_falls_back_to_empty() {
        let loaded = load_state("not json at all");
        assert!(loaded.document.nodes.is_empty());
        assert!(matches!(loaded.warnings[0], LoadWarning::UnreadableState { .. }));
    }

    #[test]
    fn test_invalid_document_replaced() {
        let state = json!({
            "document": { "schemaVersion": "0.1.0", "metadata": { "name": "old" } },
            "selection": ["ghost"],
        });
        let loaded = load_state(&state.to_string());
        assert!(loaded.document.nodes.is_empty());
        assert!(loaded.selection.is_empty());
        assert!(matches!(loaded.warnings[0], LoadWarning::DocumentReplaced { .. }));
        assert!(matches!(loaded.warnings[1], LoadWarning::SelectionPruned { count: 1 }));
    }

    #[test]
    fn test_invalid_scenario_dropped() {
        let engine = populated();
        let mut state: Value = serde_json::from_str(&engine.export_state().unwrap()).unwrap();
        let active = engine.active_scenario_id().unwrap().to_string();
        state["scenarios"][0]["document"]["edges"][0]["target"] = json!("x");

        let loaded = load_state(&state.to_string());
        assert_eq!(loaded.scenarios.len(), 1);
        assert!(loaded.scenarios.active_id().is_none(), "active scenario was the dropped one");
        match &loaded.warnings[0] {
            LoadWarning::ScenarioDropped { id, .. } => assert_eq!(id, &active),
            other => panic!("unexpected warning {:?}", other),
        }
    }
}
