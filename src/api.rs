//! WASM API for the org chart engine
//!
//! `OrgChartCore` is the handle the canvas instantiates once. Structured
//! values cross the boundary through `serde-wasm-bindgen` as plain JS
//! objects; every `OrgError` surfaces as a JS `Error` carrying its message.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

use crate::analysis::{
    bridge_nodes, calculate_span_metrics, degree_centrality, find_shortest_path, find_top_paths, network_analysis,
    org_health, sphere_of_influence, suggest_connections,
};
use crate::config::EngineConfig;
use crate::dedupe::{find_duplicates, ExtractedPerson, ExtractionResult, MergeDecision, ReviewedRelationship};
use crate::document::{conflicts, validate_value, Lens, NodeId, Position, RelationshipType, Viewport};
use crate::engine::{EdgePatch, GroupPatch, OrgEngine, PersonPatch, PersonPayload};
use crate::layout::{compute_layout, LayoutMode};

// =============================================================================
// Conversion helpers
// =============================================================================

fn js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(js_error)
}

fn parse_lens(lens: &str) -> Result<Lens, JsValue> {
    Lens::parse(lens).ok_or_else(|| js_error(format!("unknown lens '{}'", lens)))
}

fn parse_mode(mode: &str) -> Result<LayoutMode, JsValue> {
    LayoutMode::parse(mode).ok_or_else(|| js_error(format!("unknown layout mode '{}'", mode)))
}

fn parse_relationship(kind: &str) -> Result<RelationshipType, JsValue> {
    RelationshipType::parse(kind).ok_or_else(|| js_error(format!("unknown relationship type '{}'", kind)))
}

// =============================================================================
// OrgChartCore WASM Handle
// =============================================================================

#[wasm_bindgen]
pub struct OrgChartCore {
    engine: OrgEngine,
}

#[wasm_bindgen]
impl OrgChartCore {
    /// Create an engine; `config` may be `undefined` for the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<OrgChartCore, JsValue> {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            from_js(config)?
        };
        Ok(Self {
            engine: OrgEngine::with_config(config),
        })
    }

    // -------------------------------------------------------------------------
    // Document
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = getDocument)]
    pub fn get_document(&self) -> Result<JsValue, JsValue> {
        to_js(self.engine.document())
    }

    #[wasm_bindgen(js_name = exportDocument)]
    pub fn export_document(&self) -> Result<String, JsValue> {
        self.engine.export_json().map_err(js_error)
    }

    /// Replace the live document; a rejected import leaves everything as is
    #[wasm_bindgen(js_name = importDocument)]
    pub fn import_document(&mut self, json: &str) -> Result<(), JsValue> {
        self.engine.import_json(json).map_err(js_error)
    }

    /// List every violation in a candidate document (empty when importable)
    #[wasm_bindgen(js_name = validateDocument)]
    pub fn validate_document(&self, json: &str) -> Result<JsValue, JsValue> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(js_error)?;
        let violations = match validate_value(&value) {
            Ok(_) => Vec::new(),
            Err(e) => e.violations().to_vec(),
        };
        to_js(&violations)
    }

    #[wasm_bindgen(js_name = getConflicts)]
    pub fn get_conflicts(&self) -> Result<JsValue, JsValue> {
        to_js(&conflicts(self.engine.document()))
    }

    // -------------------------------------------------------------------------
    // People and groups
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = addPerson)]
    pub fn add_person(&mut self, payload: JsValue) -> Result<String, JsValue> {
        let payload: PersonPayload = from_js(payload)?;
        Ok(self.engine.add_person(payload))
    }

    #[wasm_bindgen(js_name = updatePerson)]
    pub fn update_person(&mut self, id: &str, patch: JsValue, record_history: bool) -> Result<(), JsValue> {
        let patch: PersonPatch = from_js(patch)?;
        self.engine.update_person(id, patch, record_history).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setLocked)]
    pub fn set_locked(&mut self, id: &str, locked: bool) -> Result<(), JsValue> {
        self.engine.set_locked(id, locked).map_err(js_error)
    }

    #[wasm_bindgen(js_name = addGroup)]
    pub fn add_group(&mut self, label: &str, member_ids: JsValue, position: JsValue) -> Result<String, JsValue> {
        let members: Vec<NodeId> = from_js(member_ids)?;
        let position: Option<Position> = from_js(position)?;
        Ok(self.engine.add_group(label, &members, position))
    }

    #[wasm_bindgen(js_name = updateGroup)]
    pub fn update_group(&mut self, id: &str, patch: JsValue) -> Result<(), JsValue> {
        let patch: GroupPatch = from_js(patch)?;
        self.engine.update_group(id, patch).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setGroupMembers)]
    pub fn set_group_members(&mut self, id: &str, member_ids: JsValue) -> Result<(), JsValue> {
        let members: Vec<NodeId> = from_js(member_ids)?;
        self.engine.set_group_members(id, &members).map_err(js_error)
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.engine.remove_node(id)
    }

    #[wasm_bindgen(js_name = removeNodes)]
    pub fn remove_nodes(&mut self, ids: JsValue) -> Result<usize, JsValue> {
        let ids: Vec<NodeId> = from_js(ids)?;
        Ok(self.engine.remove_nodes(&ids))
    }

    #[wasm_bindgen(js_name = duplicateNodes)]
    pub fn duplicate_nodes(&mut self, ids: JsValue) -> Result<JsValue, JsValue> {
        let ids: Vec<NodeId> = from_js(ids)?;
        to_js(&self.engine.duplicate_nodes(&ids))
    }

    // -------------------------------------------------------------------------
    // Relationships
    // -------------------------------------------------------------------------

    /// Returns the new edge id, or `undefined` for a silently ignored edge
    #[wasm_bindgen(js_name = addRelationship)]
    pub fn add_relationship(&mut self, source_id: &str, target_id: &str, kind: &str) -> Result<Option<String>, JsValue> {
        let relationship = parse_relationship(kind)?;
        self.engine
            .add_relationship(source_id, target_id, relationship)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = wouldCreateCycle)]
    pub fn would_create_cycle(&self, source_id: &str, target_id: &str) -> bool {
        self.engine.would_create_cycle(source_id, target_id)
    }

    #[wasm_bindgen(js_name = removeRelationship)]
    pub fn remove_relationship(&mut self, id: &str) -> bool {
        self.engine.remove_relationship(id)
    }

    #[wasm_bindgen(js_name = updateRelationship)]
    pub fn update_relationship(&mut self, id: &str, patch: JsValue) -> Result<(), JsValue> {
        let patch: EdgePatch = from_js(patch)?;
        self.engine.update_relationship(id, patch).map_err(js_error)
    }

    // -------------------------------------------------------------------------
    // Layout and view state
    // -------------------------------------------------------------------------

    /// `positions`: `{ [nodeId]: { x, y } }`
    #[wasm_bindgen(js_name = moveNodes)]
    pub fn move_nodes(&mut self, positions: JsValue) -> Result<usize, JsValue> {
        let positions: BTreeMap<NodeId, Position> = from_js(positions)?;
        Ok(self.engine.move_nodes(&positions))
    }

    /// Run a layout (`hierarchical`, `compact`, `spacious`) and persist it
    #[wasm_bindgen(js_name = applyLayout)]
    pub fn apply_layout(&mut self, mode: &str) -> Result<JsValue, JsValue> {
        let mode = parse_mode(mode)?;
        to_js(&self.engine.apply_layout(mode))
    }

    /// Preview a layout without touching the document
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(&self, mode: &str) -> Result<JsValue, JsValue> {
        let mode = parse_mode(mode)?;
        to_js(&compute_layout(self.engine.document(), mode, &self.engine.config().layout))
    }

    #[wasm_bindgen(js_name = setActiveLens)]
    pub fn set_active_lens(&mut self, lens: &str) -> Result<(), JsValue> {
        self.engine.set_active_lens(parse_lens(lens)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = activeLens)]
    pub fn active_lens(&self) -> String {
        self.engine.active_lens().as_str().to_string()
    }

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) {
        self.engine.set_viewport(Viewport { x, y, zoom });
    }

    #[wasm_bindgen(js_name = setGrid)]
    pub fn set_grid(&mut self, snap_to_grid: bool, show_grid: bool) {
        self.engine.set_grid(snap_to_grid, show_grid);
    }

    #[wasm_bindgen(js_name = setHighlights)]
    pub fn set_highlights(&mut self, tokens: JsValue) -> Result<(), JsValue> {
        self.engine.set_highlights(from_js(tokens)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = setFocus)]
    pub fn set_focus(&mut self, ids: JsValue) -> Result<(), JsValue> {
        let ids: Vec<NodeId> = from_js(ids)?;
        self.engine.set_focus(&ids);
        Ok(())
    }

    #[wasm_bindgen(js_name = setHidden)]
    pub fn set_hidden(&mut self, ids: JsValue) -> Result<(), JsValue> {
        let ids: Vec<NodeId> = from_js(ids)?;
        self.engine.set_hidden(&ids);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Selection and history
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> Result<JsValue, JsValue> {
        to_js(self.engine.selection())
    }

    pub fn select(&mut self, ids: JsValue) -> Result<(), JsValue> {
        let ids: Vec<NodeId> = from_js(ids)?;
        self.engine.select(&ids);
        Ok(())
    }

    #[wasm_bindgen(js_name = toggleSelection)]
    pub fn toggle_selection(&mut self, id: &str) {
        self.engine.toggle_selection(id);
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.engine.clear_selection();
    }

    pub fn undo(&mut self) -> bool {
        self.engine.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.engine.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.engine.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.engine.can_redo()
    }

    pub fn checkpoint(&mut self) {
        self.engine.checkpoint();
    }

    // -------------------------------------------------------------------------
    // Analysis
    // -------------------------------------------------------------------------

    /// Shortest path or `null`
    #[wasm_bindgen(js_name = findShortestPath)]
    pub fn find_shortest_path(&self, from: &str, to: &str) -> Result<JsValue, JsValue> {
        to_js(&find_shortest_path(self.engine.document(), from, to))
    }

    /// Simple paths up to `maxDepth` hops (config default when omitted)
    #[wasm_bindgen(js_name = findAllPaths)]
    pub fn find_all_paths(&self, from: &str, to: &str, max_depth: Option<usize>) -> Result<JsValue, JsValue> {
        let analysis = &self.engine.config().analysis;
        let depth = max_depth.unwrap_or(analysis.max_path_depth);
        to_js(&find_top_paths(self.engine.document(), from, to, depth, analysis.max_paths))
    }

    #[wasm_bindgen(js_name = sphereOfInfluence)]
    pub fn sphere_of_influence(&self, id: &str, depth: Option<usize>) -> Result<JsValue, JsValue> {
        let depth = depth.unwrap_or(self.engine.config().analysis.sphere_depth);
        to_js(&sphere_of_influence(self.engine.document(), id, depth))
    }

    #[wasm_bindgen(js_name = networkAnalysis)]
    pub fn network_analysis(&self, id: &str) -> Result<JsValue, JsValue> {
        let depth = self.engine.config().analysis.sphere_depth;
        to_js(&network_analysis(self.engine.document(), id, depth))
    }

    #[wasm_bindgen(js_name = degreeCentrality)]
    pub fn degree_centrality(&self, id: &str) -> f64 {
        degree_centrality(self.engine.document(), id)
    }

    #[wasm_bindgen(js_name = bridgeNodes)]
    pub fn bridge_nodes(&self) -> Result<JsValue, JsValue> {
        to_js(&bridge_nodes(self.engine.document()))
    }

    #[wasm_bindgen(js_name = spanMetrics)]
    pub fn span_metrics(&self, id: &str) -> Result<JsValue, JsValue> {
        to_js(&calculate_span_metrics(self.engine.document(), id, &self.engine.config().span))
    }

    #[wasm_bindgen(js_name = orgHealth)]
    pub fn org_health(&self) -> Result<JsValue, JsValue> {
        to_js(&org_health(self.engine.document(), &self.engine.config().span))
    }

    #[wasm_bindgen(js_name = suggestConnections)]
    pub fn suggest_connections(&self, id: &str) -> Result<JsValue, JsValue> {
        let limit = self.engine.config().analysis.max_suggestions;
        to_js(&suggest_connections(self.engine.document(), id, limit))
    }

    // -------------------------------------------------------------------------
    // Scenarios
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = createScenario)]
    pub fn create_scenario(&mut self, name: &str, description: Option<String>, copy_from_current: bool) -> String {
        self.engine.create_scenario(name, description, copy_from_current)
    }

    #[wasm_bindgen(js_name = switchScenario)]
    pub fn switch_scenario(&mut self, id: &str) -> Result<(), JsValue> {
        self.engine.switch_scenario(id).map_err(js_error)
    }

    #[wasm_bindgen(js_name = deleteScenario)]
    pub fn delete_scenario(&mut self, id: &str) -> Result<(), JsValue> {
        self.engine.delete_scenario(id).map_err(js_error)
    }

    #[wasm_bindgen(js_name = renameScenario)]
    pub fn rename_scenario(&mut self, id: &str, name: &str) -> Result<(), JsValue> {
        self.engine.rename_scenario(id, name).map_err(js_error)
    }

    #[wasm_bindgen(js_name = listScenarios)]
    pub fn list_scenarios(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.list_scenarios())
    }

    #[wasm_bindgen(js_name = activeScenarioId)]
    pub fn active_scenario_id(&self) -> Option<String> {
        self.engine.active_scenario_id().map(str::to_string)
    }

    #[wasm_bindgen(js_name = scenarioDiff)]
    pub fn scenario_diff(&self, base_id: &str, target_id: &str) -> Result<JsValue, JsValue> {
        let diff = self.engine.scenario_diff(base_id, target_id).map_err(js_error)?;
        to_js(&diff)
    }

    // -------------------------------------------------------------------------
    // AI import
    // -------------------------------------------------------------------------

    /// Review an extraction payload and suggest merge decisions
    #[wasm_bindgen(js_name = planImport)]
    pub fn plan_import(&self, extraction: JsValue) -> Result<JsValue, JsValue> {
        let extraction: ExtractionResult = from_js(extraction)?;
        to_js(&self.engine.plan_import(&extraction))
    }

    #[wasm_bindgen(js_name = applyMergeDecisions)]
    pub fn apply_merge_decisions(&mut self, decisions: JsValue, relationships: JsValue) -> Result<JsValue, JsValue> {
        let decisions: Vec<MergeDecision> = from_js(decisions)?;
        let relationships: Vec<ReviewedRelationship> = from_js(relationships)?;
        to_js(&self.engine.apply_merge_decisions(&decisions, &relationships))
    }

    #[wasm_bindgen(js_name = findDuplicates)]
    pub fn find_duplicates(&self, candidate: JsValue) -> Result<JsValue, JsValue> {
        let candidate: ExtractedPerson = from_js(candidate)?;
        let matches = find_duplicates(&candidate, &self.engine.document().nodes, &self.engine.config().duplicates);
        to_js(&matches)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = exportState)]
    pub fn export_state(&self) -> Result<String, JsValue> {
        self.engine.export_state().map_err(js_error)
    }

    /// Restore persisted state; returns the load warnings
    #[wasm_bindgen(js_name = loadState)]
    pub fn load_state(&mut self, json: &str) -> Result<JsValue, JsValue> {
        let warnings = self.engine.load_state(json);
        to_js(&warnings)
    }
}
