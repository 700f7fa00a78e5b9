//! Scenario branching on the live engine
//!
//! The active scenario's stored document goes stale while the user edits;
//! the live document is written back on every switch and is what diffs see.

use tracing::info;

use super::OrgEngine;
use crate::document::{create_empty_document, now_millis, GraphDocument};
use crate::error::{OrgError, Result};
use crate::scenario::{compute_scenario_diff, ScenarioDiff, ScenarioStore, ScenarioSummary};

impl OrgEngine {
    pub fn scenarios(&self) -> &ScenarioStore {
        &self.scenarios
    }

    pub fn active_scenario_id(&self) -> Option<&str> {
        self.scenarios.active_id()
    }

    /// Snapshot the live document (or start empty) under a new scenario
    ///
    /// A scenario created while none is active becomes active and therefore
    /// always adopts the live document. Returns the new scenario id.
    pub fn create_scenario(&mut self, name: &str, description: Option<String>, copy_from_current: bool) -> String {
        let activates = self.scenarios.active_id().is_none();
        let (document, parent_id) = if activates || copy_from_current {
            (self.document.clone(), self.scenarios.active_id().map(str::to_string))
        } else {
            (create_empty_document(), None)
        };

        let id = self
            .scenarios
            .create(name, description, parent_id, document, now_millis())
            .id
            .clone();
        info!(id = %id, name = %name, active = activates, "Created scenario");
        id
    }

    /// Replace the live document with a scenario's copy
    ///
    /// The outgoing live document is stored back into the previously active
    /// scenario. Selection and undo/redo history are reset.
    pub fn switch_scenario(&mut self, id: &str) -> Result<()> {
        let target = self
            .scenarios
            .get(id)
            .map(|s| s.document.clone())
            .ok_or_else(|| OrgError::ScenarioNotFound(id.to_string()))?;

        if let Some(active) = self.scenarios.active_id().map(str::to_string) {
            if active == id {
                return Ok(());
            }
            self.scenarios.store_document(&active, self.document.clone())?;
        }
        self.scenarios.set_active(id)?;

        self.document = target;
        self.selection.clear();
        self.history.clear();
        info!(id = %id, nodes = self.document.nodes.len(), "Switched scenario");
        Ok(())
    }

    /// Delete a scenario; the live document is left as is
    pub fn delete_scenario(&mut self, id: &str) -> Result<()> {
        let removed = self.scenarios.remove(id)?;
        info!(id = %id, name = %removed.name, "Deleted scenario");
        Ok(())
    }

    pub fn rename_scenario(&mut self, id: &str, name: &str) -> Result<()> {
        self.scenarios.rename(id, name)
    }

    /// Scenario summaries in creation order
    pub fn list_scenarios(&self) -> Vec<ScenarioSummary> {
        self.scenarios.summaries()
    }

    /// Structural diff between two scenarios; the active one resolves to the
    /// live document
    pub fn scenario_diff(&self, base_id: &str, target_id: &str) -> Result<ScenarioDiff> {
        let base = self.scenario_document(base_id)?;
        let target = self.scenario_document(target_id)?;
        Ok(compute_scenario_diff(base, target))
    }

    fn scenario_document(&self, id: &str) -> Result<&GraphDocument> {
        if self.scenarios.active_id() == Some(id) {
            return Ok(&self.document);
        }
        self.scenarios
            .get(id)
            .map(|s| &s.document)
            .ok_or_else(|| OrgError::ScenarioNotFound(id.to_string()))
    }

    /// Reassemble an engine from persisted parts; history starts empty
    pub(crate) fn restore(&mut self, document: GraphDocument, selection: Vec<String>, scenarios: ScenarioStore) {
        self.document = document;
        self.scenarios = scenarios;
        self.history.clear();
        self.select(&selection);
    }
}
