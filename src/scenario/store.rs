//! Named, independently owned document snapshots

use serde::{Deserialize, Serialize};

use crate::document::{new_id, GraphDocument};
use crate::error::{OrgError, Result};

/// A named what-if copy of the whole document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub document: GraphDocument,
}

/// Listing entry without the document payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub parent_id: Option<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub is_active: bool,
}

/// Scenarios in creation order plus the active scenario id
#[derive(Debug, Clone, Default)]
pub struct ScenarioStore {
    scenarios: Vec<Scenario>,
    active_id: Option<String>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts; an unknown active id is dropped
    pub fn from_parts(scenarios: Vec<Scenario>, active_id: Option<String>) -> Self {
        let active_id = active_id.filter(|id| scenarios.iter().any(|s| &s.id == id));
        Self { scenarios, active_id }
    }

    /// Store a new scenario; it becomes active when no scenario is
    pub fn create(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        parent_id: Option<String>,
        document: GraphDocument,
        now: i64,
    ) -> &Scenario {
        let scenario = Scenario {
            id: new_id("scenario"),
            name: name.into(),
            description,
            created_at: now,
            parent_id,
            document,
        };
        if self.active_id.is_none() {
            self.active_id = Some(scenario.id.clone());
        }
        self.scenarios.push(scenario);
        &self.scenarios[self.scenarios.len() - 1]
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Scenario> {
        self.scenarios
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| OrgError::ScenarioNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn set_active(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(OrgError::ScenarioNotFound(id.to_string()));
        }
        self.active_id = Some(id.to_string());
        Ok(())
    }

    /// Overwrite the stored document of `id`
    pub fn store_document(&mut self, id: &str, document: GraphDocument) -> Result<()> {
        self.get_mut(id)?.document = document;
        Ok(())
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    /// Remove a scenario; removing the active one leaves no scenario active
    pub fn remove(&mut self, id: &str) -> Result<Scenario> {
        let index = self
            .scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| OrgError::ScenarioNotFound(id.to_string()))?;
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
        Ok(self.scenarios.remove(index))
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn summaries(&self) -> Vec<ScenarioSummary> {
        self.scenarios
            .iter()
            .map(|s| ScenarioSummary {
                id: s.id.clone(),
                name: s.name.clone(),
                description: s.description.clone(),
                created_at: s.created_at,
                parent_id: s.parent_id.clone(),
                node_count: s.document.nodes.len(),
                edge_count: s.document.edges.len(),
                is_active: self.active_id.as_deref() == Some(s.id.as_str()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
