//! Caller-supplied payloads for creating and patching nodes and edges
//!
//! Patches only touch the fields they carry. For optional text fields an
//! empty string clears the value.

use serde::{Deserialize, Serialize};

use crate::document::{EdgeMetadata, GroupNode, Lens, PersonNode, Position, RelationshipType, Tier};

fn clearable(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// =============================================================================
// People
// =============================================================================

/// Attributes of a new person
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonPayload {
    pub name: String,
    pub title: String,
    pub tier: Tier,
    pub departments: Vec<String>,
    pub brands: Vec<String>,
    pub channels: Vec<String>,
    pub primary_department: Option<String>,
    pub primary_brand: Option<String>,
    pub primary_channel: Option<String>,
    pub tags: Vec<String>,
    pub location: Option<String>,
    pub cost_center: Option<String>,
    pub notes: Option<String>,
    /// Initial position in the active lens
    pub position: Option<Position>,
}

impl PersonPayload {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub(crate) fn into_person(self, id: String, now: i64) -> PersonNode {
        let mut person = PersonNode::new(id, self.name, self.title, now);
        person.tier = self.tier;
        person.departments = self.departments;
        person.brands = self.brands;
        person.channels = self.channels;
        person.primary_department = self.primary_department;
        person.primary_brand = self.primary_brand;
        person.primary_channel = self.primary_channel;
        person.tags = self.tags;
        person.location = self.location;
        person.cost_center = self.cost_center;
        person.notes = self.notes;
        person
    }
}

/// Partial update of a person
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub tier: Option<Tier>,
    pub departments: Option<Vec<String>>,
    pub brands: Option<Vec<String>>,
    pub channels: Option<Vec<String>>,
    pub primary_department: Option<String>,
    pub primary_brand: Option<String>,
    pub primary_channel: Option<String>,
    pub tags: Option<Vec<String>>,
    pub location: Option<String>,
    pub cost_center: Option<String>,
    pub notes: Option<String>,
    pub locked: Option<bool>,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply(self, person: &mut PersonNode) {
        if let Some(name) = self.name {
            person.name = name;
        }
        if let Some(title) = self.title {
            person.title = title;
        }
        if let Some(tier) = self.tier {
            person.tier = tier;
        }
        if let Some(v) = self.departments {
            person.departments = v;
        }
        if let Some(v) = self.brands {
            person.brands = v;
        }
        if let Some(v) = self.channels {
            person.channels = v;
        }
        if let Some(v) = self.primary_department {
            person.primary_department = clearable(&v);
        }
        if let Some(v) = self.primary_brand {
            person.primary_brand = clearable(&v);
        }
        if let Some(v) = self.primary_channel {
            person.primary_channel = clearable(&v);
        }
        if let Some(v) = self.tags {
            person.tags = v;
        }
        if let Some(v) = self.location {
            person.location = clearable(&v);
        }
        if let Some(v) = self.cost_center {
            person.cost_center = clearable(&v);
        }
        if let Some(v) = self.notes {
            person.notes = clearable(&v);
        }
        if let Some(locked) = self.locked {
            person.locked = locked;
        }
    }
}

// =============================================================================
// Groups
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupPatch {
    pub label: Option<String>,
    pub color: Option<String>,
    pub collapsed: Option<bool>,
}

impl GroupPatch {
    pub(crate) fn apply(self, group: &mut GroupNode) {
        if let Some(label) = self.label {
            group.label = label;
        }
        if let Some(color) = self.color {
            group.color = color;
        }
        if let Some(collapsed) = self.collapsed {
            group.collapsed = collapsed;
        }
    }
}

// =============================================================================
// Edges
// =============================================================================

/// Partial update of an edge's metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgePatch {
    #[serde(rename = "type")]
    pub relationship: Option<RelationshipType>,
    pub weight: Option<f64>,
    pub label: Option<String>,
    pub lenses: Option<Vec<Lens>>,
    pub ghost: Option<bool>,
}

impl EdgePatch {
    pub(crate) fn apply(self, metadata: &mut EdgeMetadata) {
        if let Some(relationship) = self.relationship {
            metadata.relationship = relationship;
        }
        if let Some(weight) = self.weight {
            metadata.weight = Some(weight);
        }
        if let Some(label) = self.label {
            metadata.label = clearable(&label);
        }
        if let Some(lenses) = self.lenses {
            metadata.lenses = Some(lenses);
        }
        if let Some(ghost) = self.ghost {
            metadata.ghost = ghost;
        }
    }
}
