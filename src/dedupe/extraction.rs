//! AI extraction contract and the review pass run before matching
//!
//! Review never fails: malformed or low-confidence records are dropped or
//! flagged and reported as `ExtractionWarning`s.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

use super::normalize;
use crate::config::DuplicateConfig;
use crate::document::RelationshipType;

// =============================================================================
// Collaborator payload
// =============================================================================

fn full_confidence() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPerson {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports_to: Option<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

impl ExtractedPerson {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            reports_to: None,
            brands: Vec::new(),
            channels: Vec::new(),
            departments: Vec::new(),
            location: None,
            confidence: 1.0,
        }
    }
}

/// Relationship kind as written by the extraction model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractedKind {
    #[serde(alias = "reports-to", alias = "reports_to", alias = "manages")]
    Manager,
    Sponsor,
    #[serde(alias = "dotted-line", alias = "dotted_line", alias = "advisory")]
    Dotted,
    Group,
    #[serde(other)]
    Unknown,
}

impl ExtractedKind {
    pub fn relationship(&self) -> Option<RelationshipType> {
        match self {
            ExtractedKind::Manager => Some(RelationshipType::Manager),
            ExtractedKind::Sponsor => Some(RelationshipType::Sponsor),
            ExtractedKind::Dotted => Some(RelationshipType::Dotted),
            ExtractedKind::Group => Some(RelationshipType::Group),
            ExtractedKind::Unknown => None,
        }
    }
}

/// `from → to`: for manager relationships, `from` manages `to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRelationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: ExtractedKind,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub source: String,
    pub extracted_at: String,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResult {
    pub people: Vec<ExtractedPerson>,
    pub relationships: Vec<ExtractedRelationship>,
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// Review
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractionWarning {
    #[error("person #{index} has no name and was dropped")]
    EmptyName { index: usize },

    #[error("'{name}' appears {count} times in the extraction")]
    DuplicateName { name: String, count: usize },

    #[error("'{name}' extracted with low confidence ({confidence:.2})")]
    LowConfidencePerson { name: String, confidence: f64 },

    #[error("relationship {from} → {to} references an unknown person and was dropped")]
    DanglingRelationship { from: String, to: String },

    #[error("relationship {from} → {to} has an unknown type and was dropped")]
    UnknownRelationshipType { from: String, to: String },

    #[error("relationship {from} → {to} extracted with low confidence ({confidence:.2})")]
    LowConfidenceRelationship { from: String, to: String, confidence: f64 },

    #[error("'{name}' reports to unknown person '{reports_to}'")]
    UnknownManager { name: String, reports_to: String },
}

/// A relationship that survived review, resolved to a concrete type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedRelationship {
    pub from: String,
    pub to: String,
    pub relationship: RelationshipType,
    pub confidence: f64,
    pub needs_review: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReview {
    /// Named people, in extraction order
    pub people: Vec<ExtractedPerson>,
    /// Names of people below the confidence threshold
    pub flagged_people: Vec<String>,
    pub relationships: Vec<ReviewedRelationship>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Apply the import obligations to raw extraction output
///
/// - people without a name are dropped
/// - duplicate names are warned about, never rejected
/// - people and relationships below `low_confidence` are flagged
/// - relationships whose endpoints match no extracted name, or whose type is
///   unknown, are dropped with a warning
/// - `reportsTo` becomes a manager relationship unless one already exists
pub fn review_extraction(result: &ExtractionResult, config: &DuplicateConfig) -> ExtractionReview {
    let mut review = ExtractionReview::default();

    for (index, person) in result.people.iter().enumerate() {
        if person.name.trim().is_empty() {
            review.warnings.push(ExtractionWarning::EmptyName { index });
            continue;
        }
        if person.confidence < config.low_confidence {
            review.flagged_people.push(person.name.clone());
            review.warnings.push(ExtractionWarning::LowConfidencePerson {
                name: person.name.clone(),
                confidence: person.confidence,
            });
        }
        review.people.push(person.clone());
    }

    let mut counts: HashMap<String, (usize, &str)> = HashMap::new();
    for person in &review.people {
        counts.entry(normalize(&person.name)).or_insert((0, person.name.as_str())).0 += 1;
    }
    let mut duplicates: Vec<ExtractionWarning> = counts
        .values()
        .filter(|(count, _)| *count > 1)
        .map(|(count, name)| ExtractionWarning::DuplicateName {
            name: name.to_string(),
            count: *count,
        })
        .collect();
    duplicates.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    review.warnings.extend(duplicates);

    let known: HashSet<String> = counts.into_keys().collect();
    let mut seen_pairs: HashSet<(String, String, RelationshipType)> = HashSet::new();

    for rel in &result.relationships {
        if !known.contains(&normalize(&rel.from)) || !known.contains(&normalize(&rel.to)) {
            warn!(from = %rel.from, to = %rel.to, "Dropping extracted relationship with unknown endpoint");
            review.warnings.push(ExtractionWarning::DanglingRelationship {
                from: rel.from.clone(),
                to: rel.to.clone(),
            });
            continue;
        }
        let Some(relationship) = rel.kind.relationship() else {
            warn!(from = %rel.from, to = %rel.to, "Dropping extracted relationship with unknown type");
            review.warnings.push(ExtractionWarning::UnknownRelationshipType {
                from: rel.from.clone(),
                to: rel.to.clone(),
            });
            continue;
        };
        let needs_review = rel.confidence < config.low_confidence;
        if needs_review {
            review.warnings.push(ExtractionWarning::LowConfidenceRelationship {
                from: rel.from.clone(),
                to: rel.to.clone(),
                confidence: rel.confidence,
            });
        }
        seen_pairs.insert((normalize(&rel.from), normalize(&rel.to), relationship));
        review.relationships.push(ReviewedRelationship {
            from: rel.from.clone(),
            to: rel.to.clone(),
            relationship,
            confidence: rel.confidence,
            needs_review,
        });
    }

    for person in &review.people {
        let Some(manager) = person.reports_to.as_deref().filter(|m| !m.trim().is_empty()) else {
            continue;
        };
        if !known.contains(&normalize(manager)) {
            review.warnings.push(ExtractionWarning::UnknownManager {
                name: person.name.clone(),
                reports_to: manager.to_string(),
            });
            continue;
        }
        let key = (normalize(manager), normalize(&person.name), RelationshipType::Manager);
        if seen_pairs.insert(key) {
            review.relationships.push(ReviewedRelationship {
                from: manager.to_string(),
                to: person.name.clone(),
                relationship: RelationshipType::Manager,
                confidence: person.confidence,
                needs_review: person.confidence < config.low_confidence,
            });
        }
    }

    debug!(
        people = review.people.len(),
        relationships = review.relationships.len(),
        warnings = review.warnings.len(),
        "Reviewed extraction"
    );
    review
}
