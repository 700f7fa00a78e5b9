//! Merge strategy suggestion for an import batch

use serde::{Deserialize, Serialize};

use super::extraction::ExtractedPerson;
use super::matching::{find_duplicates, DuplicateMatch};
use super::normalize;
use crate::config::DuplicateConfig;
use crate::document::{GraphNode, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    CreateNew,
    Update,
    Skip,
}

/// Why a suggested decision needs a human look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MergeConflict {
    /// MergeAmbiguity: match in the review band, never auto-resolved
    UncertainMatch { score: f64 },
    TitleDiffers { existing: String, incoming: String },
    LocationDiffers { existing: Option<String>, incoming: String },
}

/// Suggested (and caller-overridable) handling of one extracted person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeDecision {
    pub candidate: ExtractedPerson,
    pub strategy: MergeStrategy,
    /// Existing node the candidate resolves to (update/skip)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub conflicts: Vec<MergeConflict>,
}

impl MergeDecision {
    pub fn create_new(candidate: ExtractedPerson) -> Self {
        Self {
            candidate,
            strategy: MergeStrategy::CreateNew,
            matched_id: None,
            score: None,
            conflicts: Vec::new(),
        }
    }

    pub fn needs_review(&self) -> bool {
        self.conflicts
            .iter()
            .any(|c| matches!(c, MergeConflict::UncertainMatch { .. }))
    }
}

/// One decision per candidate, in candidate order
///
/// | best score       | strategy                                   |
/// |------------------|--------------------------------------------|
/// | no match         | create-new                                 |
/// | > skip           | skip, or update when title/location differ |
/// | (review, skip]   | update, flagged as uncertain               |
/// | <= review        | create-new                                 |
pub fn suggest_merge_strategies(
    candidates: &[ExtractedPerson],
    existing: &[GraphNode],
    config: &DuplicateConfig,
) -> Vec<MergeDecision> {
    candidates
        .iter()
        .map(|candidate| {
            let best = find_duplicates(candidate, existing, config).into_iter().next();
            decide(candidate, best, existing, config)
        })
        .collect()
}

fn decide(
    candidate: &ExtractedPerson,
    best: Option<DuplicateMatch>,
    existing: &[GraphNode],
    config: &DuplicateConfig,
) -> MergeDecision {
    let Some(best) = best else {
        return MergeDecision::create_new(candidate.clone());
    };
    if best.score <= config.review_threshold {
        return MergeDecision::create_new(candidate.clone());
    }

    let mut conflicts = field_conflicts(candidate, existing, &best.existing_id);
    let strategy = if best.score > config.skip_threshold {
        if conflicts.is_empty() {
            MergeStrategy::Skip
        } else {
            MergeStrategy::Update
        }
    } else {
        conflicts.insert(0, MergeConflict::UncertainMatch { score: best.score });
        MergeStrategy::Update
    };

    MergeDecision {
        candidate: candidate.clone(),
        strategy,
        matched_id: Some(best.existing_id),
        score: Some(best.score),
        conflicts,
    }
}

fn field_conflicts(candidate: &ExtractedPerson, existing: &[GraphNode], id: &str) -> Vec<MergeConflict> {
    let Some(person) = existing.iter().filter_map(GraphNode::as_person).find(|p| p.id == id) else {
        return vec![];
    };

    let mut conflicts = Vec::new();
    if !candidate.title.trim().is_empty() && normalize(&candidate.title) != normalize(&person.title) {
        conflicts.push(MergeConflict::TitleDiffers {
            existing: person.title.clone(),
            incoming: candidate.title.clone(),
        });
    }
    if let Some(incoming) = candidate.location.as_deref().filter(|l| !l.trim().is_empty()) {
        let same = person.location.as_deref().is_some_and(|l| normalize(l) == normalize(incoming));
        if !same {
            conflicts.push(MergeConflict::LocationDiffers {
                existing: person.location.clone(),
                incoming: incoming.to_string(),
            });
        }
    }
    conflicts
}
