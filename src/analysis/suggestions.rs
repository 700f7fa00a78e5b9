//! Connection suggestions for a focus person

use serde::Serialize;
use std::cmp::Ordering;

use super::hierarchy::build_parent_map;
use crate::document::{Dimension, GraphDocument, NodeId, PersonNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionReason {
    /// Team member under the same manager
    SameManager,
    /// Shares both a brand and a channel
    SharedBrandAndChannel,
    /// Shares both a department and a brand
    SharedDepartmentAndBrand,
}

impl SuggestionReason {
    pub fn score(&self) -> f64 {
        match self {
            SuggestionReason::SharedBrandAndChannel => 0.9,
            SuggestionReason::SameManager => 0.8,
            SuggestionReason::SharedDepartmentAndBrand => 0.7,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            SuggestionReason::SameManager => "Team member under same manager",
            SuggestionReason::SharedBrandAndChannel => "Works on the same brand and channel",
            SuggestionReason::SharedDepartmentAndBrand => "Same department and brand",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSuggestion {
    pub node_id: NodeId,
    pub score: f64,
    pub reason: SuggestionReason,
    pub description: String,
}

/// Up to `limit` people worth connecting to `focus_id`, best first
///
/// Candidates already joined to the focus node by any edge are excluded.
/// Each candidate keeps its strongest reason; ties break by node id.
pub fn suggest_connections(doc: &GraphDocument, focus_id: &str, limit: usize) -> Vec<ConnectionSuggestion> {
    let Some(focus) = doc.person(focus_id) else {
        return vec![];
    };

    let parents = build_parent_map(doc);
    let focus_managers = parents.get(focus_id).cloned().unwrap_or_default();

    let mut suggestions: Vec<ConnectionSuggestion> = doc
        .people()
        .filter(|candidate| candidate.id != focus_id && !doc.are_connected(focus_id, &candidate.id))
        .filter_map(|candidate| {
            let shares_manager = parents
                .get(candidate.id.as_str())
                .is_some_and(|managers| managers.iter().any(|m| focus_managers.contains(m)));
            best_reason(focus, candidate, shares_manager).map(|reason| ConnectionSuggestion {
                node_id: candidate.id.clone(),
                score: reason.score(),
                reason,
                description: reason.describe().to_string(),
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    suggestions.truncate(limit);
    suggestions
}

fn best_reason(focus: &PersonNode, candidate: &PersonNode, shares_manager: bool) -> Option<SuggestionReason> {
    let brand = focus.shares(candidate, Dimension::Brand);
    let channel = focus.shares(candidate, Dimension::Channel);
    let department = focus.shares(candidate, Dimension::Department);

    let mut reasons = Vec::with_capacity(3);
    if shares_manager {
        reasons.push(SuggestionReason::SameManager);
    }
    if brand && channel {
        reasons.push(SuggestionReason::SharedBrandAndChannel);
    }
    if department && brand {
        reasons.push(SuggestionReason::SharedDepartmentAndBrand);
    }

    reasons
        .into_iter()
        .max_by(|a, b| a.score().partial_cmp(&b.score()).unwrap_or(Ordering::Equal))
}
