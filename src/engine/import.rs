//! Applying an AI-import batch to the live document
//!
//! `plan_import` runs review, matching and strategy suggestion without
//! touching the document. The caller may override any decision before
//! handing the batch to `apply_merge_decisions`.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use super::OrgEngine;
use crate::dedupe::{
    normalize, review_extraction, suggest_merge_strategies, ExtractedPerson, ExtractionResult, ExtractionReview,
    MergeDecision, MergeStrategy, ReviewedRelationship,
};
use crate::document::{new_id, GraphEdge, GraphNode, NodeId, PersonNode, RelationshipType};

/// Review output plus one suggested decision per reviewed person
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPlan {
    pub review: ExtractionReview,
    pub decisions: Vec<MergeDecision>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub created: Vec<NodeId>,
    pub updated: Vec<NodeId>,
    pub skipped: usize,
    pub relationships_added: usize,
    /// Unresolved endpoints, self loops and edges that already exist
    pub relationships_skipped: usize,
    /// Manager edges refused because they would close a reporting loop
    pub cycles_prevented: usize,
}

impl ImportSummary {
    fn changed(&self) -> bool {
        !self.created.is_empty() || !self.updated.is_empty() || self.relationships_added > 0
    }
}

fn union_into(target: &mut Vec<String>, incoming: &[String]) {
    for value in incoming {
        if !target.iter().any(|existing| normalize(existing) == normalize(value)) {
            target.push(value.clone());
        }
    }
}

fn person_from(candidate: &ExtractedPerson, id: NodeId, now: i64) -> PersonNode {
    let mut person = PersonNode::new(id, candidate.name.trim(), candidate.title.trim(), now);
    person.departments = candidate.departments.clone();
    person.brands = candidate.brands.clone();
    person.channels = candidate.channels.clone();
    person.location = candidate.location.clone().filter(|l| !l.trim().is_empty());
    person
}

fn merge_into(person: &mut PersonNode, candidate: &ExtractedPerson, now: i64) {
    if !candidate.title.trim().is_empty() {
        person.title = candidate.title.trim().to_string();
    }
    if let Some(location) = candidate.location.as_deref().filter(|l| !l.trim().is_empty()) {
        person.location = Some(location.to_string());
    }
    union_into(&mut person.departments, &candidate.departments);
    union_into(&mut person.brands, &candidate.brands);
    union_into(&mut person.channels, &candidate.channels);
    person.updated_at = now;
}

impl OrgEngine {
    /// Review an extraction batch and suggest a merge strategy per person
    pub fn plan_import(&self, result: &ExtractionResult) -> ImportPlan {
        let review = review_extraction(result, &self.config.duplicates);
        let decisions = suggest_merge_strategies(&review.people, &self.document.nodes, &self.config.duplicates);
        debug!(
            people = review.people.len(),
            warnings = review.warnings.len(),
            "Planned import"
        );
        ImportPlan { review, decisions }
    }

    /// Apply merge decisions and extracted relationships as one undo step
    ///
    /// Relationship endpoints are names; they resolve first to the people
    /// this batch created or matched, then to existing people by name.
    /// Relationships flagged for review are added as ghost edges.
    pub fn apply_merge_decisions(
        &mut self,
        decisions: &[MergeDecision],
        relationships: &[ReviewedRelationship],
    ) -> ImportSummary {
        let before = self.document.clone();
        let now = self.touch();
        let mut summary = ImportSummary::default();
        let mut resolved: HashMap<String, NodeId> = HashMap::new();

        for decision in decisions {
            let key = normalize(&decision.candidate.name);
            if key.is_empty() {
                summary.skipped += 1;
                continue;
            }
            let matched = decision
                .matched_id
                .as_deref()
                .filter(|id| self.document.person(id).is_some())
                .map(str::to_string);

            match (decision.strategy, matched) {
                (MergeStrategy::Skip, Some(id)) => {
                    summary.skipped += 1;
                    resolved.insert(key, id);
                }
                (MergeStrategy::Skip, None) => summary.skipped += 1,
                (MergeStrategy::Update, Some(id)) => {
                    if let Some(person) = self.document.person_mut(&id) {
                        merge_into(person, &decision.candidate, now);
                    }
                    summary.updated.push(id.clone());
                    resolved.insert(key, id);
                }
                (MergeStrategy::Update, None) | (MergeStrategy::CreateNew, _) => {
                    let id = new_id("person");
                    let person = person_from(&decision.candidate, id.clone(), now);
                    self.document.nodes.push(GraphNode::Person(person));
                    summary.created.push(id.clone());
                    resolved.insert(key, id);
                }
            }
        }

        for rel in relationships {
            let source = self.resolve_name(&resolved, &rel.from);
            let target = self.resolve_name(&resolved, &rel.to);
            let (Some(source), Some(target)) = (source, target) else {
                summary.relationships_skipped += 1;
                continue;
            };
            let exists = self.document.edges.iter().any(|e| {
                e.source == source && e.target == target && e.relationship() == rel.relationship
            });
            if source == target || exists {
                summary.relationships_skipped += 1;
                continue;
            }
            if rel.relationship == RelationshipType::Manager && self.would_create_cycle(&source, &target) {
                summary.cycles_prevented += 1;
                continue;
            }
            let mut edge = GraphEdge::new(new_id("edge"), source, target, rel.relationship);
            edge.metadata.ghost = rel.needs_review;
            self.document.edges.push(edge);
            summary.relationships_added += 1;
        }

        if summary.changed() {
            self.history.record(before);
            self.selection = summary.created.clone();
        } else {
            self.document = before;
        }

        info!(
            created = summary.created.len(),
            updated = summary.updated.len(),
            skipped = summary.skipped,
            relationships = summary.relationships_added,
            cycles_prevented = summary.cycles_prevented,
            "Applied import"
        );
        summary
    }

    fn resolve_name(&self, resolved: &HashMap<String, NodeId>, name: &str) -> Option<NodeId> {
        let key = normalize(name);
        if let Some(id) = resolved.get(&key) {
            return Some(id.clone());
        }
        self.document
            .people()
            .find(|p| normalize(&p.name) == key)
            .map(|p| p.id.clone())
    }
}
