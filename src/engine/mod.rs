//! Mutation & History Engine
//!
//! `OrgEngine` owns the live document, the selection, the undo/redo history
//! and the scenario store. It is the only writer: analysis and layout read
//! `engine.document()` and never mutate it.
//!
//! Every mutating call pushes the pre-mutation document onto the undo stack
//! (clearing redo) unless it changed nothing. View-state setters (viewport,
//! active lens, filters) and history-suppressed person updates do not.

mod import;
mod payload;
mod scenarios;

pub use import::{ImportPlan, ImportSummary};
pub use payload::{EdgePatch, GroupPatch, PersonPatch, PersonPayload};

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::analysis::hierarchy;
use crate::config::EngineConfig;
use crate::document::{
    create_empty_document, export_document, import_document, new_id, now_millis, EdgeId, GraphDocument,
    GraphEdge, GraphNode, GroupNode, Lens, NodeId, Position, RelationshipType, Viewport,
};
use crate::error::{OrgError, Result};
use crate::history::History;
use crate::layout::{compute_layout, LayoutMode, PositionMap};
use crate::scenario::ScenarioStore;

// =============================================================================
// OrgEngine
// =============================================================================

/// Single owner of the live org chart
pub struct OrgEngine {
    document: GraphDocument,
    /// Selected node ids, in selection order
    selection: Vec<NodeId>,
    history: History<GraphDocument>,
    config: EngineConfig,
    scenarios: ScenarioStore,
}

impl Default for OrgEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OrgEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::from_document(create_empty_document(), config)
    }

    /// Engine over an already validated document
    pub fn from_document(document: GraphDocument, config: EngineConfig) -> Self {
        Self {
            document,
            selection: Vec::new(),
            history: History::new(config.history_capacity),
            config,
            scenarios: ScenarioStore::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn document(&self) -> &GraphDocument {
        &self.document
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn active_lens(&self) -> Lens {
        self.document.active_lens
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_len()
    }

    /// Would a manager edge `source → target` close a reporting loop?
    pub fn would_create_cycle(&self, source_id: &str, target_id: &str) -> bool {
        hierarchy::would_create_cycle(&self.document, source_id, target_id)
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    fn record(&mut self) {
        self.history.record(self.document.clone());
    }

    /// Stamp the document as modified and return the timestamp used
    fn touch(&mut self) -> i64 {
        let now = now_millis();
        self.document.touch(now);
        now
    }

    /// Push the current document as an undo step
    ///
    /// Pairs with `update_person(.., false)`: live edits accumulate without
    /// history and the caller checkpoints once editing starts or ends.
    pub fn checkpoint(&mut self) {
        self.record();
        debug!(depth = self.history.undo_len(), "Checkpoint recorded");
    }

    pub fn undo(&mut self) -> bool {
        let current = self.document.clone();
        match self.history.undo(current) {
            Some(previous) => {
                self.document = previous;
                self.prune_selection();
                debug!("Undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.document.clone();
        match self.history.redo(current) {
            Some(next) => {
                self.document = next;
                self.prune_selection();
                debug!("Redo");
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // People and groups
    // -------------------------------------------------------------------------

    /// Create a person, optionally positioned in the active lens, and select it
    pub fn add_person(&mut self, payload: PersonPayload) -> NodeId {
        self.record();
        let now = self.touch();

        let id = new_id("person");
        let position = payload.position.filter(Position::is_finite);
        let person = payload.into_person(id.clone(), now);
        self.document.nodes.push(GraphNode::Person(person));
        if let Some(position) = position {
            self.place(&id, position, now);
        }

        self.selection = vec![id.clone()];
        debug!(id = %id, "Added person");
        id
    }

    /// Merge attribute fields into a person
    ///
    /// With `record_history == false` no undo step is pushed (keystroke
    /// editing); see `checkpoint`. A patch that changes nothing is a no-op.
    pub fn update_person(&mut self, id: &str, patch: PersonPatch, record_history: bool) -> Result<()> {
        let mut updated = match self.document.node(id) {
            None => return Err(OrgError::NodeNotFound(id.to_string())),
            Some(GraphNode::Group(_)) => return Err(OrgError::NotAPerson(id.to_string())),
            Some(GraphNode::Person(person)) => person.clone(),
        };
        patch.apply(&mut updated);
        if self.document.person(id) == Some(&updated) {
            return Ok(());
        }

        if record_history {
            self.record();
        }
        let now = self.touch();
        if let Some(person) = self.document.person_mut(id) {
            updated.updated_at = now;
            *person = updated;
        }
        debug!(id = %id, record_history, "Updated person");
        Ok(())
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> Result<()> {
        self.update_person(
            id,
            PersonPatch {
                locked: Some(locked),
                ..PersonPatch::default()
            },
            true,
        )
    }

    /// Create a group over existing nodes; unknown member ids are ignored
    pub fn add_group(&mut self, label: &str, member_ids: &[NodeId], position: Option<Position>) -> NodeId {
        self.record();
        let now = self.touch();

        let id = new_id("group");
        let mut group = GroupNode::new(id.clone(), label, now);
        group.member_ids = self.existing_unique(member_ids);
        self.document.nodes.push(GraphNode::Group(group));
        if let Some(position) = position.filter(Position::is_finite) {
            self.place(&id, position, now);
        }

        self.selection = vec![id.clone()];
        debug!(id = %id, "Added group");
        id
    }

    pub fn update_group(&mut self, id: &str, patch: GroupPatch) -> Result<()> {
        self.require_group(id)?;
        self.record();
        let now = self.touch();
        if let Some(group) = self.document.node_mut(id).and_then(GraphNode::as_group_mut) {
            patch.apply(group);
            group.updated_at = now;
        }
        debug!(id = %id, "Updated group");
        Ok(())
    }

    pub fn set_group_members(&mut self, id: &str, member_ids: &[NodeId]) -> Result<()> {
        self.require_group(id)?;
        let members: Vec<NodeId> = self
            .existing_unique(member_ids)
            .into_iter()
            .filter(|member| member != id)
            .collect();
        self.record();
        let now = self.touch();
        if let Some(group) = self.document.node_mut(id).and_then(GraphNode::as_group_mut) {
            group.member_ids = members;
            group.updated_at = now;
        }
        debug!(id = %id, "Set group members");
        Ok(())
    }

    fn require_group(&self, id: &str) -> Result<()> {
        match self.document.node(id) {
            None => Err(OrgError::NodeNotFound(id.to_string())),
            Some(GraphNode::Person(_)) => Err(OrgError::NotAGroup(id.to_string())),
            Some(GraphNode::Group(_)) => Ok(()),
        }
    }

    /// Remove a node, every incident edge and its per-lens state
    ///
    /// Groups listing the node keep the (now dangling) member id; see
    /// `document::conflicts`.
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.remove_nodes(&[id.to_string()]) > 0
    }

    /// Batch delete with a single undo step; returns the number removed
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> usize {
        let doomed: HashSet<NodeId> = self.existing_unique(ids).into_iter().collect();
        if doomed.is_empty() {
            return 0;
        }
        self.record();
        self.touch();

        self.document.nodes.retain(|n| !doomed.contains(n.id()));
        self.document
            .edges
            .retain(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target));
        for state in self.document.lens_states.values_mut() {
            for id in &doomed {
                state.forget_node(id);
            }
        }
        self.selection.retain(|s| !doomed.contains(s));

        debug!(count = doomed.len(), "Removed nodes");
        doomed.len()
    }

    /// Deep-copy nodes with fresh ids, offset positions and the edges among them
    ///
    /// Returns the new ids (which become the selection).
    pub fn duplicate_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let originals = self.existing_unique(ids);
        if originals.is_empty() {
            return vec![];
        }
        self.record();
        let now = self.touch();
        let offset = self.config.layout.duplicate_offset;

        let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(originals.len());
        for old_id in &originals {
            let Some(mut copy) = self.document.node(old_id).cloned() else {
                continue;
            };
            let copy_id = match &mut copy {
                GraphNode::Person(p) => {
                    p.name = format!("{} (copy)", p.name);
                    new_id("person")
                }
                GraphNode::Group(g) => {
                    g.label = format!("{} (copy)", g.label);
                    new_id("group")
                }
            };
            copy.set_id(copy_id.clone());
            copy.stamp(now);
            self.document.nodes.push(copy);
            remap.insert(old_id.clone(), copy_id);
        }

        for group in self.document.nodes.iter_mut().filter_map(GraphNode::as_group_mut) {
            if remap.values().any(|id| *id == group.id) {
                for member in group.member_ids.iter_mut() {
                    if let Some(copied) = remap.get(member) {
                        *member = copied.clone();
                    }
                }
            }
        }

        for state in self.document.lens_states.values_mut() {
            for (old_id, copied) in &remap {
                if let Some(pos) = state.layout.positions.get(old_id).copied() {
                    state
                        .layout
                        .positions
                        .insert(copied.clone(), Position::new(pos.x + offset, pos.y + offset));
                }
            }
        }

        let copied_edges: Vec<GraphEdge> = self
            .document
            .edges
            .iter()
            .filter_map(|edge| {
                let source = remap.get(&edge.source)?;
                let target = remap.get(&edge.target)?;
                Some(GraphEdge {
                    id: new_id("edge"),
                    source: source.clone(),
                    target: target.clone(),
                    metadata: edge.metadata.clone(),
                })
            })
            .collect();
        self.document.edges.extend(copied_edges);

        let new_ids: Vec<NodeId> = originals.iter().filter_map(|id| remap.get(id).cloned()).collect();
        self.selection = new_ids.clone();
        debug!(count = new_ids.len(), "Duplicated nodes");
        new_ids
    }

    // -------------------------------------------------------------------------
    // Relationships
    // -------------------------------------------------------------------------

    /// Add an edge `source → target`
    ///
    /// Self loops and unknown endpoints are silent no-ops (`Ok(None)`). A
    /// manager edge that would close a reporting loop is refused with
    /// `OrgError::CycleRisk` and leaves the document untouched.
    pub fn add_relationship(
        &mut self,
        source_id: &str,
        target_id: &str,
        relationship: RelationshipType,
    ) -> Result<Option<EdgeId>> {
        if source_id == target_id
            || !self.document.contains_node(source_id)
            || !self.document.contains_node(target_id)
        {
            return Ok(None);
        }
        if relationship == RelationshipType::Manager && self.would_create_cycle(source_id, target_id) {
            return Err(OrgError::CycleRisk {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
            });
        }

        self.record();
        self.touch();
        let id = new_id("edge");
        self.document
            .edges
            .push(GraphEdge::new(id.clone(), source_id, target_id, relationship));
        debug!(id = %id, source = %source_id, target = %target_id, kind = relationship.as_str(), "Added relationship");
        Ok(Some(id))
    }

    pub fn remove_relationship(&mut self, id: &str) -> bool {
        if self.document.edge(id).is_none() {
            return false;
        }
        self.record();
        self.touch();
        self.document.edges.retain(|e| e.id != id);
        debug!(id = %id, "Removed relationship");
        true
    }

    /// Patch edge metadata; turning an edge into a manager edge is cycle-checked
    pub fn update_relationship(&mut self, id: &str, patch: EdgePatch) -> Result<()> {
        let edge = self
            .document
            .edge(id)
            .ok_or_else(|| OrgError::EdgeNotFound(id.to_string()))?;
        if patch.relationship == Some(RelationshipType::Manager)
            && !edge.is_manager()
            && self.would_create_cycle(&edge.source, &edge.target)
        {
            return Err(OrgError::CycleRisk {
                source_id: edge.source.clone(),
                target_id: edge.target.clone(),
            });
        }

        self.record();
        self.touch();
        if let Some(edge) = self.document.edge_mut(id) {
            patch.apply(&mut edge.metadata);
        }
        debug!(id = %id, "Updated relationship");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Positions and layout
    // -------------------------------------------------------------------------

    fn place(&mut self, id: &str, position: Position, now: i64) {
        let lens = self.document.active_lens;
        let layout = &mut self.document.lens_state_mut(lens).layout;
        layout.positions.insert(id.to_string(), position);
        layout.last_updated = now;
    }

    /// Drag end: store positions in the active lens (one undo step)
    ///
    /// Unknown ids, locked nodes and non-finite coordinates are ignored.
    pub fn move_nodes(&mut self, positions: &BTreeMap<NodeId, Position>) -> usize {
        let moves: Vec<(NodeId, Position)> = positions
            .iter()
            .filter(|(id, pos)| {
                pos.is_finite() && self.document.node(id).is_some_and(|node| !node.is_locked())
            })
            .map(|(id, pos)| (id.clone(), *pos))
            .collect();
        if moves.is_empty() {
            return 0;
        }
        self.record();
        let now = self.touch();
        for (id, pos) in &moves {
            self.place(id, *pos, now);
        }
        debug!(count = moves.len(), "Moved nodes");
        moves.len()
    }

    /// Compute a layout and persist it into the active lens (one undo step)
    ///
    /// Locked nodes keep the position they already have.
    pub fn apply_layout(&mut self, mode: LayoutMode) -> PositionMap {
        let computed = compute_layout(&self.document, mode, &self.config.layout);
        self.record();
        let now = self.touch();

        let lens = self.document.active_lens;
        let locked: HashSet<NodeId> = self
            .document
            .nodes
            .iter()
            .filter(|n| n.is_locked())
            .map(|n| n.id().to_string())
            .collect();

        let layout = &mut self.document.lens_state_mut(lens).layout;
        for (id, pos) in computed {
            if locked.contains(&id) && layout.positions.contains_key(&id) {
                continue;
            }
            layout.positions.insert(id, pos);
        }
        layout.last_updated = now;

        debug!(lens = lens.as_str(), mode = ?mode, "Applied layout");
        layout.positions.clone()
    }

    // -------------------------------------------------------------------------
    // View state (no history)
    // -------------------------------------------------------------------------

    pub fn set_active_lens(&mut self, lens: Lens) {
        self.document.active_lens = lens;
        self.document.lens_state_mut(lens);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if !(viewport.x.is_finite() && viewport.y.is_finite() && viewport.zoom.is_finite() && viewport.zoom > 0.0) {
            return;
        }
        let lens = self.document.active_lens;
        self.document.lens_state_mut(lens).layout.viewport = viewport;
    }

    pub fn set_grid(&mut self, snap_to_grid: bool, show_grid: bool) {
        let lens = self.document.active_lens;
        let layout = &mut self.document.lens_state_mut(lens).layout;
        layout.snap_to_grid = snap_to_grid;
        layout.show_grid = show_grid;
    }

    pub fn set_highlights(&mut self, tokens: Vec<String>) {
        let lens = self.document.active_lens;
        self.document.lens_state_mut(lens).filters.highlights = tokens;
    }

    pub fn set_focus(&mut self, ids: &[NodeId]) {
        let lens = self.document.active_lens;
        let focus = self.existing_unique(ids).into_iter().collect();
        self.document.lens_state_mut(lens).filters.focus = focus;
    }

    pub fn set_hidden(&mut self, ids: &[NodeId]) {
        let lens = self.document.active_lens;
        let hidden = self.existing_unique(ids).into_iter().collect();
        self.document.lens_state_mut(lens).filters.hidden = hidden;
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Replace the selection (unknown ids are dropped)
    pub fn select(&mut self, ids: &[NodeId]) {
        self.selection = self.existing_unique(ids);
    }

    pub fn toggle_selection(&mut self, id: &str) {
        if let Some(index) = self.selection.iter().position(|s| s == id) {
            self.selection.remove(index);
        } else if self.document.contains_node(id) {
            self.selection.push(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn prune_selection(&mut self) {
        let document = &self.document;
        self.selection.retain(|id| document.contains_node(id));
    }

    /// `ids` that exist in the document, first occurrence only
    fn existing_unique(&self, ids: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| self.document.contains_node(id) && seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Whole-document replacement
    // -------------------------------------------------------------------------

    /// Replace the live document with an imported one (one undo step)
    pub fn replace_document(&mut self, document: GraphDocument) {
        self.record();
        self.document = document;
        self.prune_selection();
        debug!(nodes = self.document.nodes.len(), "Replaced document");
    }

    /// Parse, validate and adopt a JSON document; rejected imports change nothing
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let document = import_document(json)?;
        self.replace_document(document);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String> {
        export_document(&self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_chain() -> (OrgEngine, NodeId, NodeId, NodeId) {
        let mut engine = OrgEngine::new();
        let a = engine.add_person(PersonPayload::new("Ada", "CEO"));
        let b = engine.add_person(PersonPayload::new("Bob", "CTO"));
        let c = engine.add_person(PersonPayload::new("Cy", "Engineer"));
        engine.add_relationship(&a, &b, RelationshipType::Manager).unwrap();
        engine.add_relationship(&b, &c, RelationshipType::Manager).unwrap();
        (engine, a, b, c)
    }

    // -------------------------------------------------------------------------
    // People
    // -------------------------------------------------------------------------

    #[test]
    fn test_add_person_selects_and_positions() {
        let mut engine = OrgEngine::new();
        let mut payload = PersonPayload::new("Ada", "CEO");
        payload.position = Some(Position::new(10.0, 20.0));
        let id = engine.add_person(payload);

        assert!(id.starts_with("person-"));
        assert_eq!(engine.selection(), &[id.clone()]);
        assert_eq!(engine.document().position(Lens::Hierarchy, &id), Some(Position::new(10.0, 20.0)));
        assert_eq!(engine.document().position(Lens::Brand, &id), None);
        assert!(engine.can_undo());
    }

    #[test]
    fn test_update_person_with_and_without_history() {
        let mut engine = OrgEngine::new();
        let id = engine.add_person(PersonPayload::new("Ada", "CEO"));
        let depth = engine.undo_depth();

        let patch = PersonPatch {
            title: Some("Chair".into()),
            ..PersonPatch::default()
        };
        engine.update_person(&id, patch.clone(), false).unwrap();
        assert_eq!(engine.undo_depth(), depth);
        assert_eq!(engine.document().person(&id).unwrap().title, "Chair");

        let patch = PersonPatch {
            title: Some("Founder".into()),
            ..PersonPatch::default()
        };
        engine.update_person(&id, patch, true).unwrap();
        assert_eq!(engine.undo_depth(), depth + 1);
    }

    #[test]
    fn test_update_person_without_change_is_noop() {
        let mut engine = OrgEngine::new();
        let id = engine.add_person(PersonPayload::new("Ada", "CEO"));
        let before = engine.document().clone();
        let depth = engine.undo_depth();

        engine.update_person(&id, PersonPatch::default(), true).unwrap();
        let same_title = PersonPatch {
            title: Some("CEO".into()),
            ..PersonPatch::default()
        };
        engine.update_person(&id, same_title, true).unwrap();
        engine.set_locked(&id, false).unwrap();

        assert_eq!(engine.undo_depth(), depth);
        assert_eq!(engine.document(), &before);
    }

    #[test]
    fn test_update_unknown_or_group() {
        let mut engine = OrgEngine::new();
        let group = engine.add_group("Team", &[], None);
        assert!(matches!(
            engine.update_person("ghost", PersonPatch::default(), true),
            Err(OrgError::NodeNotFound(_))
        ));
        assert!(matches!(
            engine.update_person(&group, PersonPatch::default(), true),
            Err(OrgError::NotAPerson(_))
        ));
    }

    #[test]
    fn test_remove_node_cascades() {
        let (mut engine, a, b, c) = engine_with_chain();
        engine.move_nodes(&BTreeMap::from([(b.clone(), Position::new(1.0, 1.0))]));
        engine.select(&[a.clone(), b.clone()]);

        assert!(engine.remove_node(&b));
        let doc = engine.document();
        assert!(!doc.contains_node(&b));
        assert!(doc.edges.is_empty(), "both incident edges removed");
        assert_eq!(doc.position(Lens::Hierarchy, &b), None);
        assert_eq!(engine.selection(), &[a.clone()]);
        assert!(doc.contains_node(&c));

        assert!(!engine.remove_node(&b));
    }

    #[test]
    fn test_remove_member_keeps_group() {
        let mut engine = OrgEngine::new();
        let p = engine.add_person(PersonPayload::new("Ada", "CEO"));
        let g = engine.add_group("Leads", &[p.clone()], None);
        engine.remove_node(&p);
        let group = engine.document().node(&g).and_then(GraphNode::as_group).unwrap();
        assert_eq!(group.member_ids, vec![p]);
    }

    // -------------------------------------------------------------------------
    // Relationships
    // -------------------------------------------------------------------------

    #[test]
    fn test_self_loop_and_missing_endpoint_are_no_ops() {
        let (mut engine, a, _, _) = engine_with_chain();
        let depth = engine.undo_depth();
        assert_eq!(engine.add_relationship(&a, &a, RelationshipType::Dotted).unwrap(), None);
        assert_eq!(engine.add_relationship(&a, "ghost", RelationshipType::Dotted).unwrap(), None);
        assert_eq!(engine.undo_depth(), depth);
    }

    #[test]
    fn test_manager_cycle_refused() {
        let (mut engine, a, _, c) = engine_with_chain();
        let before = engine.document().clone();

        assert!(engine.would_create_cycle(&c, &a));
        let err = engine.add_relationship(&c, &a, RelationshipType::Manager).unwrap_err();
        assert!(matches!(err, OrgError::CycleRisk { .. }));
        assert_eq!(engine.document(), &before);

        // non-manager edges may point upward
        assert!(engine.add_relationship(&c, &a, RelationshipType::Dotted).unwrap().is_some());
    }

    #[test]
    fn test_update_relationship_into_manager_checks_cycle() {
        let (mut engine, a, _, c) = engine_with_chain();
        let edge = engine.add_relationship(&c, &a, RelationshipType::Sponsor).unwrap().unwrap();
        let patch = EdgePatch {
            relationship: Some(RelationshipType::Manager),
            ..EdgePatch::default()
        };
        assert!(matches!(
            engine.update_relationship(&edge, patch),
            Err(OrgError::CycleRisk { .. })
        ));

        let patch = EdgePatch {
            label: Some("exec sponsor".into()),
            ..EdgePatch::default()
        };
        engine.update_relationship(&edge, patch).unwrap();
        assert_eq!(engine.document().edge(&edge).unwrap().metadata.label.as_deref(), Some("exec sponsor"));
        assert!(matches!(
            engine.update_relationship("nope", EdgePatch::default()),
            Err(OrgError::EdgeNotFound(_))
        ));
    }

    #[test]
    fn test_remove_relationship() {
        let (mut engine, _, _, _) = engine_with_chain();
        let id = engine.document().edges[0].id.clone();
        assert!(engine.remove_relationship(&id));
        assert!(!engine.remove_relationship(&id));
        assert_eq!(engine.document().edges.len(), 1);
    }

    // -------------------------------------------------------------------------
    // Duplicate
    // -------------------------------------------------------------------------

    #[test]
    fn test_duplicate_nodes_copies_internal_edges() {
        let (mut engine, a, b, c) = engine_with_chain();
        engine.move_nodes(&BTreeMap::from([(a.clone(), Position::new(100.0, 100.0))]));

        let copies = engine.duplicate_nodes(&[a.clone(), b.clone()]);
        assert_eq!(copies.len(), 2);
        assert_eq!(engine.selection(), copies.as_slice());

        let doc = engine.document();
        assert_eq!(doc.nodes.len(), 5);
        assert_eq!(doc.person(&copies[0]).unwrap().name, "Ada (copy)");
        assert_eq!(doc.position(Lens::Hierarchy, &copies[0]), Some(Position::new(140.0, 140.0)));

        // a→b copied, b→c not (c outside the set)
        assert_eq!(doc.edges.len(), 3);
        let copied = doc.edges.last().unwrap();
        assert_eq!(copied.source, copies[0]);
        assert_eq!(copied.target, copies[1]);
        assert!(doc.contains_node(&c));
    }

    // -------------------------------------------------------------------------
    // Undo / redo
    // -------------------------------------------------------------------------

    #[test]
    fn test_undo_redo_exact() {
        let (mut engine, a, _, _) = engine_with_chain();
        let before = engine.document().clone();
        engine.remove_node(&a);
        let after = engine.document().clone();

        assert!(engine.undo());
        assert_eq!(engine.document(), &before);
        assert!(engine.redo());
        assert_eq!(engine.document(), &after);
        assert!(!engine.redo());
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut engine = OrgEngine::new();
        let id = engine.add_person(PersonPayload::new("Ada", "CEO"));
        assert_eq!(engine.selection().len(), 1);
        engine.undo();
        assert!(engine.selection().is_empty());
        assert!(!engine.document().contains_node(&id));
    }

    #[test]
    fn test_history_capacity_respected() {
        let config = EngineConfig {
            history_capacity: 3,
            ..EngineConfig::default()
        };
        let mut engine = OrgEngine::with_config(config);
        for i in 0..5 {
            engine.add_person(PersonPayload::new(format!("P{}", i), ""));
        }
        assert_eq!(engine.undo_depth(), 3);
        while engine.undo() {}
        assert_eq!(engine.document().nodes.len(), 2);
    }

    #[test]
    fn test_checkpoint_wraps_live_edits() {
        let mut engine = OrgEngine::new();
        let id = engine.add_person(PersonPayload::new("Ada", "CEO"));
        engine.checkpoint();
        for title in ["C", "Ch", "Cha", "Chair"] {
            let patch = PersonPatch {
                title: Some(title.into()),
                ..PersonPatch::default()
            };
            engine.update_person(&id, patch, false).unwrap();
        }
        engine.undo();
        assert_eq!(engine.document().person(&id).unwrap().title, "CEO");
    }

    // -------------------------------------------------------------------------
    // Layout and view state
    // -------------------------------------------------------------------------

    #[test]
    fn test_apply_layout_keeps_locked_positions() {
        let (mut engine, a, b, _) = engine_with_chain();
        engine.move_nodes(&BTreeMap::from([(a.clone(), Position::new(-999.0, -999.0))]));
        engine.set_locked(&a, true).unwrap();

        let positions = engine.apply_layout(LayoutMode::Hierarchical);
        assert_eq!(positions[&a], Position::new(-999.0, -999.0));
        assert_eq!(positions.len(), 3);
        assert!(engine.document().position(Lens::Hierarchy, &b).is_some());
        assert_eq!(engine.document().position(Lens::Brand, &b), None);
    }

    #[test]
    fn test_locked_nodes_ignore_moves() {
        let (mut engine, a, _, _) = engine_with_chain();
        engine.set_locked(&a, true).unwrap();
        let moved = engine.move_nodes(&BTreeMap::from([(a.clone(), Position::new(5.0, 5.0))]));
        assert_eq!(moved, 0);
    }

    #[test]
    fn test_view_state_has_no_history() {
        let (mut engine, a, _, _) = engine_with_chain();
        let depth = engine.undo_depth();
        engine.set_active_lens(Lens::Brand);
        engine.set_viewport(Viewport { x: 1.0, y: 2.0, zoom: 1.5 });
        engine.set_focus(&[a.clone(), "ghost".into()]);
        engine.set_highlights(vec!["Acme".into()]);
        assert_eq!(engine.undo_depth(), depth);

        let state = engine.document().lens_state(Lens::Brand).unwrap();
        assert_eq!(state.layout.viewport.zoom, 1.5);
        assert_eq!(state.filters.focus.len(), 1);
        assert_eq!(engine.document().lens_state(Lens::Hierarchy).unwrap().layout.viewport.zoom, 1.0);
    }

    #[test]
    fn test_lens_positions_are_independent() {
        let (mut engine, a, _, _) = engine_with_chain();
        engine.move_nodes(&BTreeMap::from([(a.clone(), Position::new(1.0, 1.0))]));
        engine.set_active_lens(Lens::Brand);
        engine.move_nodes(&BTreeMap::from([(a.clone(), Position::new(9.0, 9.0))]));
        assert_eq!(engine.document().position(Lens::Hierarchy, &a), Some(Position::new(1.0, 1.0)));
        assert_eq!(engine.document().position(Lens::Brand, &a), Some(Position::new(9.0, 9.0)));
    }

    #[test]
    fn test_toggle_selection() {
        let (mut engine, a, b, _) = engine_with_chain();
        engine.clear_selection();
        engine.toggle_selection(&a);
        engine.toggle_selection(&b);
        engine.toggle_selection(&a);
        engine.toggle_selection("ghost");
        assert_eq!(engine.selection(), &[b]);
    }

    #[test]
    fn test_rejected_import_changes_nothing() {
        let (mut engine, _, _, _) = engine_with_chain();
        let before = engine.document().clone();
        let depth = engine.undo_depth();
        assert!(engine.import_json(r#"{"schemaVersion": "9.9.9"}"#).is_err());
        assert_eq!(engine.document(), &before);
        assert_eq!(engine.undo_depth(), depth);
    }

    #[test]
    fn test_export_import_round_trip() {
        let (engine, _, _, _) = engine_with_chain();
        let json = engine.export_json().unwrap();
        let mut other = OrgEngine::new();
        other.import_json(&json).unwrap();
        assert_eq!(other.document(), engine.document());
    }
}
