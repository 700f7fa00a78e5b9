//! Layout Engine - node coordinates per lens
//!
//! Both algorithms are pure functions of the document's nodes and manager
//! edges. Callers persist the returned map into a lens' `LayoutState`.

pub mod cleanup;
pub mod hierarchical;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{LayoutConfig, Separation};
use crate::document::{GraphDocument, NodeId, Position};

pub use cleanup::cleanup_layout;
pub use hierarchical::{assign_ranks, hierarchical_layout};

/// node id → top-left position
pub type PositionMap = BTreeMap<NodeId, Position>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Plain hierarchical layout with base separations
    Hierarchical,
    /// Cleanup with tight spacing; overlap possible
    Compact,
    /// Cleanup with wide spacing; never overlaps
    Spacious,
}

impl LayoutMode {
    pub fn separation(&self, config: &LayoutConfig) -> Separation {
        match self {
            LayoutMode::Hierarchical => config.base,
            LayoutMode::Compact => config.compact,
            LayoutMode::Spacious => config.spacious,
        }
    }

    pub fn parse(s: &str) -> Option<LayoutMode> {
        match s {
            "hierarchical" => Some(LayoutMode::Hierarchical),
            "compact" => Some(LayoutMode::Compact),
            "spacious" => Some(LayoutMode::Spacious),
            _ => None,
        }
    }
}

/// Run the layout for `mode`
pub fn compute_layout(doc: &GraphDocument, mode: LayoutMode, config: &LayoutConfig) -> PositionMap {
    match mode {
        LayoutMode::Hierarchical => hierarchical_layout(doc, config.base, config),
        LayoutMode::Compact | LayoutMode::Spacious => cleanup_layout(doc, mode, config),
    }
}
