//! Error types for OrgCore
//!
//! Import/parse problems are collected as `Violation`s and reported together
//! (fail-closed). In-session mutations mostly degrade to no-ops; the few that
//! refuse outright return an `OrgError`.

use serde::Serialize;
use thiserror::Error;

use crate::document::{EdgeId, NodeId};

/// Which end of an edge a dangling reference was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Source,
    Target,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

/// A single structural problem found while validating a document
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    #[error("unsupported schema version '{found}' (expected '{expected}')")]
    SchemaVersion { found: String, expected: String },

    #[error("document is malformed: {reason}")]
    MalformedDocument { reason: String },

    #[error("duplicate node id '{id}'")]
    DuplicateNodeId { id: NodeId },

    #[error("duplicate edge id '{id}'")]
    DuplicateEdgeId { id: EdgeId },

    /// ReferenceError: an edge points at a node that is not in the document
    #[error("edge '{edge_id}' {endpoint} references missing node '{node_id}'")]
    DanglingReference {
        edge_id: EdgeId,
        endpoint: Endpoint,
        node_id: NodeId,
    },

    #[error("lens state '{lens}' is malformed: {reason}")]
    MalformedLensState { lens: String, reason: String },
}

impl Violation {
    /// True for the reference-error category (edge → missing node)
    pub fn is_reference_error(&self) -> bool {
        matches!(self, Violation::DanglingReference { .. })
    }
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum OrgError {
    #[error("document failed validation with {} violation(s)", .0.len())]
    Validation(Vec<Violation>),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A manager edge that would close a reporting loop
    #[error("manager edge {source_id} -> {target_id} would create a reporting cycle")]
    CycleRisk { source_id: NodeId, target_id: NodeId },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("node '{0}' is not a person")]
    NotAPerson(NodeId),

    #[error("node '{0}' is not a group")]
    NotAGroup(NodeId),
}

impl OrgError {
    /// Violations carried by a validation failure (empty for other errors)
    pub fn violations(&self) -> &[Violation] {
        match self {
            OrgError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, OrgError>;
