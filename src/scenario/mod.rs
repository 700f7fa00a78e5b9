//! Scenario Engine - named document snapshots and structural diffs
//!
//! Switching between scenarios is owned by `OrgEngine`, which also resets
//! selection and history; this module only stores and compares documents.

pub mod diff;
pub mod store;

pub use diff::{
    compute_scenario_diff, ChangeCategory, ChangeItem, DiffCounts, DiffStatus, EdgeChange, FieldChange, NodeChange,
    ScenarioDiff, Severity,
};
pub use store::{Scenario, ScenarioStore, ScenarioSummary};
