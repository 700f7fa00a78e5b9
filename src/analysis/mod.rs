//! Graph Analysis - read-only computations over a `GraphDocument`
//!
//! Nothing in this module mutates its input; every routine may be called
//! repeatedly or speculatively.
//!
//! # Modules
//!
//! - `graph`: petgraph view (`OrgGraph`) built on demand
//! - `hierarchy`: reporting-line helpers over manager edges
//! - `paths`: shortest path, all paths, sphere of influence
//! - `influence`: centrality, bridge nodes, per-node network analysis
//! - `span`: span of control, organization health
//! - `suggestions`: connection suggestions

pub mod graph;
pub mod hierarchy;
pub mod influence;
pub mod paths;
pub mod span;
pub mod suggestions;

pub use graph::OrgGraph;
pub use hierarchy::{ancestors, build_child_map, build_parent_map, descendants, is_ancestor, would_create_cycle};
pub use influence::{bridge_nodes, degree_centrality, network_analysis, NetworkAnalysis};
pub use paths::{
    find_all_paths, find_shortest_path, find_top_paths, influence_distances, sphere_of_influence, PathResult,
    PathStep,
};
pub use span::{calculate_span_metrics, org_health, OrgHealth, SpanMetrics, SpanStatus};
pub use suggestions::{suggest_connections, ConnectionSuggestion, SuggestionReason};
