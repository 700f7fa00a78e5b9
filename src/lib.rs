//! OrgCore: Organizational Graph Engine
//!
//! A Rust/WASM implementation of the engine behind a multi-lens org chart
//! editor. The canvas, dialogs and keyboard handling live in the host
//! application; this crate owns everything with algorithmic content.
//!
//! # Architecture
//!
//! ## Document
//! - `document` - versioned `GraphDocument`: nodes, edges, per-lens state,
//!   fail-closed validation, sanitizing and advisory conflicts
//! - `persist` - persisted-state layout and load-time migration
//!
//! ## Editing
//! - `history` - bounded undo/redo snapshot stacks
//! - `engine` - `OrgEngine`, the single writer: mutations, selection, view
//!   state, scenario switching, AI-import application
//!
//! ## Read-only computations
//! - `layout` - hierarchical and cleanup layouts
//! - `analysis` - paths, sphere of influence, centrality, bridges, span of
//!   control, connection suggestions, org health
//! - `scenario` - scenario store and structural diff
//! - `dedupe` - extraction review, fuzzy duplicate matching, merge strategies
//!
//! ## Ambient
//! - `config`, `error`, `logging`, `api` (wasm facade `OrgChartCore`)
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { OrgChartCore } from 'orgcore';
//!
//! await init();
//! const core = new OrgChartCore();
//!
//! const ceo = core.addPerson({ name: 'Ada Lovelace', title: 'CEO' });
//! const cto = core.addPerson({ name: 'Alan Turing', title: 'CTO' });
//! core.addRelationship(ceo, cto, 'manager');
//!
//! core.applyLayout('hierarchical');
//! console.log(core.spanMetrics(ceo)); // { directReports: 1, ... }
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod dedupe;
pub mod document;
pub mod engine;
pub mod error;
pub mod history;
pub mod layout;
pub mod logging;
pub mod persist;
pub mod scenario;

#[cfg(test)]
mod tests;

pub use api::OrgChartCore;
pub use config::EngineConfig;
pub use document::{GraphDocument, GraphEdge, GraphNode, Lens, NodeId, Position, RelationshipType};
pub use engine::OrgEngine;
pub use error::{OrgError, Violation};
pub use layout::LayoutMode;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Install the panic hook and the tracing subscriber
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("orgcore v{}", env!("CARGO_PKG_VERSION"))
}
