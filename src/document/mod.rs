//! Document model: schema, validation and the serialization contract

pub mod model;
pub mod serialize;
pub mod validate;

pub use model::{
    create_empty_document, new_id, now_millis, Dimension, DocumentMetadata, EdgeId, EdgeMetadata,
    FilterState, GraphDocument, GraphEdge, GraphNode, GroupNode, LayoutState, Lens, LensState,
    NodeId, PersonNode, Position, RelationshipType, Tier, Viewport, SCHEMA_VERSION,
};
pub use serialize::{document_to_value, export_document, import_document, import_value};
pub use validate::{conflicts, sanitize, validate_document, validate_value, Conflict};
