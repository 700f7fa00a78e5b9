//! Import/export at the serialization boundary
//!
//! Import is fail-closed: the JSON is parsed, fully validated and only then
//! sanitized. A document with any violation is rejected as a whole.

use serde_json::Value;
use tracing::{debug, warn};

use super::model::GraphDocument;
use super::validate::{sanitize, validate_value};
use crate::error::{OrgError, Result};

/// Serialize a document to pretty-printed JSON
pub fn export_document(doc: &GraphDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Serialize a document to a JSON value
pub fn document_to_value(doc: &GraphDocument) -> Result<Value> {
    Ok(serde_json::to_value(doc)?)
}

/// Parse, validate and sanitize a JSON document
pub fn import_document(json: &str) -> Result<GraphDocument> {
    let value: Value = serde_json::from_str(json)?;
    import_value(&value)
}

/// Validate and sanitize an already parsed JSON value
pub fn import_value(value: &Value) -> Result<GraphDocument> {
    match validate_value(value) {
        Ok(doc) => {
            debug!(nodes = doc.nodes.len(), edges = doc.edges.len(), "document imported");
            Ok(sanitize(doc))
        }
        Err(OrgError::Validation(violations)) => {
            warn!(count = violations.len(), "document import rejected");
            Err(OrgError::Validation(violations))
        }
        Err(other) => Err(other),
    }
}
