//! Document-side half of the pipeline: identifier normalization, the feature
//! scan that produces the matched list, and the in-place merge of fetched
//! rows back into feature properties.
//!
//! The document is a `serde_json::Value` with a top-level `features` array;
//! each feature carries a `properties` object whose identifier field joins it
//! to a storage row. Anything that deviates from that shape is skipped, never
//! treated as an error.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::datatype::Row;
use crate::error::{MergeError, Result};

// ------------- Normalization -------------

/// Canonicalizes a raw identifier for comparison: trim, lowercase. Returns
/// `None` when there is nothing left to compare against.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// The normalized identifier of one feature, if it has one.
fn feature_identifier(feature: &Value, field: &str) -> Option<String> {
    feature
        .get("properties")?
        .get(field)?
        .as_str()
        .and_then(normalize)
}

// ------------- Loading -------------

/// Reads and parses the input document. A file that cannot be read or does
/// not parse is fatal; the offending content is logged so the bad document
/// can be inspected afterwards.
pub fn load(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| MergeError::Document {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    match serde_json::from_str(&content) {
        Ok(value) => Ok(value),
        Err(e) => {
            error!(path = %path.display(), error = %e, "JSON decode error");
            error!(content = %content, "content of the document causing the issue");
            Err(MergeError::Document {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }
}

// ------------- Scanning -------------

/// Walks the document's features and returns the normalized identifiers that
/// are members of the reference set, in document order, duplicates included.
/// A document without a `features` array yields an empty list.
pub fn matched_identifiers(doc: &Value, field: &str, reference: &HashSet<String>) -> Vec<String> {
    let mut matched = Vec::new();
    let features = match doc.get("features").and_then(Value::as_array) {
        Some(features) => features,
        None => {
            info!("document has no feature list, nothing to match");
            return matched;
        }
    };
    for feature in features {
        if let Some(identifier) = feature_identifier(feature, field) {
            if reference.contains(&identifier) {
                matched.push(identifier);
            }
        }
    }
    info!(
        features = features.len(),
        matched = matched.len(),
        "scanned document"
    );
    matched
}

// ------------- Merging -------------

/// Merges fetched rows into the features they belong to, in place.
///
/// A lookup is built from each row's own normalized identifier; when storage
/// returns several rows with the same identifier the last one wins. Every
/// feature whose identifier hits the lookup gets the row's columns written
/// into its `properties` map, overwriting same-named keys. The identifier
/// column itself is left alone so the document keeps its original spelling.
/// Features without a hit are untouched.
///
/// Returns whether at least one feature was updated.
pub fn merge_rows(doc: &mut Value, field: &str, rows: &[Row]) -> bool {
    let mut lookup: HashMap<String, &Row> = HashMap::new();
    for row in rows {
        if let Some(identifier) = row.text(field).and_then(normalize) {
            lookup.insert(identifier, row);
        }
    }

    let mut changed = false;
    let features = match doc.get_mut("features").and_then(Value::as_array_mut) {
        Some(features) => features,
        None => return false,
    };
    for feature in features {
        let identifier = match feature_identifier(feature, field) {
            Some(identifier) => identifier,
            None => continue,
        };
        let row = match lookup.get(&identifier) {
            Some(row) => *row,
            None => continue,
        };
        if let Some(properties) = feature
            .get_mut("properties")
            .and_then(Value::as_object_mut)
        {
            for (column, value) in row.columns() {
                if column == field {
                    continue;
                }
                properties.insert(column.clone(), value.to_json());
            }
            debug!(identifier = %identifier, "updated feature");
            changed = true;
        }
    }
    changed
}
