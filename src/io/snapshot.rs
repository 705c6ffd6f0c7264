use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::model::raw::RawProject;
use crate::normalize::page::{Page, normalize_page};

/// Error type for snapshot loading
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no project with fields and items found in {0}")]
    NoProject(PathBuf),
}

/// Locate the `projectV2` node in a saved API response.
///
/// Accepts the node itself, or a GraphQL envelope of the form
/// `{ data: { node | organization | user: { projectV2 } } }`. A `node`
/// query may return the project directly.
fn find_project(doc: &Value) -> Option<&Value> {
    let is_project = |v: &Value| v.get("fields").is_some() || v.get("items").is_some();
    if is_project(doc) {
        return Some(doc);
    }
    let data = doc.get("data")?;
    ["node", "organization", "user", "viewer"]
        .iter()
        .filter_map(|owner| data.get(owner))
        .find_map(|owner| match owner.get("projectV2") {
            Some(project) => Some(project),
            None if is_project(owner) => Some(owner),
            None => None,
        })
}

/// Parse a snapshot document into the raw project
pub fn parse_snapshot(doc: &Value) -> Option<Result<RawProject, serde_json::Error>> {
    find_project(doc).map(RawProject::deserialize)
}

/// Load and normalize a saved API response
pub fn load_snapshot(path: &Path) -> Result<Page, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|e| SnapshotError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let doc: Value = serde_json::from_str(&text).map_err(|e| SnapshotError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw = parse_snapshot(&doc)
        .ok_or_else(|| SnapshotError::NoProject(path.to_path_buf()))?
        .map_err(|e| SnapshotError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    let fields: Vec<_> = raw.fields.iter().cloned().collect();
    let items: Vec<_> = raw.items.iter().cloned().collect();
    let page = normalize_page(&fields, &items);
    info!(
        path = %path.display(),
        fields = page.fields.len(),
        items = page.items.len(),
        "loaded snapshot"
    );
    Ok(page)
}
