use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::graph::GraphDocument;
use super::records::Record;

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read data file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Loads an array of flat records. Non-object array entries are skipped.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let parsed = read_json(path)?;
    let rows = parsed
        .as_array()
        .ok_or_else(|| anyhow!("expected a JSON array of rows in {}", path.display()))?;

    let records = rows
        .iter()
        .filter(|row| row.is_object())
        .filter_map(|row| Record::deserialize(row).ok())
        .collect::<Vec<_>>();

    info!(path = %path.display(), rows = records.len(), "loaded records");
    Ok(records)
}

/// Loads a `{nodes, links}` graph document.
pub fn load_graph(path: &Path) -> Result<GraphDocument> {
    let parsed = read_json(path)?;
    let document = GraphDocument::deserialize(&parsed)
        .with_context(|| format!("expected {{nodes, links}} in {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = document.nodes.len(),
        links = document.links.len(),
        "loaded graph"
    );
    Ok(document)
}
