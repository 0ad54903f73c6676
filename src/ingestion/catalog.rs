//! Tool catalog loading.
//!
//! Accepts either an MCP `list_tools` JSON-RPC response (`result.tools`), an
//! object with a top-level `tools` array, or a bare array of tool objects,
//! and turns each entry into a [`ToolRecord`]. Malformed entries are logged
//! and skipped; a catalog where every entry is malformed is an error.

use crate::error::{AppError, Result};
use crate::index::Document;
use crate::ingestion::types::ToolRecord;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

/// An ordered set of tools with name lookup.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolRecord>,
    by_name: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Wrap already-parsed tools. Later duplicates shadow earlier ones in
    /// lookups; building an index over such a catalog fails.
    pub fn new(tools: Vec<ToolRecord>) -> Self {
        let by_name = tools
            .iter()
            .enumerate()
            .map(|(idx, tool)| (tool.name.clone(), idx))
            .collect();
        Self { tools, by_name }
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let json: Value = serde_json::from_str(&raw)
            .map_err(|e| AppError::CatalogError(format!("{}: {}", path.display(), e)))?;

        let origin = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("catalog");
        let catalog = Self::new(parse_tools(&json, origin)?);

        tracing::info!(
            path = %path.display(),
            tools = catalog.len(),
            fingerprint = %catalog.fingerprint(),
            "Tool catalog loaded"
        );

        Ok(catalog)
    }

    pub fn tools(&self) -> &[ToolRecord] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolRecord> {
        self.by_name.get(name).map(|&idx| &self.tools[idx])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Index documents in catalog order.
    pub fn documents(&self) -> Vec<Document> {
        self.tools.iter().map(ToolRecord::to_document).collect()
    }

    /// Hex SHA256 over tool names and search texts; changes whenever the
    /// indexed content changes.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for tool in &self.tools {
            hasher.update(tool.name.as_bytes());
            hasher.update(b"|");
            hasher.update(tool.search_text().as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// Parse tool definitions from any supported catalog shape.
///
/// # Errors
/// Returns `AppError::CatalogError` if no tools array can be found, or if the
/// array is non-empty and every entry fails to parse.
pub fn parse_tools(json: &Value, server_name: &str) -> Result<Vec<ToolRecord>> {
    let tools_array = extract_tools_array(json)?;
    let mut results = Vec::with_capacity(tools_array.len());

    for (idx, tool_value) in tools_array.iter().enumerate() {
        match normalize_tool(tool_value, server_name) {
            Ok(tool) => results.push(tool),
            Err(e) => {
                tracing::warn!(
                    index = idx,
                    error = %e,
                    "Skipping malformed tool definition"
                );
            }
        }
    }

    if results.is_empty() && !tools_array.is_empty() {
        return Err(AppError::CatalogError(
            "All tool definitions failed to parse".into(),
        ));
    }

    tracing::debug!(
        total = tools_array.len(),
        parsed = results.len(),
        server = server_name,
        "Tool parsing complete"
    );

    Ok(results)
}

fn extract_tools_array(json: &Value) -> Result<&Vec<Value>> {
    if let Some(array) = json.as_array() {
        return Ok(array);
    }
    json.get("result")
        .and_then(|r| r.get("tools"))
        .or_else(|| json.get("tools"))
        .and_then(|t| t.as_array())
        .ok_or_else(|| {
            AppError::CatalogError(
                "Expected a tools array, 'tools' field or MCP 'result.tools'".into(),
            )
        })
}

fn normalize_tool(tool_value: &Value, server_name: &str) -> Result<ToolRecord> {
    let name = tool_value
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::CatalogError(format!(
                "Tool missing required 'name' field: {:?}",
                tool_value.get("name")
            ))
        })?;

    let description = tool_value
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let category = tool_value
        .get("category")
        .and_then(|v| v.as_str())
        .map(String::from)
        .or_else(|| infer_category(name));

    let tags = tool_value
        .get("tags")
        .and_then(|t| t.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(ToolRecord::new(
        name.to_string(),
        description.to_string(),
        category,
        server_name.to_string(),
        tool_value.clone(),
    )
    .with_tags(tags))
}

/// Unified-API tool names carry their category as a prefix
/// (`hris_list_employees` → `hris`).
fn infer_category(name: &str) -> Option<String> {
    name.split_once('_')
        .map(|(prefix, _)| prefix)
        .filter(|p| !p.is_empty())
        .map(str::to_lowercase)
}
