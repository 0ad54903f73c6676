//! Type definitions for the ingestion module.

use crate::index::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized tool record ready for indexing.
///
/// `raw_definition` keeps the full tool schema for agent invocation; only
/// `name`, `description`, `category` and `tags` feed the search text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRecord {
    /// Unique tool identifier, e.g. `hris_list_employees`
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Functional area such as `hris`, `crm` or `ats`
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// The MCP server or catalog that provided this tool
    pub server_origin: String,

    pub raw_definition: Value,
}

impl ToolRecord {
    pub fn new(
        name: String,
        description: String,
        category: Option<String>,
        server_origin: String,
        raw_definition: Value,
    ) -> Self {
        Self {
            name,
            description,
            category,
            tags: Vec::new(),
            server_origin,
            raw_definition,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Search text: name, description, then category and tags.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.name.as_str()];
        if !self.description.is_empty() {
            parts.push(self.description.as_str());
        }
        if let Some(category) = &self.category {
            parts.push(category.as_str());
        }
        parts.extend(self.tags.iter().map(String::as_str));
        parts.join(" ")
    }

    pub fn to_document(&self) -> Document {
        Document::new(self.name.clone(), self.search_text())
    }
}
