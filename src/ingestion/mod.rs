//! Ingestion module for tool catalogs.
//!
//! Turns tool definitions (MCP `list_tools` responses or plain tool arrays)
//! into [`ToolRecord`]s and the index documents derived from them.

pub mod catalog;
pub mod types;

pub use catalog::{parse_tools, ToolCatalog};
pub use types::ToolRecord;
