//! Table payload sent to the view layer
//!
//! The server serializes a [`TablePayload`] into the page properties; the
//! client controller deserializes the same structure to rebuild its
//! column, filter and record view-models.

use crate::sort::CurrentSorts;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full table state for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePayload<R> {
	/// Table identity token, echoed back in action calls
	pub id: String,
	/// Primary-key field of the records
	pub key_name: String,
	/// Current page of records
	pub records: PaginatedRecords<R>,
	/// Visible columns
	pub columns: Vec<ColumnPayload>,
	/// Visible filters
	pub filters: Vec<FilterPayload>,
	/// Visible inline actions
	pub inline_actions: Vec<ActionPayload>,
	/// Visible bulk actions
	pub bulk_actions: Vec<BulkActionPayload>,
	/// Sorts resolved from the request
	#[serde(default)]
	pub current_sorts: CurrentSorts,
	/// Filter values resolved from the request, keyed by filter name
	#[serde(default)]
	pub current_filters: IndexMap<String, Value>,
	/// Parameter scope
	#[serde(default)]
	pub scope: Option<String>,
}

/// Serialized column descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPayload {
	pub name: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub hidden: bool,
	#[serde(default)]
	pub sortable: bool,
	#[serde(default)]
	pub searchable: bool,
	#[serde(default)]
	pub sort_columns: Vec<String>,
	#[serde(default)]
	pub search_columns: Vec<String>,
	#[serde(default)]
	pub metadata: Value,
}

/// Serialized filter descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPayload {
	pub name: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub metadata: Value,
}

/// Serialized inline action descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
	pub name: String,
	pub label: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub metadata: Value,
}

/// Serialized bulk action descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkActionPayload {
	#[serde(flatten)]
	pub action: ActionPayload,
	/// Whether the client should clear its selection after running the action
	#[serde(default = "default_deselect")]
	pub deselect: bool,
}

fn default_deselect() -> bool {
	true
}

/// Page of records with length-aware pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedRecords<R> {
	/// Records on this page
	pub data: Vec<R>,
	/// Current page number (1-indexed)
	pub current_page: usize,
	/// Last page number
	pub last_page: usize,
	/// Records per page
	pub per_page: usize,
	/// Total number of matching records
	pub total: usize,
	/// 1-based index of the first record on the page
	pub from: Option<usize>,
	/// 1-based index of the last record on the page
	pub to: Option<usize>,
	/// Base path of the page links
	pub path: String,
	pub first_page_url: String,
	pub last_page_url: String,
	pub next_page_url: Option<String>,
	pub prev_page_url: Option<String>,
	/// Previous link, page numbers (with `...` separators), next link
	#[serde(default)]
	pub links: Vec<PaginatorLink>,
}

impl<R> PaginatedRecords<R> {
	/// Whether there is a page after this one
	pub fn has_more_pages(&self) -> bool {
		self.current_page < self.last_page
	}
}

/// Pagination link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorLink {
	pub url: Option<String>,
	pub label: String,
	pub active: bool,
}
