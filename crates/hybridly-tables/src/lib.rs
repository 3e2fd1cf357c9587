//! Declarative data tables for server-driven applications
//!
//! A table is declared once on the server: a record source, its columns,
//! filters, inline actions and bulk actions. Each request binds the table
//! to the current query string, which selects filters, sorts and the page,
//! and produces a serializable payload for the view layer. Actions are
//! executed through a single endpoint that resolves the table by identity
//! token.
//!
//! # Features
//!
//! - **Columns**: labels, visibility rules, sortable and searchable flags
//! - **Filters**: default values, query modifiers and base-query hooks
//! - **Sorting**: multi-column sort tokens (`?sorts=name,-created_at`)
//! - **Pagination**: page-number pagination with elided link lists
//! - **Scoping**: several tables per page through prefixed parameters
//! - **Actions**: inline and bulk actions with tri-state selections
//! - **Backends**: in-memory JSON records and `sea-query` statements (`sql` feature)
//!
//! # Architecture
//!
//! ```mermaid
//! graph TD
//!     A[Table] --> B[Columns]
//!     A --> C[Filters]
//!     A --> D[Inline actions]
//!     A --> E[Bulk actions]
//!     F[TableInstance] --> A
//!     F --> G[TableRequest]
//!     F --> H[Payload]
//!     I[Endpoint] --> J[ActionDispatcher]
//!     J --> K[TableRegistry]
//!     K --> F
//! ```
//!
//! # Example
//!
//! ```rust
//! use hybridly_tables::prelude::*;
//! use serde_json::{Value, json};
//! use std::sync::Arc;
//!
//! struct UsersTable {
//!     source: MemorySource,
//! }
//!
//! impl Table for UsersTable {
//!     type Source = MemorySource;
//!
//!     fn source(&self) -> &MemorySource {
//!         &self.source
//!     }
//!
//!     fn define_columns(&self) -> Vec<Column<MemoryQuery>> {
//!         vec![Column::make("name").sortable(true), Column::make("role")]
//!     }
//!
//!     fn define_filters(&self) -> Vec<Filter<MemoryQuery>> {
//!         vec![Filter::make("role").query(|query: &mut MemoryQuery, value: &Value| {
//!             query.where_eq("role", value.clone());
//!         })]
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = MemorySource::new("id", vec![
//!     json!({ "id": 1, "name": "Bob", "role": "admin" }),
//!     json!({ "id": 2, "name": "Alice", "role": "member" }),
//!     json!({ "id": 3, "name": "Carol", "role": "admin" }),
//! ]);
//! let request = TableRequest::from_uri("/users?filters[role]=admin&sorts=-name").unwrap();
//! let table = TableInstance::new(UsersTable { source }, request, Arc::new(TableConfig::new()));
//!
//! let records = table.paginated_records().await.unwrap();
//! let names: Vec<_> = records.data.iter().map(|user| user["name"].clone()).collect();
//! assert_eq!(names, vec![json!("Carol"), json!("Bob")]);
//! # }
//! ```

#![warn(rustdoc::broken_intra_doc_links)]

pub mod action;
pub mod column;
pub mod component;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod evaluate;
pub mod filter;
pub mod memory;
pub mod pagination;
pub mod query;
pub mod registry;
pub mod request;
#[cfg(feature = "sql")]
pub mod sql;
pub mod table;

// Re-exports for convenience
pub use action::{ActionResult, BulkAction, BulkHandler, InlineAction};
pub use column::{Column, ColumnSettings};
pub use component::{
	Component, ComponentInfo, ComponentKind, Configurable, HasMetadata, Hideable, Labeled, Named,
	Typed, Visibility, when,
};
pub use config::{TableConfig, TableSettings};
pub use dispatch::{ActionDispatcher, ActionOutcome, DispatchPhase};
pub use error::{ActionKind, Result, TableError};
pub use evaluate::{Evaluable, Params, Rule};
pub use filter::Filter;
pub use memory::{MemoryQuery, MemorySource};
pub use pagination::PageNumberPagination;
pub use query::{RecordSource, TableQuery};
pub use registry::{DynTable, Resolvable, TableRegistry};
pub use request::TableRequest;
#[cfg(feature = "sql")]
pub use sql::SqlQuery;
pub use table::{QueryOf, RecordOf, Table, TableInstance, table_id};

pub use hybridly_tables_types as types;

/// Items needed to declare and serve a table
pub mod prelude {
	pub use crate::action::{ActionResult, BulkAction, InlineAction};
	pub use crate::column::{Column, ColumnSettings};
	pub use crate::component::{Configurable, HasMetadata, Hideable, Labeled, Named, Typed, when};
	pub use crate::config::{TableConfig, TableSettings};
	pub use crate::dispatch::{ActionDispatcher, ActionOutcome};
	pub use crate::error::TableError;
	pub use crate::evaluate::{Evaluable, Params, Rule};
	pub use crate::filter::Filter;
	pub use crate::memory::{MemoryQuery, MemorySource};
	pub use crate::query::{RecordSource, TableQuery};
	pub use crate::registry::TableRegistry;
	pub use crate::request::TableRequest;
	#[cfg(feature = "sql")]
	pub use crate::sql::SqlQuery;
	pub use crate::table::{Table, TableInstance, table_id};
	pub use hybridly_tables_types::{
		ActionCall, BulkActionRequest, CurrentSort, InlineActionRequest, RecordKey, Selection,
		SortDirection, TablePayload,
	};
}
