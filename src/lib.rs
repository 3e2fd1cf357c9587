//! # Hybridly
//!
//! Declarative, server-driven data tables.
//!
//! A table is declared once on the server: its columns, filters, inline and
//! bulk actions, and the record source they apply to. Each request resolves
//! sorts, filters and the page from the query string, and the table is
//! serialized into a payload the view layer renders. Action calls post back
//! to a single endpoint that routes them to the declaring table.
//!
//! ## Feature Flags
//!
//! - `minimal` - Server-side table engine with the SQL backend
//! - `sql` - [`sea-query`](https://docs.rs/sea-query) backend for [`tables::SqlQuery`]
//! - `client` - Client-side controller ([`client::TableController`])
//! - `full` (default) - Everything
//!
//! ## Crates
//!
//! - [`types`]: wire contracts shared by both sides
//! - [`tables`]: the table engine, action dispatcher and endpoint
//! - [`client`]: selection, sorting and filtering state for the browser side

#![warn(rustdoc::broken_intra_doc_links)]

pub use hybridly_tables as tables;
pub use hybridly_tables_types as types;

#[cfg(feature = "client")]
pub use hybridly_tables_client as client;

/// Common imports for declaring and serving tables
pub mod prelude {
	pub use hybridly_tables::prelude::*;

	#[cfg(feature = "client")]
	pub use hybridly_tables_client::{BulkSelect, Navigator, ParamPatch, TableController};
}
