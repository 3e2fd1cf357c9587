//! Wire contracts for Hybridly tables
//!
//! Types in this crate are exchanged between the server-side table engine
//! (`hybridly-tables`) and the client controller (`hybridly-tables-client`):
//!
//! - [`RecordKey`]: primary-key values, numeric or textual
//! - [`Selection`]: tri-state bulk selection (`all` / `only` / `except`)
//! - [`CurrentSort`] and [`parse_sorts`]: sort tokens (`name`, `-name`)
//! - [`scope`]: parameter-name scoping for multiple tables per page
//! - [`query`]: bracket-notation query parameters
//! - [`TablePayload`]: the serialized table handed to the view layer
//! - [`ActionCall`]: inline and bulk action requests

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod key;
#[allow(missing_docs)]
pub mod payload;
pub mod query;
pub mod request;
pub mod scope;
pub mod selection;
pub mod sort;

pub use key::RecordKey;
pub use payload::{
	ActionPayload, BulkActionPayload, ColumnPayload, FilterPayload, PaginatedRecords,
	PaginatorLink, TablePayload,
};
pub use request::{ActionCall, BULK_ACTION, BulkActionRequest, INLINE_ACTION, InlineActionRequest};
pub use scope::{ScopedKeys, format_scope};
pub use selection::Selection;
pub use sort::{CurrentSort, CurrentSorts, SortDirection, initial_token, parse_sorts};
