//! Client-side controller for Hybridly tables
//!
//! [`TableController`] binds to one table property of the current view and
//! turns user intent into navigations through a [`Navigator`]:
//!
//! - sorting and filtering reload the current page with a [`ParamPatch`]
//!   applied to its query string
//! - inline and bulk actions post an [`ActionCall`](hybridly_tables_types::ActionCall)
//!   to the action endpoint
//! - [`BulkSelect`] tracks the `all` / `only` / `except` selection
//! - [`Paginator`] derives page navigation from the server's link list
//!
//! The controller is single-threaded: shared state lives behind
//! `Rc<RefCell<_>>` and futures are not `Send`.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod bulk;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod paginator;

pub use bulk::BulkSelect;
pub use controller::{
	ClientConfig, ColumnView, DEFAULT_ENDPOINT, FilterView, RecordView, TableController,
};
pub use error::{ClientError, Result};
pub use navigation::{NavigationResponse, Navigator, ParamPatch, Visit, VisitMethod};
pub use paginator::{Paginator, PaginatorItem, SEPARATOR};
