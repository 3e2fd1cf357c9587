//! Record-source collaborator contract
//!
//! The table engine never talks to a database directly. It shapes queries
//! through [`TableQuery`] and executes them through [`RecordSource`]; two
//! backends ship with the crate: [`crate::memory`] for JSON records held in
//! memory and [`crate::sql`] (feature `sql`) for `sea-query` statements.

use crate::error::Result;
use async_trait::async_trait;
use hybridly_tables_types::{RecordKey, SortDirection};
use serde::Serialize;

/// Query builder operations the table engine relies on
///
/// Backends expose richer predicate APIs on their concrete types; filter
/// closures receive the concrete query and may use them freely.
pub trait TableQuery: Clone + Send + Sync + 'static {
	/// Restricts the query to records whose `field` is one of `keys`
	fn where_in(&mut self, field: &str, keys: &[RecordKey]);

	/// Excludes records whose `field` is one of `keys`
	fn where_not_in(&mut self, field: &str, keys: &[RecordKey]);

	/// Appends an ordering clause
	fn order_by(&mut self, field: &str, direction: SortDirection);

	/// Adds a parenthesized group combined with the existing predicates by AND
	///
	/// Clauses added inside `build` compose with each other however the
	/// callback decides (AND or OR).
	fn where_group<F>(&mut self, build: F)
	where
		F: FnOnce(&mut Self);
}

/// Queryable record collection
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
	/// Record type rendered in the table payload
	type Record: Serialize + Clone + Send + Sync + 'static;
	/// Query type shaped by filters, sorts and selections
	type Query: TableQuery;

	/// Primary-key field name
	fn key_name(&self) -> &str;

	/// Fresh base query over every record
	fn query(&self) -> Self::Query;

	/// Loads one record by primary key
	async fn find(&self, key: &RecordKey) -> Result<Option<Self::Record>>;

	/// Executes a query and returns every matching record
	async fn get(&self, query: &Self::Query) -> Result<Vec<Self::Record>>;

	/// Counts the records matching a query
	async fn count(&self, query: &Self::Query) -> Result<usize>;

	/// Executes a query returning at most `limit` records after skipping `offset`
	async fn fetch(
		&self,
		query: &Self::Query,
		offset: usize,
		limit: usize,
	) -> Result<Vec<Self::Record>>;
}
