//! Table definitions and their request-scoped instances
//!
//! A [`Table`] declares a record source and its descriptors. Each request
//! wraps the table in a [`TableInstance`], which resolves the current
//! filters, sorts and page from that request and memoizes every derived
//! collection for the lifetime of the instance.
//!
//! # Example
//!
//! ```
//! use hybridly_tables::prelude::*;
//! use serde_json::json;
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
//!         vec![Column::make("name").sortable(true), Column::make("email")]
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = MemorySource::new("id", vec![
//!     json!({ "id": 1, "name": "Bob", "email": "bob@example.com" }),
//!     json!({ "id": 2, "name": "Alice", "email": "alice@example.com" }),
//! ]);
//! let request = TableRequest::from_uri("/users?sorts=name").unwrap();
//! let table = TableInstance::new(UsersTable { source }, request, Arc::new(TableConfig::new()));
//!
//! let payload = table.payload().await.unwrap();
//! assert_eq!(payload.records.data[0]["name"], "Alice");
//! assert_eq!(payload.current_sorts["name"].next.as_deref(), Some("-name"));
//! # }
//! ```

use crate::action::{BulkAction, BulkHandler, InlineAction};
use crate::column::{Column, ColumnSettings};
use crate::component::{Component, Hideable, Named};
use crate::config::TableConfig;
use crate::error::{ActionKind, Result, TableError};
use crate::evaluate::Params;
use crate::filter::Filter;
use crate::pagination::PageNumberPagination;
use crate::query::{RecordSource, TableQuery};
use crate::request::TableRequest;
use bytes::Bytes;
use http::Response;
use hybridly_tables_types::{
	CurrentSorts, PaginatedRecords, RecordKey, ScopedKeys, Selection, SortDirection, TablePayload,
	parse_sorts,
};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Query type of a table's record source
pub type QueryOf<T> = <<T as Table>::Source as RecordSource>::Query;

/// Record type of a table's record source
pub type RecordOf<T> = <<T as Table>::Source as RecordSource>::Record;

/// Declarative table
pub trait Table: Send + Sync + 'static {
	/// Collection the table reads from
	type Source: RecordSource;

	fn source(&self) -> &Self::Source;

	fn define_columns(&self) -> Vec<Column<QueryOf<Self>>> {
		Vec::new()
	}

	fn define_filters(&self) -> Vec<Filter<QueryOf<Self>>> {
		Vec::new()
	}

	fn define_inline_actions(&self) -> Vec<InlineAction<RecordOf<Self>>> {
		Vec::new()
	}

	fn define_bulk_actions(&self) -> Vec<BulkAction<QueryOf<Self>, RecordOf<Self>>> {
		Vec::new()
	}

	/// Prefix for the table's query parameters
	fn scope(&self) -> Option<&str> {
		None
	}

	/// Primary-key field name
	fn key_name(&self) -> &str {
		self.source().key_name()
	}

	/// Page size; `None` uses the configured default
	fn records_per_page(&self) -> Option<usize> {
		None
	}

	/// Base query every other query starts from
	fn table_query(&self) -> QueryOf<Self> {
		self.source().query()
	}
}

/// Identity token of a table type
///
/// Clients send this token back when executing actions.
pub fn table_id<T: Table>() -> &'static str {
	std::any::type_name::<T>()
}

/// Keeps the first descriptor of each name, warning about the others
fn first_by_name<D: Named>(table: &str, kind: &str, descriptors: Vec<D>) -> Vec<D> {
	let mut seen = HashSet::new();
	descriptors
		.into_iter()
		.filter(|descriptor| {
			let unique = seen.insert(descriptor.name().to_string());
			if !unique {
				tracing::warn!(
					table = %table,
					kind = %kind,
					name = %descriptor.name(),
					"Duplicate descriptor name, keeping the first declaration"
				);
			}
			unique
		})
		.collect()
}

fn visible<D: Hideable>(descriptors: Vec<D>, params: &Params) -> Result<Vec<D>> {
	let mut kept = Vec::with_capacity(descriptors.len());
	for descriptor in descriptors {
		if !descriptor.is_hidden(params)? {
			kept.push(descriptor);
		}
	}
	Ok(kept)
}

/// Table bound to one request
pub struct TableInstance<T: Table> {
	table: T,
	request: Arc<TableRequest>,
	config: Arc<TableConfig>,
	keys: ScopedKeys,
	params: Params,
	columns: OnceCell<Vec<Column<QueryOf<T>>>>,
	filters: OnceCell<Vec<Filter<QueryOf<T>>>>,
	inline_actions: OnceCell<Vec<InlineAction<RecordOf<T>>>>,
	bulk_actions: OnceCell<Vec<BulkAction<QueryOf<T>, RecordOf<T>>>>,
	current_filters: OnceCell<IndexMap<String, Value>>,
	current_sorts: OnceCell<CurrentSorts>,
	records: tokio::sync::OnceCell<PaginatedRecords<RecordOf<T>>>,
}

impl<T: Table> TableInstance<T> {
	/// Binds `table` to `request`
	pub fn new(table: T, request: TableRequest, config: Arc<TableConfig>) -> Self {
		let request = Arc::new(request);
		let keys = ScopedKeys::new(table.scope());
		let mut params = Params::new();
		params.insert_arc("request", Arc::clone(&request));

		Self {
			table,
			request,
			config,
			keys,
			params,
			columns: OnceCell::new(),
			filters: OnceCell::new(),
			inline_actions: OnceCell::new(),
			bulk_actions: OnceCell::new(),
			current_filters: OnceCell::new(),
			current_sorts: OnceCell::new(),
			records: tokio::sync::OnceCell::new(),
		}
	}

	/// Identity token
	pub fn id(&self) -> &'static str {
		table_id::<T>()
	}

	pub fn table(&self) -> &T {
		&self.table
	}

	pub fn request(&self) -> &TableRequest {
		&self.request
	}

	pub fn config(&self) -> &TableConfig {
		&self.config
	}

	pub fn scope(&self) -> Option<&str> {
		self.table.scope().filter(|scope| !scope.is_empty())
	}

	/// Scoped parameter names
	pub fn keys(&self) -> &ScopedKeys {
		&self.keys
	}

	/// Primary-key field name
	pub fn key_name(&self) -> &str {
		match self.table.key_name() {
			"" => self.config.key_name(),
			key_name => key_name,
		}
	}

	pub fn records_per_page(&self) -> usize {
		self.table
			.records_per_page()
			.unwrap_or_else(|| self.config.per_page())
			.max(1)
	}

	/// Parameters every descriptor rule can read (`request`)
	pub fn base_params(&self) -> &Params {
		&self.params
	}

	/// Visible columns
	pub fn table_columns(&self) -> Result<&[Column<QueryOf<T>>]> {
		self.columns
			.get_or_try_init(|| {
				let mut columns = first_by_name(self.id(), "column", self.table.define_columns());
				for column in &mut columns {
					self.config.apply_column_configurators(column);
				}
				visible(columns, &self.params)
			})
			.map(Vec::as_slice)
	}

	/// Visible filters
	pub fn table_filters(&self) -> Result<&[Filter<QueryOf<T>>]> {
		self.filters
			.get_or_try_init(|| {
				let mut filters = first_by_name(self.id(), "filter", self.table.define_filters());
				for filter in &mut filters {
					self.config.apply_filter_configurators(filter);
				}
				visible(filters, &self.params)
			})
			.map(Vec::as_slice)
	}

	/// Visible inline actions
	pub fn inline_actions(&self) -> Result<&[InlineAction<RecordOf<T>>]> {
		self.inline_actions
			.get_or_try_init(|| {
				let mut actions =
					first_by_name(self.id(), "inline action", self.table.define_inline_actions());
				for action in &mut actions {
					self.config.apply_inline_action_configurators(action);
				}
				visible(actions, &self.params)
			})
			.map(Vec::as_slice)
	}

	/// Visible bulk actions
	pub fn bulk_actions(&self) -> Result<&[BulkAction<QueryOf<T>, RecordOf<T>>]> {
		self.bulk_actions
			.get_or_try_init(|| {
				let mut actions =
					first_by_name(self.id(), "bulk action", self.table.define_bulk_actions());
				for action in &mut actions {
					self.config.apply_bulk_action_configurators(action);
				}
				visible(actions, &self.params)
			})
			.map(Vec::as_slice)
	}

	pub fn find_inline_action(&self, name: &str) -> Result<Option<&InlineAction<RecordOf<T>>>> {
		Ok(self.inline_actions()?.iter().find(|action| action.name() == name))
	}

	pub fn find_bulk_action(
		&self,
		name: &str,
	) -> Result<Option<&BulkAction<QueryOf<T>, RecordOf<T>>>> {
		Ok(self.bulk_actions()?.iter().find(|action| action.name() == name))
	}

	/// Visible columns that accept sorting
	pub fn sortable_columns(&self) -> Result<Vec<&Column<QueryOf<T>>>> {
		Ok(self
			.table_columns()?
			.iter()
			.filter(|column| column.is_sortable())
			.collect())
	}

	/// Current value of every visible filter
	///
	/// The request's scoped filter map wins over defaults; filters with
	/// neither resolve to `null`.
	pub fn current_filters(&self) -> Result<&IndexMap<String, Value>> {
		self.current_filters.get_or_try_init(|| -> Result<IndexMap<String, Value>> {
			let requested = self.request.param(&self.keys.filters);
			let mut current = IndexMap::new();

			for filter in self.table_filters()? {
				let value = requested
					.and_then(|values| values.get(filter.name()))
					.filter(|value| !value.is_null())
					.or_else(|| filter.default_value())
					.cloned()
					.unwrap_or(Value::Null);
				current.insert(filter.name().to_string(), value);
			}

			tracing::debug!(table = %self.id(), filters = ?current, "Resolved current filters");
			Ok(current)
		})
	}

	/// Sorts requested through the scoped sort parameter
	///
	/// Tokens naming unknown or non-sortable columns are dropped.
	pub fn current_sorts(&self) -> Result<&CurrentSorts> {
		self.current_sorts.get_or_try_init(|| -> Result<CurrentSorts> {
			let Some(raw) = self
				.request
				.param_str(&self.keys.sorts)
				.filter(|raw| !raw.trim().is_empty())
			else {
				return Ok(CurrentSorts::new());
			};

			let sortable: HashSet<&str> = self
				.sortable_columns()?
				.into_iter()
				.map(|column| column.name())
				.collect();
			let sorts = parse_sorts(raw, |column| sortable.contains(column));

			for token in raw.split(',') {
				let column = SortDirection::parse_token(token.trim()).1;
				if !sorts.contains_key(column) {
					tracing::trace!(table = %self.id(), token = %token, "Dropped sort token");
				}
			}

			tracing::debug!(
				table = %self.id(),
				sorts = ?sorts.keys().collect::<Vec<_>>(),
				"Resolved current sorts"
			);
			Ok(sorts)
		})
	}

	/// Base query with filters and sorts applied
	///
	/// Base-query hooks run first, then every filter predicate inside one
	/// AND group, then each current sort in request order.
	pub fn filtered_query(&self) -> Result<QueryOf<T>> {
		let mut query = self.table.table_query();
		let filters = self.table_filters()?;
		let values = self.current_filters()?;

		for filter in filters {
			let value = values.get(filter.name()).unwrap_or(&Value::Null);
			filter.apply_to_base_query(&mut query, value, &self.params)?;
		}

		let mut applied = Ok(());
		query.where_group(|group| {
			for filter in filters {
				let value = values.get(filter.name()).unwrap_or(&Value::Null);
				if let Err(error) = filter.apply(group, value, &self.params) {
					applied = Err(error);
					return;
				}
			}
		});
		applied?;

		let columns = self.table_columns()?;
		for (name, sort) in self.current_sorts()? {
			if let Some(column) = columns.iter().find(|column| column.name() == name) {
				column.apply_sort(&mut query, sort.direction);
			}
		}

		Ok(query)
	}

	/// Pagination settings for this table's scope
	pub fn paginator(&self) -> PageNumberPagination {
		PageNumberPagination::new()
			.page_size(self.records_per_page())
			.page_query_param(self.keys.page.clone())
	}

	/// Current page of filtered, sorted records
	pub async fn paginated_records(&self) -> Result<&PaginatedRecords<RecordOf<T>>> {
		self.records
			.get_or_try_init(|| async {
				let query = self.filtered_query()?;
				let paginator = self.paginator();
				let page = paginator.current_page(&self.request);
				let source = self.table.source();

				let total = source.count(&query).await?;
				let data = source
					.fetch(&query, paginator.offset(page), paginator.page_size)
					.await?;

				tracing::debug!(
					table = %self.id(),
					page,
					total,
					returned = data.len(),
					"Paginated table records"
				);
				Ok::<_, TableError>(paginator.paginate(data, total, page, self.request.url()))
			})
			.await
	}

	/// Query over the records described by `selection`
	///
	/// `all` selections exclude `except`; the others include only `only`.
	pub fn selection_query(&self, selection: &Selection) -> QueryOf<T> {
		let mut query = self.table.table_query();
		let key_name = self.key_name();
		let keys: Vec<RecordKey> = if selection.all {
			selection.except.iter().cloned().collect()
		} else {
			selection.only.iter().cloned().collect()
		};

		if selection.all {
			query.where_not_in(key_name, &keys);
		} else {
			query.where_in(key_name, &keys);
		}
		query
	}

	/// Runs an inline action against one record
	pub async fn execute_inline_action(
		&self,
		name: &str,
		key: &RecordKey,
	) -> Result<Option<Response<Bytes>>> {
		let action = self
			.find_inline_action(name)?
			.ok_or_else(|| TableError::UnknownAction {
				kind: ActionKind::Inline,
				name: name.to_string(),
			})?;

		let record = self
			.table
			.source()
			.find(key)
			.await?
			.ok_or_else(|| TableError::RecordNotFound { key: key.clone() })?;

		if !action.has_handler() {
			tracing::warn!(table = %self.id(), action = %name, "Inline action has no handler");
		}

		let mut params = action.evaluation_params(&self.params);
		params.insert("record", record.clone());

		action.execute(record, params).await.map_err(TableError::Handler)
	}

	/// Runs a bulk action against a selection
	pub async fn execute_bulk_action(
		&self,
		name: &str,
		selection: &Selection,
	) -> Result<Option<Response<Bytes>>> {
		let action = self
			.find_bulk_action(name)?
			.ok_or_else(|| TableError::UnknownAction {
				kind: ActionKind::Bulk,
				name: name.to_string(),
			})?;

		let query = self.selection_query(selection);
		let mut params = action.evaluation_params(&self.params);

		let result = match action.bulk_handler() {
			None => {
				tracing::warn!(table = %self.id(), action = %name, "Bulk action has no handler");
				Ok(None)
			}
			Some(BulkHandler::OnQuery(handler)) => {
				params.insert("query", query.clone());
				handler(query, params).await
			}
			Some(BulkHandler::OnRecords(handler)) => {
				let records = self.table.source().get(&query).await?;
				tracing::debug!(
					table = %self.id(),
					action = %name,
					records = records.len(),
					"Materialized bulk selection"
				);
				params.insert("records", records.clone());
				handler(records, params).await
			}
		};

		result.map_err(TableError::Handler)
	}

	/// Serializable table
	pub async fn payload(&self) -> Result<TablePayload<RecordOf<T>>> {
		let records = self.paginated_records().await?.clone();

		let columns = self
			.table_columns()?
			.iter()
			.map(|column| column.payload(&self.params))
			.collect::<Result<Vec<_>>>()?;
		let filters = self
			.table_filters()?
			.iter()
			.map(|filter| filter.payload(&self.params))
			.collect::<Result<Vec<_>>>()?;
		let inline_actions = self
			.inline_actions()?
			.iter()
			.map(|action| action.payload(&self.params))
			.collect::<Result<Vec<_>>>()?;
		let bulk_actions = self
			.bulk_actions()?
			.iter()
			.map(|action| action.payload(&self.params))
			.collect::<Result<Vec<_>>>()?;

		Ok(TablePayload {
			id: self.id().to_string(),
			key_name: self.key_name().to_string(),
			records,
			columns,
			filters,
			inline_actions,
			bulk_actions,
			current_sorts: self.current_sorts()?.clone(),
			current_filters: self.current_filters()?.clone(),
			scope: self.scope().map(str::to_string),
		})
	}
}
