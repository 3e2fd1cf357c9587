//! Common test fixtures for hybridly-tables tests

#![allow(dead_code)]

use bytes::Bytes;
use http::{Response, StatusCode};
use hybridly_tables::prelude::*;
use parking_lot::Mutex;
use rstest::*;
use serde_json::{Value, json};
use std::sync::Arc;

/// Records seen by bulk handlers, in call order
#[derive(Debug, Clone, Default)]
pub struct ActionLog(Arc<Mutex<Vec<Value>>>);

impl ActionLog {
	pub fn push(&self, value: Value) {
		self.0.lock().push(value);
	}

	pub fn entries(&self) -> Vec<Value> {
		self.0.lock().clone()
	}
}

/// Users table exercising every descriptor kind
#[derive(Clone)]
pub struct UsersTable {
	pub source: MemorySource,
	pub log: ActionLog,
	pub scope: Option<String>,
}

impl UsersTable {
	pub fn new(source: MemorySource) -> Self {
		Self {
			source,
			log: ActionLog::default(),
			scope: None,
		}
	}

	pub fn scoped(mut self, scope: &str) -> Self {
		self.scope = Some(scope.to_string());
		self
	}
}

impl Table for UsersTable {
	type Source = MemorySource;

	fn source(&self) -> &MemorySource {
		&self.source
	}

	fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	fn define_columns(&self) -> Vec<Column<MemoryQuery>> {
		vec![
			Column::make("id").label("#").sortable(true),
			Column::make("name").sortable(true),
			Column::make("email").searchable(true),
			Column::make("role").sortable(true),
			Column::make("password").hidden(true).sortable(true),
		]
	}

	fn define_filters(&self) -> Vec<Filter<MemoryQuery>> {
		vec![
			Filter::make("role").query(|query: &mut MemoryQuery, value: &Value| {
				query.where_eq("role", value.clone());
			}),
			Filter::make("search").query(|query: &mut MemoryQuery, value: &Value| {
				let needle = value.as_str().unwrap_or_default().to_string();
				query.where_group(|group| {
					group.or_where_contains("name", &needle);
					group.or_where_contains("email", &needle);
				});
			}),
			Filter::make("archived")
				.hidden(true)
				.query(|query: &mut MemoryQuery, _value: &Value| {
					query.where_fn(|_| false);
				}),
		]
	}

	fn define_inline_actions(&self) -> Vec<InlineAction<Value>> {
		let source = self.source.clone();
		vec![
			InlineAction::make("promote").handler(move |record: Value, _params| {
				let source = source.clone();
				async move {
					let mut query = MemoryQuery::new();
					query.where_eq("id", record["id"].clone());
					source.update(&query, |user| user["role"] = json!("admin"));
					Ok(None)
				}
			}),
			InlineAction::make("download").handler(|record: Value, _params| async move {
				let mut response = Response::new(Bytes::from(record["name"].to_string()));
				*response.status_mut() = StatusCode::OK;
				Ok(Some(response))
			}),
			InlineAction::make("explode")
				.handler(|_record: Value, _params| async move { Err(anyhow::anyhow!("boom")) }),
			InlineAction::make("impersonate").hidden(true),
		]
	}

	fn define_bulk_actions(&self) -> Vec<BulkAction<MemoryQuery, Value>> {
		let source = self.source.clone();
		let log = self.log.clone();
		vec![
			BulkAction::make("delete").on_query(move |query: MemoryQuery, _params| {
				let source = source.clone();
				async move {
					source.delete(&query);
					Ok(None)
				}
			}),
			BulkAction::make("collect")
				.deselect(false)
				.on_records(move |records: Vec<Value>, _params| {
					let log = log.clone();
					async move {
						for record in records {
							log.push(record["id"].clone());
						}
						Ok(None)
					}
				}),
			BulkAction::make("noop"),
		]
	}
}

/// Ten users, alternating admin and member roles
#[fixture]
pub fn sample_users() -> Vec<Value> {
	let names = [
		"Alice", "Bob", "Carol", "Dave", "Eve", "Frank", "Grace", "Heidi", "Ivan", "Judy",
	];
	names
		.iter()
		.enumerate()
		.map(|(index, name)| {
			json!({
				"id": index + 1,
				"name": name,
				"email": format!("{}@example.com", name.to_lowercase()),
				"role": if index % 2 == 0 { "admin" } else { "member" },
				"password": "secret",
			})
		})
		.collect()
}

#[fixture]
pub fn source(sample_users: Vec<Value>) -> MemorySource {
	MemorySource::new("id", sample_users)
}

#[fixture]
pub fn users_table(source: MemorySource) -> UsersTable {
	UsersTable::new(source)
}

/// Binds `table` to `uri` with the default configuration
pub fn instance(table: UsersTable, uri: &str) -> TableInstance<UsersTable> {
	instance_with(table, uri, TableConfig::new())
}

pub fn instance_with(
	table: UsersTable,
	uri: &str,
	config: TableConfig,
) -> TableInstance<UsersTable> {
	let request = TableRequest::from_uri(uri).unwrap();
	TableInstance::new(table, request, Arc::new(config))
}

/// Registry serving `table` for every request
pub fn registry_for(table: UsersTable) -> Arc<TableRegistry> {
	let registry = TableRegistry::new(Arc::new(TableConfig::new()));
	registry.register_table(move |_request| table.clone());
	Arc::new(registry)
}

/// Ids of a record list
pub fn ids(records: &[Value]) -> Vec<i64> {
	records.iter().filter_map(|record| record["id"].as_i64()).collect()
}
