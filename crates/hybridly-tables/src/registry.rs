//! Identity-token resolution
//!
//! Action requests name their table by identity token. The registry maps
//! tokens to factories that build a fresh, request-scoped component;
//! components that turn out not to be tables are rejected with
//! [`TableError::NotATable`].

use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::request::TableRequest;
use crate::table::{Table, TableInstance, table_id};
use async_trait::async_trait;
use bytes::Bytes;
use http::Response;
use hybridly_tables_types::{RecordKey, Selection};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased request-scoped table
#[async_trait]
pub trait DynTable: Send + Sync {
	/// Identity token
	fn id(&self) -> &str;

	/// Whether a visible inline action has this name
	fn has_inline_action(&self, name: &str) -> Result<bool>;

	/// Whether a visible bulk action has this name
	fn has_bulk_action(&self, name: &str) -> Result<bool>;

	/// Loads the record and runs the inline action
	async fn execute_inline(
		&self,
		action: &str,
		record: &RecordKey,
	) -> Result<Option<Response<Bytes>>>;

	/// Builds the selection query and runs the bulk action
	async fn execute_bulk(
		&self,
		action: &str,
		selection: &Selection,
	) -> Result<Option<Response<Bytes>>>;

	/// Serialized table payload
	async fn payload_json(&self) -> Result<Value>;
}

#[async_trait]
impl<T: Table> DynTable for TableInstance<T> {
	fn id(&self) -> &str {
		TableInstance::id(self)
	}

	fn has_inline_action(&self, name: &str) -> Result<bool> {
		Ok(self.find_inline_action(name)?.is_some())
	}

	fn has_bulk_action(&self, name: &str) -> Result<bool> {
		Ok(self.find_bulk_action(name)?.is_some())
	}

	async fn execute_inline(
		&self,
		action: &str,
		record: &RecordKey,
	) -> Result<Option<Response<Bytes>>> {
		self.execute_inline_action(action, record).await
	}

	async fn execute_bulk(
		&self,
		action: &str,
		selection: &Selection,
	) -> Result<Option<Response<Bytes>>> {
		self.execute_bulk_action(action, selection).await
	}

	async fn payload_json(&self) -> Result<Value> {
		Ok(serde_json::to_value(self.payload().await?)?)
	}
}

/// Component a registry entry resolves to
pub trait Resolvable: Send + Sync {
	/// Name of the concrete component type
	fn type_name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}

	/// Converts into a table, if this component is one
	fn into_table(self: Box<Self>) -> Option<Box<dyn DynTable>> {
		None
	}
}

impl<T: Table> Resolvable for TableInstance<T> {
	fn into_table(self: Box<Self>) -> Option<Box<dyn DynTable>> {
		Some(self)
	}
}

type Factory = Arc<dyn Fn(&TableRequest, &Arc<TableConfig>) -> Box<dyn Resolvable> + Send + Sync>;

/// Registry of resolvable components keyed by identity token
///
/// # Example
///
/// ```
/// use hybridly_tables::prelude::*;
/// use std::sync::Arc;
///
/// struct TagsTable(MemorySource);
///
/// impl Table for TagsTable {
///     type Source = MemorySource;
///
///     fn source(&self) -> &MemorySource {
///         &self.0
///     }
/// }
///
/// let registry = TableRegistry::new(Arc::new(TableConfig::new()));
/// let source = MemorySource::new("id", vec![]);
/// registry.register_table(move |_request| TagsTable(source.clone()));
///
/// let request = TableRequest::from_uri("/").unwrap();
/// let table = registry.resolve_table(table_id::<TagsTable>(), &request).unwrap();
/// assert_eq!(table.id(), table_id::<TagsTable>());
/// ```
pub struct TableRegistry {
	config: Arc<TableConfig>,
	factories: RwLock<HashMap<String, Factory>>,
}

impl TableRegistry {
	pub fn new(config: Arc<TableConfig>) -> Self {
		Self {
			config,
			factories: RwLock::new(HashMap::new()),
		}
	}

	pub fn config(&self) -> &Arc<TableConfig> {
		&self.config
	}

	/// Registers a table under its identity token
	///
	/// `factory` builds the table for each incoming request.
	pub fn register_table<T, F>(&self, factory: F) -> &'static str
	where
		T: Table,
		F: Fn(&TableRequest) -> T + Send + Sync + 'static,
	{
		let id = table_id::<T>();
		self.register(id, move |request, config| {
			Box::new(TableInstance::new(factory(request), request.clone(), Arc::clone(config)))
		});
		id
	}

	/// Registers an arbitrary component under `id`
	pub fn register<F>(&self, id: impl Into<String>, factory: F)
	where
		F: Fn(&TableRequest, &Arc<TableConfig>) -> Box<dyn Resolvable> + Send + Sync + 'static,
	{
		let id = id.into();
		tracing::debug!(id = %id, "Registered table component");
		self.factories.write().insert(id, Arc::new(factory));
	}

	pub fn contains(&self, id: &str) -> bool {
		self.factories.read().contains_key(id)
	}

	/// Registered identity tokens, sorted
	pub fn ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.factories.read().keys().cloned().collect();
		ids.sort();
		ids
	}

	/// Builds the component registered under `id`
	pub fn resolve(&self, id: &str, request: &TableRequest) -> Result<Box<dyn Resolvable>> {
		let factory = self
			.factories
			.read()
			.get(id)
			.cloned()
			.ok_or_else(|| TableError::UnknownTable(id.to_string()))?;

		Ok(factory(request, &self.config))
	}

	/// Builds the table registered under `id`
	pub fn resolve_table(&self, id: &str, request: &TableRequest) -> Result<Box<dyn DynTable>> {
		let component = self.resolve(id, request)?;
		let type_name = component.type_name();

		component.into_table().ok_or_else(|| TableError::NotATable {
			id: id.to_string(),
			type_name: type_name.to_string(),
		})
	}
}

impl fmt::Debug for TableRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TableRegistry")
			.field("config", &self.config)
			.field("ids", &self.ids())
			.finish()
	}
}
