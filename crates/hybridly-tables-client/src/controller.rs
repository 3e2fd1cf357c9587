//! Table controller
//!
//! A [`TableController`] is bound to one table property of the current view.
//! It exposes column, filter and record view-models derived from the table
//! payload, and turns sorting, filtering and action calls into navigations.
//! Every navigation response that carries the table property replaces the
//! controller's payload; when requests overlap, the last response to resolve
//! wins.

use crate::bulk::BulkSelect;
use crate::error::{ClientError, Result};
use crate::navigation::{NavigationResponse, Navigator, ParamPatch, Visit};
use crate::paginator::Paginator;
use hybridly_tables_types::{
	ActionCall, ActionPayload, BulkActionPayload, BulkActionRequest, ColumnPayload, CurrentSorts,
	FilterPayload, InlineActionRequest, RecordKey, ScopedKeys, Selection, SortDirection,
	TablePayload, initial_token,
};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Default URL of the action endpoint
pub const DEFAULT_ENDPOINT: &str = "/hybridly";

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	/// URL action calls are posted to
	pub endpoint: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_string(),
		}
	}
}

impl ClientConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();
		self
	}
}

/// Controller for one table property
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use hybridly_tables_client::{NavigationResponse, Navigator, ParamPatch, TableController, Visit};
/// use hybridly_tables_types::RecordKey;
/// use serde_json::{Map, Value, json};
/// use std::rc::Rc;
///
/// struct Offline;
///
/// #[async_trait(?Send)]
/// impl Navigator for Offline {
///     async fn reload(&self, _patch: ParamPatch) -> anyhow::Result<NavigationResponse> {
///         Ok(NavigationResponse::default())
///     }
///
///     async fn navigate(&self, _visit: Visit) -> anyhow::Result<NavigationResponse> {
///         Ok(NavigationResponse::default())
///     }
/// }
///
/// let properties = json!({
///     "users": {
///         "id": "app::UsersTable",
///         "keyName": "id",
///         "records": {
///             "data": [{ "id": 1, "name": "Alice" }],
///             "current_page": 1, "last_page": 1, "per_page": 15, "total": 1,
///             "from": 1, "to": 1, "path": "/users",
///             "first_page_url": "/users?page=1", "last_page_url": "/users?page=1",
///             "next_page_url": null, "prev_page_url": null, "links": []
///         },
///         "columns": [{ "name": "name", "label": "Name", "type": "column", "sortable": true }],
///         "filters": [],
///         "inlineActions": [],
///         "bulkActions": []
///     }
/// });
/// let properties: Map<String, Value> = properties.as_object().cloned().unwrap();
///
/// let table = TableController::<Value>::new(&properties, "users", Rc::new(Offline)).unwrap();
/// let records = table.records();
/// records[0].toggle(None);
/// assert!(table.bulk().selected(&RecordKey::Int(1)));
/// assert!(!table.is_sorting("name", None));
/// ```
pub struct TableController<R> {
	key: String,
	state: Rc<RefCell<TablePayload<R>>>,
	bulk: BulkSelect,
	navigator: Rc<dyn Navigator>,
	config: ClientConfig,
}

impl<R> TableController<R>
where
	R: Serialize + DeserializeOwned + Clone,
{
	/// Binds a controller to `properties[key]`
	pub fn new(
		properties: &Map<String, Value>,
		key: impl Into<String>,
		navigator: Rc<dyn Navigator>,
	) -> Result<Self> {
		let key = key.into();
		let payload = decode(properties, &key)?;

		Ok(Self {
			key,
			state: Rc::new(RefCell::new(payload)),
			bulk: BulkSelect::new(),
			navigator,
			config: ClientConfig::default(),
		})
	}

	pub fn with_config(mut self, config: ClientConfig) -> Self {
		self.config = config;
		self
	}

	/// Property the controller is bound to
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Selection shared by the record view-models
	pub fn bulk(&self) -> &BulkSelect {
		&self.bulk
	}

	/// Snapshot of the current payload
	pub fn payload(&self) -> TablePayload<R> {
		self.state.borrow().clone()
	}

	/// Table identity token
	pub fn id(&self) -> String {
		self.state.borrow().id.clone()
	}

	/// Scoped parameter names
	pub fn keys(&self) -> ScopedKeys {
		ScopedKeys::new(self.state.borrow().scope.as_deref())
	}

	pub fn current_sorts(&self) -> CurrentSorts {
		self.state.borrow().current_sorts.clone()
	}

	pub fn current_filters(&self) -> IndexMap<String, Value> {
		self.state.borrow().current_filters.clone()
	}

	pub fn inline_actions(&self) -> Vec<ActionPayload> {
		self.state.borrow().inline_actions.clone()
	}

	pub fn bulk_actions(&self) -> Vec<BulkActionPayload> {
		self.state.borrow().bulk_actions.clone()
	}

	/// Replaces the payload from a new set of view properties
	pub fn refresh(&self, properties: &Map<String, Value>) -> Result<()> {
		let payload = decode(properties, &self.key)?;
		*self.state.borrow_mut() = payload;
		Ok(())
	}

	fn absorb(&self, response: &NavigationResponse) -> Result<()> {
		if response.properties.contains_key(&self.key) {
			self.refresh(&response.properties)
		} else {
			tracing::trace!(key = %self.key, "Navigation response carries no table property");
			Ok(())
		}
	}

	async fn reload(&self, patch: ParamPatch) -> Result<NavigationResponse> {
		tracing::debug!(key = %self.key, params = ?patch, "Reloading table");
		let response = self
			.navigator
			.reload(patch)
			.await
			.map_err(ClientError::Navigation)?;
		self.absorb(&response)?;
		Ok(response)
	}

	async fn navigate(&self, call: &ActionCall) -> Result<NavigationResponse> {
		tracing::debug!(
			key = %self.key,
			action = %call.action(),
			kind = %call.kind(),
			"Executing table action"
		);
		let visit = Visit::post(self.config.endpoint.clone(), serde_json::to_value(call)?);
		let response = self
			.navigator
			.navigate(visit)
			.await
			.map_err(ClientError::Navigation)?;
		self.absorb(&response)?;
		Ok(response)
	}

	/// Clears sorts, filters and the page
	pub async fn reset(&self) -> Result<NavigationResponse> {
		let keys = self.keys();
		let mut patch = ParamPatch::new();
		patch.remove(keys.sorts).remove(keys.filters).remove(keys.page);
		self.reload(patch).await
	}

	pub async fn reset_filters(&self) -> Result<NavigationResponse> {
		let mut patch = ParamPatch::new();
		patch.remove(self.keys().filters);
		self.reload(patch).await
	}

	pub async fn reset_sorts(&self) -> Result<NavigationResponse> {
		let mut patch = ParamPatch::new();
		patch.remove(self.keys().sorts);
		self.reload(patch).await
	}

	/// Sets one filter, keeping the others
	///
	/// An empty string clears the filter. Unknown filters issue no request.
	pub async fn apply_filter(
		&self,
		filter: &str,
		value: impl Into<Value>,
	) -> Result<Option<NavigationResponse>> {
		let known = self
			.state
			.borrow()
			.filters
			.iter()
			.any(|candidate| candidate.name == filter);
		if !known {
			tracing::debug!(key = %self.key, filter = %filter, "Ignoring unknown filter");
			return Ok(None);
		}

		let value = match value.into() {
			Value::String(text) if text.is_empty() => Value::Null,
			value => value,
		};

		let mut patch = ParamPatch::new();
		patch.set(self.keys().filters, json!({ filter: value }));
		self.reload(patch).await.map(Some)
	}

	/// Sorts by `column` alone
	pub async fn sort(&self, column: &str, direction: SortDirection) -> Result<NavigationResponse> {
		let mut patch = ParamPatch::new();
		patch.set(self.keys().sorts, direction.token_for(column));
		self.reload(patch).await
	}

	/// Cycles the sort of `column`, keeping the other sorted columns
	///
	/// Without a direction the column moves unsorted → ascending →
	/// descending → unsorted, following the server's `next` token. With a
	/// direction the column is sorted that way. Non-sortable columns issue
	/// no request.
	pub async fn toggle_sort(
		&self,
		column: &str,
		direction: Option<SortDirection>,
	) -> Result<Option<NavigationResponse>> {
		let sortable = self
			.state
			.borrow()
			.columns
			.iter()
			.any(|candidate| candidate.sortable && candidate.name == column);
		if !sortable {
			tracing::debug!(key = %self.key, column = %column, "Ignoring non-sortable column");
			return Ok(None);
		}

		let sorts = self.current_sorts();
		let token = match direction {
			Some(direction) => Some(direction.token_for(column)),
			None => match sorts.get(column) {
				Some(current) => current.next.clone(),
				None => Some(initial_token(column)),
			},
		};

		let mut patch = ParamPatch::new();
		match replace_sort_token(&sorts, column, token) {
			Some(tokens) => patch.set(self.keys().sorts, tokens),
			None => patch.remove(self.keys().sorts),
		};
		self.reload(patch).await.map(Some)
	}

	/// Whether `column` is sorted, optionally in `direction`
	pub fn is_sorting(&self, column: &str, direction: Option<SortDirection>) -> bool {
		let state = self.state.borrow();
		match state.current_sorts.get(column) {
			Some(sort) => direction.is_none_or(|direction| sort.direction == direction),
			None => false,
		}
	}

	/// Posts an inline action for one record
	pub async fn execute_inline_action(
		&self,
		action: &str,
		record: RecordKey,
	) -> Result<NavigationResponse> {
		let call = ActionCall::Inline(InlineActionRequest {
			action: action.to_string(),
			id: self.id(),
			record,
		});
		self.navigate(&call).await
	}

	/// Posts a bulk action for the current selection
	///
	/// After success the selection is cleared unless `deselect` is
	/// `Some(false)`, or it is `None` and the action declares
	/// `deselect: false`.
	pub async fn execute_bulk_action(
		&self,
		action: &str,
		deselect: Option<bool>,
	) -> Result<NavigationResponse> {
		let selection = self.bulk.selection();
		let call = ActionCall::Bulk(BulkActionRequest::new(action, self.id(), &selection));
		let declared = self
			.state
			.borrow()
			.bulk_actions
			.iter()
			.find(|candidate| candidate.action.name == action)
			.map(|candidate| candidate.deselect);

		let response = self.navigate(&call).await?;

		if deselect.or(declared).unwrap_or(true) {
			self.bulk.deselect_all();
		}
		Ok(response)
	}

	pub fn select_all(&self) {
		self.bulk.select_all();
	}

	pub fn deselect_all(&self) {
		self.bulk.deselect_all();
	}

	pub fn is_selected(&self, record: &RecordKey) -> bool {
		self.bulk.selected(record)
	}

	pub fn all_selected(&self) -> bool {
		self.bulk.all_selected()
	}

	pub fn selection(&self) -> Selection {
		self.bulk.selection()
	}

	/// Column view-models
	pub fn columns(&self) -> Vec<ColumnView<'_, R>> {
		self.state
			.borrow()
			.columns
			.iter()
			.cloned()
			.map(|column| ColumnView {
				column,
				controller: self,
			})
			.collect()
	}

	/// Filter view-models with their current values
	pub fn filters(&self) -> Vec<FilterView<'_, R>> {
		let state = self.state.borrow();
		state
			.filters
			.iter()
			.cloned()
			.map(|filter| FilterView {
				value: state
					.current_filters
					.get(&filter.name)
					.filter(|value| !value.is_null())
					.cloned(),
				filter,
				controller: self,
			})
			.collect()
	}

	/// Record view-models for the current page
	pub fn records(&self) -> Vec<RecordView<'_, R>> {
		let state = self.state.borrow();
		state
			.records
			.data
			.iter()
			.cloned()
			.map(|record| {
				let key = record_key(&record, &state.key_name);
				RecordView {
					selected: key.as_ref().is_some_and(|key| self.bulk.selected(key)),
					key,
					record,
					controller: self,
				}
			})
			.collect()
	}

	pub fn paginator(&self) -> Paginator {
		Paginator::new(&self.state.borrow().records)
	}
}

impl<R> fmt::Debug for TableController<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TableController")
			.field("key", &self.key)
			.field("id", &self.state.borrow().id)
			.field("selection", &self.bulk)
			.field("config", &self.config)
			.finish()
	}
}

fn decode<R: DeserializeOwned>(
	properties: &Map<String, Value>,
	key: &str,
) -> Result<TablePayload<R>> {
	let value = properties
		.get(key)
		.ok_or_else(|| ClientError::MissingProperty(key.to_string()))?;
	Ok(serde_json::from_value(value.clone())?)
}

fn record_key<R: Serialize>(record: &R, key_name: &str) -> Option<RecordKey> {
	let value = serde_json::to_value(record).ok()?;
	value.get(key_name).and_then(RecordKey::from_json)
}

/// Rebuilds the comma-separated sort list with `column` set to `token`
///
/// Other columns keep their tokens and positions; a newly sorted column is
/// appended, and `None` drops the column.
fn replace_sort_token(sorts: &CurrentSorts, column: &str, token: Option<String>) -> Option<String> {
	let mut tokens = Vec::with_capacity(sorts.len() + 1);
	let mut placed = false;

	for (name, sort) in sorts {
		if name == column {
			placed = true;
			if let Some(token) = &token {
				tokens.push(token.clone());
			}
		} else {
			tokens.push(sort.sort.clone());
		}
	}
	if !placed && let Some(token) = token {
		tokens.push(token);
	}

	(!tokens.is_empty()).then(|| tokens.join(","))
}

/// Column with sorting operations
pub struct ColumnView<'a, R> {
	pub column: ColumnPayload,
	controller: &'a TableController<R>,
}

impl<R> ColumnView<'_, R>
where
	R: Serialize + DeserializeOwned + Clone,
{
	pub async fn toggle_sort(&self) -> Result<Option<NavigationResponse>> {
		self.controller.toggle_sort(&self.column.name, None).await
	}

	pub async fn sort(&self, direction: SortDirection) -> Result<NavigationResponse> {
		self.controller.sort(&self.column.name, direction).await
	}

	pub fn is_sorting(&self, direction: Option<SortDirection>) -> bool {
		self.controller.is_sorting(&self.column.name, direction)
	}
}

/// Filter with its current value
pub struct FilterView<'a, R> {
	pub filter: FilterPayload,
	/// Value resolved by the server; `None` when inactive
	pub value: Option<Value>,
	controller: &'a TableController<R>,
}

impl<R> FilterView<'_, R>
where
	R: Serialize + DeserializeOwned + Clone,
{
	pub async fn apply(&self, value: impl Into<Value>) -> Result<Option<NavigationResponse>> {
		self.controller.apply_filter(&self.filter.name, value).await
	}
}

/// Record with selection and inline-action operations
pub struct RecordView<'a, R> {
	pub record: R,
	/// Primary key read from the record's key field
	pub key: Option<RecordKey>,
	/// Selection state when the view was built
	pub selected: bool,
	controller: &'a TableController<R>,
}

impl<R> RecordView<'_, R>
where
	R: Serialize + DeserializeOwned + Clone,
{
	/// Inline actions available on the record
	pub fn actions(&self) -> Vec<ActionPayload> {
		self.controller.inline_actions()
	}

	pub async fn execute(&self, action: &str) -> Result<NavigationResponse> {
		let key = self.require_key()?;
		self.controller.execute_inline_action(action, key).await
	}

	pub fn select(&self) {
		if let Some(key) = &self.key {
			self.controller.bulk.select([key.clone()]);
		}
	}

	pub fn deselect(&self) {
		if let Some(key) = &self.key {
			self.controller.bulk.deselect([key.clone()]);
		}
	}

	pub fn toggle(&self, force: Option<bool>) {
		if let Some(key) = &self.key {
			self.controller.bulk.toggle(key.clone(), force);
		}
	}

	/// Live selection state
	pub fn is_selected(&self) -> bool {
		self.key
			.as_ref()
			.is_some_and(|key| self.controller.bulk.selected(key))
	}

	fn require_key(&self) -> Result<RecordKey> {
		self.key.clone().ok_or_else(|| {
			ClientError::MissingProperty(self.controller.state.borrow().key_name.clone())
		})
	}
}
