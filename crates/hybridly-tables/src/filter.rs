//! Filter descriptors

use crate::component::{
	Component, ComponentKind, Configurable, HasMetadata, Hideable, Labeled, Named, Typed,
	Visibility, default_label,
};
use crate::error::Result;
use crate::evaluate::{Evaluable, Params};
use crate::query::TableQuery;
use hybridly_tables_types::FilterPayload;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

type FilterFn<Q> = Arc<dyn Fn(&mut Q, &Value) + Send + Sync>;

/// Declarative table filter
///
/// The current value of a filter comes from the request's filter map, or
/// from its default when the request does not mention it. Null values never
/// touch the query.
///
/// # Example
///
/// ```
/// use hybridly_tables::evaluate::Params;
/// use hybridly_tables::filter::Filter;
/// use hybridly_tables::memory::MemoryQuery;
/// use serde_json::{Value, json};
///
/// let status: Filter<MemoryQuery> = Filter::make("status").query(|query: &mut MemoryQuery, value: &Value| {
///     query.where_eq("status", value.clone());
/// });
///
/// let mut query = MemoryQuery::new();
/// status.apply(&mut query, &Value::Null, &Params::new()).unwrap();
/// assert_eq!(query.clause_count(), 0);
///
/// status.apply(&mut query, &json!("active"), &Params::new()).unwrap();
/// assert!(query.matches(&json!({ "status": "active" })));
/// ```
pub struct Filter<Q> {
	name: String,
	label: String,
	kind: String,
	visibility: Visibility,
	default: Option<Value>,
	query: Option<FilterFn<Q>>,
	base_query: Option<FilterFn<Q>>,
	metadata: Evaluable<Value>,
}

impl<Q: TableQuery> Filter<Q> {
	/// Creates a filter with a label derived from its name
	pub fn make(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			label: default_label(&name),
			name,
			kind: "custom".to_string(),
			visibility: Visibility::default(),
			default: None,
			query: None,
			base_query: None,
			metadata: Evaluable::Literal(json!({})),
		}
	}

	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	/// Type identifier sent to the front end
	pub fn kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = kind.into();
		self
	}

	pub fn hidden(mut self, hidden: impl Into<Evaluable<bool>>) -> Self {
		self.visibility.set_hidden(hidden);
		self
	}

	pub fn visible(mut self, visible: impl Into<Evaluable<bool>>) -> Self {
		self.visibility.set_visible(visible);
		self
	}

	/// Value used when the request carries none
	pub fn default(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(value.into());
		self
	}

	/// Predicate-applying closure
	///
	/// Runs inside the table's combined filter group; it may build
	/// disjunctions with the backend's `or_where` methods.
	pub fn query<F>(mut self, modifier: F) -> Self
	where
		F: Fn(&mut Q, &Value) + Send + Sync + 'static,
	{
		self.query = Some(Arc::new(modifier));
		self
	}

	/// Closure run on the base query before any filter predicate
	pub fn base_query<F>(mut self, modifier: F) -> Self
	where
		F: Fn(&mut Q, &Value) + Send + Sync + 'static,
	{
		self.base_query = Some(Arc::new(modifier));
		self
	}

	pub fn metadata(mut self, metadata: impl Into<Evaluable<Value>>) -> Self {
		self.metadata = metadata.into();
		self
	}

	pub fn default_value(&self) -> Option<&Value> {
		self.default.as_ref()
	}

	pub fn has_query_modifier(&self) -> bool {
		self.query.is_some()
	}

	fn skips(&self, value: &Value, base: &Params) -> Result<bool> {
		Ok(value.is_null() || self.is_hidden(base)?)
	}

	/// Applies the predicate closure to `query`
	///
	/// Does nothing when the filter is hidden, has no predicate closure, or
	/// `value` is null.
	pub fn apply(&self, query: &mut Q, value: &Value, base: &Params) -> Result<()> {
		let Some(modifier) = &self.query else {
			return Ok(());
		};
		if self.skips(value, base)? {
			return Ok(());
		}

		modifier(query, value);
		Ok(())
	}

	/// Applies the base-query closure to `query`
	///
	/// Same short-circuit rules as [`Filter::apply`].
	pub fn apply_to_base_query(&self, query: &mut Q, value: &Value, base: &Params) -> Result<()> {
		let Some(modifier) = &self.base_query else {
			return Ok(());
		};
		if self.skips(value, base)? {
			return Ok(());
		}

		modifier(query, value);
		Ok(())
	}

	/// Serializable view of the filter
	pub fn payload(&self, base: &Params) -> Result<FilterPayload> {
		Ok(FilterPayload {
			name: self.name.clone(),
			label: self.label.clone(),
			kind: self.kind.clone(),
			metadata: HasMetadata::metadata(self, base)?,
		})
	}
}

impl<Q> Named for Filter<Q> {
	fn name(&self) -> &str {
		&self.name
	}
}

impl<Q> Labeled for Filter<Q> {
	fn label(&self) -> &str {
		&self.label
	}
}

impl<Q> Typed for Filter<Q> {
	fn kind(&self) -> &str {
		&self.kind
	}
}

impl<Q> Component for Filter<Q> {
	fn component_kind(&self) -> ComponentKind {
		ComponentKind::Filter
	}
}

impl<Q> Hideable for Filter<Q> {
	fn visibility(&self) -> &Visibility {
		&self.visibility
	}
}

impl<Q> HasMetadata for Filter<Q> {
	fn metadata_field(&self) -> &Evaluable<Value> {
		&self.metadata
	}
}

impl<Q> Configurable for Filter<Q> {
	fn set_label(&mut self, label: String) {
		self.label = label;
	}

	fn set_kind(&mut self, kind: String) {
		self.kind = kind;
	}

	fn visibility_mut(&mut self) -> &mut Visibility {
		&mut self.visibility
	}

	fn set_metadata(&mut self, metadata: Evaluable<Value>) {
		self.metadata = metadata;
	}
}

impl<Q> fmt::Debug for Filter<Q> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Filter")
			.field("name", &self.name)
			.field("label", &self.label)
			.field("kind", &self.kind)
			.field("default", &self.default)
			.field("has_query", &self.query.is_some())
			.field("has_base_query", &self.base_query.is_some())
			.finish()
	}
}
