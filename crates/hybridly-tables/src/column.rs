//! Column descriptors

use crate::component::{
	Component, ComponentKind, Configurable, HasMetadata, Hideable, Labeled, Named, Typed,
	Visibility, default_label,
};
use crate::error::Result;
use crate::evaluate::{Evaluable, Params};
use crate::query::TableQuery;
use hybridly_tables_types::{ColumnPayload, SortDirection};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

type SortFn<Q> = Arc<dyn Fn(&mut Q, SortDirection) + Send + Sync>;

/// Column-specific settings exposed to column configurators
pub trait ColumnSettings: Configurable {
	fn set_sortable(&mut self, sortable: bool);

	fn set_searchable(&mut self, searchable: bool);

	fn is_sortable(&self) -> bool;
}

/// Declarative table column
///
/// Columns are not sortable until [`Column::sortable`], [`Column::sortable_by`]
/// or [`Column::sort_using`] is called.
///
/// # Example
///
/// ```
/// use hybridly_tables::column::Column;
/// use hybridly_tables::memory::MemoryQuery;
///
/// let column: Column<MemoryQuery> = Column::make("author.name").sortable(true);
///
/// assert_eq!(column.label_text(), "Author name");
/// assert_eq!(column.sort_columns(), vec!["name".to_string()]);
/// ```
pub struct Column<Q> {
	name: String,
	label: String,
	kind: String,
	visibility: Visibility,
	sortable: bool,
	sort_columns: Option<Vec<String>>,
	sort_using: Option<SortFn<Q>>,
	searchable: bool,
	search_columns: Option<Vec<String>>,
	metadata: Evaluable<Value>,
}

impl<Q: TableQuery> Column<Q> {
	/// Creates a column with a label derived from its name
	pub fn make(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			label: default_label(&name),
			name,
			kind: "column".to_string(),
			visibility: Visibility::default(),
			sortable: false,
			sort_columns: None,
			sort_using: None,
			searchable: false,
			search_columns: None,
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

	/// Toggles sorting over the default sort columns
	pub fn sortable(mut self, sortable: bool) -> Self {
		self.sortable = sortable;
		self.sort_columns = None;
		self.sort_using = None;
		self
	}

	/// Sorts by the given fields, in order
	pub fn sortable_by<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.sortable = true;
		self.sort_columns = Some(fields.into_iter().map(Into::into).collect());
		self.sort_using = None;
		self
	}

	/// Sorts with a custom query closure
	pub fn sort_using<F>(mut self, sort: F) -> Self
	where
		F: Fn(&mut Q, SortDirection) + Send + Sync + 'static,
	{
		self.sortable = true;
		self.sort_using = Some(Arc::new(sort));
		self
	}

	pub fn searchable(mut self, searchable: bool) -> Self {
		self.searchable = searchable;
		self
	}

	/// Marks the column searchable over explicit fields
	pub fn search_columns<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.searchable = true;
		self.search_columns = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	pub fn metadata(mut self, metadata: impl Into<Evaluable<Value>>) -> Self {
		self.metadata = metadata.into();
		self
	}

	/// Resolved label
	pub fn label_text(&self) -> &str {
		&self.label
	}

	pub fn is_searchable(&self) -> bool {
		self.searchable
	}

	/// Fields ordered when the column is sorted
	///
	/// Defaults to the final segment of the column name.
	pub fn sort_columns(&self) -> Vec<String> {
		self.sort_columns
			.clone()
			.unwrap_or_else(|| vec![self.final_segment()])
	}

	/// Fields searched when the column is searchable
	pub fn search_fields(&self) -> Vec<String> {
		self.search_columns
			.clone()
			.unwrap_or_else(|| vec![self.final_segment()])
	}

	fn final_segment(&self) -> String {
		self.name
			.rsplit('.')
			.next()
			.unwrap_or(&self.name)
			.to_string()
	}

	/// Applies this column's ordering to `query`
	pub fn apply_sort(&self, query: &mut Q, direction: SortDirection) {
		if let Some(sort) = &self.sort_using {
			sort(query, direction);
			return;
		}

		for field in self.sort_columns() {
			query.order_by(&field, direction);
		}
	}

	/// Serializable view of the column
	pub fn payload(&self, base: &Params) -> Result<ColumnPayload> {
		Ok(ColumnPayload {
			name: self.name.clone(),
			label: self.label.clone(),
			kind: self.kind.clone(),
			hidden: self.is_hidden(base)?,
			sortable: self.sortable,
			searchable: self.searchable,
			sort_columns: self.sort_columns(),
			search_columns: self.search_fields(),
			metadata: HasMetadata::metadata(self, base)?,
		})
	}
}

impl<Q> Named for Column<Q> {
	fn name(&self) -> &str {
		&self.name
	}
}

impl<Q> Labeled for Column<Q> {
	fn label(&self) -> &str {
		&self.label
	}
}

impl<Q> Typed for Column<Q> {
	fn kind(&self) -> &str {
		&self.kind
	}
}

impl<Q> Component for Column<Q> {
	fn component_kind(&self) -> ComponentKind {
		ComponentKind::Column
	}
}

impl<Q> Hideable for Column<Q> {
	fn visibility(&self) -> &Visibility {
		&self.visibility
	}
}

impl<Q> HasMetadata for Column<Q> {
	fn metadata_field(&self) -> &Evaluable<Value> {
		&self.metadata
	}
}

impl<Q> Configurable for Column<Q> {
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

impl<Q> ColumnSettings for Column<Q> {
	fn set_sortable(&mut self, sortable: bool) {
		self.sortable = sortable;
	}

	fn set_searchable(&mut self, searchable: bool) {
		self.searchable = searchable;
	}

	fn is_sortable(&self) -> bool {
		self.sortable
	}
}

impl<Q> fmt::Debug for Column<Q> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Column")
			.field("name", &self.name)
			.field("label", &self.label)
			.field("kind", &self.kind)
			.field("sortable", &self.sortable)
			.field("sort_columns", &self.sort_columns)
			.field("searchable", &self.searchable)
			.finish_non_exhaustive()
	}
}
