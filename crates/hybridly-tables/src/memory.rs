//! In-memory record source over JSON records
//!
//! [`MemorySource`] keeps records as `serde_json::Value` objects and
//! evaluates [`MemoryQuery`] predicates against them. Predicates compose
//! like SQL: consecutive `where_*` clauses are joined by AND, an `or_where_*`
//! clause starts a new OR branch, and [`TableQuery::where_group`] nests a
//! parenthesized group.
//!
//! ```
//! use hybridly_tables::memory::{MemoryQuery, MemorySource};
//! use hybridly_tables::query::TableQuery;
//! use serde_json::json;
//!
//! let mut query = MemoryQuery::new();
//! query.where_eq("active", json!(true));
//! query.where_group(|group| {
//!     group.where_contains("name", "al");
//!     group.or_where_contains("name", "bo");
//! });
//!
//! assert!(query.matches(&json!({ "name": "Alice", "active": true })));
//! assert!(!query.matches(&json!({ "name": "Bob", "active": false })));
//! assert!(!query.matches(&json!({ "name": "Carol", "active": true })));
//! ```

use crate::error::Result;
use crate::query::{RecordSource, TableQuery};
use async_trait::async_trait;
use hybridly_tables_types::{RecordKey, SortDirection};
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
enum Clause {
	Predicate(Predicate),
	Group(Conditions),
}

impl Clause {
	fn matches(&self, record: &Value) -> bool {
		match self {
			Self::Predicate(predicate) => predicate(record),
			Self::Group(conditions) => conditions.matches(record),
		}
	}
}

/// OR of AND-joined clause lists
#[derive(Clone, Default)]
struct Conditions {
	branches: Vec<Vec<Clause>>,
}

impl Conditions {
	fn and(&mut self, clause: Clause) {
		match self.branches.last_mut() {
			Some(branch) => branch.push(clause),
			None => self.branches.push(vec![clause]),
		}
	}

	fn or(&mut self, clause: Clause) {
		self.branches.push(vec![clause]);
	}

	fn is_empty(&self) -> bool {
		self.branches.is_empty()
	}

	fn matches(&self, record: &Value) -> bool {
		self.is_empty()
			|| self
				.branches
				.iter()
				.any(|branch| branch.iter().all(|clause| clause.matches(record)))
	}

	fn clause_count(&self) -> usize {
		self.branches.iter().map(Vec::len).sum()
	}
}

/// Query over JSON records
#[derive(Clone, Default)]
pub struct MemoryQuery {
	conditions: Conditions,
	orders: Vec<(String, SortDirection)>,
}

impl MemoryQuery {
	/// Creates a query matching every record
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an AND predicate
	pub fn where_fn<F>(&mut self, predicate: F) -> &mut Self
	where
		F: Fn(&Value) -> bool + Send + Sync + 'static,
	{
		self.conditions.and(Clause::Predicate(Arc::new(predicate)));
		self
	}

	/// Adds an OR predicate
	pub fn or_where_fn<F>(&mut self, predicate: F) -> &mut Self
	where
		F: Fn(&Value) -> bool + Send + Sync + 'static,
	{
		self.conditions.or(Clause::Predicate(Arc::new(predicate)));
		self
	}

	/// `field = value`, joined by AND
	pub fn where_eq(&mut self, field: &str, value: Value) -> &mut Self {
		let field = field.to_string();
		self.where_fn(move |record| field_value(record, &field) == Some(&value))
	}

	/// `field = value`, joined by OR
	pub fn or_where_eq(&mut self, field: &str, value: Value) -> &mut Self {
		let field = field.to_string();
		self.or_where_fn(move |record| field_value(record, &field) == Some(&value))
	}

	/// Case-insensitive substring match, joined by AND
	pub fn where_contains(&mut self, field: &str, needle: &str) -> &mut Self {
		let field = field.to_string();
		let needle = needle.to_lowercase();
		self.where_fn(move |record| contains(record, &field, &needle))
	}

	/// Case-insensitive substring match, joined by OR
	pub fn or_where_contains(&mut self, field: &str, needle: &str) -> &mut Self {
		let field = field.to_string();
		let needle = needle.to_lowercase();
		self.or_where_fn(move |record| contains(record, &field, &needle))
	}

	/// Whether a record satisfies every predicate
	pub fn matches(&self, record: &Value) -> bool {
		self.conditions.matches(record)
	}

	/// Ordering clauses, in application order
	pub fn orders(&self) -> &[(String, SortDirection)] {
		&self.orders
	}

	/// Number of top-level and grouped predicate clauses
	pub fn clause_count(&self) -> usize {
		self.conditions.clause_count()
	}

	/// Filters and sorts a record list
	pub fn apply<'a, I>(&self, records: I) -> Vec<Value>
	where
		I: IntoIterator<Item = &'a Value>,
	{
		let mut matched: Vec<Value> = records
			.into_iter()
			.filter(|record| self.matches(record))
			.cloned()
			.collect();

		if !self.orders.is_empty() {
			matched.sort_by(|left, right| {
				self.orders
					.iter()
					.map(|(field, direction)| {
						let ordering = compare_json(
							field_value(left, field).unwrap_or(&Value::Null),
							field_value(right, field).unwrap_or(&Value::Null),
						);
						match direction {
							SortDirection::Asc => ordering,
							SortDirection::Desc => ordering.reverse(),
						}
					})
					.find(|ordering| ordering.is_ne())
					.unwrap_or(Ordering::Equal)
			});
		}

		matched
	}
}

impl fmt::Debug for MemoryQuery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryQuery")
			.field("clauses", &self.clause_count())
			.field("orders", &self.orders)
			.finish()
	}
}

impl TableQuery for MemoryQuery {
	fn where_in(&mut self, field: &str, keys: &[RecordKey]) {
		let field = field.to_string();
		let keys = keys.to_vec();
		self.where_fn(move |record| {
			field_value(record, &field)
				.is_some_and(|value| keys.iter().any(|key| key.matches_json(value)))
		});
	}

	fn where_not_in(&mut self, field: &str, keys: &[RecordKey]) {
		let field = field.to_string();
		let keys = keys.to_vec();
		self.where_fn(move |record| {
			!field_value(record, &field)
				.is_some_and(|value| keys.iter().any(|key| key.matches_json(value)))
		});
	}

	fn order_by(&mut self, field: &str, direction: SortDirection) {
		self.orders.push((field.to_string(), direction));
	}

	fn where_group<F>(&mut self, build: F)
	where
		F: FnOnce(&mut Self),
	{
		let mut group = MemoryQuery::new();
		build(&mut group);
		if !group.conditions.is_empty() {
			self.conditions.and(Clause::Group(group.conditions));
		}
		// Orderings added inside a group still apply to the whole query
		self.orders.extend(group.orders);
	}
}

/// Reads a dotted field path (`author.name`) out of a record
pub fn field_value<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
	path.split('.')
		.try_fold(record, |value, segment| value.get(segment))
}

fn contains(record: &Value, field: &str, needle: &str) -> bool {
	match field_value(record, field) {
		Some(Value::String(text)) => text.to_lowercase().contains(needle),
		Some(Value::Number(number)) => number.to_string().contains(needle),
		_ => false,
	}
}

fn type_rank(value: &Value) -> u8 {
	match value {
		Value::Null => 0,
		Value::Bool(_) => 1,
		Value::Number(_) => 2,
		Value::String(_) => 3,
		Value::Array(_) => 4,
		Value::Object(_) => 5,
	}
}

/// Total order over JSON values used for sorting
///
/// Values of different types order by type (null first); numbers compare
/// numerically, strings lexicographically.
pub fn compare_json(left: &Value, right: &Value) -> Ordering {
	match (left, right) {
		(Value::Bool(a), Value::Bool(b)) => a.cmp(b),
		(Value::Number(a), Value::Number(b)) => {
			let a = a.as_f64().unwrap_or(0.0);
			let b = b.as_f64().unwrap_or(0.0);
			a.partial_cmp(&b).unwrap_or(Ordering::Equal)
		}
		(Value::String(a), Value::String(b)) => a.cmp(b),
		(Value::Array(a), Value::Array(b)) => a.len().cmp(&b.len()),
		_ => type_rank(left).cmp(&type_rank(right)),
	}
}

/// Shared in-memory record collection
///
/// Clones share the same records, so action handlers can capture a clone
/// and mutate the collection the table reads from.
#[derive(Clone)]
pub struct MemorySource {
	key_name: String,
	records: Arc<RwLock<Vec<Value>>>,
}

impl MemorySource {
	/// Creates a source keyed by `key_name`
	pub fn new(key_name: impl Into<String>, records: Vec<Value>) -> Self {
		Self {
			key_name: key_name.into(),
			records: Arc::new(RwLock::new(records)),
		}
	}

	/// Snapshot of every record
	pub fn records(&self) -> Vec<Value> {
		self.records.read().clone()
	}

	/// Number of records
	pub fn len(&self) -> usize {
		self.records.read().len()
	}

	/// Whether the collection is empty
	pub fn is_empty(&self) -> bool {
		self.records.read().is_empty()
	}

	/// Appends a record
	pub fn insert(&self, record: Value) {
		self.records.write().push(record);
	}

	/// Deletes every record matching `query`, returning how many were removed
	pub fn delete(&self, query: &MemoryQuery) -> usize {
		let mut records = self.records.write();
		let before = records.len();
		records.retain(|record| !query.matches(record));
		before - records.len()
	}

	/// Applies `update` to every record matching `query`
	pub fn update<F>(&self, query: &MemoryQuery, mut update: F) -> usize
	where
		F: FnMut(&mut Value),
	{
		let mut records = self.records.write();
		let mut updated = 0;
		for record in records.iter_mut().filter(|record| query.matches(record)) {
			update(record);
			updated += 1;
		}
		updated
	}
}

impl fmt::Debug for MemorySource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemorySource")
			.field("key_name", &self.key_name)
			.field("records", &self.len())
			.finish()
	}
}

#[async_trait]
impl RecordSource for MemorySource {
	type Record = Value;
	type Query = MemoryQuery;

	fn key_name(&self) -> &str {
		&self.key_name
	}

	fn query(&self) -> MemoryQuery {
		MemoryQuery::new()
	}

	async fn find(&self, key: &RecordKey) -> Result<Option<Value>> {
		Ok(self
			.records
			.read()
			.iter()
			.find(|record| {
				field_value(record, &self.key_name).is_some_and(|value| key.matches_json(value))
			})
			.cloned())
	}

	async fn get(&self, query: &MemoryQuery) -> Result<Vec<Value>> {
		Ok(query.apply(self.records.read().iter()))
	}

	async fn count(&self, query: &MemoryQuery) -> Result<usize> {
		Ok(self
			.records
			.read()
			.iter()
			.filter(|record| query.matches(record))
			.count())
	}

	async fn fetch(&self, query: &MemoryQuery, offset: usize, limit: usize) -> Result<Vec<Value>> {
		Ok(query
			.apply(self.records.read().iter())
			.into_iter()
			.skip(offset)
			.take(limit)
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	#[fixture]
	fn records() -> Vec<Value> {
		vec![
			json!({ "id": 1, "name": "Alice", "age": 31, "team": { "name": "core" } }),
			json!({ "id": 2, "name": "bob", "age": 25, "team": { "name": "web" } }),
			json!({ "id": 3, "name": "Charlie", "age": null, "team": { "name": "core" } }),
		]
	}

	#[rstest]
	fn test_empty_query_matches_everything(records: Vec<Value>) {
		assert_eq!(MemoryQuery::new().apply(&records).len(), 3);
	}

	#[rstest]
	fn test_or_branch_follows_sql_precedence(records: Vec<Value>) {
		// id = 1 AND name = 'bob' OR id = 3  =>  (id = 1 AND name = 'bob') OR id = 3
		let mut query = MemoryQuery::new();
		query.where_eq("id", json!(1));
		query.where_eq("name", json!("bob"));
		query.or_where_eq("id", json!(3));

		let ids: Vec<_> = query.apply(&records).iter().map(|r| r["id"].clone()).collect();
		assert_eq!(ids, vec![json!(3)]);
	}

	#[rstest]
	fn test_group_is_combined_by_and(records: Vec<Value>) {
		let mut query = MemoryQuery::new();
		query.where_eq("team.name", json!("core"));
		query.where_group(|group| {
			group.where_eq("id", json!(2));
			group.or_where_eq("id", json!(3));
		});

		let ids: Vec<_> = query.apply(&records).iter().map(|r| r["id"].clone()).collect();
		assert_eq!(ids, vec![json!(3)]);
	}

	#[rstest]
	fn test_empty_group_adds_no_clause() {
		let mut query = MemoryQuery::new();
		query.where_group(|_| {});
		assert_eq!(query.clause_count(), 0);
	}

	#[rstest]
	fn test_order_by_multiple_fields(records: Vec<Value>) {
		let mut query = MemoryQuery::new();
		query.order_by("team.name", SortDirection::Asc);
		query.order_by("id", SortDirection::Desc);

		let ids: Vec<_> = query.apply(&records).iter().map(|r| r["id"].clone()).collect();
		assert_eq!(ids, vec![json!(3), json!(1), json!(2)]);
	}

	#[rstest]
	fn test_nulls_sort_first(records: Vec<Value>) {
		let mut query = MemoryQuery::new();
		query.order_by("age", SortDirection::Asc);

		let ids: Vec<_> = query.apply(&records).iter().map(|r| r["id"].clone()).collect();
		assert_eq!(ids, vec![json!(3), json!(2), json!(1)]);
	}

	#[rstest]
	fn test_where_in_and_not_in(records: Vec<Value>) {
		let keys = vec![RecordKey::Int(1), RecordKey::Str("3".into())];

		let mut included = MemoryQuery::new();
		included.where_in("id", &keys);
		assert_eq!(included.apply(&records).len(), 2);

		let mut excluded = MemoryQuery::new();
		excluded.where_not_in("id", &keys);
		assert_eq!(excluded.apply(&records).len(), 1);

		let mut nothing = MemoryQuery::new();
		nothing.where_in("id", &[]);
		assert!(nothing.apply(&records).is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_source_find_fetch_and_delete(records: Vec<Value>) {
		let source = MemorySource::new("id", records);

		let found = source.find(&RecordKey::Int(2)).await.unwrap();
		assert_eq!(found.unwrap()["name"], "bob");
		assert!(source.find(&RecordKey::Int(9)).await.unwrap().is_none());

		let mut query = source.query();
		query.order_by("id", SortDirection::Desc);
		let page = source.fetch(&query, 1, 5).await.unwrap();
		assert_eq!(page.len(), 2);
		assert_eq!(page[0]["id"], 2);

		let mut doomed = source.query();
		doomed.where_contains("name", "AL");
		assert_eq!(source.delete(&doomed), 1);
		assert_eq!(source.count(&source.query()).await.unwrap(), 2);
	}
}
