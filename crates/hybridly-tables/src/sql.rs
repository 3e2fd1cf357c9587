//! SQL query backend built on `sea-query`
//!
//! [`SqlQuery`] shapes a `SELECT` over one table. Executing it is left to
//! the application's own [`RecordSource`](crate::query::RecordSource)
//! implementation, which renders the statements with the builder of its
//! database driver.
//!
//! ```
//! use hybridly_tables::query::TableQuery;
//! use hybridly_tables::sql::SqlQuery;
//! use hybridly_tables_types::SortDirection;
//! use sea_query::{Expr, PostgresQueryBuilder};
//!
//! let mut query = SqlQuery::new("users");
//! query.and_where(Expr::col(SqlQuery::column("active")).eq(true));
//! query.order_by("name", SortDirection::Asc);
//!
//! assert_eq!(
//!     query.to_sql(PostgresQueryBuilder),
//!     r#"SELECT * FROM "users" WHERE "active" = TRUE ORDER BY "name" ASC"#
//! );
//! ```

use crate::query::TableQuery;
use hybridly_tables_types::{RecordKey, SortDirection};
use sea_query::{
	Alias, Asterisk, ColumnRef, Cond, Condition, ConditionExpression, Expr, Func, IntoColumnRef,
	Order, Query, QueryBuilder, SelectStatement, SimpleExpr, Value,
};

/// `SELECT` builder over a single table
#[derive(Debug, Clone)]
pub struct SqlQuery {
	table: String,
	columns: Vec<String>,
	// OR of AND-joined conditions
	branches: Vec<Condition>,
	orders: Vec<(String, SortDirection)>,
}

impl SqlQuery {
	/// Selects every column of `table`
	pub fn new(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			columns: Vec::new(),
			branches: Vec::new(),
			orders: Vec::new(),
		}
	}

	/// Restricts the selected columns
	pub fn columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();
		self
	}

	/// Table name
	pub fn table(&self) -> &str {
		&self.table
	}

	/// Column reference for a field path
	///
	/// `name` refers to a column, `posts.title` to a qualified column.
	pub fn column(field: &str) -> ColumnRef {
		match field.split_once('.') {
			Some((table, column)) => (Alias::new(table), Alias::new(column)).into_column_ref(),
			None => Alias::new(field).into_column_ref(),
		}
	}

	/// Adds a condition joined by AND
	pub fn and_where<C: Into<ConditionExpression>>(&mut self, condition: C) -> &mut Self {
		match self.branches.pop() {
			Some(branch) => self.branches.push(branch.add(condition)),
			None => self.branches.push(Cond::all().add(condition)),
		}
		self
	}

	/// Starts a new OR branch with `condition`
	pub fn or_where<C: Into<ConditionExpression>>(&mut self, condition: C) -> &mut Self {
		self.branches.push(Cond::all().add(condition));
		self
	}

	/// Combined `WHERE` condition, if any predicate was added
	pub fn condition(&self) -> Option<Condition> {
		match self.branches.as_slice() {
			[] => None,
			[branch] => Some(branch.clone()),
			branches => Some(
				branches
					.iter()
					.cloned()
					.fold(Cond::any(), |any, branch| any.add(branch)),
			),
		}
	}

	/// Ordering clauses, in application order
	pub fn orders(&self) -> &[(String, SortDirection)] {
		&self.orders
	}

	fn base_statement(&self) -> SelectStatement {
		let mut select = Query::select();
		select.from(Alias::new(&self.table));
		if let Some(condition) = self.condition() {
			select.cond_where(condition);
		}
		select
	}

	/// Full `SELECT` statement
	pub fn statement(&self) -> SelectStatement {
		let mut select = self.base_statement();
		if self.columns.is_empty() {
			select.column(Asterisk);
		} else {
			select.columns(self.columns.iter().map(|column| Self::column(column)));
		}

		for (field, direction) in &self.orders {
			let order = match direction {
				SortDirection::Asc => Order::Asc,
				SortDirection::Desc => Order::Desc,
			};
			select.order_by(Self::column(field), order);
		}

		select
	}

	/// `SELECT COUNT(*)` over the same predicates
	pub fn count_statement(&self) -> SelectStatement {
		let mut select = self.base_statement();
		select.expr(Func::count(Expr::col(Asterisk)));
		select
	}

	/// Statement limited to one page
	pub fn page_statement(&self, offset: usize, limit: usize) -> SelectStatement {
		let mut select = self.statement();
		select.offset(offset as u64).limit(limit as u64);
		select
	}

	/// Renders the full statement with inlined values
	pub fn to_sql<B: QueryBuilder>(&self, builder: B) -> String {
		self.statement().to_string(builder)
	}
}

fn key_values(keys: &[RecordKey]) -> Vec<SimpleExpr> {
	keys.iter()
		.map(|key| match key {
			RecordKey::Int(value) => Value::BigInt(Some(*value)).into(),
			RecordKey::Str(value) => Value::String(Some(Box::new(value.clone()))).into(),
		})
		.collect()
}

impl TableQuery for SqlQuery {
	fn where_in(&mut self, field: &str, keys: &[RecordKey]) {
		if keys.is_empty() {
			self.and_where(Expr::cust("1 = 2"));
			return;
		}
		self.and_where(Expr::col(Self::column(field)).is_in(key_values(keys)));
	}

	fn where_not_in(&mut self, field: &str, keys: &[RecordKey]) {
		if keys.is_empty() {
			return;
		}
		self.and_where(Expr::col(Self::column(field)).is_not_in(key_values(keys)));
	}

	fn order_by(&mut self, field: &str, direction: SortDirection) {
		self.orders.push((field.to_string(), direction));
	}

	fn where_group<F>(&mut self, build: F)
	where
		F: FnOnce(&mut Self),
	{
		let mut group = SqlQuery::new(self.table.clone());
		build(&mut group);
		if let Some(condition) = group.condition() {
			self.and_where(condition);
		}
		self.orders.extend(group.orders);
	}
}
