//! Sort tokens and the current sort state
//!
//! A sort token is a column name optionally prefixed with `-` for descending
//! order (`name` sorts ascending, `-name` descending). Several tokens may be
//! joined with commas to sort by multiple columns.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	/// Ascending order
	Asc,
	/// Descending order
	Desc,
}

impl SortDirection {
	/// Returns the opposite direction
	pub fn toggle(&self) -> Self {
		match self {
			Self::Asc => Self::Desc,
			Self::Desc => Self::Asc,
		}
	}

	/// Splits a sort token into its direction and column name
	///
	/// Every leading `-` is stripped from the name; the direction is
	/// descending when the token starts with `-`.
	///
	/// ```
	/// use hybridly_tables_types::SortDirection;
	///
	/// assert_eq!(SortDirection::parse_token("name"), (SortDirection::Asc, "name"));
	/// assert_eq!(SortDirection::parse_token("-name"), (SortDirection::Desc, "name"));
	/// ```
	pub fn parse_token(token: &str) -> (Self, &str) {
		let name = token.trim_start_matches('-');
		if token.starts_with('-') {
			(Self::Desc, name)
		} else {
			(Self::Asc, name)
		}
	}

	/// Builds the token sorting `column` in this direction
	pub fn token_for(&self, column: &str) -> String {
		match self {
			Self::Asc => column.to_string(),
			Self::Desc => format!("-{}", column),
		}
	}

	/// SQL keyword for this direction
	pub fn as_sql(&self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

/// Sort resolved from the current request for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSort {
	/// Raw token as it appeared in the request
	pub sort: String,
	/// Column name
	pub column: String,
	/// Direction
	pub direction: SortDirection,
	/// Token to request when the sort is toggled; `None` clears the sort
	#[serde(default)]
	pub next: Option<String>,
}

impl CurrentSort {
	/// Parses a single sort token
	///
	/// Returns `None` for tokens without a column name (`""`, `"-"`).
	pub fn from_token(token: &str) -> Option<Self> {
		let (direction, column) = SortDirection::parse_token(token);
		if column.is_empty() {
			return None;
		}

		let next = match direction {
			SortDirection::Asc => Some(SortDirection::Desc.token_for(column)),
			SortDirection::Desc => None,
		};

		Some(Self {
			sort: token.to_string(),
			column: column.to_string(),
			direction,
			next,
		})
	}
}

/// Current sorts keyed by column name, in request order
pub type CurrentSorts = IndexMap<String, CurrentSort>;

/// Token requested by toggling an unsorted column
pub fn initial_token(column: &str) -> String {
	SortDirection::Asc.token_for(column)
}

/// Resolves a comma-separated sort parameter
///
/// Tokens naming columns rejected by `is_sortable` are dropped, and so are
/// empty tokens. When a column appears more than once, its first token wins.
///
/// ```
/// use hybridly_tables_types::{SortDirection, parse_sorts};
///
/// let sorts = parse_sorts("-created_at,name,secret", |column| column != "secret");
/// assert_eq!(sorts.len(), 2);
/// assert_eq!(sorts["created_at"].direction, SortDirection::Desc);
/// assert_eq!(sorts["name"].next.as_deref(), Some("-name"));
/// ```
pub fn parse_sorts<F>(raw: &str, is_sortable: F) -> CurrentSorts
where
	F: Fn(&str) -> bool,
{
	let mut sorts = CurrentSorts::new();

	for token in raw.split(',').map(str::trim) {
		let Some(sort) = CurrentSort::from_token(token) else {
			continue;
		};

		if !is_sortable(&sort.column) || sorts.contains_key(&sort.column) {
			continue;
		}

		sorts.insert(sort.column.clone(), sort);
	}

	sorts
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("name", SortDirection::Asc, "name", Some("-name"))]
	#[case("-name", SortDirection::Desc, "name", None)]
	#[case("--name", SortDirection::Desc, "name", None)]
	fn test_from_token(
		#[case] token: &str,
		#[case] direction: SortDirection,
		#[case] column: &str,
		#[case] next: Option<&str>,
	) {
		let sort = CurrentSort::from_token(token).unwrap();
		assert_eq!(sort.sort, token);
		assert_eq!(sort.column, column);
		assert_eq!(sort.direction, direction);
		assert_eq!(sort.next.as_deref(), next);
	}

	#[rstest]
	#[case("")]
	#[case("-")]
	#[case("---")]
	fn test_from_token_without_column(#[case] token: &str) {
		assert!(CurrentSort::from_token(token).is_none());
	}

	#[rstest]
	fn test_parse_sorts_keeps_request_order() {
		let sorts = parse_sorts("name,-email", |_| true);
		let columns: Vec<_> = sorts.keys().cloned().collect();
		assert_eq!(columns, vec!["name", "email"]);
	}

	#[rstest]
	fn test_parse_sorts_first_duplicate_wins() {
		let sorts = parse_sorts("-name,name", |_| true);
		assert_eq!(sorts.len(), 1);
		assert_eq!(sorts["name"].direction, SortDirection::Desc);
	}

	#[rstest]
	fn test_parse_sorts_drops_unknown_columns() {
		let sorts = parse_sorts("unknown,-missing", |column| column == "name");
		assert!(sorts.is_empty());
	}

	#[rstest]
	fn test_parse_sorts_trims_whitespace() {
		let sorts = parse_sorts(" name , ,-email ", |_| true);
		assert_eq!(sorts.len(), 2);
		assert_eq!(sorts["email"].sort, "-email");
	}

	#[rstest]
	fn test_serializes_lowercase_direction() {
		let sort = CurrentSort::from_token("-name").unwrap();
		let json = serde_json::to_value(&sort).unwrap();
		assert_eq!(json["direction"], "desc");
		assert!(json["next"].is_null());
	}
}
