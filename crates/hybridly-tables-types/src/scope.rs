//! Query-parameter scoping
//!
//! Tables may declare a scope so several of them can live on the same page
//! without their parameters colliding: a table scoped `users` reads
//! `users-sorts`, `users-filters` and `users-page`.

/// Sort parameter name
pub const SORTS: &str = "sorts";
/// Filter map parameter name
pub const FILTERS: &str = "filters";
/// Page number parameter name
pub const PAGE: &str = "page";

/// Prefixes `key` with the scope, if any
///
/// ```
/// use hybridly_tables_types::scope::format_scope;
///
/// assert_eq!(format_scope(None, "sorts"), "sorts");
/// assert_eq!(format_scope(Some("users"), "sorts"), "users-sorts");
/// assert_eq!(format_scope(Some(""), "page"), "page");
/// ```
pub fn format_scope(scope: Option<&str>, key: &str) -> String {
	match scope {
		Some(scope) if !scope.is_empty() => format!("{}-{}", scope, key),
		_ => key.to_string(),
	}
}

/// Scoped names of the three table parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedKeys {
	/// Sort parameter
	pub sorts: String,
	/// Filter map parameter
	pub filters: String,
	/// Page parameter
	pub page: String,
}

impl ScopedKeys {
	/// Computes the parameter names for a scope
	pub fn new(scope: Option<&str>) -> Self {
		Self {
			sorts: format_scope(scope, SORTS),
			filters: format_scope(scope, FILTERS),
			page: format_scope(scope, PAGE),
		}
	}
}
