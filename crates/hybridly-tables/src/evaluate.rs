//! Deferred descriptor fields
//!
//! Descriptor fields such as `hidden`, `metadata` or `deselect` are either a
//! literal value or a rule computed from named contextual parameters. The
//! evaluation site assembles a [`Params`] set from the descriptor's default
//! parameters (`column`, `filter`, `action`), the table-level defaults
//! (`request`) and any caller overrides, then resolves the field.
//!
//! # Example
//!
//! ```
//! use hybridly_tables::evaluate::{Evaluable, Params, Rule};
//!
//! let hidden: Evaluable<bool> = Rule::new(["role"], |params: &Params| {
//!     params.get::<String>("role").map(|role| role != "admin").unwrap_or(true)
//! })
//! .into();
//!
//! let params = Params::new().with("role", "admin".to_string());
//! assert_eq!(hidden.evaluate(&params, "column `secret`").unwrap(), false);
//!
//! // Rules fail loudly when their parameters are not supplied
//! assert!(hidden.evaluate(&Params::new(), "column `secret`").is_err());
//! ```

use crate::error::{Result, TableError};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Named parameters available to deferred rules
#[derive(Clone, Default)]
pub struct Params {
	values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Params {
	/// Creates an empty parameter set
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a parameter, builder style
	pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
		self.insert(name, value);
		self
	}

	/// Adds or replaces a parameter
	pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
		self.values.insert(name.into(), Arc::new(value));
	}

	/// Adds or replaces a parameter from an existing `Arc`
	pub fn insert_arc<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: Arc<T>) {
		self.values.insert(name.into(), value);
	}

	/// Reads a parameter by name and type
	///
	/// Returns `None` when the parameter is absent or has a different type.
	pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
		self.values.get(name).and_then(|value| value.downcast_ref::<T>())
	}

	/// Whether a parameter with this name exists
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Returns a copy of `self` extended with `overrides`; overrides win
	pub fn merged(&self, overrides: &Params) -> Params {
		let mut values = self.values.clone();
		for (name, value) in &overrides.values {
			values.insert(name.clone(), Arc::clone(value));
		}
		Params { values }
	}

	/// Parameter names, unordered
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}
}

impl fmt::Debug for Params {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<_> = self.names().collect();
		names.sort_unstable();
		f.debug_struct("Params").field("names", &names).finish()
	}
}

/// Function computing a field from named parameters
pub struct Rule<T> {
	requires: Vec<String>,
	func: Arc<dyn Fn(&Params) -> T + Send + Sync>,
}

impl<T> Rule<T> {
	/// Creates a rule requiring the given parameter names
	pub fn new<I, S, F>(requires: I, func: F) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
		F: Fn(&Params) -> T + Send + Sync + 'static,
	{
		Self {
			requires: requires.into_iter().map(Into::into).collect(),
			func: Arc::new(func),
		}
	}

	/// Creates a rule without declared requirements
	pub fn from_fn<F>(func: F) -> Self
	where
		F: Fn(&Params) -> T + Send + Sync + 'static,
	{
		Self {
			requires: Vec::new(),
			func: Arc::new(func),
		}
	}

	/// Declared parameter names
	pub fn requires(&self) -> &[String] {
		&self.requires
	}

	fn call(&self, params: &Params, component: &str) -> Result<T> {
		if let Some(missing) = self.requires.iter().find(|name| !params.contains(name)) {
			return Err(TableError::MissingParameter {
				parameter: missing.clone(),
				component: component.to_string(),
			});
		}

		Ok((self.func)(params))
	}
}

impl<T> Clone for Rule<T> {
	fn clone(&self) -> Self {
		Self {
			requires: self.requires.clone(),
			func: Arc::clone(&self.func),
		}
	}
}

impl<T> fmt::Debug for Rule<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Rule")
			.field("requires", &self.requires)
			.finish_non_exhaustive()
	}
}

/// Literal value or deferred rule
#[derive(Debug, Clone)]
pub enum Evaluable<T> {
	/// Returned unchanged
	Literal(T),
	/// Computed at evaluation time
	Rule(Rule<T>),
}

impl<T: Clone> Evaluable<T> {
	/// Resolves the field against a parameter set
	///
	/// `component` names the owning descriptor in error messages.
	pub fn evaluate(&self, params: &Params, component: &str) -> Result<T> {
		match self {
			Self::Literal(value) => Ok(value.clone()),
			Self::Rule(rule) => rule.call(params, component),
		}
	}

	/// Whether this field is a literal
	pub fn is_literal(&self) -> bool {
		matches!(self, Self::Literal(_))
	}
}

impl<T: Default> Default for Evaluable<T> {
	fn default() -> Self {
		Self::Literal(T::default())
	}
}

impl<T> From<Rule<T>> for Evaluable<T> {
	fn from(rule: Rule<T>) -> Self {
		Self::Rule(rule)
	}
}

impl From<bool> for Evaluable<bool> {
	fn from(value: bool) -> Self {
		Self::Literal(value)
	}
}

impl From<serde_json::Value> for Evaluable<serde_json::Value> {
	fn from(value: serde_json::Value) -> Self {
		Self::Literal(value)
	}
}
