//! Capabilities shared by columns, filters and actions

use crate::error::Result;
use crate::evaluate::{Evaluable, Params, Rule};
use serde_json::Value;
use std::fmt;

/// Kind of descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
	Column,
	Filter,
	InlineAction,
	BulkAction,
}

impl ComponentKind {
	/// Name of the default evaluation parameter bound to the descriptor
	pub fn parameter_name(&self) -> &'static str {
		match self {
			Self::Column => "column",
			Self::Filter => "filter",
			Self::InlineAction | Self::BulkAction => "action",
		}
	}
}

impl fmt::Display for ComponentKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Column => f.write_str("column"),
			Self::Filter => f.write_str("filter"),
			Self::InlineAction => f.write_str("inline action"),
			Self::BulkAction => f.write_str("bulk action"),
		}
	}
}

/// Snapshot of a descriptor handed to its own rules
///
/// Bound under the descriptor's default parameter name (`column`, `filter`
/// or `action`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
	pub kind: ComponentKind,
	pub name: String,
	pub label: String,
}

impl fmt::Display for ComponentInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} `{}`", self.kind, self.name)
	}
}

/// Descriptor identified by name
pub trait Named {
	fn name(&self) -> &str;
}

/// Descriptor with a human-readable label
pub trait Labeled {
	fn label(&self) -> &str;
}

/// Descriptor with a type identifier for the front end
pub trait Typed {
	fn kind(&self) -> &str;
}

/// Descriptor carrying default evaluation parameters
pub trait Component: Named + Labeled {
	/// Kind of descriptor
	fn component_kind(&self) -> ComponentKind;

	/// Descriptor snapshot
	fn info(&self) -> ComponentInfo {
		ComponentInfo {
			kind: self.component_kind(),
			name: self.name().to_string(),
			label: self.label().to_string(),
		}
	}

	/// `base` extended with the descriptor's own default parameter
	fn evaluation_params(&self, base: &Params) -> Params {
		let info = self.info();
		base.merged(&Params::new().with(info.kind.parameter_name(), info))
	}
}

/// Descriptor that may be hidden
pub trait Hideable: Component {
	fn visibility(&self) -> &Visibility;

	/// Resolves visibility with the descriptor's default parameters
	fn is_hidden(&self, base: &Params) -> Result<bool> {
		let params = self.evaluation_params(base);
		self.visibility().is_hidden(&params, &self.info().to_string())
	}
}

/// Descriptor with free-form metadata
pub trait HasMetadata: Component {
	fn metadata_field(&self) -> &Evaluable<Value>;

	/// Resolves metadata with the descriptor's default parameters
	fn metadata(&self, base: &Params) -> Result<Value> {
		let params = self.evaluation_params(base);
		self.metadata_field()
			.evaluate(&params, &self.info().to_string())
	}
}

/// Settings shared by every descriptor, exposed to configurators
///
/// Table configurators registered on [`TableConfig`](crate::config::TableConfig)
/// receive descriptors through this trait right after the table defines them.
pub trait Configurable: Component + Typed {
	fn set_label(&mut self, label: String);

	fn set_kind(&mut self, kind: String);

	fn visibility_mut(&mut self) -> &mut Visibility;

	fn set_metadata(&mut self, metadata: Evaluable<Value>);
}

/// `hidden` and `visible` rules
///
/// A descriptor is hidden when its hidden rule is true or its visible rule
/// is false.
#[derive(Debug, Clone)]
pub struct Visibility {
	hidden: Evaluable<bool>,
	visible: Evaluable<bool>,
}

impl Default for Visibility {
	fn default() -> Self {
		Self {
			hidden: Evaluable::Literal(false),
			visible: Evaluable::Literal(true),
		}
	}
}

impl Visibility {
	pub fn set_hidden(&mut self, hidden: impl Into<Evaluable<bool>>) {
		self.hidden = hidden.into();
	}

	pub fn set_visible(&mut self, visible: impl Into<Evaluable<bool>>) {
		self.visible = visible.into();
	}

	pub fn is_hidden(&self, params: &Params, component: &str) -> Result<bool> {
		if self.hidden.evaluate(params, component)? {
			return Ok(true);
		}

		Ok(!self.visible.evaluate(params, component)?)
	}
}

/// Builds a hidden/visible rule from a predicate over the parameter set
pub fn when<F>(func: F) -> Rule<bool>
where
	F: Fn(&Params) -> bool + Send + Sync + 'static,
{
	Rule::from_fn(func)
}

/// Default label for a descriptor name
///
/// Splits on `_`, `-`, `.`, whitespace and lower-to-upper case boundaries,
/// then renders the words in sentence case.
///
/// ```
/// use hybridly_tables::component::default_label;
///
/// assert_eq!(default_label("created_at"), "Created at");
/// assert_eq!(default_label("firstName"), "First name");
/// assert_eq!(default_label("author.email"), "Author email");
/// ```
pub fn default_label(name: &str) -> String {
	let mut words: Vec<String> = Vec::new();
	let mut current = String::new();
	let mut previous_lower = false;

	for ch in name.chars() {
		if ch == '_' || ch == '-' || ch == '.' || ch.is_whitespace() {
			if !current.is_empty() {
				words.push(std::mem::take(&mut current));
			}
			previous_lower = false;
			continue;
		}

		if ch.is_uppercase() && previous_lower && !current.is_empty() {
			words.push(std::mem::take(&mut current));
		}

		previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
		current.extend(ch.to_lowercase());
	}

	if !current.is_empty() {
		words.push(current);
	}

	let sentence = words.join(" ");
	let mut chars = sentence.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
