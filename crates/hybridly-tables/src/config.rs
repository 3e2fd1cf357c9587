//! Table configuration
//!
//! [`TableConfig`] is built once by the application and handed to every
//! [`TableInstance`](crate::table::TableInstance) it creates. Configurators
//! registered on it run against each descriptor of their kind, in
//! registration order, right after the table defines its descriptors.
//!
//! ```
//! use hybridly_tables::column::ColumnSettings;
//! use hybridly_tables::component::{Configurable, Labeled, Typed};
//! use hybridly_tables::config::TableConfig;
//!
//! let config = TableConfig::new()
//!     .records_per_page(25)
//!     .configure_columns(|column| {
//!         if column.kind() == "date" {
//!             column.set_sortable(true);
//!         }
//!     })
//!     .configure_bulk_actions(|action| {
//!         action.set_label(action.label().to_uppercase());
//!     });
//!
//! assert_eq!(config.per_page(), 25);
//! ```
//!
//! The serializable subset lives in [`TableSettings`], which can be loaded
//! from TOML:
//!
//! ```
//! use hybridly_tables::config::TableSettings;
//!
//! let settings = TableSettings::from_toml_str("records_per_page = 50").unwrap();
//! assert_eq!(settings.records_per_page, 50);
//! assert_eq!(settings.endpoint_path, "/hybridly");
//! ```

use crate::column::ColumnSettings;
use crate::component::Configurable;
use crate::error::{Result, TableError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Default page size
pub const DEFAULT_RECORDS_PER_PAGE: usize = 15;

/// Default action endpoint path
pub const DEFAULT_ENDPOINT_PATH: &str = "/hybridly";

/// Default primary-key name
pub const DEFAULT_KEY_NAME: &str = "id";

/// Column configurator
pub type ColumnConfigurator = Arc<dyn Fn(&mut dyn ColumnSettings) + Send + Sync>;

/// Filter and action configurator
pub type Configurator = Arc<dyn Fn(&mut dyn Configurable) + Send + Sync>;

/// Configuration threaded through table construction
#[derive(Clone)]
pub struct TableConfig {
	records_per_page: usize,
	endpoint_path: String,
	default_key_name: String,
	column_configurators: Vec<ColumnConfigurator>,
	filter_configurators: Vec<Configurator>,
	inline_action_configurators: Vec<Configurator>,
	bulk_action_configurators: Vec<Configurator>,
}

impl Default for TableConfig {
	fn default() -> Self {
		Self {
			records_per_page: DEFAULT_RECORDS_PER_PAGE,
			endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
			default_key_name: DEFAULT_KEY_NAME.to_string(),
			column_configurators: Vec::new(),
			filter_configurators: Vec::new(),
			inline_action_configurators: Vec::new(),
			bulk_action_configurators: Vec::new(),
		}
	}
}

impl TableConfig {
	/// Creates the default configuration
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the page size used by tables that do not override it
	pub fn records_per_page(mut self, records_per_page: usize) -> Self {
		self.records_per_page = records_per_page.max(1);
		self
	}

	/// Sets the path the action endpoint is mounted on
	pub fn endpoint_path(mut self, path: impl Into<String>) -> Self {
		self.endpoint_path = path.into();
		self
	}

	/// Sets the key name used when a record source reports none
	pub fn default_key_name(mut self, key_name: impl Into<String>) -> Self {
		self.default_key_name = key_name.into();
		self
	}

	pub fn configure_columns<F>(mut self, configure: F) -> Self
	where
		F: Fn(&mut dyn ColumnSettings) + Send + Sync + 'static,
	{
		self.column_configurators.push(Arc::new(configure));
		self
	}

	pub fn configure_filters<F>(mut self, configure: F) -> Self
	where
		F: Fn(&mut dyn Configurable) + Send + Sync + 'static,
	{
		self.filter_configurators.push(Arc::new(configure));
		self
	}

	pub fn configure_inline_actions<F>(mut self, configure: F) -> Self
	where
		F: Fn(&mut dyn Configurable) + Send + Sync + 'static,
	{
		self.inline_action_configurators.push(Arc::new(configure));
		self
	}

	pub fn configure_bulk_actions<F>(mut self, configure: F) -> Self
	where
		F: Fn(&mut dyn Configurable) + Send + Sync + 'static,
	{
		self.bulk_action_configurators.push(Arc::new(configure));
		self
	}

	pub fn per_page(&self) -> usize {
		self.records_per_page
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint_path
	}

	pub fn key_name(&self) -> &str {
		&self.default_key_name
	}

	pub(crate) fn apply_column_configurators(&self, column: &mut dyn ColumnSettings) {
		for configure in &self.column_configurators {
			configure(column);
		}
	}

	pub(crate) fn apply_filter_configurators(&self, filter: &mut dyn Configurable) {
		for configure in &self.filter_configurators {
			configure(filter);
		}
	}

	pub(crate) fn apply_inline_action_configurators(&self, action: &mut dyn Configurable) {
		for configure in &self.inline_action_configurators {
			configure(action);
		}
	}

	pub(crate) fn apply_bulk_action_configurators(&self, action: &mut dyn Configurable) {
		for configure in &self.bulk_action_configurators {
			configure(action);
		}
	}
}

impl fmt::Debug for TableConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TableConfig")
			.field("records_per_page", &self.records_per_page)
			.field("endpoint_path", &self.endpoint_path)
			.field("default_key_name", &self.default_key_name)
			.field("column_configurators", &self.column_configurators.len())
			.field("filter_configurators", &self.filter_configurators.len())
			.field("inline_action_configurators", &self.inline_action_configurators.len())
			.field("bulk_action_configurators", &self.bulk_action_configurators.len())
			.finish()
	}
}

/// Serializable table settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
	/// Page size
	pub records_per_page: usize,
	/// Action endpoint path
	pub endpoint_path: String,
	/// Primary-key name used when a record source reports none
	pub default_key_name: String,
}

impl Default for TableSettings {
	fn default() -> Self {
		Self {
			records_per_page: DEFAULT_RECORDS_PER_PAGE,
			endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
			default_key_name: DEFAULT_KEY_NAME.to_string(),
		}
	}
}

impl TableSettings {
	/// Parses settings from a TOML document
	pub fn from_toml_str(content: &str) -> Result<Self> {
		toml::from_str(content).map_err(|e| TableError::Config {
			message: e.to_string(),
		})
	}

	/// Loads settings from a TOML file
	///
	/// # Errors
	///
	/// Returns [`TableError::Config`] if the file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| TableError::Config {
			message: format!("{}: {}", path.as_ref().display(), e),
		})?;

		Self::from_toml_str(&content)
	}

	/// Builds a configuration without configurators
	pub fn into_config(self) -> TableConfig {
		TableConfig::new()
			.records_per_page(self.records_per_page)
			.endpoint_path(self.endpoint_path)
			.default_key_name(self.default_key_name)
	}
}

impl From<TableSettings> for TableConfig {
	fn from(settings: TableSettings) -> Self {
		settings.into_config()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let config = TableConfig::default();
		assert_eq!(config.per_page(), 15);
		assert_eq!(config.endpoint(), "/hybridly");
		assert_eq!(config.key_name(), "id");
	}

	#[rstest]
	fn test_settings_from_toml() {
		let settings = TableSettings::from_toml_str(
			r#"
			records_per_page = 30
			endpoint_path = "/tables/actions"
			default_key_name = "uuid"
			"#,
		)
		.unwrap();

		let config = settings.into_config();
		assert_eq!(config.per_page(), 30);
		assert_eq!(config.endpoint(), "/tables/actions");
		assert_eq!(config.key_name(), "uuid");
	}

	#[rstest]
	fn test_invalid_settings() {
		let error = TableSettings::from_toml_str("records_per_page = \"many\"").unwrap_err();
		assert!(matches!(error, TableError::Config { .. }));
	}

	#[rstest]
	fn test_zero_page_size_is_clamped() {
		assert_eq!(TableConfig::new().records_per_page(0).per_page(), 1);
	}
}
