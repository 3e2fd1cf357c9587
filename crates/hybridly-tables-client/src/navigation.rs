//! Navigation collaborator and query-parameter patches
//!
//! The controller never performs HTTP itself. State changes are expressed
//! as a [`ParamPatch`] handed to [`Navigator::reload`], and actions as a
//! [`Visit`] handed to [`Navigator::navigate`]. The navigator returns the
//! view properties of the page it landed on.

use async_trait::async_trait;
use hybridly_tables_types::query::{decode_pairs, encode_pairs};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;
use url::form_urlencoded;

/// HTTP method of a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitMethod {
	Get,
	Post,
}

/// Outbound visit to a URL other than the current page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
	pub method: VisitMethod,
	pub url: String,
	/// Request body
	pub data: Value,
	/// Keep client-side component state across the visit
	pub preserve_state: bool,
}

impl Visit {
	/// State-preserving `POST` carrying `data`
	pub fn post(url: impl Into<String>, data: Value) -> Self {
		Self {
			method: VisitMethod::Post,
			url: url.into(),
			data,
			preserve_state: true,
		}
	}
}

/// Page reached by a visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationResponse {
	/// URL of the page, when known
	#[serde(default)]
	pub url: Option<String>,
	/// View properties of the page
	#[serde(default)]
	pub properties: Map<String, Value>,
}

impl NavigationResponse {
	pub fn new(properties: Map<String, Value>) -> Self {
		Self {
			url: None,
			properties,
		}
	}
}

/// Front-end router
///
/// Implementations run on a single-threaded event loop and may suspend
/// while the server answers.
#[async_trait(?Send)]
pub trait Navigator {
	/// Reloads the current page with `patch` merged into its query string
	async fn reload(&self, patch: ParamPatch) -> anyhow::Result<NavigationResponse>;

	/// Visits another URL
	async fn navigate(&self, visit: Visit) -> anyhow::Result<NavigationResponse>;
}

/// Changes to the current query parameters
///
/// Each entry sets or removes one top-level parameter. Object values are
/// deep-merged into the existing parameter, so patching
/// `filters = {"role": "admin"}` keeps the other filters; `null` members
/// remove the matching key.
///
/// # Example
///
/// ```
/// use hybridly_tables_client::ParamPatch;
/// use serde_json::json;
///
/// let mut patch = ParamPatch::new();
/// patch.set("filters", json!({ "role": "admin", "q": null }));
/// patch.remove("page");
///
/// let query = patch.apply_to_query("filters[q]=bob&filters[active]=1&page=3&sorts=name");
/// assert_eq!(query, "filters%5Bactive%5D=1&filters%5Brole%5D=admin&sorts=name");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamPatch {
	entries: IndexMap<String, Option<Value>>,
}

impl ParamPatch {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `key` to `value`; `null` removes it
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		let value = value.into();
		let value = (!value.is_null()).then_some(value);
		self.entries.insert(key.into(), value);
		self
	}

	/// Removes `key`
	pub fn remove(&mut self, key: impl Into<String>) -> &mut Self {
		self.entries.insert(key.into(), None);
		self
	}

	/// Patched value of `key`: `Some(None)` when the key is removed
	pub fn get(&self, key: &str) -> Option<Option<&Value>> {
		self.entries.get(key).map(Option::as_ref)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
		self.entries
			.iter()
			.map(|(key, value)| (key.as_str(), value.as_ref()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Applies the patch to decoded parameters
	pub fn apply_to_params(&self, params: &mut Map<String, Value>) {
		for (key, value) in &self.entries {
			match value {
				None => {
					params.remove(key);
				}
				Some(Value::Object(patch)) => match params.get_mut(key) {
					Some(Value::Object(existing)) => merge(existing, patch),
					_ => {
						let mut fresh = Map::new();
						merge(&mut fresh, patch);
						params.insert(key.clone(), Value::Object(fresh));
					}
				},
				Some(value) => {
					params.insert(key.clone(), value.clone());
				}
			}
		}
	}

	/// Applies the patch to a query string, returning the new query string
	pub fn apply_to_query(&self, query: &str) -> String {
		let query = query.trim_start_matches('?');
		let mut params = decode_pairs(form_urlencoded::parse(query.as_bytes()));
		self.apply_to_params(&mut params);

		form_urlencoded::Serializer::new(String::new())
			.extend_pairs(encode_pairs(&params))
			.finish()
	}

	/// Applies the patch to the query string of `url`
	pub fn apply_to_url(&self, url: &Url) -> Url {
		let mut patched = url.clone();
		let query = self.apply_to_query(url.query().unwrap_or_default());
		patched.set_query((!query.is_empty()).then_some(query.as_str()));
		patched
	}
}

fn merge(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
	for (key, value) in patch {
		match value {
			Value::Null => {
				target.remove(key);
			}
			Value::Object(nested) => match target.get_mut(key) {
				Some(Value::Object(existing)) => merge(existing, nested),
				_ => {
					let mut fresh = Map::new();
					merge(&mut fresh, nested);
					target.insert(key.clone(), Value::Object(fresh));
				}
			},
			value => {
				target.insert(key.clone(), value.clone());
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_remove_drops_parameter() {
		let mut patch = ParamPatch::new();
		patch.remove("sorts");
		assert_eq!(patch.apply_to_query("?sorts=-name&page=2"), "page=2");
	}

	#[rstest]
	fn test_set_null_is_removal() {
		let mut patch = ParamPatch::new();
		patch.set("users-page", Value::Null);
		assert_eq!(patch.get("users-page"), Some(None));
		assert_eq!(patch.apply_to_query("users-page=4"), "");
	}

	#[rstest]
	fn test_scalar_replaces_object() {
		let mut patch = ParamPatch::new();
		patch.set("filters", json!("none"));
		assert_eq!(patch.apply_to_query("filters[role]=admin"), "filters=none");
	}

	#[rstest]
	fn test_nested_merge() {
		let mut params = json!({ "filters": { "range": { "from": "1", "to": "9" } } })
			.as_object()
			.cloned()
			.unwrap();

		let mut patch = ParamPatch::new();
		patch.set("filters", json!({ "range": { "to": null, "step": 2 } }));
		patch.apply_to_params(&mut params);

		assert_eq!(
			Value::Object(params),
			json!({ "filters": { "range": { "from": "1", "step": 2 } } })
		);
	}

	#[rstest]
	fn test_apply_to_url() {
		let url = Url::parse("http://localhost/users?page=2").unwrap();
		let mut patch = ParamPatch::new();
		patch.remove("page");

		assert_eq!(patch.apply_to_url(&url).as_str(), "http://localhost/users");
	}
}
