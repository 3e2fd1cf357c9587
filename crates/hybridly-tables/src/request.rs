//! Request view consumed by tables
//!
//! Query strings use bracket notation for nested parameters, so
//! `filters[status]=active&only[]=1&only[]=2` decodes into
//! `{"filters": {"status": "active"}, "only": ["1", "2"]}`. Values are kept
//! as strings; empty strings decode to `null`.

use crate::error::{Result, TableError};
use http::header;
use hybridly_tables_types::query::decode_pairs;
use serde_json::{Map, Value};
use url::Url;

const BASE_URL: &str = "http://localhost";

/// Parsed request parameters and the URL they came from
#[derive(Debug, Clone)]
pub struct TableRequest {
	url: Url,
	params: Map<String, Value>,
	referer: Option<String>,
}

impl TableRequest {
	/// Parses an absolute URL or a path with a query string
	///
	/// ```
	/// use hybridly_tables::request::TableRequest;
	/// use serde_json::json;
	///
	/// let request = TableRequest::from_uri("/users?sorts=-name&filters[role]=admin").unwrap();
	///
	/// assert_eq!(request.path(), "/users");
	/// assert_eq!(request.param("sorts"), Some(&json!("-name")));
	/// assert_eq!(request.param("filters"), Some(&json!({ "role": "admin" })));
	/// ```
	pub fn from_uri(uri: &str) -> Result<Self> {
		let base = Url::parse(BASE_URL).map_err(|e| TableError::InvalidRequest(e.to_string()))?;
		let url = base
			.join(uri)
			.map_err(|e| TableError::InvalidRequest(format!("invalid URI `{}`: {}", uri, e)))?;

		Ok(Self::from_url(url))
	}

	/// Parses a bare query string against the root path
	pub fn from_query(query: &str) -> Result<Self> {
		let query = query.trim_start_matches('?');
		if query.is_empty() {
			return Self::from_uri("/");
		}
		Self::from_uri(&format!("/?{}", query))
	}

	/// Builds the view from an HTTP request, keeping its `Referer` header
	pub fn from_http<B>(request: &http::Request<B>) -> Result<Self> {
		let mut table_request = Self::from_uri(&request.uri().to_string())?;
		table_request.referer = request
			.headers()
			.get(header::REFERER)
			.and_then(|value| value.to_str().ok())
			.map(str::to_string);
		Ok(table_request)
	}

	fn from_url(url: Url) -> Self {
		let params = decode_pairs(url.query_pairs());
		Self {
			url,
			params,
			referer: None,
		}
	}

	/// Sets the page the request was issued from
	pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
		self.referer = Some(referer.into());
		self
	}

	/// Absolute request URL
	pub fn url(&self) -> &Url {
		&self.url
	}

	pub fn path(&self) -> &str {
		self.url.path()
	}

	/// Decoded parameter by top-level name
	pub fn param(&self, name: &str) -> Option<&Value> {
		self.params.get(name)
	}

	/// String parameter by top-level name
	pub fn param_str(&self, name: &str) -> Option<&str> {
		self.param(name).and_then(Value::as_str)
	}

	/// Every decoded parameter
	pub fn params(&self) -> &Map<String, Value> {
		&self.params
	}

	pub fn referer(&self) -> Option<&str> {
		self.referer.as_deref()
	}
}
