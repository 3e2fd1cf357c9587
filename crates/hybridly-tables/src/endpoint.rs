//! HTTP adapter for the action endpoint
//!
//! The endpoint accepts a JSON body such as
//! `{"type": "action:bulk", "id": "...", "action": "delete", "all": true, "except": [3]}`
//! and answers with either the handler's own response or a `303 See Other`
//! back to the page named by the `Referer` header.

use crate::dispatch::{ActionDispatcher, ActionOutcome};
use crate::error::{Result, TableError};
use crate::request::TableRequest;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode, header};
use hybridly_tables_types::{ActionCall, BULK_ACTION, INLINE_ACTION};
use serde_json::Value;

/// Location used when the request carries no `Referer`
pub const FALLBACK_LOCATION: &str = "/";

/// Decodes an endpoint body into an action call
///
/// ```
/// use hybridly_tables::endpoint::parse_call;
/// use hybridly_tables::error::TableError;
///
/// let call = parse_call(br#"{"type":"action:inline","id":"app::UsersTable","action":"ban","record":3}"#).unwrap();
/// assert_eq!(call.action(), "ban");
///
/// let error = parse_call(br#"{"type":"action:other","id":"x","action":"y"}"#).unwrap_err();
/// assert!(matches!(error, TableError::InvalidActionType(kind) if kind == "action:other"));
/// ```
pub fn parse_call(body: &[u8]) -> Result<ActionCall> {
	let value: Value = serde_json::from_slice(body)
		.map_err(|e| TableError::InvalidRequest(format!("body is not valid JSON: {}", e)))?;

	let kind = value
		.get("type")
		.and_then(Value::as_str)
		.ok_or_else(|| TableError::InvalidRequest("missing `type` field".to_string()))?;

	if kind != INLINE_ACTION && kind != BULK_ACTION {
		return Err(TableError::InvalidActionType(kind.to_string()));
	}

	serde_json::from_value(value).map_err(|e| TableError::InvalidRequest(e.to_string()))
}

/// `303 See Other` to `location`
pub fn redirect_back(location: Option<&str>) -> Response<Bytes> {
	let location = location.unwrap_or(FALLBACK_LOCATION);
	let mut response = Response::new(Bytes::new());
	*response.status_mut() = StatusCode::SEE_OTHER;
	match header::HeaderValue::from_str(location) {
		Ok(value) => {
			response.headers_mut().insert(header::LOCATION, value);
		}
		Err(_) => {
			response
				.headers_mut()
				.insert(header::LOCATION, header::HeaderValue::from_static(FALLBACK_LOCATION));
		}
	}
	response
}

/// Dispatches an endpoint request, surfacing failures as errors
pub async fn try_handle(
	dispatcher: &ActionDispatcher,
	request: Request<Bytes>,
) -> Result<Response<Bytes>> {
	if request.method() != Method::POST {
		return Err(TableError::InvalidRequest(format!(
			"the action endpoint only accepts POST, got {}",
			request.method()
		)));
	}

	let call = parse_call(request.body())?;
	let table_request = TableRequest::from_http(&request)?;

	match dispatcher.dispatch(&call, &table_request).await? {
		ActionOutcome::Respond(response) => Ok(response),
		ActionOutcome::Back => Ok(redirect_back(table_request.referer())),
	}
}

/// Dispatches an endpoint request, mapping failures to error responses
pub async fn handle(dispatcher: &ActionDispatcher, request: Request<Bytes>) -> Response<Bytes> {
	match try_handle(dispatcher, request).await {
		Ok(response) => response,
		Err(error) => {
			if !error.is_client_error() {
				tracing::error!(error = %error, "Action endpoint failed");
			}
			error.into()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(b"not json".as_slice())]
	#[case(br#"{"id":"x","action":"y"}"#.as_slice())]
	#[case(br#"{"type":"action:bulk","id":"x"}"#.as_slice())]
	fn test_malformed_bodies(#[case] body: &[u8]) {
		assert!(matches!(parse_call(body), Err(TableError::InvalidRequest(_))));
	}

	#[rstest]
	fn test_bulk_body_defaults() {
		let call = parse_call(br#"{"type":"action:bulk","id":"x","action":"purge"}"#).unwrap();
		match call {
			ActionCall::Bulk(bulk) => {
				assert!(!bulk.all);
				assert!(bulk.only.is_empty());
				assert!(bulk.except.is_empty());
			}
			other => panic!("unexpected call: {other:?}"),
		}
	}

	#[rstest]
	#[case(Some("http://localhost/users?page=2"), "http://localhost/users?page=2")]
	#[case(None, "/")]
	fn test_redirect_back(#[case] referer: Option<&str>, #[case] expected: &str) {
		let response = redirect_back(referer);
		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(response.headers()[header::LOCATION], expected);
	}
}
