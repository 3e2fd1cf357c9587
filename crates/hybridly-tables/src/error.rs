//! Error types for the table engine

use bytes::Bytes;
use http::{Response, StatusCode, header};
use hybridly_tables_types::RecordKey;
use std::fmt;

/// Which action collection a lookup targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
	/// Single-record actions
	Inline,
	/// Selection-wide actions
	Bulk,
}

impl fmt::Display for ActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Inline => f.write_str("inline"),
			Self::Bulk => f.write_str("bulk"),
		}
	}
}

/// Errors raised while resolving or executing table operations
///
/// Filter and sort resolution never produce errors: unknown or malformed
/// request parameters simply have no effect.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
	/// The identity token is not registered
	#[error("Unknown table: {0}")]
	UnknownTable(String),

	/// The identity token resolves to something that is not a table
	#[error("{id} resolves to {type_name}, which is not a table")]
	NotATable {
		/// Identity token
		id: String,
		/// Name of the resolved component type
		type_name: String,
	},

	/// No action with this name in the requested collection
	#[error("Unknown {kind} action: {name}")]
	UnknownAction {
		/// Collection that was searched
		kind: ActionKind,
		/// Requested action name
		name: String,
	},

	/// Inline action target does not exist
	#[error("Record not found: {key}")]
	RecordNotFound {
		/// Requested primary key
		key: RecordKey,
	},

	/// Endpoint `type` is neither `action:inline` nor `action:bulk`
	#[error("Invalid action type: {0}")]
	InvalidActionType(String),

	/// Endpoint body could not be understood
	#[error("Invalid request: {0}")]
	InvalidRequest(String),

	/// A deferred rule requires a parameter the evaluation site does not supply
	#[error("Missing parameter `{parameter}` while evaluating {component}")]
	MissingParameter {
		/// Parameter name declared by the rule
		parameter: String,
		/// Component whose rule was evaluated
		component: String,
	},

	/// Record source failure
	#[error("Record source error: {0}")]
	Source(#[source] anyhow::Error),

	/// Action handler failure, propagated unchanged
	#[error("Action handler failed: {0}")]
	Handler(#[source] anyhow::Error),

	/// JSON (de)serialization error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Table settings could not be loaded
	#[error("Invalid table settings: {message}")]
	Config {
		/// Parser or I/O error message
		message: String,
	},
}

impl TableError {
	/// HTTP status reported to the transport layer
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::UnknownTable(_) | Self::UnknownAction { .. } | Self::RecordNotFound { .. } => {
				StatusCode::NOT_FOUND
			}
			Self::NotATable { .. }
			| Self::InvalidActionType(_)
			| Self::InvalidRequest(_)
			| Self::Json(_) => StatusCode::BAD_REQUEST,
			Self::MissingParameter { .. }
			| Self::Source(_)
			| Self::Handler(_)
			| Self::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Whether the failure was caused by the request rather than the server
	pub fn is_client_error(&self) -> bool {
		self.status_code().is_client_error()
	}
}

impl From<TableError> for Response<Bytes> {
	fn from(error: TableError) -> Self {
		let status = error.status_code();
		// Server-side failures do not leak their details
		let message = if status.is_server_error() {
			status
				.canonical_reason()
				.unwrap_or("Internal Server Error")
				.to_string()
		} else {
			error.to_string()
		};
		let body = serde_json::json!({ "message": message }).to_string();

		let mut response = Response::new(Bytes::from(body));
		*response.status_mut() = status;
		response.headers_mut().insert(
			header::CONTENT_TYPE,
			header::HeaderValue::from_static("application/json"),
		);
		response
	}
}

/// Result type alias for table operations
pub type Result<T> = std::result::Result<T, TableError>;
