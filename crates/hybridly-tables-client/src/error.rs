//! Error types for the table controller

/// Errors raised while issuing table requests or reading table payloads
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
	/// The navigator failed to complete a visit
	#[error("Navigation failed: {0}")]
	Navigation(#[source] anyhow::Error),

	/// The table property could not be decoded
	#[error("Invalid table payload: {0}")]
	Payload(#[from] serde_json::Error),

	/// The response carried no property under the controller's key
	#[error("Missing table property: {0}")]
	MissingProperty(String),
}

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, ClientError>;
