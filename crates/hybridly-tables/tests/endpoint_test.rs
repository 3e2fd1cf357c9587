mod fixtures;

use bytes::Bytes;
use fixtures::*;
use http::{Method, Request, StatusCode, header};
use hybridly_tables::endpoint;
use hybridly_tables::prelude::*;
use rstest::*;
use serde_json::{Value, json};

fn post(body: Value, referer: Option<&str>) -> Request<Bytes> {
	let mut builder = Request::builder()
		.method(Method::POST)
		.uri("/hybridly")
		.header(header::CONTENT_TYPE, "application/json");
	if let Some(referer) = referer {
		builder = builder.header(header::REFERER, referer);
	}
	builder.body(Bytes::from(body.to_string())).unwrap()
}

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

fn body_json(bytes: &Bytes) -> Value {
	serde_json::from_slice(bytes).unwrap()
}

#[fixture]
fn dispatcher(users_table: UsersTable) -> ActionDispatcher {
	ActionDispatcher::new(registry_for(users_table))
}

#[rstest]
#[tokio::test]
async fn test_bulk_action_redirects_back(dispatcher: ActionDispatcher) {
	let request = post(
		json!({
			"type": "action:bulk",
			"id": table_id::<UsersTable>(),
			"action": "delete",
			"all": true,
			"except": [3],
		}),
		Some("http://localhost/users?sorts=-name&page=2"),
	);

	let response = endpoint::handle(&dispatcher, request).await;

	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(
		response.headers()[header::LOCATION],
		"http://localhost/users?sorts=-name&page=2"
	);
}

#[rstest]
#[tokio::test]
async fn test_redirect_without_referer(dispatcher: ActionDispatcher) {
	let request = post(
		json!({
			"type": "action:inline",
			"id": table_id::<UsersTable>(),
			"action": "promote",
			"record": 1,
		}),
		None,
	);

	let response = endpoint::handle(&dispatcher, request).await;

	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(response.headers()[header::LOCATION], "/");
}

#[rstest]
#[tokio::test]
async fn test_handler_response_is_returned(dispatcher: ActionDispatcher) {
	let request = post(
		json!({
			"type": "action:inline",
			"id": table_id::<UsersTable>(),
			"action": "download",
			"record": "4",
		}),
		Some("/users"),
	);

	let response = endpoint::handle(&dispatcher, request).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.body().as_ref(), b"\"Dave\"");
}

#[rstest]
#[case::invalid_type(json!({ "type": "action:other", "id": "x", "action": "y" }), StatusCode::BAD_REQUEST)]
#[case::missing_type(json!({ "id": "x", "action": "y" }), StatusCode::BAD_REQUEST)]
#[case::unknown_table(
	json!({ "type": "action:inline", "id": "app::Nope", "action": "y", "record": 1 }),
	StatusCode::NOT_FOUND
)]
#[tokio::test]
async fn test_client_errors(
	dispatcher: ActionDispatcher,
	#[case] body: Value,
	#[case] expected: StatusCode,
) {
	let response = endpoint::handle(&dispatcher, post(body, None)).await;

	assert_eq!(response.status(), expected);
	assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
	assert!(body_json(response.body())["message"].is_string());
}

#[rstest]
#[tokio::test]
async fn test_invalid_type_message(dispatcher: ActionDispatcher) {
	let body = json!({ "type": "action:other", "id": "x", "action": "y" });
	let response = endpoint::handle(&dispatcher, post(body, None)).await;

	assert_eq!(
		body_json(response.body())["message"],
		"Invalid action type: action:other"
	);
}

#[rstest]
#[tokio::test]
async fn test_handler_failure_is_opaque(dispatcher: ActionDispatcher) {
	init_tracing();
	let body = json!({
		"type": "action:inline",
		"id": table_id::<UsersTable>(),
		"action": "explode",
		"record": 1,
	});
	let response = endpoint::handle(&dispatcher, post(body, None)).await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert!(!String::from_utf8_lossy(response.body()).contains("boom"));
}

#[rstest]
#[tokio::test]
async fn test_only_post_is_accepted(dispatcher: ActionDispatcher) {
	let request = Request::builder()
		.method(Method::GET)
		.uri("/hybridly")
		.body(Bytes::new())
		.unwrap();

	let error = endpoint::try_handle(&dispatcher, request).await.unwrap_err();

	assert!(matches!(error, TableError::InvalidRequest(_)));
}
