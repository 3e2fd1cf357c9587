mod fixtures;

use fixtures::*;
use http::StatusCode;
use hybridly_tables::error::ActionKind;
use hybridly_tables::prelude::*;
use hybridly_tables::registry::Resolvable;
use rstest::*;
use serde_json::json;
use std::collections::BTreeSet;

fn bulk(action: &str, all: bool, only: &[i64], except: &[i64]) -> ActionCall {
	ActionCall::Bulk(BulkActionRequest {
		action: action.to_string(),
		id: table_id::<UsersTable>().to_string(),
		all,
		only: only.iter().copied().map(RecordKey::from).collect::<BTreeSet<_>>(),
		except: except.iter().copied().map(RecordKey::from).collect::<BTreeSet<_>>(),
	})
}

fn inline(action: &str, record: i64) -> ActionCall {
	ActionCall::Inline(InlineActionRequest {
		action: action.to_string(),
		id: table_id::<UsersTable>().to_string(),
		record: RecordKey::from(record),
	})
}

fn request() -> TableRequest {
	TableRequest::from_uri("/hybridly").unwrap().with_referer("/users?page=2")
}

#[rstest]
#[tokio::test]
async fn test_bulk_all_except_on_records(users_table: UsersTable) {
	let log = users_table.log.clone();
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	let outcome = dispatcher
		.dispatch(&bulk("collect", true, &[], &[3]), &request())
		.await
		.unwrap();

	assert!(outcome.is_back());
	let seen: Vec<i64> = log.entries().iter().filter_map(|id| id.as_i64()).collect();
	assert_eq!(seen, vec![1, 2, 4, 5, 6, 7, 8, 9, 10]);
}

#[rstest]
#[tokio::test]
async fn test_bulk_all_except_on_query(users_table: UsersTable) {
	let source = users_table.source.clone();
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	dispatcher
		.dispatch(&bulk("delete", true, &[], &[3]), &request())
		.await
		.unwrap();

	assert_eq!(ids(&source.records()), vec![3]);
}

#[rstest]
#[tokio::test]
async fn test_bulk_only(users_table: UsersTable) {
	let source = users_table.source.clone();
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	dispatcher
		.dispatch(&bulk("delete", false, &[2, 4, 42], &[]), &request())
		.await
		.unwrap();

	assert_eq!(ids(&source.records()), vec![1, 3, 5, 6, 7, 8, 9, 10]);
}

#[rstest]
#[tokio::test]
async fn test_bulk_empty_selection_touches_nothing(users_table: UsersTable) {
	let source = users_table.source.clone();
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	dispatcher
		.dispatch(&bulk("delete", false, &[], &[]), &request())
		.await
		.unwrap();

	assert_eq!(source.len(), 10);
}

#[rstest]
#[tokio::test]
async fn test_bulk_without_handler_goes_back(users_table: UsersTable) {
	let table = instance(users_table.clone(), "/users");
	let noop = table.find_bulk_action("noop").unwrap().unwrap();
	assert!(!noop.has_handler());

	let dispatcher = ActionDispatcher::new(registry_for(users_table));
	let outcome = dispatcher
		.dispatch(&bulk("noop", true, &[], &[]), &request())
		.await
		.unwrap();
	assert!(outcome.is_back());
}

#[rstest]
#[tokio::test]
async fn test_inline_action_updates_record(users_table: UsersTable) {
	let source = users_table.source.clone();
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	let outcome = dispatcher.dispatch(&inline("promote", 2), &request()).await.unwrap();

	assert!(outcome.is_back());
	let bob = source.records().into_iter().find(|user| user["id"] == 2).unwrap();
	assert_eq!(bob["role"], json!("admin"));
}

#[rstest]
#[tokio::test]
async fn test_inline_action_response_passes_through(users_table: UsersTable) {
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	let outcome = dispatcher.dispatch(&inline("download", 5), &request()).await.unwrap();

	match outcome {
		ActionOutcome::Respond(response) => {
			assert_eq!(response.status(), StatusCode::OK);
			assert_eq!(response.body().as_ref(), b"\"Eve\"");
		}
		ActionOutcome::Back => panic!("expected the handler's response"),
	}
}

#[rstest]
#[tokio::test]
async fn test_inline_missing_record(users_table: UsersTable) {
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	let error = dispatcher.dispatch(&inline("promote", 99), &request()).await.unwrap_err();

	assert!(matches!(error, TableError::RecordNotFound { ref key } if *key == RecordKey::Int(99)));
	assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::unknown_inline(inline("nuke", 1), ActionKind::Inline)]
#[case::hidden_inline(inline("impersonate", 1), ActionKind::Inline)]
#[case::unknown_bulk(bulk("nuke", true, &[], &[]), ActionKind::Bulk)]
#[case::inline_name_as_bulk(bulk("promote", true, &[], &[]), ActionKind::Bulk)]
#[tokio::test]
async fn test_unknown_action(
	users_table: UsersTable,
	#[case] call: ActionCall,
	#[case] expected: ActionKind,
) {
	let source = users_table.source.clone();
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	let error = dispatcher.dispatch(&call, &request()).await.unwrap_err();

	assert!(matches!(error, TableError::UnknownAction { kind, .. } if kind == expected));
	assert_eq!(source.len(), 10);
}

#[rstest]
#[tokio::test]
async fn test_handler_error_is_propagated(users_table: UsersTable) {
	let dispatcher = ActionDispatcher::new(registry_for(users_table));

	let error = dispatcher.dispatch(&inline("explode", 1), &request()).await.unwrap_err();

	match error {
		TableError::Handler(source) => assert_eq!(source.to_string(), "boom"),
		other => panic!("unexpected error: {other:?}"),
	}
}

#[rstest]
#[tokio::test]
async fn test_unknown_table(users_table: UsersTable) {
	let dispatcher = ActionDispatcher::new(registry_for(users_table));
	let call = ActionCall::Inline(InlineActionRequest {
		action: "promote".to_string(),
		id: "app::tables::Missing".to_string(),
		record: RecordKey::from(1),
	});

	let error = dispatcher.dispatch(&call, &request()).await.unwrap_err();

	assert!(matches!(error, TableError::UnknownTable(ref id) if id == "app::tables::Missing"));
}

#[rstest]
#[tokio::test]
async fn test_resolves_to_non_table(users_table: UsersTable) {
	struct Newsletter;
	impl Resolvable for Newsletter {}

	let registry = registry_for(users_table);
	registry.register("app::Newsletter", |_, _| Box::new(Newsletter));
	let dispatcher = ActionDispatcher::new(registry);

	let call = ActionCall::Bulk(BulkActionRequest {
		action: "send".to_string(),
		id: "app::Newsletter".to_string(),
		all: true,
		only: BTreeSet::new(),
		except: BTreeSet::new(),
	});
	let error = dispatcher.dispatch(&call, &request()).await.unwrap_err();

	assert!(matches!(error, TableError::NotATable { .. }));
	assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_bulk_selection_respects_table_query(source: MemorySource) {
	struct MembersTable(MemorySource);

	impl Table for MembersTable {
		type Source = MemorySource;

		fn source(&self) -> &MemorySource {
			&self.0
		}

		fn table_query(&self) -> MemoryQuery {
			let mut query = MemoryQuery::new();
			query.where_eq("role", json!("member"));
			query
		}

		fn define_bulk_actions(&self) -> Vec<BulkAction<MemoryQuery, serde_json::Value>> {
			let source = self.0.clone();
			vec![BulkAction::make("delete").on_query(move |query: MemoryQuery, _params| {
				let source = source.clone();
				async move {
					source.delete(&query);
					Ok(None)
				}
			})]
		}
	}

	let request = TableRequest::from_uri("/members").unwrap();
	let table = TableInstance::new(MembersTable(source.clone()), request, Default::default());
	let selection = Selection {
		all: true,
		..Selection::default()
	};
	table.execute_bulk_action("delete", &selection).await.unwrap();

	assert_eq!(ids(&source.records()), vec![1, 3, 5, 7, 9]);
}
