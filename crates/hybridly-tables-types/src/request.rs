//! Action-execution requests posted to the table endpoint

use crate::key::RecordKey;
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `type` of an inline action call
pub const INLINE_ACTION: &str = "action:inline";
/// `type` of a bulk action call
pub const BULK_ACTION: &str = "action:bulk";

/// Single-record action call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineActionRequest {
	/// Action name
	pub action: String,
	/// Table identity token
	pub id: String,
	/// Primary key of the targeted record
	pub record: RecordKey,
}

/// Selection-wide action call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionRequest {
	/// Action name
	pub action: String,
	/// Table identity token
	pub id: String,
	/// Open-world flag
	#[serde(default)]
	pub all: bool,
	/// Included records
	#[serde(default)]
	pub only: BTreeSet<RecordKey>,
	/// Excluded records
	#[serde(default)]
	pub except: BTreeSet<RecordKey>,
}

impl BulkActionRequest {
	/// Builds a request from a selection
	pub fn new(action: impl Into<String>, id: impl Into<String>, selection: &Selection) -> Self {
		Self {
			action: action.into(),
			id: id.into(),
			all: selection.all,
			only: selection.only.clone(),
			except: selection.except.clone(),
		}
	}

	/// Selection described by this request
	pub fn selection(&self) -> Selection {
		Selection {
			all: self.all,
			only: self.only.clone(),
			except: self.except.clone(),
		}
	}
}

/// Any call accepted by the table endpoint, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionCall {
	/// `action:inline`
	#[serde(rename = "action:inline")]
	Inline(InlineActionRequest),
	/// `action:bulk`
	#[serde(rename = "action:bulk")]
	Bulk(BulkActionRequest),
}

impl ActionCall {
	/// Table identity token
	pub fn table_id(&self) -> &str {
		match self {
			Self::Inline(call) => &call.id,
			Self::Bulk(call) => &call.id,
		}
	}

	/// Action name
	pub fn action(&self) -> &str {
		match self {
			Self::Inline(call) => &call.action,
			Self::Bulk(call) => &call.action,
		}
	}

	/// Wire `type` value
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Inline(_) => INLINE_ACTION,
			Self::Bulk(_) => BULK_ACTION,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_inline_call_wire_format() {
		let call: ActionCall = serde_json::from_value(json!({
			"type": "action:inline",
			"action": "delete",
			"id": "app::UsersTable",
			"record": 4,
		}))
		.unwrap();

		assert_eq!(
			call,
			ActionCall::Inline(InlineActionRequest {
				action: "delete".to_string(),
				id: "app::UsersTable".to_string(),
				record: RecordKey::Int(4),
			})
		);
		assert_eq!(call.kind(), INLINE_ACTION);
	}

	#[rstest]
	fn test_bulk_call_defaults_missing_sets() {
		let call: ActionCall = serde_json::from_value(json!({
			"type": "action:bulk",
			"action": "archive",
			"id": "app::UsersTable",
			"all": true,
		}))
		.unwrap();

		let ActionCall::Bulk(bulk) = call else {
			panic!("expected bulk call");
		};
		assert!(bulk.all);
		assert!(bulk.only.is_empty());
		assert!(bulk.except.is_empty());
	}

	#[rstest]
	fn test_bulk_request_serializes_selection() {
		let mut selection = Selection::default();
		selection.select_all();
		selection.deselect([RecordKey::Int(3)]);

		let call = ActionCall::Bulk(BulkActionRequest::new("archive", "t", &selection));
		let json = serde_json::to_value(&call).unwrap();
		assert_eq!(json["type"], "action:bulk");
		assert_eq!(json["all"], true);
		assert_eq!(json["except"], json!([3]));
		assert_eq!(json["only"], json!([]));
	}
}
