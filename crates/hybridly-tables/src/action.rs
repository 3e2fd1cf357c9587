//! Inline and bulk action descriptors
//!
//! Inline actions run against exactly one record. Bulk actions run against
//! the records described by a client-side selection, either as an
//! unexecuted query or as a materialized record list. The shape is chosen
//! when the handler is registered:
//!
//! ```
//! use hybridly_tables::action::{BulkAction, InlineAction};
//! use hybridly_tables::memory::MemoryQuery;
//! use serde_json::Value;
//!
//! let archive: BulkAction<MemoryQuery, Value> = BulkAction::make("archive")
//!     .on_query(|_query, _params| async move { Ok(None) });
//!
//! let export: BulkAction<MemoryQuery, Value> = BulkAction::make("export")
//!     .deselect(false)
//!     .on_records(|records: Vec<Value>, _params| async move {
//!         assert!(records.iter().all(Value::is_object));
//!         Ok(None)
//!     });
//!
//! let delete: InlineAction<Value> = InlineAction::make("delete")
//!     .handler(|_record, _params| async move { Ok(None) });
//! # let _ = (archive, export, delete);
//! ```

use crate::component::{
	Component, ComponentKind, Configurable, HasMetadata, Hideable, Labeled, Named, Typed,
	Visibility, default_label,
};
use crate::error::Result;
use crate::evaluate::{Evaluable, Params};
use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use http::Response;
use hybridly_tables_types::{ActionPayload, BulkActionPayload};
use serde_json::{Value, json};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Value returned by action handlers
///
/// `Some(response)` is sent to the client unchanged; `None` redirects back
/// to the page the action was triggered from.
pub type ActionResult = anyhow::Result<Option<Response<Bytes>>>;

type InlineFn<R> = Arc<dyn Fn(R, Params) -> BoxFuture<'static, ActionResult> + Send + Sync>;
type QueryFn<Q> = Arc<dyn Fn(Q, Params) -> BoxFuture<'static, ActionResult> + Send + Sync>;
type RecordsFn<R> = Arc<dyn Fn(Vec<R>, Params) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// Descriptor fields shared by both action kinds
#[derive(Debug, Clone)]
struct ActionBase {
	name: String,
	label: String,
	kind: String,
	visibility: Visibility,
	metadata: Evaluable<Value>,
}

impl ActionBase {
	fn new(name: String, kind: &str) -> Self {
		Self {
			label: default_label(&name),
			name,
			kind: kind.to_string(),
			visibility: Visibility::default(),
			metadata: Evaluable::Literal(json!({})),
		}
	}
}

macro_rules! impl_action_capabilities {
	($ty:ident < $($param:ident),+ >, $component:expr) => {
		impl<$($param),+> $ty<$($param),+> {
			pub fn label(mut self, label: impl Into<String>) -> Self {
				self.base.label = label.into();
				self
			}

			/// Type identifier sent to the front end
			pub fn kind(mut self, kind: impl Into<String>) -> Self {
				self.base.kind = kind.into();
				self
			}

			pub fn hidden(mut self, hidden: impl Into<Evaluable<bool>>) -> Self {
				self.base.visibility.set_hidden(hidden);
				self
			}

			pub fn visible(mut self, visible: impl Into<Evaluable<bool>>) -> Self {
				self.base.visibility.set_visible(visible);
				self
			}

			pub fn metadata(mut self, metadata: impl Into<Evaluable<Value>>) -> Self {
				self.base.metadata = metadata.into();
				self
			}

			fn action_payload(&self, base: &Params) -> Result<ActionPayload> {
				Ok(ActionPayload {
					name: self.base.name.clone(),
					label: self.base.label.clone(),
					kind: self.base.kind.clone(),
					metadata: HasMetadata::metadata(self, base)?,
				})
			}
		}

		impl<$($param),+> Named for $ty<$($param),+> {
			fn name(&self) -> &str {
				&self.base.name
			}
		}

		impl<$($param),+> Labeled for $ty<$($param),+> {
			fn label(&self) -> &str {
				&self.base.label
			}
		}

		impl<$($param),+> Typed for $ty<$($param),+> {
			fn kind(&self) -> &str {
				&self.base.kind
			}
		}

		impl<$($param),+> Component for $ty<$($param),+> {
			fn component_kind(&self) -> ComponentKind {
				$component
			}
		}

		impl<$($param),+> Hideable for $ty<$($param),+> {
			fn visibility(&self) -> &Visibility {
				&self.base.visibility
			}
		}

		impl<$($param),+> HasMetadata for $ty<$($param),+> {
			fn metadata_field(&self) -> &Evaluable<Value> {
				&self.base.metadata
			}
		}

		impl<$($param),+> Configurable for $ty<$($param),+> {
			fn set_label(&mut self, label: String) {
				self.base.label = label;
			}

			fn set_kind(&mut self, kind: String) {
				self.base.kind = kind;
			}

			fn visibility_mut(&mut self) -> &mut Visibility {
				&mut self.base.visibility
			}

			fn set_metadata(&mut self, metadata: Evaluable<Value>) {
				self.base.metadata = metadata;
			}
		}
	};
}

/// Action executed against a single record
pub struct InlineAction<R> {
	base: ActionBase,
	handler: Option<InlineFn<R>>,
}

impl<R: Send + 'static> InlineAction<R> {
	/// Creates an action with a label derived from its name and no handler
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			base: ActionBase::new(name.into(), "inline"),
			handler: None,
		}
	}

	/// Registers the handler
	///
	/// The handler receives the loaded record together with the evaluation
	/// parameters (`record`, `action`, `request` and the table defaults).
	pub fn handler<F, Fut>(mut self, handler: F) -> Self
	where
		F: Fn(R, Params) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ActionResult> + Send + 'static,
	{
		self.handler = Some(Arc::new(move |record, params| handler(record, params).boxed()));
		self
	}

	/// Whether a handler was registered
	pub fn has_handler(&self) -> bool {
		self.handler.is_some()
	}

	/// Runs the handler; actions without one do nothing
	pub async fn execute(&self, record: R, params: Params) -> ActionResult {
		match &self.handler {
			Some(handler) => handler(record, params).await,
			None => Ok(None),
		}
	}

	/// Serializable view of the action
	pub fn payload(&self, base: &Params) -> Result<ActionPayload> {
		self.action_payload(base)
	}
}

impl_action_capabilities!(InlineAction<R>, ComponentKind::InlineAction);

impl<R> fmt::Debug for InlineAction<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InlineAction")
			.field("name", &self.base.name)
			.field("kind", &self.base.kind)
			.field("has_handler", &self.handler.is_some())
			.finish()
	}
}

/// How a bulk handler receives the selected records
pub enum BulkHandler<Q, R> {
	/// Receives the unexecuted query, bound to the `query` parameter
	OnQuery(QueryFn<Q>),
	/// Receives the materialized records, bound to the `records` parameter
	OnRecords(RecordsFn<R>),
}

impl<Q, R> Clone for BulkHandler<Q, R> {
	fn clone(&self) -> Self {
		match self {
			Self::OnQuery(handler) => Self::OnQuery(Arc::clone(handler)),
			Self::OnRecords(handler) => Self::OnRecords(Arc::clone(handler)),
		}
	}
}

impl<Q, R> fmt::Debug for BulkHandler<Q, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::OnQuery(_) => f.write_str("BulkHandler::OnQuery"),
			Self::OnRecords(_) => f.write_str("BulkHandler::OnRecords"),
		}
	}
}

/// Action executed against a selection of records
pub struct BulkAction<Q, R> {
	base: ActionBase,
	deselect: Evaluable<bool>,
	handler: Option<BulkHandler<Q, R>>,
}

impl<Q: Send + 'static, R: Send + 'static> BulkAction<Q, R> {
	/// Creates an action with a label derived from its name and no handler
	pub fn make(name: impl Into<String>) -> Self {
		Self {
			base: ActionBase::new(name.into(), "bulk"),
			deselect: Evaluable::Literal(true),
			handler: None,
		}
	}

	/// Whether the client should clear its selection after the action
	pub fn deselect(mut self, deselect: impl Into<Evaluable<bool>>) -> Self {
		self.deselect = deselect.into();
		self
	}

	/// Registers a handler receiving the unexecuted selection query
	pub fn on_query<F, Fut>(mut self, handler: F) -> Self
	where
		F: Fn(Q, Params) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ActionResult> + Send + 'static,
	{
		self.handler = Some(BulkHandler::OnQuery(Arc::new(move |query, params| {
			handler(query, params).boxed()
		})));
		self
	}

	/// Registers a handler receiving the selected records
	///
	/// The selection query is executed before the handler runs.
	pub fn on_records<F, Fut>(mut self, handler: F) -> Self
	where
		F: Fn(Vec<R>, Params) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ActionResult> + Send + 'static,
	{
		self.handler = Some(BulkHandler::OnRecords(Arc::new(move |records, params| {
			handler(records, params).boxed()
		})));
		self
	}

	/// Registered handler, if any
	pub fn bulk_handler(&self) -> Option<&BulkHandler<Q, R>> {
		self.handler.as_ref()
	}

	pub fn has_handler(&self) -> bool {
		self.handler.is_some()
	}

	/// Resolves the `deselect` flag
	pub fn should_deselect(&self, base: &Params) -> Result<bool> {
		let params = self.evaluation_params(base);
		self.deselect.evaluate(&params, &self.info().to_string())
	}

	/// Serializable view of the action
	pub fn payload(&self, base: &Params) -> Result<BulkActionPayload> {
		Ok(BulkActionPayload {
			action: self.action_payload(base)?,
			deselect: self.should_deselect(base)?,
		})
	}
}

impl_action_capabilities!(BulkAction<Q, R>, ComponentKind::BulkAction);

impl<Q, R> fmt::Debug for BulkAction<Q, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BulkAction")
			.field("name", &self.base.name)
			.field("kind", &self.base.kind)
			.field("handler", &self.handler)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::evaluate::Rule;
	use crate::memory::MemoryQuery;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let inline: InlineAction<Value> = InlineAction::make("send_invite");
		assert_eq!(Labeled::label(&inline), "Send invite");
		assert_eq!(Typed::kind(&inline), "inline");

		let bulk: BulkAction<MemoryQuery, Value> = BulkAction::make("archive");
		assert_eq!(Typed::kind(&bulk), "bulk");
		assert!(bulk.should_deselect(&Params::new()).unwrap());
		assert!(bulk.bulk_handler().is_none());
		assert!(!bulk.has_handler());
		assert!(!inline.has_handler());
	}

	#[rstest]
	fn test_deselect_rule_sees_action_parameter() {
		let bulk: BulkAction<MemoryQuery, Value> = BulkAction::make("export").deselect(Rule::new(
			["action"],
			|params: &Params| {
				params
					.get::<crate::component::ComponentInfo>("action")
					.is_some_and(|action| action.name != "export")
			},
		));

		let payload = bulk.payload(&Params::new()).unwrap();
		assert!(!payload.deselect);
		assert_eq!(payload.action.name, "export");
	}

	#[rstest]
	#[tokio::test]
	async fn test_inline_handler_receives_record() {
		let action: InlineAction<Value> =
			InlineAction::make("touch").handler(|record: Value, _| async move {
				if record["id"] == 1 {
					Ok(Some(Response::new(Bytes::from_static(b"touched"))))
				} else {
					Ok(None)
				}
			});

		let response = action
			.execute(json!({ "id": 1 }), Params::new())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(response.body(), &Bytes::from_static(b"touched"));
		assert!(action.execute(json!({ "id": 2 }), Params::new()).await.unwrap().is_none());
		assert!(action.has_handler());
	}

	#[rstest]
	#[tokio::test]
	async fn test_action_without_handler_is_a_no_op() {
		let action: InlineAction<Value> = InlineAction::make("noop");
		assert!(!action.has_handler());
		assert!(action.execute(json!({}), Params::new()).await.unwrap().is_none());
	}
}
