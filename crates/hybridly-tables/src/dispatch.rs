//! Action execution
//!
//! One dispatch walks `Idle -> ResolveTable -> ResolveAction -> Execute ->
//! Respond`. Every phase either advances or ends the dispatch with a typed
//! error; nothing is retried and handler errors are passed through as
//! [`TableError::Handler`].

use crate::error::{ActionKind, Result, TableError};
use crate::registry::{DynTable, TableRegistry};
use crate::request::TableRequest;
use bytes::Bytes;
use http::Response;
use hybridly_tables_types::ActionCall;
use std::fmt;
use std::sync::Arc;

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
	Idle,
	ResolveTable,
	ResolveAction,
	Execute,
	Respond,
}

impl fmt::Display for DispatchPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Idle => "idle",
			Self::ResolveTable => "resolve_table",
			Self::ResolveAction => "resolve_action",
			Self::Execute => "execute",
			Self::Respond => "respond",
		};
		f.write_str(name)
	}
}

/// Result of a successful dispatch
#[derive(Debug)]
pub enum ActionOutcome {
	/// The handler produced its own response, sent unchanged
	Respond(Response<Bytes>),
	/// Redirect to the page the action was triggered from
	Back,
}

impl ActionOutcome {
	pub fn is_back(&self) -> bool {
		matches!(self, Self::Back)
	}
}

/// Executes inline and bulk action calls
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
	registry: Arc<TableRegistry>,
}

impl ActionDispatcher {
	pub fn new(registry: Arc<TableRegistry>) -> Self {
		Self { registry }
	}

	pub fn registry(&self) -> &TableRegistry {
		&self.registry
	}

	/// Runs `call` to completion
	pub async fn dispatch(
		&self,
		call: &ActionCall,
		request: &TableRequest,
	) -> Result<ActionOutcome> {
		let result = self.run(call, request).await;
		if let Err(error) = &result
			&& error.is_client_error()
		{
			tracing::warn!(
				table = %call.table_id(),
				action = %call.action(),
				kind = %call.kind(),
				error = %error,
				"Action dispatch failed"
			);
		}
		result
	}

	async fn run(&self, call: &ActionCall, request: &TableRequest) -> Result<ActionOutcome> {
		let mut phase = DispatchPhase::Idle;
		let table = self.resolve_table(&mut phase, call, request)?;
		self.resolve_action(&mut phase, table.as_ref(), call)?;

		advance(&mut phase, DispatchPhase::Execute, call);
		let response = match call {
			ActionCall::Inline(inline) => {
				table.execute_inline(&inline.action, &inline.record).await?
			}
			ActionCall::Bulk(bulk) => table.execute_bulk(&bulk.action, &bulk.selection()).await?,
		};

		advance(&mut phase, DispatchPhase::Respond, call);
		Ok(match response {
			Some(response) => ActionOutcome::Respond(response),
			None => ActionOutcome::Back,
		})
	}

	fn resolve_table(
		&self,
		phase: &mut DispatchPhase,
		call: &ActionCall,
		request: &TableRequest,
	) -> Result<Box<dyn DynTable>> {
		advance(phase, DispatchPhase::ResolveTable, call);
		self.registry.resolve_table(call.table_id(), request)
	}

	fn resolve_action(
		&self,
		phase: &mut DispatchPhase,
		table: &dyn DynTable,
		call: &ActionCall,
	) -> Result<()> {
		advance(phase, DispatchPhase::ResolveAction, call);
		let (kind, found) = match call {
			ActionCall::Inline(inline) => {
				(ActionKind::Inline, table.has_inline_action(&inline.action)?)
			}
			ActionCall::Bulk(bulk) => (ActionKind::Bulk, table.has_bulk_action(&bulk.action)?),
		};

		if found {
			Ok(())
		} else {
			Err(TableError::UnknownAction {
				kind,
				name: call.action().to_string(),
			})
		}
	}
}

fn advance(phase: &mut DispatchPhase, next: DispatchPhase, call: &ActionCall) {
	tracing::debug!(
		table = %call.table_id(),
		action = %call.action(),
		from = %phase,
		to = %next,
		"Action dispatch transition"
	);
	*phase = next;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(DispatchPhase::Idle, "idle")]
	#[case(DispatchPhase::ResolveTable, "resolve_table")]
	#[case(DispatchPhase::Respond, "respond")]
	fn test_phase_names(#[case] phase: DispatchPhase, #[case] expected: &str) {
		assert_eq!(phase.to_string(), expected);
	}

	#[rstest]
	fn test_outcome_is_back() {
		assert!(ActionOutcome::Back.is_back());
		assert!(!ActionOutcome::Respond(Response::new(Bytes::new())).is_back());
	}
}
