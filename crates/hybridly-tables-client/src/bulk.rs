//! Bulk selection state
//!
//! [`BulkSelect`] wraps a [`Selection`] in shared interior-mutable state so
//! every record view-model of a table toggles the same selection.

use hybridly_tables_types::{RecordKey, Selection};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared tri-state record selection
///
/// Clones share the same selection.
///
/// # Example
///
/// ```
/// use hybridly_tables_client::BulkSelect;
/// use hybridly_tables_types::RecordKey;
///
/// let bulk = BulkSelect::new();
/// let view = bulk.clone();
///
/// bulk.select_all();
/// view.toggle(RecordKey::Int(3), None);
///
/// assert!(bulk.selected(&RecordKey::Int(1)));
/// assert!(!bulk.selected(&RecordKey::Int(3)));
/// assert!(!bulk.all_selected());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BulkSelect {
	selection: Rc<RefCell<Selection>>,
}

impl BulkSelect {
	pub fn new() -> Self {
		Self::default()
	}

	/// Selects every record
	pub fn select_all(&self) {
		self.selection.borrow_mut().select_all();
	}

	/// Clears the selection
	pub fn deselect_all(&self) {
		self.selection.borrow_mut().deselect_all();
	}

	pub fn select<I>(&self, records: I)
	where
		I: IntoIterator<Item = RecordKey>,
	{
		self.selection.borrow_mut().select(records);
	}

	/// Removes records; under `all` they are recorded as exceptions
	pub fn deselect<I>(&self, records: I)
	where
		I: IntoIterator<Item = RecordKey>,
	{
		self.selection.borrow_mut().deselect(records);
	}

	/// Flips one record; `force` pins the outcome
	pub fn toggle(&self, record: RecordKey, force: Option<bool>) {
		self.selection.borrow_mut().toggle(record, force);
	}

	pub fn selected(&self, record: &RecordKey) -> bool {
		self.selection.borrow().selected(record)
	}

	pub fn all_selected(&self) -> bool {
		self.selection.borrow().all_selected()
	}

	/// Snapshot of the current selection
	pub fn selection(&self) -> Selection {
		self.selection.borrow().clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	fn key(id: i64) -> RecordKey {
		RecordKey::Int(id)
	}

	#[rstest]
	fn test_select_then_deselect_all() {
		let bulk = BulkSelect::new();
		bulk.select([key(1), key(2)]);
		assert_eq!(bulk.selection().only.len(), 2);

		bulk.deselect_all();
		let selection = bulk.selection();
		assert!(!selection.all);
		assert!(selection.only.is_empty());
		assert!(selection.except.is_empty());
	}

	#[rstest]
	#[case(None, true)]
	#[case(Some(true), true)]
	#[case(Some(false), false)]
	fn test_toggle_unselected(#[case] force: Option<bool>, #[case] expected: bool) {
		let bulk = BulkSelect::new();
		bulk.toggle(key(1), force);
		assert_eq!(bulk.selected(&key(1)), expected);
	}

	#[rstest]
	fn test_force_true_keeps_selected() {
		let bulk = BulkSelect::new();
		bulk.select([key(1)]);
		bulk.toggle(key(1), Some(true));
		assert!(bulk.selected(&key(1)));
	}

	proptest! {
		#[test]
		fn toggle_twice_restores_membership(
			all in any::<bool>(),
			picked in proptest::collection::vec(0i64..20, 0..10),
			id in 0i64..20,
		) {
			let bulk = BulkSelect::new();
			if all {
				bulk.select_all();
			}
			bulk.toggle(key(id), None);
			for other in picked {
				if other != id {
					bulk.toggle(key(other), None);
				}
			}
			let before = bulk.selected(&key(id));
			bulk.toggle(key(id), None);
			bulk.toggle(key(id), None);
			prop_assert_eq!(bulk.selected(&key(id)), before);
		}

		#[test]
		fn select_then_deselect_matches_all_flag(all in any::<bool>(), id in 0i64..100) {
			let bulk = BulkSelect::new();
			if all {
				bulk.select_all();
			}
			bulk.select([key(id)]);
			bulk.deselect([key(id)]);
			let selection = bulk.selection();
			prop_assert!(!selection.only.contains(&key(id)));
			prop_assert!(!bulk.selected(&key(id)));
		}
	}
}
