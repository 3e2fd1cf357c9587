//! Tri-state record selection
//!
//! A [`Selection`] describes the records a bulk action targets without
//! enumerating the whole table. It is either closed-world (`all = false`,
//! only the identifiers in `only`) or open-world (`all = true`, every record
//! except the identifiers in `except`).

use crate::key::RecordKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Record selection used by bulk actions
///
/// # Examples
///
/// ```
/// use hybridly_tables_types::{RecordKey, Selection};
///
/// let mut selection = Selection::default();
/// selection.select_all();
/// selection.deselect([RecordKey::Int(3)]);
///
/// assert!(selection.selected(&RecordKey::Int(1)));
/// assert!(!selection.selected(&RecordKey::Int(3)));
/// assert!(!selection.all_selected());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
	/// Whether every record is selected (minus `except`)
	#[serde(default)]
	pub all: bool,
	/// Included records when `all` is false
	#[serde(default)]
	pub only: BTreeSet<RecordKey>,
	/// Excluded records when `all` is true
	#[serde(default)]
	pub except: BTreeSet<RecordKey>,
}

impl Selection {
	/// Selects every record
	pub fn select_all(&mut self) {
		self.all = true;
		self.only.clear();
		self.except.clear();
	}

	/// Clears the selection
	pub fn deselect_all(&mut self) {
		self.all = false;
		self.only.clear();
		self.except.clear();
	}

	/// Adds records to the selection
	pub fn select<I>(&mut self, records: I)
	where
		I: IntoIterator<Item = RecordKey>,
	{
		for record in records {
			self.except.remove(&record);
			self.only.insert(record);
		}
	}

	/// Removes records from the selection
	///
	/// With `all` set the records move to `except`, so they stop being
	/// [`selected`](Self::selected) even though `all` stays true.
	pub fn deselect<I>(&mut self, records: I)
	where
		I: IntoIterator<Item = RecordKey>,
	{
		for record in records {
			self.only.remove(&record);
			self.except.insert(record);
		}
	}

	/// Flips the selection state of a record
	///
	/// `force = Some(false)` always deselects, `force = Some(true)` always
	/// selects, `None` inverts the current state.
	pub fn toggle(&mut self, record: RecordKey, force: Option<bool>) {
		if force == Some(false) || (force.is_none() && self.selected(&record)) {
			self.deselect([record]);
		} else {
			self.select([record]);
		}
	}

	/// Membership test
	pub fn selected(&self, record: &RecordKey) -> bool {
		if self.all {
			return !self.except.contains(record);
		}

		self.only.contains(record)
	}

	/// Whether every record is selected with no exclusions
	pub fn all_selected(&self) -> bool {
		self.all && self.except.is_empty()
	}

	/// Whether the selection can match at least one record
	pub fn is_empty(&self) -> bool {
		!self.all && self.only.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn key(value: i64) -> RecordKey {
		RecordKey::Int(value)
	}

	#[rstest]
	fn test_default_selects_nothing() {
		let selection = Selection::default();
		assert!(!selection.selected(&key(1)));
		assert!(!selection.all_selected());
		assert!(selection.is_empty());
	}

	#[rstest]
	fn test_select_removes_from_except() {
		let mut selection = Selection::default();
		selection.select_all();
		selection.deselect([key(2)]);
		assert!(selection.except.contains(&key(2)));

		selection.select([key(2)]);
		assert!(!selection.except.contains(&key(2)));
		assert!(selection.only.contains(&key(2)));
		assert!(selection.all_selected());
	}

	#[rstest]
	fn test_deselect_under_all_keeps_flag() {
		let mut selection = Selection::default();
		selection.select_all();
		selection.select([key(4)]);
		selection.deselect([key(4)]);

		assert!(selection.all);
		assert!(!selection.selected(&key(4)));
		assert!(selection.selected(&key(5)));
		assert!(!selection.all_selected());
	}

	#[rstest]
	fn test_select_all_resets_sets() {
		let mut selection = Selection::default();
		selection.select([key(1), key(2)]);
		selection.deselect([key(3)]);

		selection.select_all();
		assert!(selection.only.is_empty());
		assert!(selection.except.is_empty());
		assert!(selection.all);

		selection.deselect_all();
		assert!(!selection.all);
		assert!(selection.is_empty());
	}

	#[rstest]
	#[case(None, true)]
	#[case(Some(true), true)]
	#[case(Some(false), false)]
	fn test_toggle_unselected_record(#[case] force: Option<bool>, #[case] expected: bool) {
		let mut selection = Selection::default();
		selection.toggle(key(5), force);
		assert_eq!(selection.selected(&key(5)), expected);
	}

	#[rstest]
	#[case(None, false)]
	#[case(Some(true), true)]
	#[case(Some(false), false)]
	fn test_toggle_selected_record(#[case] force: Option<bool>, #[case] expected: bool) {
		let mut selection = Selection::default();
		selection.select([key(5)]);
		selection.toggle(key(5), force);
		assert_eq!(selection.selected(&key(5)), expected);
	}
}
