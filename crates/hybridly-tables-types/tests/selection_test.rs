use hybridly_tables_types::{CurrentSort, RecordKey, Selection, SortDirection, initial_token};
use proptest::prelude::*;
use rstest::*;
use std::collections::BTreeSet;

fn key_strategy() -> impl Strategy<Value = RecordKey> {
	prop_oneof![
		(0i64..50).prop_map(RecordKey::Int),
		"[a-z]{1,4}".prop_map(RecordKey::Str),
	]
}

fn selection_strategy() -> impl Strategy<Value = Selection> {
	(
		any::<bool>(),
		prop::collection::btree_set(key_strategy(), 0..6),
		prop::collection::btree_set(key_strategy(), 0..6),
	)
		.prop_map(|(all, only, except)| {
			let mut selection = Selection::default();
			if all {
				selection.select_all();
			}
			selection.select(only);
			selection.deselect(except);
			selection
		})
}

proptest! {
	#[test]
	fn select_then_deselect_matches_all_flag(
		mut selection in selection_strategy(),
		record in key_strategy(),
	) {
		selection.select([record.clone()]);
		selection.deselect([record.clone()]);

		prop_assert!(!selection.only.contains(&record));
		prop_assert_eq!(selection.selected(&record), false);
		// Open-world selections exclude the record through `except`
		prop_assert_eq!(selection.except.contains(&record), true);
	}

	#[test]
	fn toggle_is_its_own_inverse(mut selection in selection_strategy(), record in key_strategy()) {
		let before = selection.selected(&record);
		selection.toggle(record.clone(), None);
		prop_assert_ne!(selection.selected(&record), before);
		selection.toggle(record.clone(), None);
		prop_assert_eq!(selection.selected(&record), before);
	}

	#[test]
	fn only_and_except_stay_disjoint(selection in selection_strategy()) {
		prop_assert!(selection.only.is_disjoint(&selection.except));
	}

	#[test]
	fn wire_round_trip_preserves_membership(
		selection in selection_strategy(),
		record in key_strategy(),
	) {
		let json = serde_json::to_string(&selection).unwrap();
		let decoded: Selection = serde_json::from_str(&json).unwrap();
		prop_assert_eq!(decoded.selected(&record), selection.selected(&record));
		prop_assert_eq!(decoded.all_selected(), selection.all_selected());
	}

	#[test]
	fn sort_token_direction_follows_prefix(name in "[a-z_]{1,12}", descending in any::<bool>()) {
		let token = if descending { format!("-{}", name) } else { name.clone() };
		let sort = CurrentSort::from_token(&token).unwrap();

		prop_assert_eq!(&sort.column, &name);
		if descending {
			prop_assert_eq!(sort.direction, SortDirection::Desc);
			prop_assert_eq!(sort.next, None);
		} else {
			prop_assert_eq!(sort.direction, SortDirection::Asc);
			prop_assert_eq!(sort.next, Some(format!("-{}", name)));
		}
		prop_assert_eq!(initial_token(&name), name);
	}
}

#[rstest]
fn test_closed_world_round_trip_membership() {
	let selection = Selection {
		all: false,
		only: BTreeSet::from([RecordKey::Int(1), RecordKey::Int(2)]),
		except: BTreeSet::new(),
	};

	let json = serde_json::to_value(&selection).unwrap();
	assert_eq!(json, serde_json::json!({ "all": false, "only": [1, 2], "except": [] }));

	let decoded: Selection = serde_json::from_value(json).unwrap();
	assert!(decoded.selected(&RecordKey::Int(1)));
	assert!(decoded.selected(&RecordKey::Int(2)));
	assert!(!decoded.selected(&RecordKey::Int(3)));
	assert_eq!(decoded, selection);
}

#[rstest]
fn test_all_selected_requires_empty_except() {
	let mut selection = Selection::default();
	selection.select_all();
	assert!(selection.all_selected());

	selection.toggle(RecordKey::Int(9), None);
	assert!(!selection.all_selected());
	assert!(!selection.selected(&RecordKey::Int(9)));

	selection.toggle(RecordKey::Int(9), None);
	assert!(selection.all_selected());
}
