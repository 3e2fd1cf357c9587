//! Record identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary-key value identifying a single record
///
/// Identifiers travel over the wire either as JSON numbers or as strings,
/// so both representations are accepted and preserved.
///
/// # Examples
///
/// ```
/// use hybridly_tables_types::RecordKey;
///
/// let numeric: RecordKey = serde_json::from_str("3").unwrap();
/// let textual: RecordKey = serde_json::from_str("\"3\"").unwrap();
///
/// assert_eq!(numeric, RecordKey::Int(3));
/// assert_eq!(textual, RecordKey::Str("3".to_string()));
/// assert_eq!(numeric.to_string(), textual.to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
	/// Integer key
	Int(i64),
	/// String key (UUIDs, slugs, ...)
	Str(String),
}

impl RecordKey {
	/// Returns the integer value when this key is numeric
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			Self::Str(value) => value.parse().ok(),
		}
	}

	/// Loose comparison against a JSON value
	///
	/// `3`, `"3"` and `3.0` all match `RecordKey::Int(3)`.
	pub fn matches_json(&self, value: &serde_json::Value) -> bool {
		match (self, value) {
			(Self::Int(key), serde_json::Value::Number(number)) => {
				number.as_i64() == Some(*key) || number.as_f64() == Some(*key as f64)
			}
			(Self::Int(key), serde_json::Value::String(text)) => text.parse() == Ok(*key),
			(Self::Str(key), serde_json::Value::String(text)) => key == text,
			(Self::Str(key), serde_json::Value::Number(number)) => key == &number.to_string(),
			_ => false,
		}
	}

	/// Reads a key out of a JSON value, if it has a key-like shape
	///
	/// Numbers that do not fit an `i64` become textual keys, which still
	/// [`match`](Self::matches_json) the number they came from.
	pub fn from_json(value: &serde_json::Value) -> Option<Self> {
		match value {
			serde_json::Value::Number(number) => Some(number_key(number)),
			serde_json::Value::String(text) => Some(Self::Str(text.clone())),
			_ => None,
		}
	}
}

fn number_key(number: &serde_json::Number) -> RecordKey {
	if let Some(value) = number.as_i64() {
		return RecordKey::Int(value);
	}

	let integral = i64::MIN as f64..i64::MAX as f64;
	match number.as_f64() {
		Some(value) if value.fract() == 0.0 && integral.contains(&value) => {
			RecordKey::Int(value as i64)
		}
		_ => RecordKey::Str(number.to_string()),
	}
}

impl fmt::Display for RecordKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(value) => write!(f, "{}", value),
			Self::Str(value) => f.write_str(value),
		}
	}
}

impl From<i64> for RecordKey {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for RecordKey {
	fn from(value: i32) -> Self {
		Self::Int(value as i64)
	}
}

impl From<u32> for RecordKey {
	fn from(value: u32) -> Self {
		Self::Int(value as i64)
	}
}

impl From<&str> for RecordKey {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for RecordKey {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<RecordKey> for serde_json::Value {
	fn from(key: RecordKey) -> Self {
		match key {
			RecordKey::Int(value) => serde_json::Value::from(value),
			RecordKey::Str(value) => serde_json::Value::String(value),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(RecordKey::Int(3), json!(3), true)]
	#[case(RecordKey::Int(3), json!("3"), true)]
	#[case(RecordKey::Int(3), json!(3.0), true)]
	#[case(RecordKey::Int(3), json!(4), false)]
	#[case(RecordKey::Str("abc".into()), json!("abc"), true)]
	#[case(RecordKey::Str("7".into()), json!(7), true)]
	#[case(RecordKey::Int(1), json!(null), false)]
	fn test_matches_json(
		#[case] key: RecordKey,
		#[case] value: serde_json::Value,
		#[case] expected: bool,
	) {
		assert_eq!(key.matches_json(&value), expected);
	}

	#[rstest]
	#[case(json!(12), Some(RecordKey::Int(12)))]
	#[case(json!(-4), Some(RecordKey::Int(-4)))]
	#[case(json!(5.0), Some(RecordKey::Int(5)))]
	#[case(json!(u64::MAX), Some(RecordKey::Str(u64::MAX.to_string())))]
	#[case(json!(1.5), Some(RecordKey::Str("1.5".into())))]
	#[case(json!("a-1"), Some(RecordKey::Str("a-1".into())))]
	#[case(json!(true), None)]
	#[case(json!(null), None)]
	fn test_from_json(#[case] value: serde_json::Value, #[case] expected: Option<RecordKey>) {
		assert_eq!(RecordKey::from_json(&value), expected);
	}

	#[rstest]
	#[case(json!(u64::MAX))]
	#[case(json!(2.5))]
	#[case(json!(9))]
	fn test_numeric_keys_match_their_source(#[case] value: serde_json::Value) {
		let key = RecordKey::from_json(&value).unwrap();
		assert!(key.matches_json(&value));
	}

	#[rstest]
	fn test_as_int_parses_numeric_strings() {
		assert_eq!(RecordKey::from("42").as_int(), Some(42));
		assert_eq!(RecordKey::from("abc").as_int(), None);
		assert_eq!(RecordKey::from(7).as_int(), Some(7));
	}
}
