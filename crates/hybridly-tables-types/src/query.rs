//! Bracket-notation query parameters
//!
//! Nested table parameters travel in the query string as
//! `filters[status]=active&only[]=1&only[]=2`. Both sides of the wire use
//! the functions here to move between those pairs and nested JSON.

use serde_json::{Map, Value};

/// Splits `filters[status][]` into `["filters", "status", ""]`
///
/// Keys with unbalanced brackets are kept whole.
pub fn parse_key(key: &str) -> Vec<String> {
	let Some(open) = key.find('[') else {
		return vec![key.to_string()];
	};
	if open == 0 {
		return vec![key.to_string()];
	}

	let mut segments = vec![key[..open].to_string()];
	let mut rest = &key[open..];
	while !rest.is_empty() {
		let Some(inner) = rest.strip_prefix('[') else {
			return vec![key.to_string()];
		};
		let Some(close) = inner.find(']') else {
			return vec![key.to_string()];
		};
		segments.push(inner[..close].to_string());
		rest = &inner[close + 1..];
	}

	segments
}

/// Writes `value` at the path described by `segments`
///
/// Empty segments append to an array.
pub fn insert_value(target: &mut Value, segments: &[String], value: Value) {
	let Some((segment, rest)) = segments.split_first() else {
		*target = value;
		return;
	};

	if segment.is_empty() {
		if !target.is_array() {
			*target = Value::Array(Vec::new());
		}
		if let Value::Array(items) = target {
			items.push(Value::Null);
			if let Some(last) = items.last_mut() {
				insert_value(last, rest, value);
			}
		}
		return;
	}

	if !target.is_object() {
		*target = Value::Object(Map::new());
	}
	if let Value::Object(map) = target {
		let entry = map.entry(segment.clone()).or_insert(Value::Null);
		insert_value(entry, rest, value);
	}
}

/// Decodes query pairs into nested parameters
///
/// Values stay strings; empty values decode to `null`.
///
/// ```
/// use hybridly_tables_types::query::decode_pairs;
/// use serde_json::json;
///
/// let params = decode_pairs([("filters[role]", "admin"), ("only[]", "1"), ("only[]", "2"), ("page", "")]);
/// assert_eq!(params["filters"], json!({ "role": "admin" }));
/// assert_eq!(params["only"], json!(["1", "2"]));
/// assert_eq!(params["page"], json!(null));
/// ```
pub fn decode_pairs<I, K, V>(pairs: I) -> Map<String, Value>
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: AsRef<str>,
{
	let mut root = Value::Object(Map::new());
	for (key, value) in pairs {
		let value = match value.as_ref() {
			"" => Value::Null,
			text => Value::String(text.to_string()),
		};
		insert_value(&mut root, &parse_key(key.as_ref()), value);
	}

	match root {
		Value::Object(map) => map,
		_ => Map::new(),
	}
}

/// Encodes nested parameters back into query pairs
///
/// `null` values are omitted, so encoding is how removals take effect.
///
/// ```
/// use hybridly_tables_types::query::encode_pairs;
/// use serde_json::json;
///
/// let params = json!({ "sorts": "-name", "filters": { "role": "admin", "q": null } });
/// let pairs = encode_pairs(params.as_object().unwrap());
/// assert_eq!(pairs.len(), 2);
/// assert!(pairs.contains(&("sorts".to_string(), "-name".to_string())));
/// assert!(pairs.contains(&("filters[role]".to_string(), "admin".to_string())));
/// ```
pub fn encode_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
	let mut pairs = Vec::new();
	for (key, value) in params {
		encode_value(key.clone(), value, &mut pairs);
	}
	pairs
}

fn encode_value(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
	match value {
		Value::Null => {}
		Value::Bool(flag) => pairs.push((prefix, flag.to_string())),
		Value::Number(number) => pairs.push((prefix, number.to_string())),
		Value::String(text) => pairs.push((prefix, text.clone())),
		Value::Array(items) => {
			for item in items {
				encode_value(format!("{}[]", prefix), item, pairs);
			}
		}
		Value::Object(map) => {
			for (key, item) in map {
				encode_value(format!("{}[{}]", prefix, key), item, pairs);
			}
		}
	}
}
