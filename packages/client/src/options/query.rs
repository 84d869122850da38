//! Query-string and urlencoded-form encoding.
//!
//! Structured maps are flattened with bracket notation: nested objects become
//! `outer[inner]=v`, arrays of scalars become `list[]=v`, and arrays holding
//! nested containers use their index, `list[0][k]=v`. `null` entries are
//! skipped and booleans encode as `1`/`0`.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// The `query` option.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Appended verbatim.
    Raw(String),
    /// Encoded as `key=value&...` in order.
    Pairs(Vec<(String, String)>),
    /// Flattened with bracket notation.
    Map(Map<String, Value>),
}

impl Query {
    /// The encoded query string, without a leading `?`.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Query::Raw(raw) => raw.clone(),
            Query::Pairs(pairs) => encode_pairs(pairs),
            Query::Map(map) => build_query(map),
        }
    }
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Query::Raw(raw.to_owned())
    }
}

impl From<String> for Query {
    fn from(raw: String) -> Self {
        Query::Raw(raw)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Query {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Query::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Map<String, Value>> for Query {
    fn from(map: Map<String, Value>) -> Self {
        Query::Map(map)
    }
}

pub(crate) fn encode_pairs(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Flattens a JSON object into an urlencoded string.
#[must_use]
pub fn build_query(map: &Map<String, Value>) -> String {
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        flatten(key.clone(), value, &mut pairs);
    }
    encode_pairs(&pairs)
}

fn flatten(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((prefix, if *b { "1" } else { "0" }.to_owned())),
        Value::Number(n) => out.push((prefix, n.to_string())),
        Value::String(s) => out.push((prefix, s.clone())),
        Value::Array(items) => {
            let nested = items
                .iter()
                .any(|item| matches!(item, Value::Array(_) | Value::Object(_)));
            for (i, item) in items.iter().enumerate() {
                let key = if nested {
                    format!("{prefix}[{i}]")
                } else {
                    format!("{prefix}[]")
                };
                flatten(key, item, out);
            }
        }
        Value::Object(fields) => {
            for (k, v) in fields {
                flatten(format!("{prefix}[{k}]"), v, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decoded(encoded: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn raw_query_is_verbatim() {
        assert_eq!(Query::from("a=1&b=%20").encode(), "a=1&b=%20");
    }

    #[test]
    fn pairs_keep_order_and_escape() {
        let query = Query::from(vec![("q", "rust lang"), ("page", "2")]);
        assert_eq!(query.encode(), "q=rust+lang&page=2");
    }

    #[test]
    fn nested_map_uses_brackets() {
        let Value::Object(map) = json!({
            "name": "ann",
            "tags": ["a", "b"],
            "meta": {"age": 3, "admin": true},
            "skip": null
        }) else {
            unreachable!()
        };

        let mut pairs = decoded(&build_query(&map));
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("meta[admin]".to_owned(), "1".to_owned()),
                ("meta[age]".to_owned(), "3".to_owned()),
                ("name".to_owned(), "ann".to_owned()),
                ("tags[]".to_owned(), "a".to_owned()),
                ("tags[]".to_owned(), "b".to_owned()),
            ]
        );
    }

    #[test]
    fn arrays_of_objects_are_indexed() {
        let Value::Object(map) = json!({"items": [{"id": 1}, {"id": 2}]}) else {
            unreachable!()
        };
        assert_eq!(
            decoded(&build_query(&map)),
            vec![
                ("items[0][id]".to_owned(), "1".to_owned()),
                ("items[1][id]".to_owned(), "2".to_owned()),
            ]
        );
    }
}
