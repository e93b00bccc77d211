//! Flat query-string fragment codec.

use regex::Regex;

use crate::error::ParseError;
use crate::fragment::{percent_decode, percent_encode};
use crate::parser::FragmentParser;
use crate::value::FragmentValue;

/// Recognizes `key=value` pairs separated by `&` and decodes them into
/// [`FragmentValue::Pairs`] with percent-decoded values.
///
/// Keys are kept verbatim, including bracketed forms like `a[b]`; no
/// nested-key hydration is performed.
pub struct QueryStringParser {
    recognizer: Regex,
}

impl QueryStringParser {
    /// Creates the parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            recognizer: Regex::new(r"[\w\[\].]+=").expect("literal pattern compiles"),
        }
    }
}

impl Default for QueryStringParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentParser for QueryStringParser {
    fn test(&self, fragment: &str) -> bool {
        self.recognizer.is_match(fragment)
    }

    fn deserialize(&self, fragment: &str) -> Result<FragmentValue, ParseError> {
        let mut pairs: Vec<(String, String)> = Vec::new();

        for piece in fragment.split('&') {
            let Some((key, value)) = piece.split_once('=') else {
                continue;
            };
            // Pairs with an empty key or value are skipped, not decoded.
            if key.is_empty() || value.is_empty() {
                continue;
            }
            let decoded = percent_decode(value);
            match pairs.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => *existing = decoded,
                None => pairs.push((key.to_string(), decoded)),
            }
        }

        Ok(FragmentValue::Pairs(pairs))
    }

    fn serialize(&self, value: &FragmentValue) -> Result<String, ParseError> {
        let pairs: Vec<(String, String)> = match value {
            FragmentValue::Pairs(pairs) => pairs.clone(),
            FragmentValue::Structured(serde_json::Value::Object(map)) => map
                .iter()
                .map(|(k, v)| {
                    let rendered = match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), rendered)
                })
                .collect(),
            other => {
                return Err(ParseError::UnsupportedValue {
                    type_name: other.type_name(),
                    format: "query string",
                })
            }
        };

        let encoded: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", percent_encode(v)))
            .collect();
        Ok(encoded.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_pair_shapes() {
        let parser = QueryStringParser::new();
        assert!(parser.test("a=1"));
        assert!(parser.test("a=1&b=2"));
        assert!(parser.test("list[0]=x"));
        assert!(!parser.test("plain-fragment"));
        assert!(!parser.test(r#"{"a":1}"#));
    }

    #[test]
    fn test_deserialize_pairs() {
        let parser = QueryStringParser::new();
        let decoded = parser.deserialize("page=2&tab=files").unwrap();
        assert_eq!(
            decoded.as_pairs().unwrap(),
            &[
                ("page".to_string(), "2".to_string()),
                ("tab".to_string(), "files".to_string()),
            ]
        );
    }

    #[test]
    fn test_deserialize_percent_decodes_values() {
        let parser = QueryStringParser::new();
        let decoded = parser.deserialize("q=foo%20bar").unwrap();
        assert_eq!(decoded.get("q"), Some("foo bar"));
    }

    #[test]
    fn test_deserialize_skips_incomplete_pairs() {
        let parser = QueryStringParser::new();
        let decoded = parser.deserialize("a=&b=2&=3&c").unwrap();
        assert_eq!(
            decoded.as_pairs().unwrap(),
            &[("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_deserialize_later_duplicate_wins() {
        let parser = QueryStringParser::new();
        let decoded = parser.deserialize("a=1&a=2").unwrap();
        assert_eq!(
            decoded.as_pairs().unwrap(),
            &[("a".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_bracketed_keys_stay_flat() {
        let parser = QueryStringParser::new();
        let decoded = parser.deserialize("user[name]=ada").unwrap();
        assert_eq!(decoded.get("user[name]"), Some("ada"));
    }

    #[test]
    fn test_serialize_pairs() {
        let parser = QueryStringParser::new();
        let value = FragmentValue::Pairs(vec![
            ("page".to_string(), "2".to_string()),
            ("q".to_string(), "foo bar".to_string()),
        ]);
        assert_eq!(parser.serialize(&value).unwrap(), "page=2&q=foo%20bar");
    }

    #[test]
    fn test_serialize_structured_object() {
        let parser = QueryStringParser::new();
        let value = FragmentValue::Structured(serde_json::json!({"a": "x", "n": 3}));
        assert_eq!(parser.serialize(&value).unwrap(), "a=x&n=3");
    }

    #[test]
    fn test_serialize_text_is_unsupported() {
        let parser = QueryStringParser::new();
        let err = parser
            .serialize(&FragmentValue::Text("foo".into()))
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_round_trip() {
        let parser = QueryStringParser::new();
        let decoded = parser.deserialize("a=1&q=foo%20bar").unwrap();
        let encoded = parser.serialize(&decoded).unwrap();
        assert_eq!(parser.deserialize(&encoded).unwrap(), decoded);
    }
}
