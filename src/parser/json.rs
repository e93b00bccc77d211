//! JSON fragment codec.

use regex::Regex;

use crate::error::ParseError;
use crate::parser::FragmentParser;
use crate::value::FragmentValue;

/// Recognizes brace- or bracket-delimited fragments and decodes them as
/// JSON into [`FragmentValue::Structured`].
pub struct JsonParser {
    recognizer: Regex,
}

impl JsonParser {
    /// Creates the parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            recognizer: Regex::new(r"^\s*[\{\[].*?[\}\]]\s*$")
                .expect("literal pattern compiles"),
        }
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentParser for JsonParser {
    fn test(&self, fragment: &str) -> bool {
        self.recognizer.is_match(fragment)
    }

    fn deserialize(&self, fragment: &str) -> Result<FragmentValue, ParseError> {
        serde_json::from_str::<serde_json::Value>(fragment)
            .map(FragmentValue::Structured)
            .map_err(|e| ParseError::InvalidJson {
                message: e.to_string(),
            })
    }

    fn serialize(&self, value: &FragmentValue) -> Result<String, ParseError> {
        let json = match value {
            FragmentValue::Structured(v) => v.clone(),
            FragmentValue::Text(s) => serde_json::Value::String(s.clone()),
            FragmentValue::Pairs(pairs) => serde_json::Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            ),
        };
        Ok(json.to_string())
    }
}
