//! Decoded fragment values.
//!
//! A parser turns raw fragment text into one of these shapes; when no
//! parser is configured subscribers receive the raw text itself.

use serde::{Deserialize, Serialize};

/// The decoded form of a fragment delivered to subscribers.
///
/// # Examples
///
/// ```
/// use hashwatch::FragmentValue;
///
/// let text = FragmentValue::Text("section-2".to_string());
/// let pairs = FragmentValue::Pairs(vec![("page".into(), "2".into())]);
///
/// assert!(text.is_text());
/// assert!(pairs.is_pairs());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FragmentValue {
    /// Raw fragment text, used when no parser is configured.
    Text(String),
    /// Structured data decoded from a JSON-shaped fragment.
    Structured(serde_json::Value),
    /// Flat key/value pairs decoded from a query-string-shaped fragment,
    /// in source order.
    Pairs(Vec<(String, String)>),
}

impl FragmentValue {
    /// Returns true for raw text values.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns true for structured values.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Returns true for key/value pair values.
    #[must_use]
    pub const fn is_pairs(&self) -> bool {
        matches!(self, Self::Pairs(_))
    }

    /// Returns the raw text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the structured data, if this is a structured value.
    #[must_use]
    pub const fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the key/value pairs, if this is a pairs value.
    #[must_use]
    pub fn as_pairs(&self) -> Option<&[(String, String)]> {
        match self {
            Self::Pairs(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up the first value stored under `key` in a pairs value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Self::Pairs(pairs) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Structured(_) => "structured",
            Self::Pairs(_) => "pairs",
        }
    }
}

impl std::fmt::Display for FragmentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(v) => write!(f, "{v}"),
            Self::Structured(v) => write!(f, "{v}"),
            Self::Pairs(pairs) => {
                let mut first = true;
                for (k, v) in pairs {
                    if !first {
                        write!(f, "&")?;
                    }
                    write!(f, "{k}={v}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for FragmentValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for FragmentValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<serde_json::Value> for FragmentValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Structured(v)
    }
}

impl From<Vec<(String, String)>> for FragmentValue {
    fn from(v: Vec<(String, String)>) -> Self {
        Self::Pairs(v)
    }
}
