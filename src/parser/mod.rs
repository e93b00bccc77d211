//! Pluggable fragment parsers.
//!
//! A parser decides whether a fragment is in a format it recognizes and
//! decodes it into a [`FragmentValue`](crate::value::FragmentValue) for
//! dispatch. Two reference implementations ship with the crate: a JSON
//! codec and a flat query-string codec.

mod json;
mod query_string;

pub use json::JsonParser;
pub use query_string::QueryStringParser;

use crate::error::ParseError;
use crate::value::FragmentValue;

/// Strategy for recognizing, decoding, and encoding fragment formats.
pub trait FragmentParser {
    /// Recognition predicate. Must be pure and side-effect free; a
    /// fragment the predicate rejects is logged to history but never
    /// delivered to subscribers.
    fn test(&self, fragment: &str) -> bool;

    /// Decode a recognized fragment. Failures are offered to the
    /// observer's error policy.
    fn deserialize(&self, fragment: &str) -> Result<FragmentValue, ParseError>;

    /// Encode a value back into fragment text. The observer never calls
    /// this; it is provided as the inverse of
    /// [`deserialize`](Self::deserialize) for external use.
    fn serialize(&self, value: &FragmentValue) -> Result<String, ParseError>;

    /// Release parser-held resources. Called once from the observer's
    /// disposal routine.
    fn dispose(&mut self) {}
}
