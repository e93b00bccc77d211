//! Error types for hashwatch.
//!
//! All errors are strongly typed using thiserror. Setup errors indicate
//! programmer error and always propagate directly; pipeline errors (parse
//! and subscriber failures) are offered to the observer's
//! [`ErrorPolicy`](crate::policy::ErrorPolicy) before any rethrow decision.

use thiserror::Error;

/// Errors raised by lifecycle and registration arguments.
///
/// These are never mediated by the error policy.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The observer has no environment bound (never initialized or already
    /// disposed).
    #[error("Missing required argument: environment")]
    MissingEnvironment,

    /// The environment exposes no location-like object.
    #[error("Missing required capability: location")]
    MissingLocation,

    /// The environment offers neither change notifications nor a timer
    /// primitive, so no observation strategy can be engaged.
    #[error("Environment supports neither change notifications nor timers")]
    NoObservationChannel,

    /// A method-name subscription named a method the context does not have.
    #[error("Method '{name}' does not exist on the context")]
    UnknownMethod {
        /// The method name that failed to resolve.
        name: String,
    },
}

/// Errors raised while decoding or encoding a fragment.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The fragment passed the recognition test but is not valid JSON.
    #[error("Fragment is not valid JSON: {message}")]
    InvalidJson {
        /// Decoder diagnostic.
        message: String,
    },

    /// The value cannot be represented in the parser's output format.
    #[error("Cannot encode {type_name} value as {format}")]
    UnsupportedValue {
        /// Type name of the offending value.
        type_name: &'static str,
        /// Target format name.
        format: &'static str,
    },
}

/// Failure reported by a subscriber or a captured previous handler.
#[derive(Debug, Error)]
#[error("Subscriber failure: {message}")]
pub struct SubscriberError {
    message: String,
}

impl SubscriberError {
    /// Creates a subscriber failure with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Top-level error type for hashwatch.
///
/// This enum encompasses every error the observation pipeline can raise.
#[derive(Debug, Error)]
pub enum WatchError {
    /// A lifecycle or registration argument error.
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    /// A fragment decode or encode error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A subscriber or previous-handler failure.
    #[error("{0}")]
    Subscriber(#[from] SubscriberError),
}

impl WatchError {
    /// Returns true if this is a setup error.
    #[must_use]
    pub const fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }

    /// Returns true if this is a parse error.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true if this is a subscriber error.
    #[must_use]
    pub const fn is_subscriber(&self) -> bool {
        matches!(self, Self::Subscriber(_))
    }

    /// Returns true if this error may be offered to the error policy.
    ///
    /// Setup errors indicate programmer error and are excluded from
    /// mediation.
    #[must_use]
    pub const fn is_mediatable(&self) -> bool {
        !self.is_setup()
    }
}

/// Result type alias for hashwatch operations.
pub type WatchResult<T> = Result<T, WatchError>;
