//! # hashwatch — navigation fragment observation
//!
//! Observes changes to a host environment's navigation fragment identifier
//! (the `#`-delimited "hash") and notifies subscribers, optionally decoding
//! the fragment through a pluggable parser.
//!
//! ## Core concepts
//!
//! - **Environment**: capability contract the host implements — a location
//!   handle plus whichever change-notification channels it supports
//! - **Observer**: per-environment state machine that detects distinct,
//!   non-blank fragment changes and keeps an append-only history
//! - **Parser**: pluggable recognizer/codec turning raw fragments into
//!   structured values ([`JsonParser`], [`QueryStringParser`])
//! - **Error policy**: injected mediator deciding whether a subscriber or
//!   parser failure is swallowed or propagated
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use hashwatch::{JsonParser, LocationObserver};
//!
//! let observer = LocationObserver::new();
//! observer.set_parser(Box::new(JsonParser::new()));
//! observer.subscribe(Rc::new(|decoded, raw| {
//!     println!("fragment changed to {decoded} (raw {raw})");
//!     Ok(())
//! }));
//! observer.init(host_environment)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod environment;
pub mod error;
pub mod fragment;
pub mod observer;
pub mod parser;
pub mod policy;
pub mod strategy;
pub mod subscriber;
pub mod value;

// Re-export primary types at crate root for convenience
pub use environment::{ChangeHandler, Environment, Location, TimerId};
pub use error::{ParseError, SetupError, SubscriberError, WatchError, WatchResult};
pub use observer::{LocationObserver, DEFAULT_POLLING_INTERVAL};
pub use parser::{FragmentParser, JsonParser, QueryStringParser};
pub use policy::ErrorPolicy;
pub use strategy::ActiveStrategy;
pub use subscriber::{Callback, SubscriberContext, SubscriberFn, Subscription};
pub use value::FragmentValue;
