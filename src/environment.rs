//! Host environment capability contract.
//!
//! The observer consumes these traits rather than any concrete host type.
//! Only a location is required; every observation channel defaults to
//! "unsupported" so implementations opt in to whichever channels the host
//! actually has. Strategy negotiation probes them in a fixed order (see
//! [`crate::strategy`]).

use std::rc::Rc;
use std::time::Duration;

use crate::error::WatchResult;

/// Handler installed into a host environment's notification channel.
///
/// The host invokes it whenever the fragment may have changed (or on a
/// timer tick). Errors from the detection pass propagate synchronously to
/// whatever triggered the handler.
pub type ChangeHandler = Rc<dyn Fn() -> WatchResult<()>>;

/// Opaque identifier for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer:{}", self.0)
    }
}

/// A location-like handle with a string-convertible form.
pub trait Location {
    /// The fragment portion, if the location exposes it directly. May
    /// include the leading `#`. `None` or empty means "not addressable
    /// this way" and triggers the [`href`](Self::href) fallback.
    fn fragment(&self) -> Option<String>;

    /// The full string form of the location.
    fn href(&self) -> String;
}

/// Host environment capability surface.
///
/// # Capability negotiation
/// Probes are tried in order: standard listener pair, older attach/detach
/// pair, single assignable handler slot, then the timer primitive. A probe
/// returning `false` (or `None`) means "unsupported here"; the default
/// implementations decline everything.
pub trait Environment {
    /// The environment's location handle. `None` means the environment
    /// lacks the required capability and initialization fails.
    fn location(&self) -> Option<Rc<dyn Location>>;

    /// Whether the host emits fragment-change notifications natively.
    fn supports_change_events(&self) -> bool {
        false
    }

    /// Register `handler` through the standard listener mechanism.
    /// Returns false when unsupported.
    fn add_change_listener(&mut self, _handler: ChangeHandler) -> bool {
        false
    }

    /// Remove the listener installed by
    /// [`add_change_listener`](Self::add_change_listener).
    fn remove_change_listener(&mut self) -> bool {
        false
    }

    /// Register `handler` through the older attach mechanism. Returns
    /// false when unsupported.
    fn attach_change_handler(&mut self, _handler: ChangeHandler) -> bool {
        false
    }

    /// Detach the handler installed by
    /// [`attach_change_handler`](Self::attach_change_handler).
    fn detach_change_handler(&mut self) -> bool {
        false
    }

    /// Whether the host exposes a single assignable handler slot.
    fn has_change_slot(&self) -> bool {
        false
    }

    /// Install `handler` into the slot (or clear it with `None`), returning
    /// the previous occupant.
    fn swap_change_slot(&mut self, _handler: Option<ChangeHandler>) -> Option<ChangeHandler> {
        None
    }

    /// Schedule `tick` to run once after `delay`. Returns `None` when the
    /// host has no timer primitive.
    fn schedule(&mut self, _delay: Duration, _tick: ChangeHandler) -> Option<TimerId> {
        None
    }

    /// Cancel a timer returned by [`schedule`](Self::schedule).
    fn cancel_timer(&mut self, _id: TimerId) {}
}
