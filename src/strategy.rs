//! Observation strategy negotiation.
//!
//! Four mutually exclusive channels exist for noticing fragment changes.
//! They are probed in a fixed order and the winner is recorded so disposal
//! can mirror it exactly.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::environment::{ChangeHandler, Environment, TimerId};
use crate::error::SetupError;

/// Which observation channel is currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveStrategy {
    /// Standard listener registration.
    Listener,
    /// Older attach/detach mechanism.
    Attached,
    /// Single assignable handler slot; the previous occupant is captured
    /// by the observer as its "previous handler".
    Slot,
    /// Polling timer fallback, re-armed on every tick.
    Polling(TimerId),
}

/// Outcome of strategy negotiation.
pub(crate) struct Engagement {
    pub(crate) strategy: ActiveStrategy,
    /// Previous occupant of the handler slot, when the slot path won.
    pub(crate) previous_handler: Option<ChangeHandler>,
}

impl std::fmt::Debug for Engagement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engagement")
            .field("strategy", &self.strategy)
            .field("previous_handler", &self.previous_handler.is_some())
            .finish()
    }
}

/// Probe the environment's channels in order: listener, attach, slot,
/// polling timer.
pub(crate) fn engage(
    env: &Rc<RefCell<dyn Environment>>,
    handler: ChangeHandler,
    interval: Duration,
) -> Result<Engagement, SetupError> {
    let mut env = env.borrow_mut();

    if env.supports_change_events() {
        if env.add_change_listener(handler.clone()) {
            return Ok(Engagement {
                strategy: ActiveStrategy::Listener,
                previous_handler: None,
            });
        }
        if env.attach_change_handler(handler.clone()) {
            return Ok(Engagement {
                strategy: ActiveStrategy::Attached,
                previous_handler: None,
            });
        }
        if env.has_change_slot() {
            let previous_handler = env.swap_change_slot(Some(handler));
            return Ok(Engagement {
                strategy: ActiveStrategy::Slot,
                previous_handler,
            });
        }
    }

    match env.schedule(interval, handler) {
        Some(id) => Ok(Engagement {
            strategy: ActiveStrategy::Polling(id),
            previous_handler: None,
        }),
        None => Err(SetupError::NoObservationChannel),
    }
}

/// Undo whichever channel [`engage`] selected. The slot is cleared, not
/// restored to its previous occupant.
pub(crate) fn disengage(env: &Rc<RefCell<dyn Environment>>, strategy: ActiveStrategy) {
    let mut env = env.borrow_mut();
    match strategy {
        ActiveStrategy::Listener => {
            env.remove_change_listener();
        }
        ActiveStrategy::Attached => {
            env.detach_change_handler();
        }
        ActiveStrategy::Slot => {
            env.swap_change_slot(None);
        }
        ActiveStrategy::Polling(id) => env.cancel_timer(id),
    }
}
