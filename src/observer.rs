//! The location observer: lifecycle, change detection, and dispatch.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::environment::{ChangeHandler, Environment, Location};
use crate::error::{SetupError, WatchResult};
use crate::fragment;
use crate::parser::FragmentParser;
use crate::policy::{self, ErrorPolicy};
use crate::strategy::{self, ActiveStrategy};
use crate::subscriber::{
    same_function, Callback, SubscriberContext, SubscriberFn, Subscription,
};
use crate::value::FragmentValue;

/// Default cadence for the polling fallback.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(100);

struct Inner {
    env: Option<Rc<RefCell<dyn Environment>>>,
    location: Option<Rc<dyn Location>>,
    last_fragment: String,
    history: Vec<String>,
    subscribers: Vec<Subscription>,
    parser: Option<Box<dyn FragmentParser>>,
    previous_handler: Option<ChangeHandler>,
    policy: Option<Rc<dyn ErrorPolicy>>,
    polling_interval: Duration,
    strategy: Option<ActiveStrategy>,
}

/// How a detected change gets delivered, decided by the parser branch.
enum Delivery {
    Value(FragmentValue),
    Failed(crate::error::ParseError),
    LoggedOnly,
}

/// Observes a host environment's fragment identifier and notifies
/// subscribers on every accepted change.
///
/// Created inert; [`init`](Self::init) binds an environment, runs one
/// baseline detection pass, and engages an observation strategy. All state
/// (history, last fragment, registry) is private to the instance.
///
/// # Delivery caveat
/// When a dispatch aborts on an unhandled subscriber error, the last
/// fragment is not advanced, so re-triggering the same change re-delivers
/// to *all* subscribers, including ones that already succeeded.
pub struct LocationObserver {
    inner: Rc<RefCell<Inner>>,
}

impl LocationObserver {
    /// Creates an inert observer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                env: None,
                location: None,
                last_fragment: String::new(),
                history: Vec::new(),
                subscribers: Vec::new(),
                parser: None,
                previous_handler: None,
                policy: None,
                polling_interval: DEFAULT_POLLING_INTERVAL,
                strategy: None,
            })),
        }
    }

    /// Binds the environment, runs one baseline detection pass with the
    /// fragment present at init time, and starts observing.
    ///
    /// # Errors
    /// `SetupError::MissingLocation` when the environment exposes no
    /// location; `SetupError::NoObservationChannel` when no observation
    /// strategy can be engaged; any pipeline error raised by the baseline
    /// pass.
    pub fn init(&self, env: Rc<RefCell<dyn Environment>>) -> WatchResult<()> {
        let location = env
            .borrow()
            .location()
            .ok_or(SetupError::MissingLocation)?;

        {
            let mut inner = self.inner.borrow_mut();
            inner.env = Some(env);
            inner.location = Some(location);
        }

        Self::handle_change(&self.inner)?;
        self.start_observing()?;
        Ok(())
    }

    /// Stops observing and releases the environment, location, parser, and
    /// subscriber references. Safe to call repeatedly or on an observer
    /// that was never initialized.
    pub fn dispose(&self) {
        let (env, strategy) = {
            let mut inner = self.inner.borrow_mut();
            (inner.env.take(), inner.strategy.take())
        };

        if let (Some(env), Some(strategy)) = (env, strategy) {
            strategy::disengage(&env, strategy);
        }

        let mut inner = self.inner.borrow_mut();
        if let Some(mut parser) = inner.parser.take() {
            parser.dispose();
        }
        inner.location = None;
        inner.previous_handler = None;
        inner.subscribers.clear();
        inner.history.clear();
    }

    /// Runs one change-detection pass immediately.
    ///
    /// # Errors
    /// `SetupError::MissingEnvironment` when the observer is not
    /// initialized; otherwise any unmediated pipeline error.
    pub fn check_now(&self) -> WatchResult<()> {
        if self.inner.borrow().location.is_none() {
            return Err(SetupError::MissingEnvironment.into());
        }
        Self::handle_change(&self.inner)
    }

    /// Registers a context-less function subscriber.
    pub fn subscribe(&self, callback: SubscriberFn) {
        self.inner.borrow_mut().subscribers.push(Subscription {
            context: None,
            callback: Callback::Function(callback),
        });
    }

    /// Registers a function subscriber anchored to `context`. The context
    /// is the identity handle for unsubscription; the closure itself
    /// captures whatever state it needs.
    pub fn subscribe_with(&self, context: Rc<dyn SubscriberContext>, callback: SubscriberFn) {
        self.inner.borrow_mut().subscribers.push(Subscription {
            context: Some(context),
            callback: Callback::Function(callback),
        });
    }

    /// Registers a late-bound method subscriber. The name is validated
    /// against the context once, here; dispatch resolves it live, so the
    /// context may reroute the name afterwards.
    ///
    /// # Errors
    /// `SetupError::UnknownMethod` when the context does not have the
    /// method; the registry is left unchanged.
    pub fn subscribe_method(
        &self,
        context: Rc<dyn SubscriberContext>,
        method: &str,
    ) -> Result<(), SetupError> {
        if !context.has_method(method) {
            return Err(SetupError::UnknownMethod {
                name: method.to_string(),
            });
        }
        self.inner.borrow_mut().subscribers.push(Subscription {
            context: Some(context),
            callback: Callback::MethodName(method.to_string()),
        });
        Ok(())
    }

    /// Removes every subscription anchored to `context`.
    pub fn unsubscribe_all(&self, context: &Rc<dyn SubscriberContext>) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|s| !s.matches_context(context));
    }

    /// Removes the first subscription matching `context` and `callback`
    /// identity, if any.
    pub fn unsubscribe_fn(&self, context: &Rc<dyn SubscriberContext>, callback: &SubscriberFn) {
        let mut inner = self.inner.borrow_mut();
        let found = inner.subscribers.iter().position(|s| {
            s.matches_context(context)
                && matches!(&s.callback, Callback::Function(f) if same_function(f, callback))
        });
        if let Some(index) = found {
            inner.subscribers.remove(index);
        }
    }

    /// Removes the first subscription matching `context` and `method`
    /// name, if any.
    pub fn unsubscribe_method(&self, context: &Rc<dyn SubscriberContext>, method: &str) {
        let mut inner = self.inner.borrow_mut();
        let found = inner.subscribers.iter().position(|s| {
            s.matches_context(context)
                && matches!(&s.callback, Callback::MethodName(name) if name == method)
        });
        if let Some(index) = found {
            inner.subscribers.remove(index);
        }
    }

    /// Installs the fragment parser.
    pub fn set_parser(&self, parser: Box<dyn FragmentParser>) {
        self.inner.borrow_mut().parser = Some(parser);
    }

    /// Installs the error policy consulted for pipeline failures.
    pub fn set_error_policy(&self, policy: Rc<dyn ErrorPolicy>) {
        self.inner.borrow_mut().policy = Some(policy);
    }

    /// Sets the polling cadence used when the timer strategy is engaged.
    /// Takes effect from the next scheduling decision.
    pub fn set_polling_interval(&self, interval: Duration) {
        self.inner.borrow_mut().polling_interval = interval;
    }

    /// Returns the polling cadence.
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        self.inner.borrow().polling_interval
    }

    /// Returns every fragment accepted as a distinct change, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.inner.borrow().history.clone()
    }

    /// Returns the most recently accepted fragment, or the empty string
    /// before the first accepted change.
    #[must_use]
    pub fn last_fragment(&self) -> String {
        self.inner.borrow().last_fragment.clone()
    }

    /// Returns true while an observation strategy is engaged.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.inner.borrow().strategy.is_some()
    }

    /// Returns the engaged strategy, if any.
    #[must_use]
    pub fn active_strategy(&self) -> Option<ActiveStrategy> {
        self.inner.borrow().strategy
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn start_observing(&self) -> WatchResult<()> {
        let env = self
            .inner
            .borrow()
            .env
            .clone()
            .ok_or(SetupError::MissingEnvironment)?;
        let handler = Self::change_handler(&self.inner);
        let interval = self.inner.borrow().polling_interval;

        let engagement = strategy::engage(&env, handler, interval)?;

        let mut inner = self.inner.borrow_mut();
        inner.previous_handler = engagement.previous_handler;
        inner.strategy = Some(engagement.strategy);
        Ok(())
    }

    /// Builds the handler installed into the environment. Holds only a
    /// weak reference so a disposed observer never keeps state alive
    /// through a channel the host forgot to clear.
    fn change_handler(inner: &Rc<RefCell<Inner>>) -> ChangeHandler {
        let weak = Rc::downgrade(inner);
        Rc::new(move || {
            let Some(inner) = weak.upgrade() else {
                return Ok(());
            };
            let result = Self::handle_change(&inner);
            Self::rearm_if_polling(&inner);
            result
        })
    }

    /// The polling timer is a schedule-once primitive, so every tick arms
    /// the next one, error or not.
    fn rearm_if_polling(inner: &Rc<RefCell<Inner>>) {
        let (env, interval, polling) = {
            let guard = inner.borrow();
            (
                guard.env.clone(),
                guard.polling_interval,
                matches!(guard.strategy, Some(ActiveStrategy::Polling(_))),
            )
        };
        if !polling {
            return;
        }
        let Some(env) = env else {
            return;
        };

        let handler = Self::change_handler(inner);
        let id = env.borrow_mut().schedule(interval, handler);
        if let Some(id) = id {
            inner.borrow_mut().strategy = Some(ActiveStrategy::Polling(id));
        }
    }

    fn handle_change(inner: &Rc<RefCell<Inner>>) -> WatchResult<()> {
        let (location, policy, previous) = {
            let guard = inner.borrow();
            let Some(location) = guard.location.clone() else {
                return Ok(());
            };
            (location, guard.policy.clone(), guard.previous_handler.clone())
        };

        let fragment = fragment::current_fragment(location.as_ref());

        {
            let guard = inner.borrow();
            if fragment.trim().is_empty() || fragment == guard.last_fragment {
                return Ok(());
            }
        }

        // A rethrown previous-handler error aborts before anything is
        // recorded, so the same change is retried on the next pass.
        if let Some(previous) = previous {
            if let Err(error) = previous() {
                policy::mediate(policy.as_ref(), error)?;
            }
        }

        // History grows for every accepted change, delivered or not, and
        // is never rolled back; only last_fragment waits for the branch
        // to finish cleanly.
        let delivery = {
            let mut guard = inner.borrow_mut();
            guard.history.push(fragment.clone());
            match &guard.parser {
                None => Delivery::Value(FragmentValue::Text(fragment.clone())),
                Some(parser) if parser.test(&fragment) => match parser.deserialize(&fragment) {
                    Ok(decoded) => Delivery::Value(decoded),
                    Err(error) => Delivery::Failed(error),
                },
                Some(_) => Delivery::LoggedOnly,
            }
        };

        match delivery {
            Delivery::LoggedOnly => {}
            Delivery::Failed(error) => {
                // Swallowed decode failures still end the pass: nothing
                // was delivered, last_fragment stays put.
                policy::mediate(policy.as_ref(), error.into())?;
                return Ok(());
            }
            Delivery::Value(decoded) => Self::dispatch(inner, &decoded, &fragment)?,
        }

        inner.borrow_mut().last_fragment = fragment;
        Ok(())
    }

    /// Invokes every subscriber in registration order with the decoded and
    /// raw fragment. The registry is snapshotted first, so subscribers may
    /// re-enter subscribe/unsubscribe; an unhandled error aborts the loop.
    fn dispatch(
        inner: &Rc<RefCell<Inner>>,
        decoded: &FragmentValue,
        raw: &str,
    ) -> WatchResult<()> {
        let (subscribers, policy) = {
            let guard = inner.borrow();
            (guard.subscribers.clone(), guard.policy.clone())
        };

        for subscription in &subscribers {
            if let Err(error) = subscription.invoke(decoded, raw) {
                policy::mediate(policy.as_ref(), error.into())?;
            }
        }
        Ok(())
    }
}

impl Default for LocationObserver {
    fn default() -> Self {
        Self::new()
    }
}
