//! Subscription records and invocation.
//!
//! Subscribers come in two shapes: a function registered directly, or a
//! method name resolved on a context object at dispatch time. The shape is
//! a tagged union so dispatch is a pattern match, not runtime type
//! inspection.

use std::rc::Rc;

use crate::error::SubscriberError;
use crate::value::FragmentValue;

/// Context object a subscription can be anchored to.
///
/// `has_method` and `call_method` back the late-bound method-name shape;
/// contexts that only anchor function subscriptions can rely on the
/// defaults. `call_method` is resolved live at dispatch time, so
/// implementations may reroute names after subscription.
pub trait SubscriberContext {
    /// Whether `name` is callable on this context. Checked once, at
    /// subscription time.
    fn has_method(&self, _name: &str) -> bool {
        false
    }

    /// Invoke `name` with the decoded and raw fragment.
    fn call_method(
        &self,
        name: &str,
        _decoded: &FragmentValue,
        _raw: &str,
    ) -> Result<(), SubscriberError> {
        Err(SubscriberError::new(format!(
            "Method '{name}' does not exist on the context"
        )))
    }
}

/// Function-shaped subscriber callback.
pub type SubscriberFn = Rc<dyn Fn(&FragmentValue, &str) -> Result<(), SubscriberError>>;

/// The two subscriber shapes.
#[derive(Clone)]
pub enum Callback {
    /// A callable registered directly.
    Function(SubscriberFn),
    /// A method name resolved on the context at dispatch time.
    MethodName(String),
}

/// One registry entry. Never mutated after creation; duplicate
/// registrations are allowed and each is invoked independently.
#[derive(Clone)]
pub struct Subscription {
    pub(crate) context: Option<Rc<dyn SubscriberContext>>,
    pub(crate) callback: Callback,
}

impl Subscription {
    pub(crate) fn invoke(
        &self,
        decoded: &FragmentValue,
        raw: &str,
    ) -> Result<(), SubscriberError> {
        match &self.callback {
            Callback::Function(callback) => callback(decoded, raw),
            Callback::MethodName(name) => match &self.context {
                Some(context) => context.call_method(name, decoded, raw),
                None => Err(SubscriberError::new(format!(
                    "Method '{name}' has no context to resolve against"
                ))),
            },
        }
    }

    pub(crate) fn matches_context(&self, context: &Rc<dyn SubscriberContext>) -> bool {
        match &self.context {
            Some(own) => same_context(own, context),
            None => false,
        }
    }
}

/// Identity comparison for context handles. Compares the data pointer only,
/// so two clones of the same `Rc` always match.
pub(crate) fn same_context(a: &Rc<dyn SubscriberContext>, b: &Rc<dyn SubscriberContext>) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a).cast::<u8>(),
        Rc::as_ptr(b).cast::<u8>(),
    )
}

/// Identity comparison for function callbacks.
pub(crate) fn same_function(a: &SubscriberFn, b: &SubscriberFn) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a).cast::<u8>(),
        Rc::as_ptr(b).cast::<u8>(),
    )
}
