//! Error mediation policy.
//!
//! A single optional policy, injected per observer instance, is consulted
//! whenever a subscriber, a captured previous handler, or a parser fails.
//! It decides between graceful recovery and propagation.

use std::rc::Rc;

use crate::error::{WatchError, WatchResult};

/// Decides whether a pipeline error is recoverable.
pub trait ErrorPolicy {
    /// Returns true when the error has been handled and execution may
    /// continue at the raising site; false (the default verdict when no
    /// policy is installed) propagates the error to the caller of the
    /// triggering operation.
    fn handle(&self, error: &WatchError) -> bool;
}

impl<F> ErrorPolicy for F
where
    F: Fn(&WatchError) -> bool,
{
    fn handle(&self, error: &WatchError) -> bool {
        self(error)
    }
}

/// Offer `error` to the policy. `Ok(())` means the error was swallowed and
/// the raising site continues; `Err` carries the original error unchanged.
pub(crate) fn mediate(
    policy: Option<&Rc<dyn ErrorPolicy>>,
    error: WatchError,
) -> WatchResult<()> {
    match policy {
        Some(policy) if policy.handle(&error) => Ok(()),
        _ => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubscriberError;

    fn failure() -> WatchError {
        SubscriberError::new("faux error").into()
    }

    #[test]
    fn test_no_policy_propagates() {
        let result = mediate(None, failure());
        assert!(result.is_err());
        assert!(result.unwrap_err().is_subscriber());
    }

    #[test]
    fn test_truthy_verdict_swallows() {
        let policy: Rc<dyn ErrorPolicy> = Rc::new(|_: &WatchError| true);
        assert!(mediate(Some(&policy), failure()).is_ok());
    }

    #[test]
    fn test_falsey_verdict_rethrows_original() {
        let policy: Rc<dyn ErrorPolicy> = Rc::new(|_: &WatchError| false);
        let err = mediate(Some(&policy), failure()).unwrap_err();
        assert_eq!(format!("{err}"), "Subscriber failure: faux error");
    }

    #[test]
    fn test_policy_sees_the_error() {
        use std::cell::RefCell;

        struct Recording {
            seen: RefCell<Vec<String>>,
        }

        impl ErrorPolicy for Recording {
            fn handle(&self, error: &WatchError) -> bool {
                self.seen.borrow_mut().push(format!("{error}"));
                true
            }
        }

        let recording = Rc::new(Recording {
            seen: RefCell::new(Vec::new()),
        });
        let policy: Rc<dyn ErrorPolicy> = recording.clone();

        mediate(Some(&policy), failure()).unwrap();

        let seen = recording.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("faux error"));
    }
}
