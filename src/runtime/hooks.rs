//! Per-machine extension points.

use crate::core::Transition;
use crate::error::MachineError;
use std::fmt;
use std::sync::Arc;

pub type EventHook<E> = Arc<dyn Fn(&E) + Send + Sync>;
pub type TransitionHook<E, S> = Arc<dyn Fn(&Transition<E, S>) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&MachineError) + Send + Sync>;

/// Optional callbacks run by a single machine.
///
/// Each hook runs before the corresponding [`ObserverHub`] notification:
///
/// - `on_event`: an event was accepted by `add`, before it is queued
/// - `on_transition`: the transition was built and the current state
///   already updated
/// - `on_error`: the mapper failed for an event
///
/// A panicking hook is caught and logged; processing continues.
///
/// [`ObserverHub`]: crate::observer::ObserverHub
///
/// # Example
///
/// ```rust
/// use statebus::runtime::Hooks;
///
/// let hooks: Hooks<&'static str, i64> = Hooks::new()
///     .on_transition(|t| println!("{}", t))
///     .on_error(|e| eprintln!("{}", e));
/// ```
pub struct Hooks<E, S> {
    pub(crate) on_event: Option<EventHook<E>>,
    pub(crate) on_transition: Option<TransitionHook<E, S>>,
    pub(crate) on_error: Option<ErrorHook>,
}

impl<E, S> Hooks<E, S> {
    pub fn new() -> Self {
        Self {
            on_event: None,
            on_transition: None,
            on_error: None,
        }
    }

    pub fn on_event<F>(mut self, hook: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(hook));
        self
    }

    pub fn on_transition<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Transition<E, S>) + Send + Sync + 'static,
    {
        self.on_transition = Some(Arc::new(hook));
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&MachineError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.on_event.is_none() && self.on_transition.is_none() && self.on_error.is_none()
    }
}

impl<E, S> Default for Hooks<E, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, S> Clone for Hooks<E, S> {
    fn clone(&self) -> Self {
        Self {
            on_event: self.on_event.clone(),
            on_transition: self.on_transition.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<E, S> fmt::Debug for Hooks<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_event", &self.on_event.is_some())
            .field("on_transition", &self.on_transition.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn default_hooks_are_empty() {
        let hooks: Hooks<u8, u8> = Hooks::default();
        assert!(hooks.is_empty());
    }

    #[test]
    fn hooks_are_shared_between_clones() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let hooks: Hooks<u8, u8> = Hooks::new().on_event(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let cloned = hooks.clone();

        (hooks.on_event.as_ref().unwrap())(&1);
        (cloned.on_event.as_ref().unwrap())(&2);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cloned.is_empty());
    }
}
