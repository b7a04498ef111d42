//! Event system shared by the resilience components.
//!
//! Each component (cache, breaker, retry) defines its own event enum and
//! emits through a [`Listeners`] collection. A panicking listener must not
//! take the component down or starve the listeners after it, so `emit`
//! isolates each call.

use std::fmt;
use std::sync::Arc;

/// An observability event emitted by a statgate component.
pub trait Event: Send + Sync + fmt::Debug {
    /// Short machine-readable discriminator, e.g. `"state_transition"`.
    fn kind(&self) -> &'static str;

    /// Name of the component instance that emitted the event.
    fn component(&self) -> &str;
}

/// A consumer of component events.
pub trait Listener<E: Event>: Send + Sync {
    fn on_event(&self, event: &E);
}

/// A collection of listeners for one event type.
#[derive(Clone)]
pub struct Listeners<E: Event> {
    inner: Vec<Arc<dyn Listener<E>>>,
}

impl<E: Event> Listeners<E> {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    pub fn add<L>(&mut self, listener: L)
    where
        L: Listener<E> + 'static,
    {
        self.inner.push(Arc::new(listener));
    }

    /// Emits an event to every listener, isolating panics so one
    /// misbehaving listener cannot suppress the rest.
    pub fn emit(&self, event: &E) {
        for listener in &self.inner {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
            if outcome.is_err() {
                tracing::warn!(
                    component = event.component(),
                    kind = event.kind(),
                    "event listener panicked"
                );
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<E: Event> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapter turning a closure into a [`Listener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _marker: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<E, F> Listener<E> for FnListener<E, F>
where
    E: Event,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
