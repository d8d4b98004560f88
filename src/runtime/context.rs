//! Mappers and the context they run in.

use super::machine::Core;
use super::queue::WeakEventQueue;
use crate::core::{Event, State, StateStream};
use crate::error::MachineError;
use crate::observer::MachineRef;
use std::sync::Arc;

/// Turns an event and the current state into candidate next states.
///
/// The returned stream is drained completely before the machine takes the
/// next event, so a mapper may suspend (await I/O, timers) between states
/// without another event of the same machine interleaving.
///
/// Closures of the shape `Fn(&Context<E, S>, E) -> StateStream<S>`
/// implement this trait.
pub trait Mapper<E: Event, S: State>: Send + Sync + 'static {
    fn map(&self, ctx: &Context<E, S>, event: E) -> StateStream<S>;
}

impl<E, S, F> Mapper<E, S> for F
where
    E: Event,
    S: State,
    F: Fn(&Context<E, S>, E) -> StateStream<S> + Send + Sync + 'static,
{
    fn map(&self, ctx: &Context<E, S>, event: E) -> StateStream<S> {
        self(ctx, event)
    }
}

/// View of the running machine handed to its mapper.
///
/// The context can be cloned into the mapper's stream. It reads the live
/// current state, which advances as earlier states of the same stream are
/// applied, and can submit further events to its own machine.
pub struct Context<E, S> {
    core: Arc<Core<E, S>>,
    queue: WeakEventQueue<E>,
}

impl<E: Event, S: State> Context<E, S> {
    pub(crate) fn new(core: Arc<Core<E, S>>, queue: WeakEventQueue<E>) -> Self {
        Self { core, queue }
    }

    /// The machine's current state.
    pub fn state(&self) -> S {
        self.core.current_state()
    }

    pub fn machine(&self) -> &MachineRef {
        self.core.machine()
    }

    /// Queue another event on the same machine.
    ///
    /// The event is processed after the current one, never nested inside it.
    pub fn add(&self, event: E) -> Result<(), MachineError> {
        if self.queue.is_closed() {
            return Err(self.core.closed_error());
        }
        let queue = self.queue.upgrade().ok_or_else(|| self.core.closed_error())?;
        self.core.submit(&queue, event)
    }
}

impl<E, S> Clone for Context<E, S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            queue: self.queue.clone(),
        }
    }
}
