//! Running state machine instances.

use super::context::{Context, Mapper};
use super::hooks::Hooks;
use super::queue::{self, EventQueue, QueueReceiver, WeakEventQueue};
use crate::builder::{BuildError, StateMachineBuilder};
use crate::checkpoint::Checkpoint;
use crate::config::MachineConfig;
use crate::core::{Event, State, StateStream, Transition};
use crate::error::MachineError;
use crate::observer::{isolate, panic_message, MachineRef, ObserverHub};
use futures::stream::{self, BoxStream, StreamExt};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::broadcast;

/// State shared by a machine's handles, its drain task and mapper contexts.
pub(crate) struct Core<E, S> {
    machine: MachineRef,
    state: RwLock<S>,
    // Taken by the drain task on exit, which ends every subscription.
    updates: Mutex<Option<broadcast::Sender<S>>>,
    hooks: Hooks<E, S>,
    hub: Arc<ObserverHub>,
}

impl<E: Event, S: State> Core<E, S> {
    pub(crate) fn current_state(&self) -> S {
        self.state.read().clone()
    }

    pub(crate) fn machine(&self) -> &MachineRef {
        &self.machine
    }

    pub(crate) fn closed_error(&self) -> MachineError {
        MachineError::Closed {
            name: self.machine.name.clone(),
        }
    }

    /// Notify hooks and the hub, then enqueue.
    pub(crate) fn submit(&self, queue: &EventQueue<E>, event: E) -> Result<(), MachineError> {
        if queue.is_closed() {
            return Err(self.closed_error());
        }

        tracing::debug!(
            machine = %self.machine.name,
            id = %self.machine.id,
            event = ?event,
            "event accepted"
        );

        if let Some(hook) = &self.hooks.on_event {
            let _ = isolate("on_event", &self.machine, || hook(&event));
        }
        let _ = self.hub.notify_event(&self.machine, &event);

        queue.push(event).map_err(|_| self.closed_error())
    }

    /// Apply one candidate state, emitting a transition unless it repeats
    /// the current state.
    fn apply(&self, event: &E, next: S) {
        let transition = {
            let mut current = self.state.write();
            if *current == next {
                tracing::trace!(
                    machine = %self.machine.name,
                    id = %self.machine.id,
                    state = ?next,
                    "duplicate state suppressed"
                );
                return;
            }
            let previous = std::mem::replace(&mut *current, next.clone());
            Transition::new(previous, event.clone(), next)
        };

        tracing::trace!(
            machine = %self.machine.name,
            id = %self.machine.id,
            %transition,
            "transition applied"
        );

        if let Some(hook) = &self.hooks.on_transition {
            let _ = isolate("on_transition", &self.machine, || hook(&transition));
        }
        let _ = self.hub.notify_transition(&self.machine, &transition);

        if let Some(updates) = self.updates.lock().as_ref() {
            // No receivers is not an error.
            let _ = updates.send(transition.next_state);
        }
    }

    fn report(&self, error: MachineError) {
        tracing::warn!(
            machine = %self.machine.name,
            id = %self.machine.id,
            code = error.error_code(),
            "{}",
            error
        );

        if let Some(hook) = &self.hooks.on_error {
            let _ = isolate("on_error", &self.machine, || hook(&error));
        }
        let _ = self.hub.notify_error(&self.machine, &error);
    }
}

/// Drain task: the single writer of a machine's state.
struct Processor<E: Event, S: State> {
    core: Arc<Core<E, S>>,
    mapper: Arc<dyn Mapper<E, S>>,
    queue: WeakEventQueue<E>,
}

impl<E: Event, S: State> Processor<E, S> {
    async fn run(self, mut receiver: QueueReceiver<E>) {
        tracing::debug!(
            machine = %self.core.machine.name,
            id = %self.core.machine.id,
            "event queue started"
        );

        while let Some(event) = receiver.next().await {
            self.process(event).await;
        }

        self.core.updates.lock().take();
        tracing::debug!(
            machine = %self.core.machine.name,
            id = %self.core.machine.id,
            "event queue drained"
        );

        // Release the mapper before acknowledging close.
        drop(self);
        drop(receiver);
    }

    async fn process(&self, event: E) {
        let ctx = Context::new(Arc::clone(&self.core), self.queue.clone());
        let mapped = panic::catch_unwind(AssertUnwindSafe(|| {
            self.mapper.map(&ctx, event.clone())
        }));
        let mut candidates = match mapped {
            Ok(candidates) => candidates,
            Err(panic) => {
                self.report_panic(&event, panic.as_ref());
                return;
            }
        };

        loop {
            let polled = AssertUnwindSafe(candidates.next()).catch_unwind().await;
            match polled {
                Ok(Some(Ok(next))) => self.core.apply(&event, next),
                Ok(Some(Err(source))) => {
                    self.core.report(MachineError::Mapping {
                        event: format!("{:?}", event),
                        source,
                    });
                    break;
                }
                Ok(None) => break,
                Err(panic) => {
                    self.report_panic(&event, panic.as_ref());
                    break;
                }
            }
        }
    }

    /// A panicking mapper counts as a failed mapping for that event.
    fn report_panic(&self, event: &E, panic: &(dyn Any + Send)) {
        let message = format!("mapper panicked: {}", panic_message(panic));
        self.core.report(MachineError::Mapping {
            event: format!("{:?}", event),
            source: message.into(),
        });
    }
}

/// Handle to a running state machine.
///
/// Handles are cheap to clone; every clone talks to the same instance.
/// Events from all clones, from any thread, are processed one at a time in
/// the order they were accepted.
///
/// # Example
///
/// ```rust
/// use statebus::core::states;
/// use statebus::StateMachine;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let counter = StateMachine::new(0i64, |ctx, event: &'static str| {
///     let current = ctx.state();
///     match event {
///         "increment" => states::once(current + 1),
///         "decrement" => states::once(current - 1),
///         _ => states::none(),
///     }
/// })
/// .unwrap();
///
/// counter.add("increment").unwrap();
/// counter.add("increment").unwrap();
/// counter.flush().await.unwrap();
/// assert_eq!(counter.current_state(), 2);
///
/// counter.dispose().await;
/// assert!(counter.add("increment").is_err());
/// # }
/// ```
pub struct StateMachine<E: Event, S: State> {
    core: Arc<Core<E, S>>,
    queue: EventQueue<E>,
}

impl<E: Event, S: State> StateMachine<E, S> {
    pub fn builder() -> StateMachineBuilder<E, S> {
        StateMachineBuilder::new()
    }

    /// Build a machine with default configuration on the current runtime.
    pub fn new<F>(initial: S, mapper: F) -> Result<Self, BuildError>
    where
        F: Fn(&Context<E, S>, E) -> StateStream<S> + Send + Sync + 'static,
    {
        Self::builder().initial(initial).mapper(mapper).build()
    }

    pub(crate) fn spawn(
        runtime: &tokio::runtime::Handle,
        initial: S,
        mapper: Arc<dyn Mapper<E, S>>,
        hooks: Hooks<E, S>,
        hub: Arc<ObserverHub>,
        config: &MachineConfig,
    ) -> Self {
        let (updates, _) = broadcast::channel(config.effective_capacity());
        let core = Arc::new(Core {
            machine: MachineRef::new(config.name.clone()),
            state: RwLock::new(initial),
            updates: Mutex::new(Some(updates)),
            hooks,
            hub,
        });
        let (queue, receiver) = queue::channel();

        let processor = Processor {
            core: Arc::clone(&core),
            mapper,
            queue: queue.downgrade(),
        };
        runtime.spawn(processor.run(receiver));

        Self { core, queue }
    }

    /// Submit an event. Returns as soon as the event is queued.
    ///
    /// Mapper failures are reported through hooks and observers, never
    /// here. The only error is [`MachineError::Closed`] after disposal.
    pub fn add(&self, event: E) -> Result<(), MachineError> {
        self.core.submit(&self.queue, event)
    }

    /// State as of the last applied transition.
    pub fn current_state(&self) -> S {
        self.core.current_state()
    }

    pub fn machine_ref(&self) -> &MachineRef {
        &self.core.machine
    }

    pub fn name(&self) -> &str {
        &self.core.machine.name
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Receive every state applied from now on.
    pub fn subscribe(&self) -> StateSubscription<S> {
        StateSubscription {
            receiver: self.core.updates.lock().as_ref().map(|tx| tx.subscribe()),
        }
    }

    /// Wait until every event accepted before this call has been processed.
    ///
    /// Must not be awaited from inside this machine's own mapper, which
    /// would wait on itself.
    pub async fn flush(&self) -> Result<(), MachineError> {
        self.queue
            .flush()
            .await
            .map_err(|_| self.core.closed_error())
    }

    /// Stop accepting events, finish the ones already accepted and release
    /// the mapper. Idempotent; affects every clone of this handle.
    ///
    /// Like [`flush`](Self::flush), must not be awaited from inside this
    /// machine's own mapper, which would wait on itself.
    pub async fn dispose(&self) {
        tracing::debug!(
            machine = %self.core.machine.name,
            id = %self.core.machine.id,
            "disposing"
        );
        self.queue.close().await;
    }

    /// Snapshot the current state for later resumption.
    pub fn checkpoint(&self) -> Checkpoint<S> {
        Checkpoint::capture(&self.core.machine, self.current_state())
    }
}

impl<E: Event, S: State> Clone for StateMachine<E, S> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            queue: self.queue.clone(),
        }
    }
}

impl<E: Event, S: State> fmt::Debug for StateMachine<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("machine", &self.core.machine)
            .field("state", &*self.core.state.read())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Stream of states applied by one machine.
///
/// A subscriber that falls more than the configured capacity behind skips
/// the states it missed and continues with the oldest one still buffered.
/// The subscription ends once the machine is disposed and drained.
pub struct StateSubscription<S> {
    receiver: Option<broadcast::Receiver<S>>,
}

impl<S: State> StateSubscription<S> {
    /// Next applied state, or `None` once the machine has shut down.
    pub async fn next(&mut self) -> Option<S> {
        let receiver = self.receiver.as_mut()?;
        loop {
            let received = receiver.recv().await;
            match received {
                Ok(state) => return Some(state),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "state subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    pub fn into_stream(self) -> BoxStream<'static, S> {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|state| (state, subscription))
        })
        .boxed()
    }
}
