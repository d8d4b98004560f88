//! Per-machine event queue.
//!
//! Events pushed from any number of tasks or threads land in a single
//! unbounded FIFO channel that exactly one drain task consumes. Besides
//! events the channel carries flush and close markers, so both are ordered
//! with respect to the events pushed before them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum Command<E> {
    Event(E),
    Flush(oneshot::Sender<()>),
    Close(oneshot::Sender<()>),
}

/// The queue no longer accepts events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QueueClosed;

/// Sending half of a machine's event queue.
pub(crate) struct EventQueue<E> {
    sender: mpsc::UnboundedSender<Command<E>>,
    closed: Arc<AtomicBool>,
}

impl<E> Clone for EventQueue<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

/// Sending half that does not keep the queue alive.
pub(crate) struct WeakEventQueue<E> {
    sender: mpsc::WeakUnboundedSender<Command<E>>,
    closed: Arc<AtomicBool>,
}

impl<E> Clone for WeakEventQueue<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

/// Receiving half, owned by the drain task.
///
/// Close acknowledgements are released when the receiver is dropped, which
/// happens only after every accepted event has been handed out.
pub(crate) struct QueueReceiver<E> {
    receiver: mpsc::UnboundedReceiver<Command<E>>,
    closed: Arc<AtomicBool>,
    close_acks: Vec<oneshot::Sender<()>>,
}

pub(crate) fn channel<E>() -> (EventQueue<E>, QueueReceiver<E>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));
    (
        EventQueue {
            sender,
            closed: Arc::clone(&closed),
        },
        QueueReceiver {
            receiver,
            closed,
            close_acks: Vec::new(),
        },
    )
}

impl<E> EventQueue<E> {
    /// Enqueue an event. Never blocks.
    pub(crate) fn push(&self, event: E) -> Result<(), QueueClosed> {
        if self.is_closed() {
            return Err(QueueClosed);
        }
        self.sender
            .send(Command::Event(event))
            .map_err(|_| QueueClosed)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Resolve once every event pushed before this call has been processed.
    pub(crate) async fn flush(&self) -> Result<(), QueueClosed> {
        if self.is_closed() {
            return Err(QueueClosed);
        }
        let (ack, done) = oneshot::channel();
        self.sender
            .send(Command::Flush(ack))
            .map_err(|_| QueueClosed)?;
        done.await.map_err(|_| QueueClosed)
    }

    /// Stop accepting events and wait until already accepted ones are processed.
    pub(crate) async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let (ack, done) = oneshot::channel();
        if self.sender.send(Command::Close(ack)).is_ok() {
            // An Err means the drain task is already gone.
            let _ = done.await;
        }
    }

    pub(crate) fn downgrade(&self) -> WeakEventQueue<E> {
        WeakEventQueue {
            sender: self.sender.downgrade(),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<E> WeakEventQueue<E> {
    pub(crate) fn upgrade(&self) -> Option<EventQueue<E>> {
        self.sender.upgrade().map(|sender| EventQueue {
            sender,
            closed: Arc::clone(&self.closed),
        })
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<E> QueueReceiver<E> {
    /// Next event in FIFO order, or `None` once the queue is closed and empty.
    pub(crate) async fn next(&mut self) -> Option<E> {
        loop {
            match self.receiver.recv().await? {
                Command::Event(event) => return Some(event),
                Command::Flush(ack) => {
                    let _ = ack.send(());
                }
                Command::Close(ack) => {
                    self.closed.store(true, Ordering::Release);
                    // Buffered commands are still delivered before recv yields None.
                    self.receiver.close();
                    self.close_acks.push(ack);
                }
            }
        }
    }
}

impl<E> Drop for QueueReceiver<E> {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
        for ack in self.close_acks.drain(..) {
            let _ = ack.send(());
        }
    }
}
