//! Constructors for mapper output streams.
//!
//! A mapper answers each event with a [`StateStream`]: a lazy, finite
//! sequence of candidate states. The stream may suspend between items and
//! may end with an error, in which case the states yielded before the error
//! remain applied.

use super::state::State;
use crate::error::BoxError;
use futures::future::Future;
use futures::stream::{self, BoxStream, StreamExt};

/// Lazy sequence of candidate states produced for one event.
pub type StateStream<S> = BoxStream<'static, Result<S, BoxError>>;

/// A stream yielding exactly one state.
pub fn once<S: State>(state: S) -> StateStream<S> {
    stream::iter(std::iter::once(Ok::<S, BoxError>(state))).boxed()
}

/// A stream yielding every state of `states` in order.
///
/// ```rust
/// use futures::StreamExt;
/// use statebus::core::states;
///
/// let collected: Vec<u32> = futures::executor::block_on(
///     states::iter(vec![1, 2, 3]).map(|s| s.unwrap()).collect(),
/// );
/// assert_eq!(collected, vec![1, 2, 3]);
/// ```
pub fn iter<S, I>(states: I) -> StateStream<S>
where
    S: State,
    I: IntoIterator<Item = S>,
    I::IntoIter: Send + 'static,
{
    stream::iter(states.into_iter().map(Ok::<S, BoxError>)).boxed()
}

/// A stream yielding nothing. The event is accepted but changes nothing.
pub fn none<S: State>() -> StateStream<S> {
    stream::empty().boxed()
}

/// A stream that fails immediately without yielding a state.
pub fn fail<S, E>(error: E) -> StateStream<S>
where
    S: State,
    E: Into<BoxError>,
{
    let error: BoxError = error.into();
    stream::iter(std::iter::once(Err::<S, BoxError>(error))).boxed()
}

/// A stream yielding the state of `result`, or failing with its error.
pub fn from_result<S, E>(result: Result<S, E>) -> StateStream<S>
where
    S: State,
    E: Into<BoxError>,
{
    match result {
        Ok(state) => once(state),
        Err(error) => fail(error),
    }
}

/// A stream resolving a single asynchronous computation.
pub fn from_future<S, F>(future: F) -> StateStream<S>
where
    S: State,
    F: Future<Output = Result<S, BoxError>> + Send + 'static,
{
    stream::once(future).boxed()
}
