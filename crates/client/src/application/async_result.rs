//! Single-assignment asynchronous results.
//!
//! Every facade operation returns an [`AsyncResult`] immediately. The result
//! is either created already settled ([`AsyncResult::resolved`],
//! [`AsyncResult::failed`]) or pending, in which case exactly one
//! [`Completer`] can settle it later. Callers either `.await` it or poll it
//! without blocking via [`AsyncResult::try_result`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::error::ServiceError;

type Outcome<T> = Result<T, ServiceError>;

enum State<T> {
    Settled(Outcome<T>),
    Pending(oneshot::Receiver<Outcome<T>>),
    Taken,
}

/// The eventual outcome of a facade operation.
///
/// Dropping the [`Completer`] without settling resolves the result to
/// [`ServiceError::Cancelled`].
#[must_use = "an AsyncResult does nothing unless awaited or polled"]
pub struct AsyncResult<T> {
    state: State<T>,
    title: Option<String>,
}

// The receiver is Unpin and settled values are never pinned.
impl<T> Unpin for AsyncResult<T> {}

impl<T> AsyncResult<T> {
    /// A pending result plus the handle that settles it.
    pub fn pending() -> (Completer<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            Completer { tx },
            Self {
                state: State::Pending(rx),
                title: None,
            },
        )
    }

    pub fn resolved(value: T) -> Self {
        Self {
            state: State::Settled(Ok(value)),
            title: None,
        }
    }

    pub fn failed(error: ServiceError) -> Self {
        Self {
            state: State::Settled(Err(error)),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Human-readable title of the work behind this result, if it has one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Take the outcome if it is available, without waiting.
    ///
    /// Returns `None` while pending and after the outcome was taken.
    pub fn try_result(&mut self) -> Option<Outcome<T>> {
        match std::mem::replace(&mut self.state, State::Taken) {
            State::Settled(outcome) => Some(outcome),
            State::Pending(mut rx) => match rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => {
                    self.state = State::Pending(rx);
                    None
                }
                Err(oneshot::error::TryRecvError::Closed) => Some(Err(ServiceError::Cancelled)),
            },
            State::Taken => None,
        }
    }
}

impl<T> Future for AsyncResult<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let State::Pending(rx) = &mut this.state {
            let outcome = match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(received) => received.unwrap_or(Err(ServiceError::Cancelled)),
            };
            this.state = State::Taken;
            return Poll::Ready(outcome);
        }

        match std::mem::replace(&mut this.state, State::Taken) {
            State::Settled(outcome) => Poll::Ready(outcome),
            // Polled again after completion.
            _ => Poll::Ready(Err(ServiceError::Cancelled)),
        }
    }
}

impl<T> std::fmt::Debug for AsyncResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Settled(Ok(_)) => "resolved",
            State::Settled(Err(_)) => "failed",
            State::Pending(_) => "pending",
            State::Taken => "taken",
        };
        f.debug_struct("AsyncResult")
            .field("state", &state)
            .field("title", &self.title)
            .finish()
    }
}

/// Settles the [`AsyncResult`] it was created with. Consumed on use.
pub struct Completer<T> {
    tx: oneshot::Sender<Outcome<T>>,
}

impl<T> Completer<T> {
    pub fn complete(self, outcome: Outcome<T>) {
        // The caller may have dropped its result; nobody is left to tell.
        let _ = self.tx.send(outcome);
    }

    pub fn resolve(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: ServiceError) {
        self.complete(Err(error));
    }

    /// True once the matching result has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolved_result_is_ready_immediately() {
        let mut result = AsyncResult::resolved(7);
        assert_eq!(result.try_result().unwrap().unwrap(), 7);
        assert!(result.try_result().is_none());
    }

    #[tokio::test]
    async fn failed_result_awaits_to_error() {
        let result: AsyncResult<()> = AsyncResult::failed(ServiceError::validation("no id"));
        assert!(result.await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn pending_result_settles_once_completed() {
        let (completer, mut result) = AsyncResult::pending();
        assert!(result.try_result().is_none());

        completer.resolve("done");

        assert_eq!(result.await.unwrap(), "done");
    }

    #[tokio::test]
    async fn completion_from_another_task_wakes_awaiter() {
        let (completer, result) = AsyncResult::<u32>::pending();

        tokio::spawn(async move {
            tokio::task::yield_now().await;
            completer.resolve(42);
        });

        assert_eq!(result.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn dropped_completer_cancels() {
        let (completer, result) = AsyncResult::<u32>::pending();
        drop(completer);
        assert!(matches!(result.await, Err(ServiceError::Cancelled)));
    }

    #[test]
    fn completer_sees_abandoned_result() {
        let (completer, result) = AsyncResult::<u32>::pending();
        assert!(!completer.is_abandoned());
        drop(result);
        assert!(completer.is_abandoned());
    }

    #[test]
    fn carries_title() {
        let result = AsyncResult::resolved(()).with_title("Loading news");
        assert_eq!(result.title(), Some("Loading news"));
    }
}
