//! Outcome of a dialog and its translation into a future.
//!
//! Every "ask the user for X" entry point funnels its result through
//! [`InputResolver::into_handler`], so confirmation and cancellation look the
//! same no matter which dialog produced them.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::channel::oneshot;

/// The user cancelled the dialog, or the dialog went away without an answer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, thiserror::Error)]
#[error("input aborted by the user")]
pub struct AbortedError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputResponse<T> {
    Confirmed(T),
    Cancelled,
}

impl<T> InputResponse<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Confirmed(value) => Some(value),
            Self::Cancelled => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Confirmed(value) => Some(value),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> InputResponse<U> {
        match self {
            Self::Confirmed(value) => InputResponse::Confirmed(f(value)),
            Self::Cancelled => InputResponse::Cancelled,
        }
    }

    pub fn into_result(self) -> Result<T, AbortedError> {
        match self {
            Self::Confirmed(value) => Ok(value),
            Self::Cancelled => Err(AbortedError),
        }
    }
}

impl<T> From<Option<T>> for InputResponse<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Cancelled, Self::Confirmed)
    }
}

/// Creates a connected resolver/future pair.
pub fn channel<T>() -> (InputResolver<T>, InputFuture<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        InputResolver {
            sender: Arc::new(Mutex::new(Some(sender))),
        },
        InputFuture { receiver },
    )
}

/// Write side of an [`InputFuture`]. Resolves at most once; clones share the
/// same slot.
pub struct InputResolver<T> {
    sender: Arc<Mutex<Option<oneshot::Sender<Result<T, AbortedError>>>>>,
}

impl<T> Clone for InputResolver<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> InputResolver<T> {
    /// Returns `false` when the future was already resolved.
    pub fn resolve(&self, response: InputResponse<T>) -> bool {
        let sender = match self.sender.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(sender) = sender else {
            return false;
        };
        // A dropped receiver means nobody is waiting; the slot is spent either way.
        let _ = sender.send(response.into_result());
        true
    }

    pub fn is_resolved(&self) -> bool {
        match self.sender.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// Adapts the resolver into the callback shape every dialog accepts.
    pub fn into_handler(self) -> impl FnOnce(InputResponse<T>) + Send + 'static
    where
        T: Send + 'static,
    {
        move |response| {
            self.resolve(response);
        }
    }
}

/// Resolves to the confirmed value or [`AbortedError`].
///
/// If the resolver is dropped unresolved the future yields `AbortedError`.
#[must_use = "an InputFuture does nothing unless awaited"]
pub struct InputFuture<T> {
    receiver: oneshot::Receiver<Result<T, AbortedError>>,
}

impl<T> InputFuture<T> {
    /// A future that is already resolved with `response`.
    pub fn ready(response: InputResponse<T>) -> Self {
        let (resolver, future) = channel();
        resolver.resolve(response);
        future
    }

    /// Non-blocking check; `None` while the dialog is still open.
    pub fn try_take(&mut self) -> Option<Result<T, AbortedError>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(AbortedError)),
        }
    }
}

impl<T> Future for InputFuture<T> {
    type Output = Result<T, AbortedError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(AbortedError)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn confirmed_resolves_successfully() {
        let (resolver, future) = channel::<i32>();
        assert!(resolver.resolve(InputResponse::Confirmed(42)));
        assert_eq!(block_on(future), Ok(42));
    }

    #[test]
    fn cancelled_resolves_with_aborted() {
        let (resolver, future) = channel::<i32>();
        let handler = resolver.into_handler();
        handler(InputResponse::Cancelled);
        assert_eq!(block_on(future), Err(AbortedError));
    }

    #[test]
    fn second_resolution_is_ignored() {
        let (resolver, future) = channel::<i32>();
        let other = resolver.clone();
        assert!(resolver.resolve(InputResponse::Confirmed(42)));
        assert!(!other.resolve(InputResponse::Cancelled));
        assert!(!resolver.resolve(InputResponse::Confirmed(7)));
        assert!(other.is_resolved());
        assert_eq!(block_on(future), Ok(42));
    }

    #[test]
    fn dropped_resolver_aborts() {
        let (resolver, future) = channel::<String>();
        drop(resolver);
        assert_eq!(block_on(future), Err(AbortedError));
    }

    #[test]
    fn try_take_reports_pending_then_value() {
        let (resolver, mut future) = channel::<u8>();
        assert_eq!(future.try_take(), None);
        resolver.resolve(InputResponse::Confirmed(3));
        assert_eq!(future.try_take(), Some(Ok(3)));
    }

    #[test]
    fn response_helpers() {
        let response: InputResponse<i32> = Some(2).into();
        assert_eq!(response.clone().map(|v| v * 2).into_value(), Some(4));
        assert_eq!(response.value(), Some(&2));
        assert!(InputResponse::<i32>::from(None).is_cancelled());
    }
}
