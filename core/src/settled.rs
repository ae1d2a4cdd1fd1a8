//! Awaiting an `Eventual` from Rust async code.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::eventual::Eventual;
use crate::resolve::fulfill;

/// Future returned by [`Eventual::settled`].
///
/// Resolves to `Some(Ok(value))` or `Some(Err(reason))`, or `None` if the
/// `Eventual` was dropped without ever settling.
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct Settled<T, E> {
    receiver: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> Future for Settled<T, E> {
    type Output = Option<Result<T, E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map(Result::ok)
    }
}

impl<T, E> Eventual<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Wait for this `Eventual` to settle.
    ///
    /// Attaches a handler for both outcomes, so a rejection observed this way
    /// is handled. The scheduler still has to run for the result to arrive.
    pub fn settled(&self) -> Settled<T, E> {
        let (sender, receiver) = oneshot::channel();
        let on_fulfilled = Rc::new(Cell::new(Some(sender)));
        let on_rejected = Rc::clone(&on_fulfilled);
        self.then(
            move |value| {
                if let Some(sender) = on_fulfilled.take() {
                    let _ = sender.send(Ok(value));
                }
                fulfill(())
            },
            move |reason| {
                if let Some(sender) = on_rejected.take() {
                    let _ = sender.send(Err(reason));
                }
                fulfill(())
            },
        );
        Settled { receiver }
    }
}
