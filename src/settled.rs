//! Awaitable view of a [`Promise`].
//!
//! `Settled` completes with `Ok(value)` or `Err(error)` once the promise
//! settles. It clones the stored value, so any number of them can wait on the
//! same promise. Handles are `Rc` based: drive them with a single-threaded
//! executor such as `futures::executor::LocalPool`.
use std::{
    cell::RefCell,
    future::{Future, IntoFuture},
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, Waker},
};

use crate::{Promise, Subscribe};

/// # Examples
///
/// ```
/// use when_deferred::{defer, Settle};
/// use futures::executor::block_on;
///
/// let deferred = defer::<String, ()>();
/// let settled = deferred.promise().settled();
/// deferred.resolve("🍓".into()).unwrap();
/// assert_eq!(block_on(settled), Ok("🍓".to_string()));
/// ```
#[derive(Debug)]
pub struct Settled<T, E> {
    slot: Rc<RefCell<Slot<T, E>>>,
}

#[derive(Debug)]
struct Slot<T, E> {
    value: Option<Result<T, E>>,
    waker: Option<Waker>,
}

impl<T, E> Slot<T, E> {
    fn fill(slot: &RefCell<Self>, value: Result<T, E>) {
        let waker = {
            let mut slot = slot.borrow_mut();
            slot.value = Some(value);
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake()
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Promise<T, E> {
    pub fn settled(&self) -> Settled<T, E> {
        let slot = Rc::new(RefCell::new(Slot {
            value: None,
            waker: None,
        }));
        let on_ok = Rc::clone(&slot);
        self.on_success(move |value| Slot::fill(&on_ok, Ok(value.clone())));
        let on_err = Rc::clone(&slot);
        self.on_failure(move |error| Slot::fill(&on_err, Err(error.clone())));
        Settled { slot }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> IntoFuture for Promise<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = Settled<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.settled()
    }
}

impl<T, E> Future for Settled<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        match slot.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}
