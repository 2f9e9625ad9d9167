//! Self-contained resolution state machine.
//!
//! `Pending → Resolved` or `Pending → Rejected`, nothing after that. While
//! pending, callbacks wait in one queue per channel; settlement swaps the
//! queues out, stores the outcome and flushes the matching queue in
//! registration order. No `RefCell` borrow is held while user callbacks run,
//! so callbacks may subscribe to, or try to settle, the same machine.
use std::{
    cell::RefCell,
    mem,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

use tracing::{debug, trace, warn};

use crate::{Backend, Error, FailureCallback, Result, State, SuccessCallback};

pub struct Machine<T, E> {
    inner: RefCell<Resolution<T, E>>,
}

enum Resolution<T, E> {
    Pending(Queues<T, E>),
    Settled(Rc<Result<T, E>>),
}

struct Queues<T, E> {
    success: Vec<SuccessCallback<T>>,
    failure: Vec<FailureCallback<E>>,
}

impl<T, E> Default for Queues<T, E> {
    fn default() -> Self {
        Self {
            success: Vec::new(),
            failure: Vec::new(),
        }
    }
}

impl<T, E> Machine<T, E> {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Resolution::Pending(Queues::default())),
        }
    }

    /// A machine that starts out settled with `outcome`.
    pub fn settled(outcome: Result<T, E>) -> Self {
        Self {
            inner: RefCell::new(Resolution::Settled(Rc::new(outcome))),
        }
    }

    fn outcome(&self) -> Option<Rc<Result<T, E>>> {
        match &*self.inner.borrow() {
            Resolution::Pending(_) => None,
            Resolution::Settled(outcome) => Some(Rc::clone(outcome)),
        }
    }
}

impl<T, E> Default for Machine<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Backend<T, E> for Machine<T, E> {
    fn state(&self) -> State {
        match &*self.inner.borrow() {
            Resolution::Pending(_) => State::Pending,
            Resolution::Settled(outcome) => State::of(outcome),
        }
    }

    fn settle(&self, outcome: Result<T, E>) -> Result<()> {
        let outcome = Rc::new(outcome);
        let queues = {
            let mut inner = self.inner.borrow_mut();
            let Resolution::Pending(queues) = &mut *inner else {
                warn!(attempted = ?State::of(&outcome), "deferred already settled");
                return Err(Error::AlreadyResolved);
            };
            let queues = mem::take(queues);
            *inner = Resolution::Settled(Rc::clone(&outcome));
            queues
        };

        match &*outcome {
            Ok(value) => {
                debug!(callbacks = queues.success.len(), "deferred resolved");
                flush(queues.success, value);
            }
            Err(error) => {
                debug!(errbacks = queues.failure.len(), "deferred rejected");
                flush(queues.failure, error);
            }
        }
        Ok(())
    }

    fn on_success(&self, callback: SuccessCallback<T>) {
        {
            let mut inner = self.inner.borrow_mut();
            if let Resolution::Pending(queues) = &mut *inner {
                queues.success.push(callback);
                trace!(queued = queues.success.len(), "callback queued");
                return;
            }
        }
        match self.outcome().as_deref() {
            Some(Ok(value)) => {
                trace!("callback fired on resolved deferred");
                callback(value)
            }
            _ => trace!("callback dropped, deferred was rejected"),
        }
    }

    fn on_failure(&self, callback: FailureCallback<E>) {
        {
            let mut inner = self.inner.borrow_mut();
            if let Resolution::Pending(queues) = &mut *inner {
                queues.failure.push(callback);
                trace!(queued = queues.failure.len(), "errback queued");
                return;
            }
        }
        match self.outcome().as_deref() {
            Some(Err(error)) => {
                trace!("errback fired on rejected deferred");
                callback(error)
            }
            _ => trace!("errback dropped, deferred was resolved"),
        }
    }
}

/// Runs every callback even if one of them panics. The first panic is
/// rethrown once the whole queue has been drained.
fn flush<A: ?Sized>(callbacks: Vec<Box<dyn FnOnce(&A)>>, arg: &A) {
    let mut first_panic = None;
    for (index, callback) in callbacks.into_iter().enumerate() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || callback(arg))) {
            warn!(index, "callback panicked while flushing");
            first_panic.get_or_insert(payload);
        }
    }
    if let Some(payload) = first_panic {
        panic::resume_unwind(payload);
    }
}
