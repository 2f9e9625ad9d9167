#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use tracing_subscriber::EnvFilter;
use when_deferred::{Deferred, FailureCallback, HostDeferred, State, SuccessCallback};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Stand-in for an event loop's deferrable: the status may be set any number
/// of times and the last one wins, callbacks fire synchronously on every
/// status change.
pub struct LoopDeferrable<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
}

struct Inner<T, E> {
    status: Option<Rc<Result<T, E>>>,
    callbacks: Vec<SuccessCallback<T>>,
    errbacks: Vec<FailureCallback<E>>,
}

impl<T, E> LoopDeferrable<T, E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                status: None,
                callbacks: Vec::new(),
                errbacks: Vec::new(),
            })),
        }
    }

    fn set_status(&self, status: Result<T, E>) {
        let status = Rc::new(status);
        let (callbacks, errbacks) = {
            let mut inner = self.inner.borrow_mut();
            inner.status = Some(Rc::clone(&status));
            (
                std::mem::take(&mut inner.callbacks),
                std::mem::take(&mut inner.errbacks),
            )
        };
        match &*status {
            Ok(value) => callbacks.into_iter().for_each(|cb| cb(value)),
            Err(error) => errbacks.into_iter().for_each(|eb| eb(error)),
        }
    }

    fn status(&self) -> Option<Rc<Result<T, E>>> {
        self.inner.borrow().status.clone()
    }
}

impl<T, E> Clone for LoopDeferrable<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, E> HostDeferred<T, E> for LoopDeferrable<T, E> {
    fn state(&self) -> State {
        match self.status().as_deref() {
            None => State::Pending,
            Some(Ok(_)) => State::Resolved,
            Some(Err(_)) => State::Rejected,
        }
    }

    fn succeed(&self, value: T) {
        self.set_status(Ok(value))
    }

    fn fail(&self, error: E) {
        self.set_status(Err(error))
    }

    fn callback(&self, callback: SuccessCallback<T>) {
        match self.status().as_deref() {
            None => self.inner.borrow_mut().callbacks.push(callback),
            Some(Ok(value)) => callback(value),
            Some(Err(_)) => {}
        }
    }

    fn errback(&self, callback: FailureCallback<E>) {
        match self.status().as_deref() {
            None => self.inner.borrow_mut().errbacks.push(callback),
            Some(Err(error)) => callback(error),
            Some(Ok(_)) => {}
        }
    }
}

pub fn machine<T: 'static, E: 'static>() -> Deferred<T, E> {
    init_tracing();
    Deferred::new()
}

pub fn hosted<T: 'static, E: 'static>() -> Deferred<T, E> {
    init_tracing();
    Deferred::hosted(LoopDeferrable::new())
}

/// Records what callbacks saw, in call order.
#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into())
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}
