//! One-shot deferreds.
//!
//! A [`Deferred`] is a unit of future work that settles exactly once, either
//! resolved with a value or rejected with an error. Producers get a
//! [`Resolver`] (write only), consumers get a [`Promise`] (read only). [`all`]
//! folds many promises into one.
//!
//! Callbacks run synchronously: settling a deferred runs every queued callback
//! before `resolve`/`reject` returns, and subscribing to a settled deferred runs
//! the callback before `on_success`/`on_failure` returns.
//!
//! # Examples
//!
//! ```
//! use when_deferred::{all, defer, Settle, Subscribe};
//! use std::{cell::RefCell, rc::Rc};
//!
//! let first = defer::<i32, String>();
//! let second = defer::<i32, String>();
//! let seen = Rc::new(RefCell::new(None));
//!
//! let sink = seen.clone();
//! all([first.promise(), second.promise()])
//!     .unwrap()
//!     .on_success(move |values| *sink.borrow_mut() = Some(values.clone()));
//!
//! second.resolver().resolve(42).unwrap();
//! first.resolver().resolve(13).unwrap();
//! assert_eq!(*seen.borrow(), Some(vec![13, 42]));
//! ```
use thiserror::Error;

pub mod all;
pub mod backend;
pub mod deferred;
pub mod host;
pub mod machine;
pub mod settled;

pub use all::all;
pub use backend::{Backend, FailureCallback, State, SuccessCallback};
pub use deferred::{Deferred, Promise, Resolver};
pub use host::{HostDeferred, Hosted};
pub use settled::Settled;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Returned by `resolve`/`reject` on a deferred that has already settled.
    #[error("Already resolved")]
    AlreadyResolved,
    /// Returned by [`all`] when the input iterator is endless.
    #[error("not an enumerable collection of promises")]
    InvalidArgument,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Write capability: settle a deferred.
pub trait Settle<T, E> {
    /// Resolve with `value`. Fails with [`Error::AlreadyResolved`] if the
    /// deferred has already been resolved or rejected.
    fn resolve(&self, value: T) -> Result<()>;
    /// Reject with `error`. Shares the settlement guard with [`Settle::resolve`].
    fn reject(&self, error: E) -> Result<()>;
    /// True once settled, whichever way.
    fn is_resolved(&self) -> bool;
}

/// Read capability: subscribe to the settlement of a deferred.
///
/// Anything implementing this is promise-like and can be handed to [`all`].
pub trait Subscribe<T, E> {
    fn on_success<F>(&self, callback: F)
    where
        F: FnOnce(&T) + 'static;

    fn on_failure<F>(&self, callback: F)
    where
        F: FnOnce(&E) + 'static;

    /// Alias for [`Subscribe::on_success`].
    fn then<F>(&self, callback: F)
    where
        F: FnOnce(&T) + 'static,
    {
        self.on_success(callback)
    }
}

/// Lets borrowed handles stand in for owned ones, e.g. `all(&deferreds)`.
impl<T, E, S> Subscribe<T, E> for &S
where
    S: Subscribe<T, E>,
{
    fn on_success<F>(&self, callback: F)
    where
        F: FnOnce(&T) + 'static,
    {
        (**self).on_success(callback)
    }

    fn on_failure<F>(&self, callback: F)
    where
        F: FnOnce(&E) + 'static,
    {
        (**self).on_failure(callback)
    }
}

/// A fresh, pending deferred backed by the built-in state machine.
pub fn defer<T: 'static, E: 'static>() -> Deferred<T, E> {
    Deferred::new()
}

/// Like [`defer`], but hands the deferred to `setup` before returning it.
///
/// ```
/// use when_deferred::{defer_with, Settle};
///
/// let deferred = defer_with::<_, (), _>(|d| d.resolve("ready").unwrap());
/// assert!(deferred.is_resolved());
/// ```
pub fn defer_with<T, E, F>(setup: F) -> Deferred<T, E>
where
    T: 'static,
    E: 'static,
    F: FnOnce(&Deferred<T, E>),
{
    let deferred = Deferred::new();
    setup(&deferred);
    deferred
}

/// A promise that is already resolved with `value`.
pub fn resolved<T: 'static, E: 'static>(value: T) -> Promise<T, E> {
    Deferred::settled(Ok(value)).promise()
}

/// A promise that is already rejected with `error`.
pub fn rejected<T: 'static, E: 'static>(error: E) -> Promise<T, E> {
    Deferred::settled(Err(error)).promise()
}

/// Lift `value` into a promise.
///
/// Promises pass through untouched, and deferreds hand over their own promise
/// (same underlying deferred in both cases); any other value is wrapped in a
/// resolved promise.
///
/// ```
/// use when_deferred::{resolved, when, Promise};
///
/// let existing: Promise<i32, ()> = resolved(1);
/// let same: Promise<i32, ()> = when(existing.clone());
/// assert!(same.ptr_eq(&existing));
///
/// let wrapped: Promise<i32, ()> = when(42);
/// assert!(!wrapped.ptr_eq(&existing));
/// ```
pub fn when<T, E, V>(value: V) -> Promise<T, E>
where
    V: Into<Promise<T, E>>,
{
    value.into()
}
