use std::{fmt, ptr, rc::Rc};

use crate::{
    machine::Machine, Backend, HostDeferred, Hosted, Result, Settle, State, Subscribe,
};

/// A unit of future work that settles exactly once.
///
/// Cloning a `Deferred` clones the handle, not the state. Hand out
/// [`Deferred::resolver`] to whoever produces the outcome and
/// [`Deferred::promise`] to whoever waits for it.
///
/// # Examples
///
/// ```
/// use when_deferred::{Deferred, Error, Settle, Subscribe};
/// use std::{cell::Cell, rc::Rc};
///
/// let deferred = Deferred::<u8, ()>::new();
/// let fired = Rc::new(Cell::new(false));
///
/// let flag = fired.clone();
/// deferred.promise().on_success(move |_| flag.set(true));
/// assert!(!fired.get());
///
/// deferred.resolver().resolve(1).unwrap();
/// assert!(fired.get());
/// assert_eq!(deferred.resolve(2), Err(Error::AlreadyResolved));
/// ```
pub struct Deferred<T, E> {
    backend: Rc<dyn Backend<T, E>>,
}

/// Write-only view of a [`Deferred`].
pub struct Resolver<T, E> {
    backend: Rc<dyn Backend<T, E>>,
}

/// Read-only view of a [`Deferred`].
///
/// Promises are cheap to clone and may be shared with any number of
/// subscribers. Every subscriber fires, in registration order per channel.
pub struct Promise<T, E> {
    backend: Rc<dyn Backend<T, E>>,
}

impl<T: 'static, E: 'static> Deferred<T, E> {
    /// A pending deferred backed by the built-in state machine.
    pub fn new() -> Self {
        Self::with_backend(Machine::new())
    }

    /// A pending deferred that delegates to a host reactor's deferrable.
    pub fn hosted<H>(host: H) -> Self
    where
        H: HostDeferred<T, E> + 'static,
    {
        Self::with_backend(Hosted::new(host))
    }

    pub fn with_backend<B>(backend: B) -> Self
    where
        B: Backend<T, E> + 'static,
    {
        Self {
            backend: Rc::new(backend),
        }
    }

    pub(crate) fn settled(outcome: Result<T, E>) -> Self {
        Self::with_backend(Machine::settled(outcome))
    }
}

impl<T, E> Deferred<T, E> {
    pub fn resolver(&self) -> Resolver<T, E> {
        Resolver {
            backend: Rc::clone(&self.backend),
        }
    }

    pub fn promise(&self) -> Promise<T, E> {
        Promise {
            backend: Rc::clone(&self.backend),
        }
    }

    pub fn state(&self) -> State {
        self.backend.state()
    }

    /// True when both handles drive the same deferred.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        same_backend(&self.backend, &other.backend)
    }
}

impl<T, E> Resolver<T, E> {
    pub fn state(&self) -> State {
        self.backend.state()
    }
}

impl<T, E> Promise<T, E> {
    pub fn state(&self) -> State {
        self.backend.state()
    }

    /// True when both promises observe the same deferred.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        same_backend(&self.backend, &other.backend)
    }
}

fn same_backend<T, E>(a: &Rc<dyn Backend<T, E>>, b: &Rc<dyn Backend<T, E>>) -> bool {
    ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl<T, E> Settle<T, E> for Deferred<T, E> {
    fn resolve(&self, value: T) -> Result<()> {
        self.backend.settle(Ok(value))
    }

    fn reject(&self, error: E) -> Result<()> {
        self.backend.settle(Err(error))
    }

    fn is_resolved(&self) -> bool {
        self.state().is_settled()
    }
}

impl<T, E> Settle<T, E> for Resolver<T, E> {
    fn resolve(&self, value: T) -> Result<()> {
        self.backend.settle(Ok(value))
    }

    fn reject(&self, error: E) -> Result<()> {
        self.backend.settle(Err(error))
    }

    fn is_resolved(&self) -> bool {
        self.state().is_settled()
    }
}

impl<T, E> Subscribe<T, E> for Deferred<T, E> {
    fn on_success<F>(&self, callback: F)
    where
        F: FnOnce(&T) + 'static,
    {
        self.backend.on_success(Box::new(callback))
    }

    fn on_failure<F>(&self, callback: F)
    where
        F: FnOnce(&E) + 'static,
    {
        self.backend.on_failure(Box::new(callback))
    }
}

impl<T, E> Subscribe<T, E> for Promise<T, E> {
    fn on_success<F>(&self, callback: F)
    where
        F: FnOnce(&T) + 'static,
    {
        self.backend.on_success(Box::new(callback))
    }

    fn on_failure<F>(&self, callback: F)
    where
        F: FnOnce(&E) + 'static,
    {
        self.backend.on_failure(Box::new(callback))
    }
}

impl<T: 'static, E: 'static> Default for Deferred<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static, E: 'static> From<T> for Promise<T, E> {
    fn from(value: T) -> Self {
        crate::resolved(value)
    }
}

impl<T, E> From<Deferred<T, E>> for Promise<T, E> {
    fn from(deferred: Deferred<T, E>) -> Self {
        deferred.promise()
    }
}

impl<T, E> From<&Deferred<T, E>> for Promise<T, E> {
    fn from(deferred: &Deferred<T, E>) -> Self {
        deferred.promise()
    }
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            backend: Rc::clone(&self.backend),
        }
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            backend: Rc::clone(&self.backend),
        }
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            backend: Rc::clone(&self.backend),
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").field("state", &self.state()).finish()
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("state", &self.state()).finish()
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").field("state", &self.state()).finish()
    }
}
