//! The seam between the public views and whatever keeps the resolution state.
//!
//! [`Deferred`](crate::Deferred), [`Resolver`](crate::Resolver) and
//! [`Promise`](crate::Promise) all talk to an `Rc<dyn Backend<T, E>>`. Two
//! backends ship with the crate: the self-contained
//! [`Machine`](crate::machine::Machine) and the [`Hosted`](crate::Hosted)
//! adapter that forwards to an event loop's own deferrable.
use crate::Result;

pub type SuccessCallback<T> = Box<dyn FnOnce(&T)>;
pub type FailureCallback<E> = Box<dyn FnOnce(&E)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Pending,
    Resolved,
    Rejected,
}

impl State {
    pub fn is_settled(self) -> bool {
        self != State::Pending
    }

    pub(crate) fn of<T, E>(outcome: &Result<T, E>) -> Self {
        match outcome {
            Ok(_) => State::Resolved,
            Err(_) => State::Rejected,
        }
    }
}

pub trait Backend<T, E> {
    fn state(&self) -> State;

    /// Moves out of `Pending` and notifies the matching channel. Must fail with
    /// [`Error::AlreadyResolved`](crate::Error::AlreadyResolved) when already
    /// settled, for both outcomes alike.
    fn settle(&self, outcome: Result<T, E>) -> Result<()>;

    /// Queue `callback`, run it now if resolved, or drop it if rejected.
    fn on_success(&self, callback: SuccessCallback<T>);

    /// Queue `callback`, run it now if rejected, or drop it if resolved.
    fn on_failure(&self, callback: FailureCallback<E>);
}
