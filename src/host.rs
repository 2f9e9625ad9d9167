//! Backend that delegates to an event loop's own deferred primitive.
//!
//! Reactors usually ship a deferrable of their own (callbacks, errbacks and a
//! status that can be flipped to succeeded or failed). [`Hosted`] keeps no
//! queues or values; it forwards subscriptions to the host and only adds the
//! single-settlement guard, since hosts commonly let a later status overwrite
//! an earlier one.
use tracing::{debug, warn};

use crate::{Backend, Error, FailureCallback, Result, State, SuccessCallback};

/// A host reactor's deferrable.
///
/// Implementations must:
/// * report a settled [`State`] before dispatching any callback, so callbacks
///   that try to settle again see the deferrable as settled;
/// * dispatch synchronously, in registration order, from `succeed`/`fail`;
/// * run callbacks registered after settlement immediately with the stored
///   value, and never run callbacks of the other channel.
pub trait HostDeferred<T, E> {
    fn state(&self) -> State;
    fn succeed(&self, value: T);
    fn fail(&self, error: E);
    fn callback(&self, callback: SuccessCallback<T>);
    fn errback(&self, callback: FailureCallback<E>);
}

#[derive(Debug, Default, Clone)]
pub struct Hosted<H> {
    host: H,
}

impl<H> Hosted<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<T, E, H> Backend<T, E> for Hosted<H>
where
    H: HostDeferred<T, E>,
{
    fn state(&self) -> State {
        self.host.state()
    }

    fn settle(&self, outcome: Result<T, E>) -> Result<()> {
        let current = self.host.state();
        if current.is_settled() {
            warn!(?current, attempted = ?State::of(&outcome), "host deferrable already settled");
            return Err(Error::AlreadyResolved);
        }
        debug!(outcome = ?State::of(&outcome), "settling host deferrable");
        match outcome {
            Ok(value) => self.host.succeed(value),
            Err(error) => self.host.fail(error),
        }
        Ok(())
    }

    fn on_success(&self, callback: SuccessCallback<T>) {
        self.host.callback(callback)
    }

    fn on_failure(&self, callback: FailureCallback<E>) {
        self.host.errback(callback)
    }
}
