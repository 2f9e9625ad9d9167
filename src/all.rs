use std::{cell::RefCell, mem, rc::Rc};

use tracing::debug;

use crate::{Deferred, Error, Promise, Result, Settle, Subscribe};

struct Aggregate<T> {
    results: Vec<Option<T>>,
    settled: usize,
}

/// Wait for every promise in `promises`.
///
/// The returned promise resolves with the values in input order, no matter in
/// which order the inputs settle, and rejects with the first rejection seen.
/// Inputs that settle after that are ignored. An empty input resolves at once
/// with an empty vector.
///
/// Any finite iterator is accepted, including ones that cannot bound their
/// length up front (`flat_map`, [`std::iter::from_fn`]). Fails with
/// [`Error::InvalidArgument`] when the iterator reports itself as endless
/// (a lower size bound of `usize::MAX`), e.g. [`std::iter::repeat`].
///
/// ```
/// use when_deferred::{all, defer, Subscribe, Settle};
/// use std::{cell::RefCell, rc::Rc};
///
/// let inputs = [defer::<i32, &str>(), defer(), defer()];
/// let failure = Rc::new(RefCell::new(None));
///
/// let sink = failure.clone();
/// all(&inputs).unwrap().on_failure(move |e| *sink.borrow_mut() = Some(*e));
///
/// inputs[0].resolve(42).unwrap();
/// inputs[2].reject("disk full").unwrap();
/// inputs[1].resolve(13).unwrap();
/// assert_eq!(*failure.borrow(), Some("disk full"));
/// ```
pub fn all<I, P, T, E>(promises: I) -> Result<Promise<Vec<T>, E>>
where
    I: IntoIterator<Item = P>,
    P: Subscribe<T, E>,
    T: Clone + 'static,
    E: Clone + 'static,
{
    let promises = promises.into_iter();
    if promises.size_hint().0 == usize::MAX {
        return Err(Error::InvalidArgument);
    }
    let promises: Vec<P> = promises.collect();
    let total = promises.len();
    let aggregate = Deferred::new();

    if total == 0 {
        aggregate.resolve(Vec::new())?;
        return Ok(aggregate.promise());
    }

    let state = Rc::new(RefCell::new(Aggregate {
        results: vec![None; total],
        settled: 0,
    }));

    for (index, promise) in promises.iter().enumerate() {
        let (on_ok, shared) = (aggregate.clone(), Rc::clone(&state));
        promise.on_success(move |value| {
            if on_ok.is_resolved() {
                debug!(index, "late resolution ignored, aggregate already settled");
                return;
            }
            let values = {
                let mut inner = shared.borrow_mut();
                if let Some(slot) = inner.results.get_mut(index) {
                    *slot = Some(value.clone());
                }
                inner.settled += 1;
                if inner.settled < total {
                    return;
                }
                mem::take(&mut inner.results).into_iter().collect::<Option<Vec<T>>>()
            };
            match values {
                Some(values) => {
                    debug!(total, "all inputs resolved");
                    if let Err(error) = on_ok.resolve(values) {
                        debug!(%error, "aggregate settled concurrently");
                    }
                }
                None => debug!(index, "input resolved twice, aggregate left pending"),
            }
        });

        let on_err = aggregate.clone();
        promise.on_failure(move |error| {
            if on_err.is_resolved() {
                debug!(index, "late rejection ignored, aggregate already settled");
                return;
            }
            debug!(index, "input rejected, rejecting aggregate");
            if let Err(error) = on_err.reject(error.clone()) {
                debug!(%error, "aggregate settled concurrently");
            }
        });
    }

    Ok(aggregate.promise())
}
