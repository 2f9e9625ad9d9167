mod common;

/// The same behavior suite, once per backend.
macro_rules! deferred_suite {
    ($backend:ident) => {
        mod $backend {
            use crate::common::{self, Log};
            use std::{cell::Cell, rc::Rc};
            use when_deferred::{Error, Settle, State, Subscribe};

            #[test]
            fn is_pending_until_settled() {
                let deferred = common::$backend::<i32, ()>();
                assert!(!deferred.is_resolved());
                assert!(!deferred.resolver().is_resolved());
                assert_eq!(deferred.state(), State::Pending);
            }

            #[test]
            fn resolves_promise_through_resolver() {
                let deferred = common::$backend::<(), ()>();
                let called = Rc::new(Cell::new(false));
                let flag = called.clone();
                deferred.promise().on_success(move |_| flag.set(true));
                assert!(!called.get());

                deferred.resolver().resolve(()).unwrap();
                assert!(called.get());
                assert!(deferred.resolver().is_resolved());
            }

            #[test]
            fn resolves_deferred_through_deferred() {
                let deferred = common::$backend::<(), ()>();
                let called = Rc::new(Cell::new(false));
                let flag = called.clone();
                deferred.on_success(move |_| flag.set(true));
                deferred.resolve(()).unwrap();
                assert!(called.get());
            }

            #[test]
            fn then_fires_like_on_success() {
                let deferred = common::$backend::<i32, ()>();
                let seen = Rc::new(Cell::new(0));
                let sink = seen.clone();
                deferred.promise().then(move |v| sink.set(*v));
                deferred.resolve(5).unwrap();
                assert_eq!(seen.get(), 5);
            }

            #[test]
            fn rejects_promise_through_resolver() {
                let deferred = common::$backend::<(), &str>();
                let seen = Rc::new(Cell::new(None));
                let sink = seen.clone();
                deferred.promise().on_failure(move |e| sink.set(Some(*e)));
                assert_eq!(seen.get(), None);

                deferred.resolver().reject("nope").unwrap();
                assert_eq!(seen.get(), Some("nope"));
                assert!(deferred.is_resolved());
                assert_eq!(deferred.state(), State::Rejected);
            }

            #[test]
            fn second_resolve_fails() {
                let deferred = common::$backend::<i32, ()>();
                deferred.resolve(1).unwrap();
                assert_eq!(deferred.resolve(2), Err(Error::AlreadyResolved));
            }

            #[test]
            fn second_reject_fails() {
                let deferred = common::$backend::<(), i32>();
                deferred.reject(1).unwrap();
                assert_eq!(deferred.resolver().reject(2), Err(Error::AlreadyResolved));
            }

            #[test]
            fn one_guard_covers_both_channels() {
                let deferred = common::$backend::<i32, i32>();
                deferred.resolve(1).unwrap();
                assert_eq!(deferred.reject(2), Err(Error::AlreadyResolved));
                assert_eq!(deferred.state(), State::Resolved);
            }

            #[test]
            fn late_subscriber_fires_immediately() {
                let deferred = common::$backend::<i32, ()>();
                deferred.resolve(42).unwrap();
                let seen = Rc::new(Cell::new(None));
                let sink = seen.clone();
                deferred.promise().on_success(move |v| sink.set(Some(*v)));
                assert_eq!(seen.get(), Some(42));
            }

            #[test]
            fn errback_on_resolved_never_fires() {
                let deferred = common::$backend::<i32, i32>();
                let log = Log::default();
                let early = log.clone();
                deferred.on_failure(move |e| early.push(format!("early {e}")));
                deferred.resolve(1).unwrap();
                let late = log.clone();
                deferred.on_failure(move |e| late.push(format!("late {e}")));
                assert!(log.entries().is_empty());
            }

            #[test]
            fn callback_on_rejected_never_fires() {
                let deferred = common::$backend::<i32, i32>();
                deferred.reject(1).unwrap();
                let log = Log::default();
                let late = log.clone();
                deferred.promise().on_success(move |v| late.push(format!("late {v}")));
                assert!(log.entries().is_empty());
            }

            #[test]
            fn subscribers_fire_in_registration_order() {
                let deferred = common::$backend::<i32, ()>();
                let promise = deferred.promise();
                let log = Log::default();
                for name in ["first", "second", "third"] {
                    let log = log.clone();
                    promise.clone().on_success(move |v| log.push(format!("{name} {v}")));
                }
                deferred.resolve(3).unwrap();
                assert_eq!(log.entries(), ["first 3", "second 3", "third 3"]);
            }

            #[test]
            fn multiple_values_travel_as_a_tuple() {
                let deferred = common::$backend::<(i32, &str), ()>();
                let log = Log::default();
                let sink = log.clone();
                deferred.on_success(move |(n, s)| sink.push(format!("{n}:{s}")));
                deferred.resolve((7, "seven")).unwrap();
                assert_eq!(log.entries(), ["7:seven"]);
            }

            #[test]
            fn callback_settling_again_sees_the_guard() {
                let deferred = common::$backend::<i32, ()>();
                let inner = deferred.resolver();
                let result = Rc::new(Cell::new(None));
                let sink = result.clone();
                deferred.on_success(move |v| sink.set(Some(inner.resolve(v + 1))));
                deferred.resolve(1).unwrap();
                assert_eq!(result.get(), Some(Err(Error::AlreadyResolved)));
            }
        }
    };
}

deferred_suite!(machine);
deferred_suite!(hosted);
