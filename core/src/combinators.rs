//! Aggregate combinators over many `Eventual`s.
//!
//! Both combinators are built on the public `then` contract only: each input
//! gets one pair of callbacks, and the aggregate is settled from inside them.
//!
//! # Semantics
//!
//! ```text
//! all([f1, ..., fn]):
//!   fulfills with [v1, ..., vn] once every fi fulfilled (input order)
//!   rejects with the first reason to settle, without waiting for the rest
//!
//! all_settled([f1, ..., fn]):
//!   fulfills with [o1, ..., on] once every fi settled (input order)
//!   never rejects
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use eventual_types::SettledOutcome;

use crate::eventual::Eventual;
use crate::resolve::fulfill;
use crate::scheduler::Scheduler;

/// Result slots filled in whatever order the inputs settle.
struct Slots<V> {
    values: RefCell<Vec<Option<V>>>,
    remaining: Cell<usize>,
}

impl<V> Slots<V> {
    fn new(len: usize) -> Rc<Self> {
        Rc::new(Self {
            values: RefCell::new((0..len).map(|_| None).collect()),
            remaining: Cell::new(len),
        })
    }

    /// Store `value` at `index`; returns every value once the last slot fills.
    fn fill(&self, index: usize, value: V) -> Option<Vec<V>> {
        self.values.borrow_mut()[index] = Some(value);
        let remaining = self.remaining.get() - 1;
        self.remaining.set(remaining);
        if remaining > 0 {
            return None;
        }
        Some(self.values.take().into_iter().flatten().collect())
    }
}

impl<T, E> Eventual<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Fulfill with every input's value, in input order, or reject with the
    /// first rejection.
    ///
    /// An empty input fulfills with an empty vector. Inputs that settle after
    /// a rejection keep running; their outcomes no longer matter.
    pub fn all<S, I>(scheduler: &S, inputs: I) -> Eventual<Vec<T>, E>
    where
        S: Scheduler + Clone + 'static,
        I: IntoIterator<Item = Eventual<T, E>>,
    {
        let inputs: Vec<Self> = inputs.into_iter().collect();
        Eventual::<Vec<T>, E>::new(scheduler, move |resolve, reject| {
            if inputs.is_empty() {
                resolve.resolve(Vec::new());
                return Ok(());
            }

            let slots = Slots::new(inputs.len());
            for (index, input) in inputs.into_iter().enumerate() {
                let slots = Rc::clone(&slots);
                let resolve = resolve.clone();
                let reject = reject.clone();
                input.then(
                    move |value| {
                        if let Some(values) = slots.fill(index, value) {
                            resolve.resolve(values);
                        }
                        fulfill(())
                    },
                    move |reason| {
                        reject.reject(reason);
                        fulfill(())
                    },
                );
            }
            Ok(())
        })
    }

    /// Fulfill with one [`SettledOutcome`] per input, in input order, once
    /// every input has settled. Never rejects.
    pub fn all_settled<S, I>(
        scheduler: &S,
        inputs: I,
    ) -> Eventual<Vec<SettledOutcome<T, E>>, E>
    where
        S: Scheduler + Clone + 'static,
        I: IntoIterator<Item = Eventual<T, E>>,
    {
        let inputs: Vec<Self> = inputs.into_iter().collect();
        Eventual::<Vec<SettledOutcome<T, E>>, E>::new(scheduler, move |resolve, _| {
            if inputs.is_empty() {
                resolve.resolve(Vec::new());
                return Ok(());
            }

            let slots = Slots::new(inputs.len());
            for (index, input) in inputs.into_iter().enumerate() {
                let on_fulfilled = (Rc::clone(&slots), resolve.clone());
                let on_rejected = (Rc::clone(&slots), resolve.clone());
                input.then(
                    move |value| {
                        let (slots, resolve) = on_fulfilled;
                        let outcome = SettledOutcome::Fulfilled { value };
                        if let Some(outcomes) = slots.fill(index, outcome) {
                            resolve.resolve(outcomes);
                        }
                        fulfill(())
                    },
                    move |reason| {
                        let (slots, resolve) = on_rejected;
                        let outcome = SettledOutcome::Rejected { reason };
                        if let Some(outcomes) = slots.fill(index, outcome) {
                            resolve.resolve(outcomes);
                        }
                        fulfill(())
                    },
                );
            }
            Ok(())
        })
    }
}
