//! The deferred-value state machine.
//!
//! An [`Eventual`] starts `Pending` and settles at most once. Everything that
//! touches its callback queues after construction happens on a later scheduler
//! turn: settlement functions enqueue the settlement, and registering on an
//! already-settled `Eventual` enqueues a drain.
//!
//! # Flattening
//!
//! Resolving with another `Eventual` registers on the inner one and settles
//! the outer one on the turn after the inner settles. Each hop costs one
//! scheduler turn, so adoption chains of any depth run in constant stack.
//!
//! # Unhandled rejections
//!
//! A rejection that settles while the rejection queue is empty is reported to
//! the scheduler exactly once, at settlement. Handlers attached afterwards
//! still receive the reason; the report is not withdrawn.
//!
//! # Teardown
//!
//! A queued callback owns the next link of its chain, so dropping a pending
//! chain in place would recurse once per link. Queues released while another
//! release is running go on a thread-local backlog that the outermost release
//! empties in a loop.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use eventual_types::{SettlementState, UnhandledRejection};

use crate::resolve::{
    Reaction, Reject, Resolution, Resolve, fulfill, reject, settlement_functions,
};
use crate::scheduler::Scheduler;

type Callback<V> = Box<dyn FnOnce(V)>;

enum State<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> State<T, E> {
    fn kind(&self) -> SettlementState {
        match self {
            State::Pending => SettlementState::Pending,
            State::Fulfilled(_) => SettlementState::Fulfilled,
            State::Rejected(_) => SettlementState::Rejected,
        }
    }
}

struct Shared<T, E> {
    state: State<T, E>,
    on_fulfill: Vec<Callback<T>>,
    on_reject: Vec<Callback<E>>,
    release: fn(&mut Shared<T, E>),
}

impl<T, E> Drop for Shared<T, E> {
    fn drop(&mut self) {
        (self.release)(self);
    }
}

thread_local! {
    /// Callback queues waiting to be dropped. `None` outside a release.
    static BACKLOG: RefCell<Option<Vec<Box<dyn Any>>>> = const { RefCell::new(None) };
}

fn release_callbacks<T: 'static, E: 'static>(shared: &mut Shared<T, E>) {
    if shared.on_fulfill.is_empty() && shared.on_reject.is_empty() {
        return;
    }
    let queues: Box<dyn Any> = Box::new((
        mem::take(&mut shared.on_fulfill),
        mem::take(&mut shared.on_reject),
    ));
    let outermost = BACKLOG.with_borrow_mut(|backlog| match backlog {
        Some(pending) => {
            pending.push(queues);
            None
        }
        None => {
            *backlog = Some(Vec::new());
            Some(queues)
        }
    });
    let Some(queues) = outermost else {
        return;
    };

    drop(queues);
    while let Some(next) = BACKLOG.with_borrow_mut(|backlog| backlog.as_mut().and_then(Vec::pop)) {
        drop(next);
    }
    BACKLOG.set(None);
}

/// A settlement request, as produced by [`Resolve`] and [`Reject`].
pub(crate) enum Settlement<T, E> {
    Resolve(Resolution<T, E>),
    Reject(E),
}

enum Delivery<T, E> {
    Fulfilled(T, Vec<Callback<T>>),
    Rejected(E, Vec<Callback<E>>),
}

/// The eventual result of a computation: a value of type `T` or a rejection
/// reason of type `E`.
///
/// Cloning yields another handle to the same state machine. Handles are `!Send`;
/// all work runs on the scheduler the `Eventual` was created with.
pub struct Eventual<T, E> {
    shared: Rc<RefCell<Shared<T, E>>>,
    scheduler: Rc<dyn Scheduler>,
}

impl<T, E> Eventual<T, E> {
    #[must_use]
    pub fn state(&self) -> SettlementState {
        self.shared.borrow().state.kind()
    }

    /// Whether `self` and `other` are handles to the same state machine.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T, E> Eventual<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Create an `Eventual` and run `executor` with its settlement functions.
    ///
    /// The executor runs synchronously; if it returns `Err`, the reason is
    /// routed through the `Reject` function (a no-op if it already settled
    /// the `Eventual` some other way).
    pub fn new<S, F>(scheduler: &S, executor: F) -> Self
    where
        S: Scheduler + Clone + 'static,
        F: FnOnce(Resolve<T, E>, Reject<T, E>) -> Result<(), E>,
    {
        Self::with_scheduler(Rc::new(scheduler.clone()), executor)
    }

    /// A pending `Eventual` together with its settlement functions.
    pub fn with_resolvers<S>(scheduler: &S) -> (Self, Resolve<T, E>, Reject<T, E>)
    where
        S: Scheduler + Clone + 'static,
    {
        let eventual = Self::pending(Rc::new(scheduler.clone()));
        let (resolve, reject) = settlement_functions(&eventual);
        (eventual, resolve, reject)
    }

    /// An `Eventual` that fulfills with `value` on the next turn.
    pub fn resolved<S>(scheduler: &S, value: T) -> Self
    where
        S: Scheduler + Clone + 'static,
    {
        Self::new(scheduler, |resolve, _| {
            resolve.resolve(value);
            Ok(())
        })
    }

    /// An `Eventual` that rejects with `reason` on the next turn.
    pub fn rejected<S>(scheduler: &S, reason: E) -> Self
    where
        S: Scheduler + Clone + 'static,
    {
        Self::new(scheduler, |_, reject| {
            reject.reject(reason);
            Ok(())
        })
    }

    /// An `Eventual` that settles however `inner` does.
    pub fn adopting<S>(scheduler: &S, inner: Eventual<T, E>) -> Self
    where
        S: Scheduler + Clone + 'static,
    {
        Self::new(scheduler, |resolve, _| {
            resolve.adopt(inner);
            Ok(())
        })
    }

    pub(crate) fn with_scheduler<F>(scheduler: Rc<dyn Scheduler>, executor: F) -> Self
    where
        F: FnOnce(Resolve<T, E>, Reject<T, E>) -> Result<(), E>,
    {
        let eventual = Self::pending(scheduler);
        let (resolve, reject) = settlement_functions(&eventual);
        if let Err(reason) = executor(resolve, reject.clone()) {
            tracing::trace!(?reason, "Executor failed");
            reject.reject(reason);
        }
        eventual
    }

    fn pending(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                state: State::Pending,
                on_fulfill: Vec::new(),
                on_reject: Vec::new(),
                release: release_callbacks::<T, E>,
            })),
            scheduler,
        }
    }

    /// Snapshot of the settled result, if any.
    ///
    /// Reading a rejection this way does not count as handling it.
    #[must_use]
    pub fn peek(&self) -> Option<Result<T, E>> {
        match &self.shared.borrow().state {
            State::Pending => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(reason) => Some(Err(reason.clone())),
        }
    }

    /// Chain both outcomes into a new `Eventual`.
    ///
    /// Whichever callback runs decides the next `Eventual`'s outcome: `Ok`
    /// resolves it (adopting, if the resolution is another `Eventual`), `Err`
    /// rejects it.
    pub fn then<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Eventual<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Reaction<U, E> + 'static,
        R: FnOnce(E) -> Reaction<U, E> + 'static,
    {
        self.chain(Box::new(on_fulfilled), Box::new(on_rejected))
    }

    /// `then` without a rejection callback: rejections pass through unchanged.
    pub fn and_then<U, F>(&self, on_fulfilled: F) -> Eventual<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Reaction<U, E> + 'static,
    {
        self.chain(Box::new(on_fulfilled), Box::new(reject::<U, E>))
    }

    /// `then` without a fulfillment callback: values pass through unchanged.
    pub fn catch<R>(&self, on_rejected: R) -> Eventual<T, E>
    where
        R: FnOnce(E) -> Reaction<T, E> + 'static,
    {
        self.chain(Box::new(fulfill::<T, E>), Box::new(on_rejected))
    }

    /// `then` without either callback: mirrors this `Eventual`'s outcome.
    pub fn chained(&self) -> Eventual<T, E> {
        self.chain(Box::new(fulfill::<T, E>), Box::new(reject::<T, E>))
    }

    /// Run `on_settled` on either outcome, keeping the outcome unless
    /// `on_settled` itself fails.
    pub fn finally<F>(&self, on_settled: F) -> Eventual<T, E>
    where
        F: FnOnce() -> Result<(), E> + 'static,
    {
        let after_fulfill = Rc::new(Cell::new(Some(on_settled)));
        let after_reject = Rc::clone(&after_fulfill);
        self.chain::<T>(
            Box::new(move |value| {
                run_once(&after_fulfill)?;
                fulfill(value)
            }),
            Box::new(move |reason| {
                run_once(&after_reject)?;
                reject(reason)
            }),
        )
    }

    fn chain<U>(
        &self,
        on_fulfilled: Box<dyn FnOnce(T) -> Reaction<U, E>>,
        on_rejected: Box<dyn FnOnce(E) -> Reaction<U, E>>,
    ) -> Eventual<U, E>
    where
        U: Clone + 'static,
    {
        let source = self.clone();
        Eventual::<U, E>::with_scheduler(Rc::clone(&self.scheduler), move |resolve_next, reject_next| {
            let resolve_after_reject = resolve_next.clone();
            let reject_after_reject = reject_next.clone();
            source.register(
                Box::new(move |value| forward(on_fulfilled(value), &resolve_next, &reject_next)),
                Box::new(move |reason| {
                    forward(
                        on_rejected(reason),
                        &resolve_after_reject,
                        &reject_after_reject,
                    );
                }),
            );
            Ok(())
        })
    }

    /// Queue one callback per outcome. Delivery always happens on a later turn.
    fn register(&self, on_fulfill: Callback<T>, on_reject: Callback<E>) {
        let settled = {
            let mut shared = self.shared.borrow_mut();
            shared.on_fulfill.push(on_fulfill);
            shared.on_reject.push(on_reject);
            !matches!(shared.state, State::Pending)
        };
        if settled {
            self.schedule(Self::drain);
        }
    }

    pub(crate) fn schedule_settle(&self, settlement: Settlement<T, E>) {
        self.schedule(move |this| this.settle(settlement));
    }

    fn schedule(&self, job: impl FnOnce(&Self) + 'static) {
        let this = self.clone();
        self.scheduler.enqueue(Box::new(move || job(&this)));
    }

    fn settle(&self, settlement: Settlement<T, E>) {
        if self.state().is_settled() {
            return;
        }
        match settlement {
            Settlement::Resolve(Resolution::Value(value)) => {
                self.transition(State::Fulfilled(value));
            }
            Settlement::Resolve(Resolution::Adopt(inner)) => self.adopt(&inner),
            Settlement::Reject(reason) => self.transition(State::Rejected(reason)),
        }
    }

    fn adopt(&self, inner: &Eventual<T, E>) {
        if self.ptr_eq(inner) {
            tracing::warn!("Eventual resolved with itself; it will stay pending");
            return;
        }
        tracing::trace!(inner = %inner.state(), "Adopting inner eventual");
        let on_fulfilled = self.clone();
        let on_rejected = self.clone();
        inner.register(
            Box::new(move |value| {
                on_fulfilled.schedule_settle(Settlement::Resolve(Resolution::Value(value)));
            }),
            Box::new(move |reason| on_rejected.schedule_settle(Settlement::Reject(reason))),
        );
    }

    fn transition(&self, settled: State<T, E>) {
        let unhandled = {
            let mut shared = self.shared.borrow_mut();
            if !matches!(shared.state, State::Pending) {
                return;
            }
            let unhandled = match &settled {
                State::Rejected(reason) if shared.on_reject.is_empty() => {
                    Some(UnhandledRejection::from_reason(reason))
                }
                _ => None,
            };
            shared.state = settled;
            unhandled
        };
        tracing::trace!(state = %self.state(), "Eventual settled");

        self.drain();
        if let Some(rejection) = unhandled {
            self.scheduler.report_unhandled(rejection);
        }
    }

    /// Hand the stored outcome to every queued callback, in registration order.
    fn drain(&self) {
        let delivery = {
            let mut guard = self.shared.borrow_mut();
            let shared = &mut *guard;
            match &shared.state {
                State::Pending => return,
                State::Fulfilled(value) => {
                    shared.on_reject.clear();
                    Delivery::Fulfilled(value.clone(), mem::take(&mut shared.on_fulfill))
                }
                State::Rejected(reason) => {
                    shared.on_fulfill.clear();
                    Delivery::Rejected(reason.clone(), mem::take(&mut shared.on_reject))
                }
            }
        };

        match delivery {
            Delivery::Fulfilled(value, callbacks) => run_callbacks(&value, callbacks),
            Delivery::Rejected(reason, callbacks) => run_callbacks(&reason, callbacks),
        }
    }
}

/// Every callback in the batch runs even if an earlier one panics; the first
/// panic is resumed once the batch is done.
fn run_callbacks<V: Clone>(value: &V, callbacks: Vec<Callback<V>>) {
    let mut panicked = None;
    for callback in callbacks {
        let value = value.clone();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(value))) {
            panicked.get_or_insert(payload);
        }
    }
    if let Some(payload) = panicked {
        panic::resume_unwind(payload);
    }
}

fn forward<U, E>(reaction: Reaction<U, E>, resolve: &Resolve<U, E>, reject: &Reject<U, E>)
where
    U: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    match reaction {
        Ok(resolution) => resolve.resolve_with(resolution),
        Err(reason) => reject.reject(reason),
    }
}

fn run_once<F, E>(slot: &Cell<Option<F>>) -> Result<(), E>
where
    F: FnOnce() -> Result<(), E>,
{
    slot.take().map_or(Ok(()), |callback| callback())
}

impl<T, E> Clone for Eventual<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
            scheduler: Rc::clone(&self.scheduler),
        }
    }
}

impl<T, E> fmt::Debug for Eventual<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Eventual");
        match self.shared.try_borrow() {
            Ok(shared) => debug.field("state", &shared.state.kind()),
            Err(_) => debug.field("state", &format_args!("<settling>")),
        };
        debug.finish_non_exhaustive()
    }
}
