//! The boundary between an `Eventual` and whatever runs its deferred work.
//!
//! The core only ever hands jobs to a [`Scheduler`]; it never runs them inline.
//! Two implementations ship with the crate: [`JobQueue`](crate::JobQueue) for
//! deterministic, manually drained hosts, and
//! [`LocalScheduler`](crate::LocalScheduler) for tokio `LocalSet`s.

use std::cell::RefCell;

use eventual_types::{UnhandledRejection, UnhandledRejectionPolicy};

/// One unit of deferred work: a scheduler turn.
pub type Job = Box<dyn FnOnce()>;

/// Executes jobs on later turns and receives unhandled rejections.
///
/// Implementations must run jobs in the order they were enqueued and never
/// from inside `enqueue` itself.
///
/// A callback that panics does not stop the other callbacks of the same
/// settlement; the panic is resumed out of the job once they have run. The
/// `Eventual` chained from the panicking callback stays pending.
pub trait Scheduler {
    fn enqueue(&self, job: Job);

    /// Called on the turn a rejection settles with no rejection callback registered.
    fn report_unhandled(&self, rejection: UnhandledRejection);
}

/// Applies an [`UnhandledRejectionPolicy`] and keeps collected rejections.
#[derive(Debug, Default)]
pub(crate) struct RejectionSink {
    policy: UnhandledRejectionPolicy,
    collected: RefCell<Vec<UnhandledRejection>>,
}

impl RejectionSink {
    pub(crate) fn new(policy: UnhandledRejectionPolicy) -> Self {
        Self {
            policy,
            collected: RefCell::default(),
        }
    }

    pub(crate) fn policy(&self) -> UnhandledRejectionPolicy {
        self.policy
    }

    pub(crate) fn report(&self, rejection: UnhandledRejection) {
        match self.policy {
            UnhandledRejectionPolicy::Panic => panic!("{rejection}"),
            UnhandledRejectionPolicy::Log => {
                tracing::error!(reason = rejection.reason(), "Unhandled rejection");
            }
            UnhandledRejectionPolicy::Collect => {
                tracing::error!(reason = rejection.reason(), "Unhandled rejection");
                self.collected.borrow_mut().push(rejection);
            }
        }
    }

    pub(crate) fn take(&self) -> Vec<UnhandledRejection> {
        self.collected.take()
    }
}
