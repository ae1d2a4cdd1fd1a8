//! Deterministic FIFO scheduler drained by the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use eventual_config::{DEFAULT_DRAIN_LIMIT, EventualConfig};
use eventual_types::{Error, UnhandledRejection, UnhandledRejectionPolicy};

use crate::scheduler::{Job, RejectionSink, Scheduler};

/// A job queue that runs nothing until the host asks it to.
///
/// Cloning yields another handle to the same queue. Jobs run strictly in
/// enqueue order; jobs enqueued while draining run in the same drain.
#[derive(Clone)]
pub struct JobQueue {
    inner: Rc<QueueInner>,
}

struct QueueInner {
    jobs: RefCell<VecDeque<Job>>,
    rejections: RejectionSink,
    drain_limit: usize,
}

impl JobQueue {
    /// A queue with the default drain limit that panics on unhandled rejections.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(UnhandledRejectionPolicy::default())
    }

    #[must_use]
    pub fn with_policy(policy: UnhandledRejectionPolicy) -> Self {
        Self::build(policy, DEFAULT_DRAIN_LIMIT)
    }

    #[must_use]
    pub fn from_config(config: &EventualConfig) -> Self {
        Self::build(config.rejection_policy(), config.drain_limit())
    }

    fn build(policy: UnhandledRejectionPolicy, drain_limit: usize) -> Self {
        Self {
            inner: Rc::new(QueueInner {
                jobs: RefCell::default(),
                rejections: RejectionSink::new(policy),
                drain_limit,
            }),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.jobs.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.jobs.borrow().is_empty()
    }

    #[must_use]
    pub fn drain_limit(&self) -> usize {
        self.inner.drain_limit
    }

    /// Run the oldest job, if any. Returns whether a job ran.
    pub fn run_next(&self) -> bool {
        match self.pop() {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run jobs until the queue is empty, including jobs enqueued along the way.
    ///
    /// Returns the number of jobs run. Stops with `DrainLimitExceeded` once the
    /// drain limit is reached and work remains; the remaining jobs stay queued.
    ///
    /// A panicking job unwinds out of this call; jobs still queued stay queued.
    pub fn run_until_idle(&self) -> Result<usize, Error> {
        let limit = self.inner.drain_limit;
        let mut ran = 0;
        while let Some(job) = self.pop() {
            if ran == limit {
                self.inner.jobs.borrow_mut().push_front(job);
                return Err(Error::DrainLimitExceeded { limit });
            }
            job();
            ran += 1;
        }
        Ok(ran)
    }

    /// Rejections collected under [`UnhandledRejectionPolicy::Collect`], oldest first.
    pub fn take_unhandled(&self) -> Vec<UnhandledRejection> {
        self.inner.rejections.take()
    }

    fn pop(&self) -> Option<Job> {
        self.inner.jobs.borrow_mut().pop_front()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for JobQueue {
    fn enqueue(&self, job: Job) {
        self.inner.jobs.borrow_mut().push_back(job);
    }

    fn report_unhandled(&self, rejection: UnhandledRejection) {
        self.inner.rejections.report(rejection);
    }
}

impl fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue")
            .field("pending", &self.len())
            .field("policy", &self.inner.rejections.policy())
            .field("drain_limit", &self.inner.drain_limit)
            .finish()
    }
}
