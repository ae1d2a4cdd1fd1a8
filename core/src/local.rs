//! Scheduler backed by a tokio `LocalSet`.

use std::fmt;
use std::rc::Rc;

use eventual_config::EventualConfig;
use eventual_types::{UnhandledRejection, UnhandledRejectionPolicy};

use crate::scheduler::{Job, RejectionSink, Scheduler};

/// Runs each job as its own `spawn_local` task.
///
/// Must be used from inside a [`tokio::task::LocalSet`]. A panic raised by
/// [`UnhandledRejectionPolicy::Panic`] aborts the task that settled the
/// rejection and is reported by tokio, not by the caller of `enqueue`.
#[derive(Clone)]
pub struct LocalScheduler {
    rejections: Rc<RejectionSink>,
}

impl LocalScheduler {
    #[must_use]
    pub fn new(policy: UnhandledRejectionPolicy) -> Self {
        Self {
            rejections: Rc::new(RejectionSink::new(policy)),
        }
    }

    #[must_use]
    pub fn from_config(config: &EventualConfig) -> Self {
        Self::new(config.rejection_policy())
    }

    pub fn take_unhandled(&self) -> Vec<UnhandledRejection> {
        self.rejections.take()
    }
}

impl Default for LocalScheduler {
    fn default() -> Self {
        Self::new(UnhandledRejectionPolicy::default())
    }
}

impl Scheduler for LocalScheduler {
    fn enqueue(&self, job: Job) {
        tokio::task::spawn_local(async move { job() });
    }

    fn report_unhandled(&self, rejection: UnhandledRejection) {
        self.rejections.report(rejection);
    }
}

impl fmt::Debug for LocalScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalScheduler")
            .field("policy", &self.rejections.policy())
            .finish()
    }
}
