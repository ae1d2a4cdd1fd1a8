//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use eventual_core::{Eventual, JobQueue, UnhandledRejectionPolicy};

pub type Ev = Eventual<i32, String>;

/// A queue that keeps unhandled rejections instead of panicking.
pub fn collecting_queue() -> JobQueue {
    JobQueue::with_policy(UnhandledRejectionPolicy::Collect)
}

/// Shared append-only log for observing callback order.
pub fn log<T>() -> Rc<RefCell<Vec<T>>> {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn run(queue: &JobQueue) {
    queue
        .run_until_idle()
        .expect("test chains stay under the drain limit");
}
