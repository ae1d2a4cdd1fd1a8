//! Deferred values for single-threaded hosts.
//!
//! An [`Eventual`] stands for a result that does not exist yet. Callers attach
//! dependent work with [`then`](Eventual::then) and friends before the result
//! arrives; each attachment returns a new `Eventual` for the chained outcome.
//!
//! - **Settlement** happens once, through the [`Resolve`]/[`Reject`] pair handed
//!   to the executor.
//! - **Delivery** is always deferred: the core hands jobs to a [`Scheduler`]
//!   and never runs callbacks inside the call that caused them.
//! - **Flattening**: resolving with another `Eventual` adopts its outcome.
//! - **Unhandled rejections** are reported to the scheduler, which applies an
//!   [`UnhandledRejectionPolicy`].
//! - **Combinators**: [`Eventual::all`] and [`Eventual::all_settled`].
//!
//! ```ignore
//! let queue = JobQueue::new();
//! let doubled = Eventual::<u32, String>::resolved(&queue, 21).and_then(|n| fulfill(n * 2));
//! queue.run_until_idle()?;
//! assert_eq!(doubled.peek(), Some(Ok(42)));
//! ```

mod combinators;
mod eventual;
mod local;
mod queue;
mod resolve;
mod scheduler;
mod settled;

pub use eventual::Eventual;
pub use local::LocalScheduler;
pub use queue::JobQueue;
pub use resolve::{Reaction, Reject, Resolution, Resolve, adopt, fulfill, reject};
pub use scheduler::{Job, Scheduler};
pub use settled::Settled;

pub use eventual_types::{
    Error, SettledOutcome, SettlementState, UnhandledRejection, UnhandledRejectionPolicy,
};
