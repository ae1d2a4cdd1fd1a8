//! Core domain types for Eventual.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! settlement states, settled-outcome records, the unhandled-rejection signal, and the
//! policy hosts use to react to it.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod outcome;
mod policy;
mod rejection;
mod state;

pub use outcome::SettledOutcome;
pub use policy::UnhandledRejectionPolicy;
pub use rejection::UnhandledRejection;
pub use state::SettlementState;

use thiserror::Error;

/// Failures surfaced by Eventual outside the ordinary rejection path.
///
/// An ordinary rejection is a value carried by an `Eventual`; these are the
/// conditions a host has to deal with itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    UnhandledRejection(#[from] UnhandledRejection),
    /// A job queue ran more jobs in one drain than its configured limit.
    ///
    /// Usually means a chain keeps re-scheduling itself.
    #[error("job queue exceeded its drain limit of {limit} jobs")]
    DrainLimitExceeded { limit: usize },
}
