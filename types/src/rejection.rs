use std::fmt;

use thiserror::Error;

/// A rejection that settled while nothing was listening for it.
///
/// Carries a rendering of the original reason, since the reason's own type
/// belongs to the chain that dropped it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unhandled rejection: {reason}")]
pub struct UnhandledRejection {
    reason: String,
}

impl UnhandledRejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Render `reason` with its `Debug` impl.
    pub fn from_reason<E: fmt::Debug + ?Sized>(reason: &E) -> Self {
        Self::new(format!("{reason:?}"))
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
