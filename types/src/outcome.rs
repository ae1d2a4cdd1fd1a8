//! Per-input outcome records produced by `all_settled`.

use serde::{Deserialize, Serialize};

use crate::SettlementState;

/// The settled result of one input, tagged by `status`.
///
/// Serializes as `{"status": "fulfilled", "value": ...}` or
/// `{"status": "rejected", "reason": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SettledOutcome<T, E> {
    Fulfilled { value: T },
    Rejected { reason: E },
}

impl<T, E> SettledOutcome<T, E> {
    #[must_use]
    pub const fn state(&self) -> SettlementState {
        match self {
            Self::Fulfilled { .. } => SettlementState::Fulfilled,
            Self::Rejected { .. } => SettlementState::Rejected,
        }
    }

    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled { value } => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    #[must_use]
    pub const fn reason(&self) -> Option<&E> {
        match self {
            Self::Fulfilled { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Fulfilled { value } => Ok(value),
            Self::Rejected { reason } => Err(reason),
        }
    }
}

impl<T, E> From<Result<T, E>> for SettledOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled { value },
            Err(reason) => Self::Rejected { reason },
        }
    }
}
