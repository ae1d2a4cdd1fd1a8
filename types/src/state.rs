use std::fmt;

use serde::{Deserialize, Serialize};

/// Where an `Eventual` sits in its one-way lifecycle.
///
/// Transitions are `Pending -> Fulfilled` or `Pending -> Rejected`, at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementState {
    #[default]
    Pending,
    Fulfilled,
    Rejected,
}

impl SettlementState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn is_settled(self) -> bool {
        !self.is_pending()
    }
}

impl fmt::Display for SettlementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
