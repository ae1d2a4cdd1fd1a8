use serde::{Deserialize, Serialize};

/// What a scheduler does when a rejection settles with no handler attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnhandledRejectionPolicy {
    /// Treat it as a failed assertion and panic on the scheduler turn that settled it.
    #[default]
    Panic,
    /// Emit an error event and carry on.
    Log,
    /// Emit an error event and keep the rejection for later inspection.
    Collect,
}

impl UnhandledRejectionPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Log => "log",
            Self::Collect => "collect",
        }
    }
}
