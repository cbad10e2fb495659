use serde::{Deserialize, Serialize};

/// Lifecycle of the most recent catalog fetch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    Success,
    /// Transport failure or a response of unknown shape
    Error,
}

impl FetchStatus {
    /// Success and error both end a fetch.
    pub fn is_settled(&self) -> bool {
        matches!(self, FetchStatus::Success | FetchStatus::Error)
    }
}
