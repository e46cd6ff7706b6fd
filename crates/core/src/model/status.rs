use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How far a learner has progressed through a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// A user-facing step that moves a topic between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusAction {
    Start,
    Complete,
    Reset,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatusError {
    #[error("unknown status: {0}")]
    Unknown(String),

    #[error("cannot {action:?} a topic that is {from}")]
    TransitionNotAllowed {
        from: ProgressStatus,
        action: StatusAction,
    },
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 3] = [
        ProgressStatus::NotStarted,
        ProgressStatus::InProgress,
        ProgressStatus::Completed,
    ];

    /// Stable label used in the persisted snapshot.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not-started",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
        }
    }

    /// Actions offered for a topic in this status.
    #[must_use]
    pub fn actions(self) -> &'static [StatusAction] {
        match self {
            ProgressStatus::NotStarted => &[StatusAction::Start],
            ProgressStatus::InProgress => &[StatusAction::Complete, StatusAction::Reset],
            ProgressStatus::Completed => &[StatusAction::Reset],
        }
    }

    /// Apply an action and return the resulting status.
    ///
    /// # Errors
    ///
    /// Returns `StatusError::TransitionNotAllowed` if the action is not offered
    /// for the current status.
    pub fn apply(self, action: StatusAction) -> Result<ProgressStatus, StatusError> {
        match (self, action) {
            (ProgressStatus::NotStarted, StatusAction::Start) => Ok(ProgressStatus::InProgress),
            (ProgressStatus::InProgress, StatusAction::Complete) => Ok(ProgressStatus::Completed),
            (ProgressStatus::InProgress | ProgressStatus::Completed, StatusAction::Reset) => {
                Ok(ProgressStatus::NotStarted)
            }
            (from, action) => Err(StatusError::TransitionNotAllowed { from, action }),
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not-started" => Ok(ProgressStatus::NotStarted),
            "in-progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}

impl FromStr for StatusAction {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start" => Ok(StatusAction::Start),
            "complete" => Ok(StatusAction::Complete),
            "reset" => Ok(StatusAction::Reset),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}
