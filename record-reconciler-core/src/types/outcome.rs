//! Invocation outcome

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a failed invocation should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A designed, user-facing failure; retrying will not help.
    Permanent,
    /// A provider error outside the recognized set for the stage.
    Unhandled,
    /// A panic or internal inconsistency.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// Reported to the engine as the envelope's `error`.
    pub error_code: String,
}

impl Failure {
    pub fn permanent(error_code: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Permanent,
            error_code: error_code.into(),
        }
    }

    pub fn unhandled(error_code: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unhandled,
            error_code: error_code.into(),
        }
    }

    pub fn unexpected(error_code: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unexpected,
            error_code: error_code.into(),
        }
    }
}

/// Result of one invocation. The caller owns any waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Converged; props and links are final.
    Done,
    /// Re-invoke after the delay with the returned `pass_back_data`.
    RetryAfter(Duration),
    Failed(Failure),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Self::RetryAfter(delay) => Some(*delay),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
