use std::fmt;

use crate::model::issue::Status;

/// Machine-readable error codes for scripts and front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ValidationFailed,
    IssueNotFound,
    UserNotFound,
    InvalidStateTransition,
    DuplicateVote,
    PermissionDenied,
    InvalidEnumValue,
    CapabilityUnavailable,
    StorageReadFailed,
    StorageWriteFailed,
    LockContention,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::ValidationFailed => "E2001",
            Self::IssueNotFound => "E2002",
            Self::UserNotFound => "E2007",
            Self::InvalidStateTransition => "E2003",
            Self::DuplicateVote => "E2004",
            Self::PermissionDenied => "E2005",
            Self::InvalidEnumValue => "E2006",
            Self::CapabilityUnavailable => "E4001",
            Self::StorageReadFailed => "E5001",
            Self::StorageWriteFailed => "E5002",
            Self::LockContention => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ValidationFailed => "Required fields missing",
            Self::IssueNotFound => "Issue not found",
            Self::UserNotFound => "User not found",
            Self::InvalidStateTransition => "Invalid status transition",
            Self::DuplicateVote => "Already upvoted",
            Self::PermissionDenied => "Not permitted for this role",
            Self::InvalidEnumValue => "Invalid category/status/priority/role value",
            Self::CapabilityUnavailable => "Capture capability unavailable",
            Self::StorageReadFailed => "Storage read failed",
            Self::StorageWriteFailed => "Storage write failed",
            Self::LockContention => "Lock contention",
        }
    }

    /// Optional remediation hint surfaced next to the error.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .civic/config.toml and retry."),
            Self::ValidationFailed => Some("Please fill in all required fields."),
            Self::IssueNotFound => Some("Run `civic dashboard` to list issue IDs."),
            Self::UserNotFound => Some("Use a directory user id such as `user1`, `user2` or `admin1`."),
            Self::InvalidStateTransition => Some(
                "Follow the lifecycle: submitted -> acknowledged -> assigned -> resolved.",
            ),
            Self::DuplicateVote => Some("Each user may upvote an issue only once."),
            Self::PermissionDenied => Some("Switch role with `civic role staff` or `civic role admin`."),
            Self::InvalidEnumValue => Some("Use one of the documented values."),
            Self::CapabilityUnavailable => Some("Enter the value manually instead."),
            Self::StorageReadFailed | Self::StorageWriteFailed => {
                Some("Check disk space and permissions on the data directory.")
            }
            Self::LockContention => Some("Retry after the other `civic` process releases its lock."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A required report field that was missing or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Title,
    Description,
    Location,
}

impl MissingField {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draft rejected before it reached the collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", join_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<MissingField>,
}

fn join_fields(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors returned by issue store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CivicError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("user {user_id} has already upvoted issue {issue_id}")]
    DuplicateVote { user_id: String, issue_id: String },

    #[error("cannot move issue from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("issue is already {0}; there is no later stage")]
    FinalStatus(Status),

    #[error("{action} requires a staff or admin session")]
    PermissionDenied { action: &'static str },
}

impl CivicError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::IssueNotFound(_) => ErrorCode::IssueNotFound,
            Self::DuplicateVote { .. } => ErrorCode::DuplicateVote,
            Self::InvalidTransition { .. } | Self::FinalStatus(_) => {
                ErrorCode::InvalidStateTransition
            }
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
        }
    }

    /// Remediation hint for the error's code.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
