use std::str::FromStr;

use warden_core::AppError;
use warden_domain::{UserId, UserStatus};

/// Bulk action applied to selected accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchUserAction {
    /// Set status to `active`.
    Enable,
    /// Set status to `banned`.
    Disable,
    /// Delete the accounts.
    Delete,
}

impl BatchUserAction {
    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Delete => "delete",
        }
    }

    /// Returns the status the action sets, if it is a status change.
    #[must_use]
    pub fn target_status(&self) -> Option<UserStatus> {
        match self {
            Self::Enable => Some(UserStatus::Active),
            Self::Disable => Some(UserStatus::Banned),
            Self::Delete => None,
        }
    }
}

impl FromStr for BatchUserAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown batch action '{value}'"
            ))),
        }
    }
}

impl std::fmt::Display for BatchUserAction {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One account a batch action did not apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItemFailure {
    /// Account identifier.
    pub user_id: UserId,
    /// Reason reported by the server or the local permission check.
    pub error: String,
}

/// Result of a batch action; partial failures are not rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchActionReport {
    /// Accounts the action applied to.
    pub processed: u32,
    /// Accounts the action did not apply to.
    pub failed: u32,
    /// Per-account failure reasons.
    pub errors: Vec<BatchItemFailure>,
}

impl BatchActionReport {
    /// Adds failures that were never sent to the server.
    pub fn record_rejected(&mut self, rejected: Vec<BatchItemFailure>) {
        let count = u32::try_from(rejected.len()).unwrap_or(u32::MAX);
        self.failed = self.failed.saturating_add(count);
        self.errors.extend(rejected);
    }

    /// Returns the ids that failed, in report order.
    #[must_use]
    pub fn failed_ids(&self) -> Vec<UserId> {
        self.errors
            .iter()
            .map(|failure| failure.user_id.clone())
            .collect()
    }
}
