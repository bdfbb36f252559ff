use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::{UserId, UserStatus, WorkspaceRole};

/// Opaque identifier of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Creates a workspace identifier from a non-blank value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "workspace id must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Workspace as listed by the admin console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Workspace identifier.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Billing plan name.
    pub plan: String,
    /// Lifecycle status as reported by the server.
    pub status: String,
    /// Creation time, Unix seconds.
    pub created_at: Option<i64>,
    /// Number of members, derived by the server.
    pub member_count: u32,
    /// Whether this is the tenant root's default workspace.
    pub is_default: bool,
    /// Creator account, when known.
    pub created_by: Option<UserId>,
}

/// Validated name for a new workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceName(NonEmptyString);

impl WorkspaceName {
    /// Maximum accepted name length in characters.
    pub const MAX_LENGTH: usize = 100;

    /// Validates a workspace name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        let name = NonEmptyString::new(trimmed)
            .map_err(|_| AppError::Validation("workspace name is required".to_owned()))?;

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "workspace name must not exceed {} characters",
                Self::MAX_LENGTH
            )));
        }

        Ok(Self(name))
    }

    /// Returns the trimmed name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Membership row of a workspace member listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMember {
    /// Member account identifier.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Avatar URL, if uploaded.
    pub avatar_url: Option<String>,
    /// Role inside the workspace.
    pub role: WorkspaceRole,
    /// Account status.
    pub status: UserStatus,
    /// Membership creation time, Unix seconds.
    pub joined_at: Option<i64>,
    /// Last recorded activity, Unix seconds.
    pub last_active_at: Option<i64>,
}

/// Full member listing of one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRoster {
    /// Workspace the roster belongs to.
    pub workspace_id: WorkspaceId,
    /// Workspace name, when returned by the server.
    pub workspace_name: Option<String>,
    /// Members in server order.
    pub members: Vec<WorkspaceMember>,
}

impl MemberRoster {
    /// Returns how many members currently hold the owner role.
    #[must_use]
    pub fn owner_count(&self) -> usize {
        self.members
            .iter()
            .filter(|member| member.role == WorkspaceRole::Owner)
            .count()
    }

    /// Finds a member by account identifier.
    #[must_use]
    pub fn find(&self, user_id: &UserId) -> Option<&WorkspaceMember> {
        self.members.iter().find(|member| &member.user_id == user_id)
    }
}

/// Account that can still be added to a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUser {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Avatar URL, if uploaded.
    pub avatar_url: Option<String>,
}
