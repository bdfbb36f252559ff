//! Explicit cache invalidation results for admin mutations.

use warden_domain::{UserId, WorkspaceId};

/// Cached view a caller must refetch after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// Every page of the user listing.
    UserList,
    /// One user's detail view.
    UserDetail(UserId),
    /// Every page of the workspace listing.
    WorkspaceList,
    /// Member listing of one workspace.
    Members(WorkspaceId),
    /// Available-users lookups of one workspace, for any search.
    AvailableUsers(WorkspaceId),
}

impl std::fmt::Display for CacheScope {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserList => formatter.write_str("users"),
            Self::UserDetail(user_id) => write!(formatter, "user:{user_id}"),
            Self::WorkspaceList => formatter.write_str("workspaces"),
            Self::Members(workspace_id) => write!(formatter, "workspace-members:{workspace_id}"),
            Self::AvailableUsers(workspace_id) => {
                write!(formatter, "available-users:{workspace_id}")
            }
        }
    }
}

/// Result of a successful mutation plus the scopes it made stale.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct MutationOutcome<T> {
    /// Value returned by the mutation.
    pub value: T,
    /// Scopes to refetch, in no particular order.
    pub invalidates: Vec<CacheScope>,
}

impl<T> MutationOutcome<T> {
    pub(crate) fn new(value: T, invalidates: Vec<CacheScope>) -> Self {
        Self { value, invalidates }
    }

    /// Returns whether the outcome marks a scope stale.
    #[must_use]
    pub fn marks_stale(&self, scope: &CacheScope) -> bool {
        self.invalidates.contains(scope)
    }
}

pub(crate) fn user_written(user_id: &UserId) -> Vec<CacheScope> {
    vec![CacheScope::UserList, CacheScope::UserDetail(user_id.clone())]
}

pub(crate) fn membership_changed(workspace_id: &WorkspaceId) -> Vec<CacheScope> {
    vec![
        CacheScope::Members(workspace_id.clone()),
        CacheScope::AvailableUsers(workspace_id.clone()),
        CacheScope::WorkspaceList,
    ]
}
