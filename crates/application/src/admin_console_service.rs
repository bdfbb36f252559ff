//! Admin console workflows.
//!
//! Every operation resolves the acting administrator from the server session
//! first: the multi-workspace feature gate and the role gate run before any
//! admin endpoint is called, and mutations are re-checked with the permission
//! evaluator against freshly fetched target state before they are sent.

use std::sync::Arc;

use tracing::{info, warn};

use warden_core::{AppError, AppResult};
use warden_domain::{
    ActorContext, AdminUser, AvailableUser, MemberRoster, NewUser, PermissionDecision, RoleOption,
    SystemRole, UserId, UserStatus, Workspace, WorkspaceId, WorkspaceName, WorkspaceRole,
    can_delete_workspace, can_modify_membership,
};

use crate::admin_ports::{
    AdminSessionRepository, AdminUserRepository, AdminWorkspaceRepository, AvailableUserQuery,
    BatchActionReport, BatchItemFailure, BatchUserAction, DashboardStats, FeatureFlags,
    MAX_PAGE_LIMIT, MemberPage, Page, PageQuery, UserListQuery,
};
use crate::mutation::{CacheScope, MutationOutcome, membership_changed, user_written};

mod access;
mod members;
mod users;
mod workspaces;

#[cfg(test)]
mod tests;

/// Message returned when the multi-workspace feature gate is off.
pub const FEATURE_DISABLED_MESSAGE: &str = "multi-workspace permission is disabled";

/// Application service behind every admin console command.
#[derive(Clone)]
pub struct AdminConsoleService {
    session_repository: Arc<dyn AdminSessionRepository>,
    user_repository: Arc<dyn AdminUserRepository>,
    workspace_repository: Arc<dyn AdminWorkspaceRepository>,
    actor_id: UserId,
}

impl AdminConsoleService {
    /// Creates a new service acting as `actor_id`.
    #[must_use]
    pub fn new(
        session_repository: Arc<dyn AdminSessionRepository>,
        user_repository: Arc<dyn AdminUserRepository>,
        workspace_repository: Arc<dyn AdminWorkspaceRepository>,
        actor_id: UserId,
    ) -> Self {
        Self {
            session_repository,
            user_repository,
            workspace_repository,
            actor_id,
        }
    }

    /// Returns server feature flags. Available to any signed-in user.
    pub async fn feature_flags(&self) -> AppResult<FeatureFlags> {
        self.session_repository.feature_flags().await
    }

    /// Returns dashboard counters for system admins.
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let actor = self.require_admin_panel().await?;
        if !actor.system_role().can_view_dashboard() {
            return Err(AppError::Forbidden(
                "the admin dashboard requires system_admin".to_owned(),
            ));
        }

        self.session_repository.dashboard_stats().await
    }
}
