use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::{
    AdminUser, AvailableUser, NewUser, RoleOption, SystemRole, UserId, UserStatus, Workspace,
    WorkspaceId, WorkspaceName, WorkspaceRole,
};

use super::{
    AvailableUserQuery, BatchActionReport, BatchUserAction, DashboardStats, FeatureFlags,
    MemberPage, Page, PageQuery, SessionRole, UserListQuery,
};

/// Repository port for the signed-in session and global admin views.
#[async_trait]
pub trait AdminSessionRepository: Send + Sync {
    /// Returns the signed-in user's system role and the feature gate.
    async fn current_session(&self) -> AppResult<SessionRole>;

    /// Returns server feature flags.
    async fn feature_flags(&self) -> AppResult<FeatureFlags>;

    /// Returns dashboard counters.
    async fn dashboard_stats(&self) -> AppResult<DashboardStats>;
}

/// Repository port for platform-wide user administration.
#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    /// Lists users with server-side filtering and pagination.
    async fn list_users(&self, query: &UserListQuery) -> AppResult<Page<AdminUser>>;

    /// Returns one user with joined workspaces.
    async fn get_user(&self, user_id: &UserId) -> AppResult<AdminUser>;

    /// Creates an account. Returns the assigned identifier.
    async fn create_user(&self, user: &NewUser) -> AppResult<UserId>;

    /// Replaces a user's system role.
    async fn update_user_role(&self, user_id: &UserId, role: SystemRole) -> AppResult<()>;

    /// Sets a user's status to `active` or `banned`.
    async fn update_user_status(&self, user_id: &UserId, status: UserStatus) -> AppResult<()>;

    /// Deletes an account.
    async fn delete_user(&self, user_id: &UserId) -> AppResult<()>;

    /// Applies one action to many accounts, reporting per-account failures.
    async fn batch_user_action(
        &self,
        user_ids: &[UserId],
        action: BatchUserAction,
    ) -> AppResult<BatchActionReport>;

    /// Lists the system roles the server offers.
    async fn list_system_roles(&self) -> AppResult<Vec<RoleOption<SystemRole>>>;
}

/// Repository port for workspace and membership administration.
#[async_trait]
pub trait AdminWorkspaceRepository: Send + Sync {
    /// Lists workspaces with member counts.
    async fn list_workspaces(&self, query: &PageQuery) -> AppResult<Page<Workspace>>;

    /// Creates a workspace. Returns the assigned identifier.
    async fn create_workspace(&self, name: &WorkspaceName) -> AppResult<WorkspaceId>;

    /// Deletes a workspace.
    async fn delete_workspace(&self, workspace_id: &WorkspaceId) -> AppResult<()>;

    /// Lists one page of workspace members.
    async fn list_members(
        &self,
        workspace_id: &WorkspaceId,
        query: &PageQuery,
    ) -> AppResult<MemberPage>;

    /// Adds an existing account to a workspace.
    async fn add_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()>;

    /// Changes a member's workspace role.
    async fn update_member_role(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()>;

    /// Removes a member from a workspace.
    async fn remove_member(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> AppResult<()>;

    /// Lists accounts that are not yet members of the workspace.
    async fn available_users(
        &self,
        workspace_id: &WorkspaceId,
        query: &AvailableUserQuery,
    ) -> AppResult<Vec<AvailableUser>>;

    /// Lists the workspace roles the server offers.
    async fn list_workspace_roles(&self) -> AppResult<Vec<RoleOption<WorkspaceRole>>>;
}
