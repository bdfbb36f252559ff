use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use warden_application::{
    AdminSessionRepository, AdminUserRepository, AdminWorkspaceRepository, AvailableUserQuery,
    BatchActionReport, BatchItemFailure, BatchUserAction, DashboardStats, FeatureFlags,
    MemberPage, Page, PageQuery, SessionRole, UserListQuery,
};
use warden_core::{AppError, AppResult};
use warden_domain::{
    AdminUser, AvailableUser, NewUser, RoleOption, SystemRole, UserId, UserStatus, UserWorkspace,
    Workspace, WorkspaceId, WorkspaceMember, WorkspaceName, WorkspaceRole,
};

mod users;
mod workspaces;

#[derive(Debug, Clone)]
struct StoredWorkspace {
    id: WorkspaceId,
    name: String,
    created_at: i64,
    is_default: bool,
    created_by: Option<UserId>,
}

#[derive(Debug, Clone)]
struct StoredMembership {
    user_id: UserId,
    role: WorkspaceRole,
    joined_at: i64,
}

#[derive(Debug, Default)]
struct BackendState {
    users: Vec<AdminUser>,
    workspaces: Vec<StoredWorkspace>,
    memberships: HashMap<WorkspaceId, Vec<StoredMembership>>,
}

/// In-memory admin backend that applies the same rules as the admin API.
///
/// Used by the console's `memory` backend and by end-to-end tests.
#[derive(Debug)]
pub struct InMemoryAdminBackend {
    state: RwLock<BackendState>,
    multi_workspace_permission_enabled: bool,
}

impl InMemoryAdminBackend {
    /// Creates an empty backend with the given feature gate.
    #[must_use]
    pub fn new(multi_workspace_permission_enabled: bool) -> Self {
        Self {
            state: RwLock::new(BackendState::default()),
            multi_workspace_permission_enabled,
        }
    }

    /// Returns a session port signed in as `user_id`.
    #[must_use]
    pub fn session(self: &Arc<Self>, user_id: UserId) -> InMemoryAdminSession {
        InMemoryAdminSession {
            backend: Arc::clone(self),
            user_id,
        }
    }

    /// Inserts an account with a caller-chosen id.
    pub async fn seed_user(
        &self,
        user_id: UserId,
        name: &str,
        email: &str,
        system_role: SystemRole,
    ) -> AppResult<()> {
        self.insert_user(user_id, name, email, system_role).await
    }

    /// Inserts a workspace owned by `owner`.
    pub async fn seed_workspace(
        &self,
        name: &WorkspaceName,
        owner: &UserId,
        is_default: bool,
    ) -> AppResult<WorkspaceId> {
        let workspace_id = self.insert_workspace(name, Some(owner), is_default).await?;
        self.add_member_impl(&workspace_id, owner, WorkspaceRole::Owner)
            .await?;
        Ok(workspace_id)
    }

    fn next_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn paginate<T: Clone>(rows: &[T], page: u32, limit: u32) -> Page<T> {
    let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
    let items = rows
        .iter()
        .skip(offset)
        .take(limit as usize)
        .cloned()
        .collect();

    Page::new(items, page, limit, rows.len() as u64)
}

fn owner_count(memberships: &[StoredMembership]) -> usize {
    memberships
        .iter()
        .filter(|membership| membership.role == WorkspaceRole::Owner)
        .count()
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_owned())
}

fn workspace_not_found() -> AppError {
    AppError::NotFound("Workspace not found".to_owned())
}

/// Session port bound to one signed-in account of an [`InMemoryAdminBackend`].
#[derive(Debug, Clone)]
pub struct InMemoryAdminSession {
    backend: Arc<InMemoryAdminBackend>,
    user_id: UserId,
}

#[async_trait]
impl AdminSessionRepository for InMemoryAdminSession {
    async fn current_session(&self) -> AppResult<SessionRole> {
        if !self.backend.multi_workspace_permission_enabled {
            return Ok(SessionRole {
                system_role: SystemRole::User,
                multi_workspace_permission_enabled: false,
            });
        }

        let state = self.backend.state.read().await;
        let user = state
            .users
            .iter()
            .find(|user| user.id == self.user_id)
            .ok_or_else(|| {
                AppError::Unauthorized(format!("session user '{}' does not exist", self.user_id))
            })?;

        Ok(SessionRole {
            system_role: user.system_role,
            multi_workspace_permission_enabled: true,
        })
    }

    async fn feature_flags(&self) -> AppResult<FeatureFlags> {
        Ok(FeatureFlags {
            multi_workspace_permission_enabled: self.backend.multi_workspace_permission_enabled,
        })
    }

    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let state = self.backend.state.read().await;
        let count_status = |status: UserStatus| {
            state
                .users
                .iter()
                .filter(|user| user.status == status)
                .count() as u64
        };

        Ok(DashboardStats {
            total_users: state.users.len() as u64,
            active_users: count_status(UserStatus::Active),
            banned_users: count_status(UserStatus::Banned),
            total_workspaces: state.workspaces.len() as u64,
        })
    }
}

#[async_trait]
impl AdminUserRepository for InMemoryAdminBackend {
    async fn list_users(&self, query: &UserListQuery) -> AppResult<Page<AdminUser>> {
        self.list_users_impl(query).await
    }

    async fn get_user(&self, user_id: &UserId) -> AppResult<AdminUser> {
        self.get_user_impl(user_id).await
    }

    async fn create_user(&self, user: &NewUser) -> AppResult<UserId> {
        let user_id = UserId::new(Self::next_id())?;
        self.insert_user(user_id.clone(), user.name(), user.email(), user.system_role())
            .await?;
        Ok(user_id)
    }

    async fn update_user_role(&self, user_id: &UserId, role: SystemRole) -> AppResult<()> {
        self.update_user_impl(user_id, |user| user.system_role = role)
            .await
    }

    async fn update_user_status(&self, user_id: &UserId, status: UserStatus) -> AppResult<()> {
        if !status.is_admin_settable() {
            return Err(AppError::Validation(format!("Invalid status: {status}")));
        }

        self.update_user_impl(user_id, |user| user.status = status)
            .await
    }

    async fn delete_user(&self, user_id: &UserId) -> AppResult<()> {
        self.delete_user_impl(user_id).await
    }

    async fn batch_user_action(
        &self,
        user_ids: &[UserId],
        action: BatchUserAction,
    ) -> AppResult<BatchActionReport> {
        self.batch_user_action_impl(user_ids, action).await
    }

    async fn list_system_roles(&self) -> AppResult<Vec<RoleOption<SystemRole>>> {
        Ok(SystemRole::options())
    }
}

#[async_trait]
impl AdminWorkspaceRepository for InMemoryAdminBackend {
    async fn list_workspaces(&self, query: &PageQuery) -> AppResult<Page<Workspace>> {
        self.list_workspaces_impl(query).await
    }

    async fn create_workspace(&self, name: &WorkspaceName) -> AppResult<WorkspaceId> {
        self.insert_workspace(name, None, false).await
    }

    async fn delete_workspace(&self, workspace_id: &WorkspaceId) -> AppResult<()> {
        self.delete_workspace_impl(workspace_id).await
    }

    async fn list_members(
        &self,
        workspace_id: &WorkspaceId,
        query: &PageQuery,
    ) -> AppResult<MemberPage> {
        self.list_members_impl(workspace_id, query).await
    }

    async fn add_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        self.add_member_impl(workspace_id, user_id, role).await
    }

    async fn update_member_role(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        self.update_member_role_impl(workspace_id, user_id, role)
            .await
    }

    async fn remove_member(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> AppResult<()> {
        self.remove_member_impl(workspace_id, user_id).await
    }

    async fn available_users(
        &self,
        workspace_id: &WorkspaceId,
        query: &AvailableUserQuery,
    ) -> AppResult<Vec<AvailableUser>> {
        self.available_users_impl(workspace_id, query).await
    }

    async fn list_workspace_roles(&self) -> AppResult<Vec<RoleOption<WorkspaceRole>>> {
        Ok(WorkspaceRole::options())
    }
}
