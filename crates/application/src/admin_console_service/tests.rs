use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::{AppError, AppResult};
use warden_domain::{
    AdminUser, AvailableUser, NewUser, RoleOption, SystemRole, UserId, UserStatus,
    UserWorkspace, Workspace, WorkspaceId, WorkspaceMember, WorkspaceName, WorkspaceRole,
};

use crate::admin_ports::{
    AdminSessionRepository, AdminUserRepository, AdminWorkspaceRepository, AvailableUserQuery,
    BatchActionReport, BatchItemFailure, BatchUserAction, DashboardStats, FeatureFlags,
    MemberPage, Page, PageQuery, SessionRole, UserListQuery,
};
use crate::mutation::CacheScope;

use super::{AdminConsoleService, FEATURE_DISABLED_MESSAGE};

struct FakeAdminApi {
    session: SessionRole,
    users: Mutex<Vec<AdminUser>>,
    workspaces: Mutex<Vec<Workspace>>,
    members: Mutex<HashMap<WorkspaceId, Vec<WorkspaceMember>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeAdminApi {
    fn new(system_role: SystemRole, enabled: bool) -> Self {
        Self {
            session: SessionRole {
                system_role,
                multi_workspace_permission_enabled: enabled,
            },
            users: Mutex::new(Vec::new()),
            workspaces: Mutex::new(Vec::new()),
            members: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    async fn record(&self, call: impl Into<String>) {
        self.calls.lock().await.push(call.into());
    }

    async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl AdminSessionRepository for FakeAdminApi {
    async fn current_session(&self) -> AppResult<SessionRole> {
        Ok(self.session)
    }

    async fn feature_flags(&self) -> AppResult<FeatureFlags> {
        Ok(FeatureFlags {
            multi_workspace_permission_enabled: self.session.multi_workspace_permission_enabled,
        })
    }

    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        self.record("dashboard").await;
        Ok(DashboardStats::default())
    }
}

#[async_trait]
impl AdminUserRepository for FakeAdminApi {
    async fn list_users(&self, query: &UserListQuery) -> AppResult<Page<AdminUser>> {
        self.record("list_users").await;
        let users = self.users.lock().await.clone();
        let total = users.len() as u64;
        Ok(Page::new(users, query.page, query.limit, total))
    }

    async fn get_user(&self, user_id: &UserId) -> AppResult<AdminUser> {
        self.record(format!("get_user:{user_id}")).await;
        self.users
            .lock()
            .await
            .iter()
            .find(|user| &user.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
    }

    async fn create_user(&self, user: &NewUser) -> AppResult<UserId> {
        self.record("create_user").await;
        let user_id = UserId::new(format!("new-{}", user.name()))?;
        self.users
            .lock()
            .await
            .push(admin_user(user_id.as_str(), user.system_role()));
        Ok(user_id)
    }

    async fn update_user_role(&self, user_id: &UserId, role: SystemRole) -> AppResult<()> {
        self.record(format!("update_user_role:{user_id}")).await;
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| &user.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;
        user.system_role = role;
        Ok(())
    }

    async fn update_user_status(&self, user_id: &UserId, status: UserStatus) -> AppResult<()> {
        self.record(format!("update_user_status:{user_id}")).await;
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| &user.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;
        user.status = status;
        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> AppResult<()> {
        self.record(format!("delete_user:{user_id}")).await;
        self.users.lock().await.retain(|user| &user.id != user_id);
        Ok(())
    }

    async fn batch_user_action(
        &self,
        user_ids: &[UserId],
        action: BatchUserAction,
    ) -> AppResult<BatchActionReport> {
        let ids: Vec<&str> = user_ids.iter().map(UserId::as_str).collect();
        self.record(format!("batch:{action}:{}", ids.join(","))).await;

        let mut users = self.users.lock().await;
        let mut report = BatchActionReport::default();
        for user_id in user_ids {
            match users.iter_mut().find(|user| &user.id == user_id) {
                Some(user) => {
                    if let Some(status) = action.target_status() {
                        user.status = status;
                    }
                    report.processed += 1;
                }
                None => {
                    report.failed += 1;
                    report.errors.push(BatchItemFailure {
                        user_id: user_id.clone(),
                        error: "User not found".to_owned(),
                    });
                }
            }
        }
        if action == BatchUserAction::Delete {
            users.retain(|user| !user_ids.contains(&user.id));
        }

        Ok(report)
    }

    async fn list_system_roles(&self) -> AppResult<Vec<RoleOption<SystemRole>>> {
        Ok(SystemRole::options())
    }
}

#[async_trait]
impl AdminWorkspaceRepository for FakeAdminApi {
    async fn list_workspaces(&self, query: &PageQuery) -> AppResult<Page<Workspace>> {
        self.record("list_workspaces").await;
        let workspaces = self.workspaces.lock().await.clone();
        let total = workspaces.len() as u64;
        Ok(Page::new(workspaces, query.page, query.limit, total))
    }

    async fn create_workspace(&self, name: &WorkspaceName) -> AppResult<WorkspaceId> {
        self.record(format!("create_workspace:{}", name.as_str()))
            .await;
        WorkspaceId::new("ws-new")
    }

    async fn delete_workspace(&self, workspace_id: &WorkspaceId) -> AppResult<()> {
        self.record(format!("delete_workspace:{workspace_id}")).await;
        Ok(())
    }

    async fn list_members(
        &self,
        workspace_id: &WorkspaceId,
        query: &PageQuery,
    ) -> AppResult<MemberPage> {
        let members = self
            .members
            .lock()
            .await
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Workspace not found".to_owned()))?;
        let total = members.len() as u64;
        Ok(MemberPage {
            workspace_name: Some("Research".to_owned()),
            members: Page::new(members, query.page, query.limit, total),
        })
    }

    async fn add_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        self.record(format!("add_member:{workspace_id}:{user_id}")).await;
        self.members
            .lock()
            .await
            .entry(workspace_id.clone())
            .or_default()
            .push(member(user_id.as_str(), role));
        Ok(())
    }

    async fn update_member_role(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        _role: WorkspaceRole,
    ) -> AppResult<()> {
        self.record(format!("update_member_role:{workspace_id}:{user_id}"))
            .await;
        Ok(())
    }

    async fn remove_member(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> AppResult<()> {
        self.record(format!("remove_member:{workspace_id}:{user_id}"))
            .await;
        Ok(())
    }

    async fn available_users(
        &self,
        _workspace_id: &WorkspaceId,
        _query: &AvailableUserQuery,
    ) -> AppResult<Vec<AvailableUser>> {
        Ok(Vec::new())
    }

    async fn list_workspace_roles(&self) -> AppResult<Vec<RoleOption<WorkspaceRole>>> {
        Ok(WorkspaceRole::options())
    }
}

fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| panic!("test"))
}

fn workspace_id(value: &str) -> WorkspaceId {
    WorkspaceId::new(value).unwrap_or_else(|_| panic!("test"))
}

fn admin_user(id: &str, system_role: SystemRole) -> AdminUser {
    AdminUser {
        id: user_id(id),
        name: id.to_owned(),
        email: format!("{id}@example.com"),
        avatar_url: None,
        system_role,
        status: UserStatus::Active,
        created_at: Some(1_700_000_000),
        last_login_at: None,
        last_active_at: None,
        workspaces: Vec::new(),
    }
}

fn member(id: &str, role: WorkspaceRole) -> WorkspaceMember {
    WorkspaceMember {
        user_id: user_id(id),
        name: id.to_owned(),
        email: format!("{id}@example.com"),
        avatar_url: None,
        role,
        status: UserStatus::Active,
        joined_at: Some(1_700_000_000),
        last_active_at: None,
    }
}

fn workspace(id: &str, member_count: u32, is_default: bool) -> Workspace {
    Workspace {
        id: workspace_id(id),
        name: id.to_owned(),
        plan: "basic".to_owned(),
        status: "normal".to_owned(),
        created_at: Some(1_700_000_000),
        member_count,
        is_default,
        created_by: None,
    }
}

async fn service_as(
    actor: &str,
    system_role: SystemRole,
    enabled: bool,
) -> (AdminConsoleService, Arc<FakeAdminApi>) {
    let api = Arc::new(FakeAdminApi::new(system_role, enabled));
    {
        let mut users = api.users.lock().await;
        users.push(admin_user(actor, system_role));
        users.push(admin_user("root-2", SystemRole::SystemAdmin));
        users.push(admin_user("bob", SystemRole::User));
        users.push(admin_user("tess", SystemRole::TenantManager));
    }

    let service = AdminConsoleService::new(api.clone(), api.clone(), api.clone(), user_id(actor));
    (service, api)
}

fn forbidden(message: &str) -> AppError {
    AppError::Forbidden(message.to_owned())
}

#[tokio::test]
async fn disabled_feature_gate_blocks_every_admin_call() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, false).await;

    let listed = service.list_users(UserListQuery::default()).await;
    let deleted = service.delete_user(&user_id("bob")).await;
    let workspaces = service.list_workspaces(PageQuery::default()).await;

    assert_eq!(listed, Err(forbidden(FEATURE_DISABLED_MESSAGE)));
    assert_eq!(deleted, Err(forbidden(FEATURE_DISABLED_MESSAGE)));
    assert_eq!(workspaces, Err(forbidden(FEATURE_DISABLED_MESSAGE)));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn plain_users_cannot_open_the_admin_panel() {
    let (service, api) = service_as("carol", SystemRole::User, true).await;

    let result = service.list_workspaces(PageQuery::default()).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn tenant_managers_manage_workspaces_but_not_users() {
    let (service, api) = service_as("tm", SystemRole::TenantManager, true).await;

    assert!(matches!(
        service.list_users(UserListQuery::default()).await,
        Err(AppError::Forbidden(message)) if message.contains("system_admin")
    ));
    assert!(matches!(
        service.dashboard().await,
        Err(AppError::Forbidden(_))
    ));
    assert!(service.list_workspaces(PageQuery::default()).await.is_ok());
    assert_eq!(api.calls().await, vec!["list_workspaces".to_owned()]);
}

#[tokio::test]
async fn system_admin_target_cannot_be_demoted() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;

    let result = service
        .change_user_role(&user_id("root-2"), SystemRole::User)
        .await;

    assert_eq!(result, Err(forbidden("cannot demote system admin")));
    assert_eq!(api.calls().await, vec!["get_user:root-2".to_owned()]);
}

#[tokio::test]
async fn role_change_invalidates_list_and_detail() {
    let (service, _) = service_as("root", SystemRole::SystemAdmin, true).await;

    let outcome = service
        .change_user_role(&user_id("bob"), SystemRole::TenantManager)
        .await
        .unwrap_or_else(|_| panic!("test"));

    assert!(outcome.marks_stale(&CacheScope::UserList));
    assert!(outcome.marks_stale(&CacheScope::UserDetail(user_id("bob"))));
    assert_eq!(outcome.invalidates.len(), 2);
}

#[tokio::test]
async fn self_ban_is_denied_without_fetching_the_target() {
    let (service, api) = service_as("tm", SystemRole::TenantManager, true).await;

    let result = service
        .change_user_status(&user_id("tm"), UserStatus::Banned)
        .await;

    assert_eq!(result, Err(forbidden("cannot disable self")));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn pending_is_not_an_admin_settable_status() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;

    let result = service
        .change_user_status(&user_id("bob"), UserStatus::Pending)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn banning_a_tenant_manager_as_another_admin_is_applied() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;

    let outcome = service
        .change_user_status(&user_id("tess"), UserStatus::Banned)
        .await;

    assert!(outcome.is_ok());
    assert!(
        api.calls()
            .await
            .contains(&"update_user_status:tess".to_owned())
    );
}

#[tokio::test]
async fn batch_sends_only_selectable_ids() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;
    let ids = vec![
        user_id("root"),
        user_id("root-2"),
        user_id("bob"),
        user_id("bob"),
        user_id("ghost"),
    ];

    let outcome = service
        .batch_user_action(&ids, BatchUserAction::Disable)
        .await
        .unwrap_or_else(|_| panic!("test"));

    assert_eq!(outcome.value.processed, 1);
    assert_eq!(outcome.value.failed, 3);
    assert_eq!(
        outcome.value.failed_ids(),
        vec![user_id("root"), user_id("root-2"), user_id("ghost")]
    );
    assert_eq!(outcome.value.errors[0].error, "cannot disable self");
    assert_eq!(outcome.value.errors[1].error, "cannot disable system admin");
    assert_eq!(outcome.invalidates, vec![CacheScope::UserList]);
    assert!(api.calls().await.contains(&"batch:disable:bob".to_owned()));
}

#[tokio::test]
async fn batch_without_eligible_ids_is_forbidden() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;

    let result = service
        .batch_user_action(&[user_id("root"), user_id("root-2")], BatchUserAction::Delete)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(
        !api.calls()
            .await
            .iter()
            .any(|call| call.starts_with("batch:"))
    );
}

#[tokio::test]
async fn last_owner_membership_is_frozen() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;
    api.members.lock().await.insert(
        workspace_id("ws-1"),
        vec![
            member("olive", WorkspaceRole::Owner),
            member("eddie", WorkspaceRole::Editor),
        ],
    );

    let removed = service
        .remove_member(&workspace_id("ws-1"), &user_id("olive"))
        .await;
    let demoted = service
        .update_member_role(&workspace_id("ws-1"), &user_id("olive"), WorkspaceRole::Admin)
        .await;

    assert_eq!(removed, Err(forbidden("cannot modify last owner")));
    assert_eq!(demoted, Err(forbidden("cannot modify last owner")));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn second_owner_unlocks_owner_changes() {
    let (service, _) = service_as("tm", SystemRole::TenantManager, true).await;
    let ws = workspace_id("ws-1");
    let _ = service
        .add_member(&ws, &user_id("olive"), WorkspaceRole::Owner)
        .await
        .unwrap_or_else(|_| panic!("test"));
    let _ = service
        .add_member(&ws, &user_id("oscar"), WorkspaceRole::Owner)
        .await
        .unwrap_or_else(|_| panic!("test"));

    let (roster, controls) = service
        .member_roster(&ws)
        .await
        .unwrap_or_else(|_| panic!("test"));
    assert_eq!(roster.owner_count(), 2);
    assert!(controls.iter().all(|(_, decision)| decision.is_allowed()));

    let outcome = service
        .remove_member(&ws, &user_id("olive"))
        .await
        .unwrap_or_else(|_| panic!("test"));
    assert!(outcome.marks_stale(&CacheScope::Members(ws.clone())));
    assert!(outcome.marks_stale(&CacheScope::AvailableUsers(ws.clone())));
    assert!(outcome.marks_stale(&CacheScope::WorkspaceList));
}

#[tokio::test]
async fn removing_a_non_member_is_not_found() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;
    api.members
        .lock()
        .await
        .insert(workspace_id("ws-1"), vec![member("olive", WorkspaceRole::Owner)]);

    let result = service
        .remove_member(&workspace_id("ws-1"), &user_id("nobody"))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn sole_workspace_owners_cannot_be_deleted() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;
    {
        let owner_of = |id: &str, workspace: &str| {
            let mut user = admin_user(id, SystemRole::User);
            user.workspaces = vec![UserWorkspace {
                id: workspace.to_owned(),
                name: workspace.to_owned(),
                role: WorkspaceRole::Owner,
                created_at: None,
            }];
            user
        };
        let mut users = api.users.lock().await;
        users.push(owner_of("olga", "ws-team"));
        users.push(owner_of("pia", "ws-pair"));
        users.push(owner_of("pete", "ws-pair"));

        let mut members = api.members.lock().await;
        members.insert(
            workspace_id("ws-team"),
            vec![
                member("olga", WorkspaceRole::Owner),
                member("root", WorkspaceRole::Editor),
            ],
        );
        members.insert(
            workspace_id("ws-pair"),
            vec![
                member("pia", WorkspaceRole::Owner),
                member("pete", WorkspaceRole::Owner),
            ],
        );
    }

    let deleted = service.delete_user(&user_id("olga")).await;
    let batch = service
        .batch_user_action(
            &[user_id("olga"), user_id("pia"), user_id("pete"), user_id("bob")],
            BatchUserAction::Delete,
        )
        .await
        .unwrap_or_else(|_| panic!("test"));

    assert_eq!(deleted, Err(forbidden("cannot modify last owner")));
    assert_eq!(batch.value.processed, 2);
    assert_eq!(batch.value.failed_ids(), vec![user_id("olga"), user_id("pete")]);
    assert_eq!(batch.value.errors[1].error, "cannot modify last owner");
    let calls = api.calls().await;
    assert!(!calls.contains(&"delete_user:olga".to_owned()));
    assert!(calls.contains(&"batch:delete:pia,bob".to_owned()));
}

#[tokio::test]
async fn co_owner_can_be_deleted() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;
    {
        let mut pia = admin_user("pia", SystemRole::User);
        pia.workspaces = vec![UserWorkspace {
            id: "ws-pair".to_owned(),
            name: "Pair".to_owned(),
            role: WorkspaceRole::Owner,
            created_at: None,
        }];
        api.users.lock().await.push(pia);
        api.members.lock().await.insert(
            workspace_id("ws-pair"),
            vec![
                member("pia", WorkspaceRole::Owner),
                member("pete", WorkspaceRole::Owner),
            ],
        );
    }

    let outcome = service.delete_user(&user_id("pia")).await;

    assert!(outcome.is_ok());
    assert!(api.calls().await.contains(&"delete_user:pia".to_owned()));
}

#[tokio::test]
async fn workspace_deletion_rules_are_checked_before_the_call() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;
    {
        let mut workspaces = api.workspaces.lock().await;
        workspaces.push(workspace("default", 1, true));
        workspaces.push(workspace("shared", 3, false));
        workspaces.push(workspace("solo", 1, false));
    }

    assert_eq!(
        service.delete_workspace(&workspace_id("default")).await,
        Err(forbidden("cannot delete default workspace"))
    );
    assert_eq!(
        service.delete_workspace(&workspace_id("shared")).await,
        Err(forbidden("cannot delete workspace with members"))
    );
    assert!(service.delete_workspace(&workspace_id("solo")).await.is_ok());
    assert!(matches!(
        service.delete_workspace(&workspace_id("missing")).await,
        Err(AppError::NotFound(_))
    ));

    let deletes: Vec<String> = api
        .calls()
        .await
        .into_iter()
        .filter(|call| call.starts_with("delete_workspace:"))
        .collect();
    assert_eq!(deletes, vec!["delete_workspace:solo".to_owned()]);
}

#[tokio::test]
async fn blank_workspace_name_is_rejected_locally() {
    let (service, api) = service_as("root", SystemRole::SystemAdmin, true).await;

    let result = service.create_workspace("   ").await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn role_choices_gray_out_demotions_of_system_admins() {
    let (service, _) = service_as("root", SystemRole::SystemAdmin, true).await;

    let choices = service
        .role_choices(&user_id("root-2"))
        .await
        .unwrap_or_else(|_| panic!("test"));

    let enabled: Vec<SystemRole> = choices
        .iter()
        .filter(|(_, disabled)| disabled.is_none())
        .map(|(option, _)| option.value)
        .collect();
    assert_eq!(enabled, vec![SystemRole::SystemAdmin]);
}
