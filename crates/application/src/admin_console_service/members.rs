use warden_domain::membership_controls;

use super::access::enforce;
use super::*;

impl AdminConsoleService {
    /// Lists one page of workspace members.
    pub async fn list_members(
        &self,
        workspace_id: &WorkspaceId,
        query: PageQuery,
    ) -> AppResult<MemberPage> {
        self.require_workspace_admin().await?;
        self.workspace_repository
            .list_members(workspace_id, &query.normalized())
            .await
    }

    /// Returns every member of a workspace with the per-member control state.
    pub async fn member_roster(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<(MemberRoster, Vec<(UserId, PermissionDecision)>)> {
        self.require_workspace_admin().await?;
        let roster = self.fetch_roster(workspace_id).await?;
        let controls = membership_controls(&roster);

        Ok((roster, controls))
    }

    /// Lists accounts that can be added to a workspace.
    pub async fn available_users(
        &self,
        workspace_id: &WorkspaceId,
        query: AvailableUserQuery,
    ) -> AppResult<Vec<AvailableUser>> {
        self.require_workspace_admin().await?;
        self.workspace_repository
            .available_users(workspace_id, &query.normalized())
            .await
    }

    /// Adds an account to a workspace with the given role.
    pub async fn add_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<MutationOutcome<()>> {
        let actor = self.require_workspace_admin().await?;
        self.workspace_repository
            .add_member(workspace_id, user_id, role)
            .await?;

        info!(
            actor_id = %actor.user_id(),
            workspace_id = %workspace_id,
            user_id = %user_id,
            role = %role,
            "member added"
        );

        Ok(MutationOutcome::new((), membership_changed(workspace_id)))
    }

    /// Changes a member's role unless it would drop the last owner.
    pub async fn update_member_role(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<MutationOutcome<()>> {
        let actor = self.require_workspace_admin().await?;
        self.check_owner_floor(&actor, workspace_id, user_id, "update_member_role")
            .await?;

        self.workspace_repository
            .update_member_role(workspace_id, user_id, role)
            .await?;
        info!(
            actor_id = %actor.user_id(),
            workspace_id = %workspace_id,
            user_id = %user_id,
            role = %role,
            "member role changed"
        );

        Ok(MutationOutcome::new(
            (),
            vec![CacheScope::Members(workspace_id.clone())],
        ))
    }

    /// Removes a member unless it is the last owner.
    pub async fn remove_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> AppResult<MutationOutcome<()>> {
        let actor = self.require_workspace_admin().await?;
        self.check_owner_floor(&actor, workspace_id, user_id, "remove_member")
            .await?;

        self.workspace_repository
            .remove_member(workspace_id, user_id)
            .await?;
        info!(
            actor_id = %actor.user_id(),
            workspace_id = %workspace_id,
            user_id = %user_id,
            "member removed"
        );

        Ok(MutationOutcome::new((), membership_changed(workspace_id)))
    }

    async fn check_owner_floor(
        &self,
        actor: &ActorContext,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        action: &'static str,
    ) -> AppResult<()> {
        let roster = self.fetch_roster(workspace_id).await?;
        let member = roster.find(user_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "user '{user_id}' is not a member of workspace '{workspace_id}'"
            ))
        })?;

        enforce(
            can_modify_membership(roster.owner_count(), member.role),
            actor,
            action,
            user_id.as_str(),
        )
    }

    /// Checks that deleting `user` leaves every workspace they own with an
    /// owner. `leaving` holds the workspaces of owners already queued for
    /// deletion in the same request; allowed owners are added to it.
    pub(super) async fn owner_floor_on_delete(
        &self,
        user: &AdminUser,
        leaving: &mut Vec<WorkspaceId>,
    ) -> AppResult<PermissionDecision> {
        let mut owned = Vec::new();

        for workspace in &user.workspaces {
            if workspace.role != WorkspaceRole::Owner {
                continue;
            }

            let workspace_id = WorkspaceId::new(workspace.id.clone())?;
            let roster = match self.fetch_roster(&workspace_id).await {
                Ok(roster) => roster,
                Err(AppError::NotFound(_)) => continue,
                Err(error) => return Err(error),
            };
            if roster
                .find(&user.id)
                .is_some_and(|member| member.role != WorkspaceRole::Owner)
            {
                continue;
            }

            let already_leaving = leaving.iter().filter(|id| **id == workspace_id).count();
            let owners = roster.owner_count().saturating_sub(already_leaving);
            let decision = can_modify_membership(owners, WorkspaceRole::Owner);
            if !decision.is_allowed() {
                return Ok(decision);
            }
            owned.push(workspace_id);
        }

        leaving.extend(owned);
        Ok(PermissionDecision::Allowed)
    }

    async fn fetch_roster(&self, workspace_id: &WorkspaceId) -> AppResult<MemberRoster> {
        let mut query = PageQuery {
            limit: MAX_PAGE_LIMIT,
            ..PageQuery::default()
        };
        let mut roster = MemberRoster {
            workspace_id: workspace_id.clone(),
            workspace_name: None,
            members: Vec::new(),
        };

        loop {
            let page = self
                .workspace_repository
                .list_members(workspace_id, &query)
                .await?;
            let exhausted = !page.members.has_more || page.members.items.is_empty();

            if roster.workspace_name.is_none() {
                roster.workspace_name = page.workspace_name;
            }
            roster.members.extend(page.members.items);

            if exhausted {
                return Ok(roster);
            }
            query.page = query.page.saturating_add(1);
        }
    }
}
