use super::*;

impl InMemoryAdminBackend {
    pub(super) async fn insert_workspace(
        &self,
        name: &WorkspaceName,
        created_by: Option<&UserId>,
        is_default: bool,
    ) -> AppResult<WorkspaceId> {
        let workspace_id = WorkspaceId::new(Self::next_id())?;
        let mut state = self.state.write().await;

        if let Some(creator) = created_by
            && !state.users.iter().any(|user| &user.id == creator)
        {
            return Err(user_not_found());
        }

        state.workspaces.push(StoredWorkspace {
            id: workspace_id.clone(),
            name: name.as_str().to_owned(),
            created_at: Self::now(),
            is_default,
            created_by: created_by.cloned(),
        });
        state.memberships.insert(workspace_id.clone(), Vec::new());

        Ok(workspace_id)
    }

    pub(super) async fn list_workspaces_impl(
        &self,
        query: &PageQuery,
    ) -> AppResult<Page<Workspace>> {
        let state = self.state.read().await;

        let matching: Vec<Workspace> = state
            .workspaces
            .iter()
            .filter(|workspace| {
                query
                    .search
                    .as_deref()
                    .is_none_or(|search| contains_ignore_case(&workspace.name, search))
            })
            .map(|workspace| Workspace {
                id: workspace.id.clone(),
                name: workspace.name.clone(),
                plan: "basic".to_owned(),
                status: "normal".to_owned(),
                created_at: Some(workspace.created_at),
                member_count: state
                    .memberships
                    .get(&workspace.id)
                    .map_or(0, |members| u32::try_from(members.len()).unwrap_or(u32::MAX)),
                is_default: workspace.is_default,
                created_by: workspace.created_by.clone(),
            })
            .collect();

        Ok(paginate(&matching, query.page, query.limit))
    }

    pub(super) async fn delete_workspace_impl(&self, workspace_id: &WorkspaceId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let workspace = state
            .workspaces
            .iter()
            .find(|workspace| &workspace.id == workspace_id)
            .ok_or_else(workspace_not_found)?;

        if workspace.is_default {
            return Err(AppError::Validation(
                "cannot delete default workspace".to_owned(),
            ));
        }
        let member_count = state.memberships.get(workspace_id).map_or(0, Vec::len);
        if member_count > 1 {
            return Err(AppError::Validation(
                "cannot delete workspace with members".to_owned(),
            ));
        }

        state
            .workspaces
            .retain(|workspace| &workspace.id != workspace_id);
        state.memberships.remove(workspace_id);
        Ok(())
    }

    pub(super) async fn list_members_impl(
        &self,
        workspace_id: &WorkspaceId,
        query: &PageQuery,
    ) -> AppResult<MemberPage> {
        let state = self.state.read().await;
        let workspace = state
            .workspaces
            .iter()
            .find(|workspace| &workspace.id == workspace_id)
            .ok_or_else(workspace_not_found)?;

        let members: Vec<WorkspaceMember> = state
            .memberships
            .get(workspace_id)
            .into_iter()
            .flatten()
            .filter_map(|membership| {
                let user = state
                    .users
                    .iter()
                    .find(|user| user.id == membership.user_id)?;
                Some(WorkspaceMember {
                    user_id: user.id.clone(),
                    name: user.name.clone(),
                    email: user.email.clone(),
                    avatar_url: user.avatar_url.clone(),
                    role: membership.role,
                    status: user.status,
                    joined_at: Some(membership.joined_at),
                    last_active_at: user.last_active_at,
                })
            })
            .filter(|member| {
                query.search.as_deref().is_none_or(|search| {
                    contains_ignore_case(&member.name, search)
                        || contains_ignore_case(&member.email, search)
                })
            })
            .collect();

        Ok(MemberPage {
            workspace_name: Some(workspace.name.clone()),
            members: paginate(&members, query.page, query.limit),
        })
    }

    pub(super) async fn add_member_impl(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|user| &user.id == user_id) {
            return Err(user_not_found());
        }

        let joined_at = Self::now();
        let memberships = state
            .memberships
            .get_mut(workspace_id)
            .ok_or_else(workspace_not_found)?;
        if memberships
            .iter()
            .any(|membership| &membership.user_id == user_id)
        {
            return Err(AppError::Conflict(
                "User is already a member of this workspace".to_owned(),
            ));
        }

        memberships.push(StoredMembership {
            user_id: user_id.clone(),
            role,
            joined_at,
        });
        Ok(())
    }

    pub(super) async fn update_member_role_impl(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let memberships = state
            .memberships
            .get_mut(workspace_id)
            .ok_or_else(workspace_not_found)?;
        let owner_count = owner_count(memberships);
        let membership = memberships
            .iter_mut()
            .find(|membership| &membership.user_id == user_id)
            .ok_or_else(not_a_member)?;

        let demotes_last_owner = membership.role == WorkspaceRole::Owner
            && role != WorkspaceRole::Owner
            && owner_count <= 1;
        if demotes_last_owner {
            return Err(AppError::Validation(
                "cannot modify last owner".to_owned(),
            ));
        }

        membership.role = role;
        Ok(())
    }

    pub(super) async fn remove_member_impl(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let memberships = state
            .memberships
            .get_mut(workspace_id)
            .ok_or_else(workspace_not_found)?;
        let owner_count = owner_count(memberships);
        let position = memberships
            .iter()
            .position(|membership| &membership.user_id == user_id)
            .ok_or_else(not_a_member)?;

        if memberships[position].role == WorkspaceRole::Owner && owner_count <= 1 {
            return Err(AppError::Validation(
                "cannot modify last owner".to_owned(),
            ));
        }

        memberships.remove(position);
        Ok(())
    }

    pub(super) async fn available_users_impl(
        &self,
        workspace_id: &WorkspaceId,
        query: &AvailableUserQuery,
    ) -> AppResult<Vec<AvailableUser>> {
        let state = self.state.read().await;
        let memberships = state
            .memberships
            .get(workspace_id)
            .ok_or_else(workspace_not_found)?;

        Ok(state
            .users
            .iter()
            .filter(|user| user.status == UserStatus::Active)
            .filter(|user| {
                !memberships
                    .iter()
                    .any(|membership| membership.user_id == user.id)
            })
            .filter(|user| {
                query.search.as_deref().is_none_or(|search| {
                    contains_ignore_case(&user.name, search)
                        || contains_ignore_case(&user.email, search)
                })
            })
            .take(query.limit as usize)
            .map(|user| AvailableUser {
                id: user.id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                avatar_url: user.avatar_url.clone(),
            })
            .collect())
    }
}

fn not_a_member() -> AppError {
    AppError::NotFound("Member not found".to_owned())
}
