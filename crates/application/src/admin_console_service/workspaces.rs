use super::access::enforce;
use super::*;

impl AdminConsoleService {
    /// Lists workspaces with member counts.
    pub async fn list_workspaces(&self, query: PageQuery) -> AppResult<Page<Workspace>> {
        self.require_workspace_admin().await?;
        self.workspace_repository
            .list_workspaces(&query.normalized())
            .await
    }

    /// Lists the workspace roles offered by the server.
    pub async fn workspace_role_options(&self) -> AppResult<Vec<RoleOption<WorkspaceRole>>> {
        self.require_workspace_admin().await?;
        self.workspace_repository.list_workspace_roles().await
    }

    /// Creates a workspace.
    pub async fn create_workspace(&self, name: &str) -> AppResult<MutationOutcome<WorkspaceId>> {
        let name = WorkspaceName::new(name)?;
        let actor = self.require_workspace_admin().await?;
        if !actor.system_role().can_create_workspace() {
            return Err(AppError::Forbidden(
                "workspace creation requires system_admin or tenant_manager".to_owned(),
            ));
        }

        let workspace_id = self.workspace_repository.create_workspace(&name).await?;
        info!(
            actor_id = %actor.user_id(),
            workspace_id = %workspace_id,
            name = name.as_str(),
            "workspace created"
        );

        Ok(MutationOutcome::new(
            workspace_id,
            vec![CacheScope::WorkspaceList],
        ))
    }

    /// Deletes a workspace that is neither default nor shared.
    pub async fn delete_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> AppResult<MutationOutcome<()>> {
        let actor = self.require_workspace_admin().await?;
        let workspace = self.find_workspace(workspace_id).await?;

        enforce(
            can_delete_workspace(&workspace),
            &actor,
            "delete_workspace",
            workspace_id.as_str(),
        )?;

        self.workspace_repository
            .delete_workspace(workspace_id)
            .await?;
        info!(
            actor_id = %actor.user_id(),
            workspace_id = %workspace_id,
            "workspace deleted"
        );

        Ok(MutationOutcome::new((), vec![CacheScope::WorkspaceList]))
    }

    async fn find_workspace(&self, workspace_id: &WorkspaceId) -> AppResult<Workspace> {
        let mut query = PageQuery {
            limit: MAX_PAGE_LIMIT,
            ..PageQuery::default()
        };

        loop {
            let page = self.workspace_repository.list_workspaces(&query).await?;
            let exhausted = !page.has_more || page.items.is_empty();
            if let Some(workspace) = page
                .items
                .into_iter()
                .find(|workspace| &workspace.id == workspace_id)
            {
                return Ok(workspace);
            }

            if exhausted {
                return Err(AppError::NotFound(format!(
                    "workspace '{workspace_id}' does not exist"
                )));
            }
            query.page = query.page.saturating_add(1);
        }
    }
}
