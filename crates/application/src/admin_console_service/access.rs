use super::*;

impl AdminConsoleService {
    /// Resolves the acting administrator from the server session.
    ///
    /// Fails with [`AppError::Forbidden`] when the feature gate is off.
    pub async fn current_actor(&self) -> AppResult<ActorContext> {
        let session = self.session_repository.current_session().await?;
        if !session.multi_workspace_permission_enabled {
            warn!(actor_id = %self.actor_id, "multi-workspace permission gate is off");
            return Err(AppError::Forbidden(FEATURE_DISABLED_MESSAGE.to_owned()));
        }

        Ok(ActorContext::new(self.actor_id.clone(), session.system_role))
    }

    pub(super) async fn require_admin_panel(&self) -> AppResult<ActorContext> {
        let actor = self.current_actor().await?;
        if !actor.system_role().can_access_admin_panel() {
            warn!(
                actor_id = %actor.user_id(),
                system_role = %actor.system_role(),
                "admin panel access denied"
            );
            return Err(AppError::Forbidden(
                "the admin panel requires system_admin or tenant_manager".to_owned(),
            ));
        }

        Ok(actor)
    }

    pub(super) async fn require_user_admin(&self) -> AppResult<ActorContext> {
        let actor = self.require_admin_panel().await?;
        ensure_user_admin(&actor)?;
        Ok(actor)
    }

    /// Fetches the target account. Self targets resolve to `None` without a
    /// fetch.
    pub(super) async fn target_user(
        &self,
        actor: &ActorContext,
        user_id: &UserId,
    ) -> AppResult<Option<AdminUser>> {
        if actor.is_self(user_id) {
            return Ok(None);
        }

        ensure_user_admin(actor)?;
        self.user_repository.get_user(user_id).await.map(Some)
    }

    /// Returns the target's current system role.
    pub(super) async fn target_role(
        &self,
        actor: &ActorContext,
        user_id: &UserId,
    ) -> AppResult<SystemRole> {
        Ok(self
            .target_user(actor, user_id)
            .await?
            .map_or(actor.system_role(), |target| target.system_role))
    }

    pub(super) async fn require_workspace_admin(&self) -> AppResult<ActorContext> {
        let actor = self.require_admin_panel().await?;
        if !actor.system_role().can_manage_workspaces() {
            return Err(AppError::Forbidden(
                "workspace management requires system_admin or tenant_manager".to_owned(),
            ));
        }

        Ok(actor)
    }
}

pub(super) fn ensure_user_admin(actor: &ActorContext) -> AppResult<()> {
    if actor.system_role().can_manage_users() {
        return Ok(());
    }

    warn!(
        actor_id = %actor.user_id(),
        system_role = %actor.system_role(),
        "user management denied"
    );
    Err(AppError::Forbidden(
        "user management requires system_admin".to_owned(),
    ))
}

/// Logs and converts a refusal into [`AppError::Forbidden`].
pub(super) fn enforce(
    decision: PermissionDecision,
    actor: &ActorContext,
    action: &'static str,
    target: &str,
) -> AppResult<()> {
    if let Some(reason) = decision.reason() {
        warn!(
            actor_id = %actor.user_id(),
            action,
            target,
            reason = %reason,
            "admin action denied"
        );
    }

    decision.into_result()
}
