use warden_domain::{DenialReason, PermissionEvaluator};

use super::access::{enforce, ensure_user_admin};
use super::*;

impl AdminConsoleService {
    /// Lists users with filters and pagination.
    pub async fn list_users(&self, query: UserListQuery) -> AppResult<Page<AdminUser>> {
        self.require_user_admin().await?;
        self.user_repository.list_users(&query.normalized()).await
    }

    /// Returns one user with joined workspaces.
    pub async fn get_user(&self, user_id: &UserId) -> AppResult<AdminUser> {
        self.require_user_admin().await?;
        self.user_repository.get_user(user_id).await
    }

    /// Lists the system roles offered by the server.
    pub async fn system_role_options(&self) -> AppResult<Vec<RoleOption<SystemRole>>> {
        self.require_user_admin().await?;
        self.user_repository.list_system_roles().await
    }

    /// Returns each offered role with the reason it is unavailable for `user_id`.
    pub async fn role_choices(
        &self,
        user_id: &UserId,
    ) -> AppResult<Vec<(RoleOption<SystemRole>, Option<DenialReason>)>> {
        let actor = self.require_user_admin().await?;
        let target = self.user_repository.get_user(user_id).await?;
        let options = self.user_repository.list_system_roles().await?;
        let evaluator = actor.evaluator();

        Ok(options
            .into_iter()
            .map(|option| {
                let disabled = evaluator.role_option_disabled_reason(
                    &target.id,
                    target.system_role,
                    option.value,
                );
                (option, disabled)
            })
            .collect())
    }

    /// Creates an account from validated input.
    pub async fn create_user(&self, user: NewUser) -> AppResult<MutationOutcome<UserId>> {
        let actor = self.require_user_admin().await?;
        let user_id = self.user_repository.create_user(&user).await?;

        info!(
            actor_id = %actor.user_id(),
            user_id = %user_id,
            system_role = %user.system_role(),
            "user created"
        );

        Ok(MutationOutcome::new(user_id, vec![CacheScope::UserList]))
    }

    /// Changes a user's system role after the permission check.
    pub async fn change_user_role(
        &self,
        user_id: &UserId,
        role: SystemRole,
    ) -> AppResult<MutationOutcome<()>> {
        let actor = self.require_admin_panel().await?;
        let target_role = self.target_role(&actor, user_id).await?;

        enforce(
            actor
                .evaluator()
                .can_change_role(user_id, target_role, role),
            &actor,
            "change_user_role",
            user_id.as_str(),
        )?;
        ensure_user_admin(&actor)?;

        self.user_repository.update_user_role(user_id, role).await?;
        info!(
            actor_id = %actor.user_id(),
            user_id = %user_id,
            from = %target_role,
            to = %role,
            "user role changed"
        );

        Ok(MutationOutcome::new((), user_written(user_id)))
    }

    /// Enables or bans a user after the permission check.
    pub async fn change_user_status(
        &self,
        user_id: &UserId,
        status: UserStatus,
    ) -> AppResult<MutationOutcome<()>> {
        if !status.is_admin_settable() {
            return Err(AppError::Validation(format!(
                "status must be 'active' or 'banned', got '{status}'"
            )));
        }

        let actor = self.require_admin_panel().await?;
        let target_role = self.target_role(&actor, user_id).await?;

        enforce(
            actor
                .evaluator()
                .can_change_status(user_id, target_role, status),
            &actor,
            "change_user_status",
            user_id.as_str(),
        )?;
        ensure_user_admin(&actor)?;

        self.user_repository
            .update_user_status(user_id, status)
            .await?;
        info!(
            actor_id = %actor.user_id(),
            user_id = %user_id,
            status = %status,
            "user status changed"
        );

        Ok(MutationOutcome::new((), user_written(user_id)))
    }

    /// Deletes a user after the permission check. Sole owners of a workspace
    /// cannot be deleted.
    pub async fn delete_user(&self, user_id: &UserId) -> AppResult<MutationOutcome<()>> {
        let actor = self.require_admin_panel().await?;
        let target = self.target_user(&actor, user_id).await?;
        let target_role = target
            .as_ref()
            .map_or(actor.system_role(), |target| target.system_role);

        enforce(
            actor.evaluator().can_delete_user(user_id, target_role),
            &actor,
            "delete_user",
            user_id.as_str(),
        )?;
        ensure_user_admin(&actor)?;
        if let Some(target) = &target {
            enforce(
                self.owner_floor_on_delete(target, &mut Vec::new()).await?,
                &actor,
                "delete_user",
                user_id.as_str(),
            )?;
        }

        self.user_repository.delete_user(user_id).await?;
        info!(actor_id = %actor.user_id(), user_id = %user_id, "user deleted");

        Ok(MutationOutcome::new((), user_written(user_id)))
    }

    /// Applies a batch action to the selectable subset of `user_ids`.
    ///
    /// Ids the evaluator rejects, or that no longer exist, are reported as
    /// failures without being sent. Failed ids are retried only by submitting
    /// a new batch.
    pub async fn batch_user_action(
        &self,
        user_ids: &[UserId],
        action: BatchUserAction,
    ) -> AppResult<MutationOutcome<BatchActionReport>> {
        if user_ids.is_empty() {
            return Err(AppError::Validation(
                "select at least one user".to_owned(),
            ));
        }

        let actor = self.require_user_admin().await?;
        let evaluator = actor.evaluator();

        let mut unique: Vec<&UserId> = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            if !unique.contains(&user_id) {
                unique.push(user_id);
            }
        }

        let mut eligible = Vec::new();
        let mut rejected = Vec::new();
        let mut leaving = Vec::new();
        for user_id in unique {
            match self.user_repository.get_user(user_id).await {
                Ok(target) if evaluator.is_selectable(&target.id, target.system_role) => {
                    let floor = if action == BatchUserAction::Delete {
                        self.owner_floor_on_delete(&target, &mut leaving).await?
                    } else {
                        PermissionDecision::Allowed
                    };

                    match floor.reason() {
                        Some(reason) => rejected.push(BatchItemFailure {
                            user_id: user_id.clone(),
                            error: reason.as_str().to_owned(),
                        }),
                        None => eligible.push(user_id.clone()),
                    }
                }
                Ok(target) => rejected.push(BatchItemFailure {
                    user_id: user_id.clone(),
                    error: batch_rejection(&evaluator, &target, action),
                }),
                Err(AppError::NotFound(message)) => rejected.push(BatchItemFailure {
                    user_id: user_id.clone(),
                    error: message,
                }),
                Err(error) => return Err(error),
            }
        }

        if eligible.is_empty() {
            warn!(
                actor_id = %actor.user_id(),
                action = %action,
                rejected = rejected.len(),
                "batch action has no eligible users"
            );
            return Err(AppError::Forbidden(format!(
                "no selected user is eligible for batch {action}"
            )));
        }

        let mut report = self
            .user_repository
            .batch_user_action(&eligible, action)
            .await?;
        report.record_rejected(rejected);

        info!(
            actor_id = %actor.user_id(),
            action = %action,
            processed = report.processed,
            failed = report.failed,
            "batch action applied"
        );

        Ok(MutationOutcome::new(report, vec![CacheScope::UserList]))
    }
}

fn batch_rejection(
    evaluator: &PermissionEvaluator<'_>,
    target: &AdminUser,
    action: BatchUserAction,
) -> String {
    let decision = match action.target_status() {
        Some(UserStatus::Banned) => {
            evaluator.can_change_status(&target.id, target.system_role, UserStatus::Banned)
        }
        Some(_) => PermissionDecision::Allowed,
        None => evaluator.can_delete_user(&target.id, target.system_role),
    };

    decision.reason().map_or_else(
        || "not selectable for batch actions".to_owned(),
        |reason| reason.as_str().to_owned(),
    )
}
