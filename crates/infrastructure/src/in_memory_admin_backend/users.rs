use super::*;

impl InMemoryAdminBackend {
    pub(super) async fn insert_user(
        &self,
        user_id: UserId,
        name: &str,
        email: &str,
        system_role: SystemRole,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;

        if state.users.iter().any(|user| user.id == user_id) {
            return Err(AppError::Conflict(format!("user '{user_id}' already exists")));
        }
        if state
            .users
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(email))
        {
            return Err(AppError::Conflict(format!(
                "email '{email}' is already registered"
            )));
        }

        state.users.push(AdminUser {
            id: user_id,
            name: name.to_owned(),
            email: email.to_owned(),
            avatar_url: None,
            system_role,
            status: UserStatus::Active,
            created_at: Some(Self::now()),
            last_login_at: None,
            last_active_at: None,
            workspaces: Vec::new(),
        });

        Ok(())
    }

    pub(super) async fn list_users_impl(
        &self,
        query: &UserListQuery,
    ) -> AppResult<Page<AdminUser>> {
        let state = self.state.read().await;

        let matching: Vec<AdminUser> = state
            .users
            .iter()
            .filter(|user| {
                query.search.as_deref().is_none_or(|search| {
                    contains_ignore_case(&user.name, search)
                        || contains_ignore_case(&user.email, search)
                })
            })
            .filter(|user| query.system_role.is_none_or(|role| user.system_role == role))
            .filter(|user| query.status.is_none_or(|status| user.status == status))
            .cloned()
            .collect();

        Ok(paginate(&matching, query.page, query.limit))
    }

    pub(super) async fn get_user_impl(&self, user_id: &UserId) -> AppResult<AdminUser> {
        let state = self.state.read().await;
        let mut user = state
            .users
            .iter()
            .find(|user| &user.id == user_id)
            .cloned()
            .ok_or_else(user_not_found)?;

        user.workspaces = state
            .workspaces
            .iter()
            .filter_map(|workspace| {
                let membership = state
                    .memberships
                    .get(&workspace.id)?
                    .iter()
                    .find(|membership| &membership.user_id == user_id)?;

                Some(UserWorkspace {
                    id: workspace.id.as_str().to_owned(),
                    name: workspace.name.clone(),
                    role: membership.role,
                    created_at: Some(membership.joined_at),
                })
            })
            .collect();

        Ok(user)
    }

    pub(super) async fn update_user_impl<F>(&self, user_id: &UserId, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut AdminUser) + Send,
    {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|user| &user.id == user_id)
            .ok_or_else(user_not_found)?;

        apply(user);
        Ok(())
    }

    pub(super) async fn delete_user_impl(&self, user_id: &UserId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|user| &user.id == user_id) {
            return Err(user_not_found());
        }

        let sole_owner = state.memberships.values().any(|memberships| {
            owner_count(memberships) <= 1
                && memberships.iter().any(|membership| {
                    &membership.user_id == user_id && membership.role == WorkspaceRole::Owner
                })
        });
        if sole_owner {
            return Err(AppError::Validation(
                "cannot modify last owner".to_owned(),
            ));
        }

        state.users.retain(|user| &user.id != user_id);

        for memberships in state.memberships.values_mut() {
            memberships.retain(|membership| &membership.user_id != user_id);
        }

        Ok(())
    }

    pub(super) async fn batch_user_action_impl(
        &self,
        user_ids: &[UserId],
        action: BatchUserAction,
    ) -> AppResult<BatchActionReport> {
        let mut report = BatchActionReport::default();

        for user_id in user_ids {
            let result = match action.target_status() {
                Some(status) => {
                    self.update_user_impl(user_id, |user| user.status = status)
                        .await
                }
                None => self.delete_user_impl(user_id).await,
            };

            match result {
                Ok(()) => report.processed += 1,
                Err(error) => {
                    report.failed += 1;
                    report.errors.push(BatchItemFailure {
                        user_id: user_id.clone(),
                        error: error.message().to_owned(),
                    });
                }
            }
        }

        Ok(report)
    }
}
