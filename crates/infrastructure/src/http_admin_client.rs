use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use warden_application::{
    AdminSessionRepository, AdminUserRepository, AdminWorkspaceRepository, AvailableUserQuery,
    BatchActionReport, BatchUserAction, DashboardStats, FeatureFlags, MemberPage, Page, PageQuery,
    SessionRole, UserListQuery,
};
use warden_core::{AccessToken, AppError, AppResult};
use warden_domain::{
    AdminUser, AvailableUser, NewUser, RoleOption, SystemRole, UserId, UserStatus, Workspace,
    WorkspaceId, WorkspaceName, WorkspaceRole,
};

mod wire;

use wire::{
    AvailableUserWire, BatchReportWire, CreatedWire, DashboardWire, FeatureFlagsWire, ListWire,
    MemberListWire, RoleOptionsWire, SessionWire, UserWire, Wrapped, WorkspaceWire,
};

/// Admin API adapter over HTTP with bearer authentication.
///
/// Each call is sent once. Transport failures surface as
/// [`AppError::Internal`] and the caller decides whether to re-invoke.
pub struct HttpAdminClient {
    http_client: reqwest::Client,
    base_url: Url,
    access_token: AccessToken,
}

impl HttpAdminClient {
    /// Creates a client rooted at `base_url`, e.g. `https://host/console/api`.
    pub fn new(base_url: Url, access_token: AccessToken, timeout: Duration) -> AppResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "admin API base URL '{base_url}' cannot carry a path"
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            base_url,
            access_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!("admin API base URL '{}' has no path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> AppResult<String> {
        debug!(method = %method, path = url.path(), "admin API request");

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                self.access_token.bearer_header(),
            );
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|error| {
            AppError::Internal(format!("admin API request {method} {} failed: {error}", url.path()))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|error| {
            AppError::Internal(format!("failed to read admin API response: {error}"))
        });

        if status.is_success() {
            return text;
        }

        warn!(method = %method, path = url.path(), status = %status, "admin API call failed");
        Err(map_status_error(status, text.as_deref().unwrap_or_default()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        let text = self.send(Method::GET, url, None).await?;
        decode(&text)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &Value,
    ) -> AppResult<T> {
        let text = self.send(method, url, Some(body)).await?;
        decode(&text)
    }

    async fn send_ack(&self, method: Method, url: Url, body: Option<&Value>) -> AppResult<()> {
        self.send(method, url, body).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> AppResult<T> {
    serde_json::from_str(text)
        .map_err(|error| AppError::Internal(format!("unexpected admin API response: {error}")))
}

/// Maps a non-success status and its body to the matching error kind.
pub(crate) fn map_status_error(status: StatusCode, body: &str) -> AppError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("admin API error")
            .to_owned()
    });

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Internal(format!("admin API returned {status}: {message}")),
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_owned)
}

fn append_page_query(url: &mut Url, page: u32, limit: u32, search: Option<&str>) {
    let mut pairs = url.query_pairs_mut();
    pairs
        .append_pair("page", &page.to_string())
        .append_pair("limit", &limit.to_string());
    if let Some(search) = search {
        pairs.append_pair("search", search);
    }
}

#[async_trait]
impl AdminSessionRepository for HttpAdminClient {
    async fn current_session(&self) -> AppResult<SessionRole> {
        let url = self.endpoint(&["custom", "me", "system-role"])?;
        let session: SessionWire = self.get_json(url).await?;
        Ok(session.into())
    }

    async fn feature_flags(&self) -> AppResult<FeatureFlags> {
        let url = self.endpoint(&["custom", "feature-flags"])?;
        let flags: FeatureFlagsWire = self.get_json(url).await?;
        Ok(flags.into())
    }

    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let url = self.endpoint(&["custom", "admin", "dashboard"])?;
        let stats: Wrapped<DashboardWire> = self.get_json(url).await?;
        Ok(stats.into_inner().into())
    }
}

#[async_trait]
impl AdminUserRepository for HttpAdminClient {
    async fn list_users(&self, query: &UserListQuery) -> AppResult<Page<AdminUser>> {
        let mut url = self.endpoint(&["custom", "admin", "users"])?;
        append_page_query(&mut url, query.page, query.limit, query.search.as_deref());
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(role) = query.system_role {
                pairs.append_pair("system_role", role.as_str());
            }
            if let Some(status) = query.status {
                pairs.append_pair("status", status.as_str());
            }
        }

        let list: ListWire<UserWire> = self.get_json(url).await?;
        list.into_page(query.page, query.limit)
    }

    async fn get_user(&self, user_id: &UserId) -> AppResult<AdminUser> {
        let url = self.endpoint(&["custom", "admin", "users", user_id.as_str()])?;
        let user: Wrapped<UserWire> = self.get_json(url).await?;
        user.into_inner().try_into()
    }

    async fn create_user(&self, user: &NewUser) -> AppResult<UserId> {
        let url = self.endpoint(&["custom", "admin", "users"])?;
        let body = serde_json::json!({
            "name": user.name(),
            "email": user.email(),
            "password": user.password(),
            "system_role": user.system_role().as_str(),
        });

        let created: Wrapped<CreatedWire> = self.send_json(Method::POST, url, &body).await?;
        UserId::new(created.into_inner().id)
    }

    async fn update_user_role(&self, user_id: &UserId, role: SystemRole) -> AppResult<()> {
        let url = self.endpoint(&["custom", "admin", "users", user_id.as_str(), "role"])?;
        let body = serde_json::json!({ "system_role": role.as_str() });
        self.send_ack(Method::PUT, url, Some(&body)).await
    }

    async fn update_user_status(&self, user_id: &UserId, status: UserStatus) -> AppResult<()> {
        let url = self.endpoint(&["custom", "admin", "users", user_id.as_str(), "status"])?;
        let body = serde_json::json!({ "status": status.as_str() });
        self.send_ack(Method::PUT, url, Some(&body)).await
    }

    async fn delete_user(&self, user_id: &UserId) -> AppResult<()> {
        let url = self.endpoint(&["custom", "admin", "users", user_id.as_str()])?;
        self.send_ack(Method::DELETE, url, None).await
    }

    async fn batch_user_action(
        &self,
        user_ids: &[UserId],
        action: BatchUserAction,
    ) -> AppResult<BatchActionReport> {
        let url = self.endpoint(&["custom", "admin", "users", "batch"])?;
        let body = serde_json::json!({
            "user_ids": user_ids.iter().map(UserId::as_str).collect::<Vec<_>>(),
            "action": action.as_str(),
        });

        let report: Wrapped<BatchReportWire> = self.send_json(Method::POST, url, &body).await?;
        report.into_inner().try_into()
    }

    async fn list_system_roles(&self) -> AppResult<Vec<RoleOption<SystemRole>>> {
        let url = self.endpoint(&["custom", "admin", "system-roles"])?;
        let options: RoleOptionsWire = self.get_json(url).await?;
        Ok(options.system_roles())
    }
}

#[async_trait]
impl AdminWorkspaceRepository for HttpAdminClient {
    async fn list_workspaces(&self, query: &PageQuery) -> AppResult<Page<Workspace>> {
        let mut url = self.endpoint(&["custom", "admin", "workspaces"])?;
        append_page_query(&mut url, query.page, query.limit, query.search.as_deref());

        let list: ListWire<WorkspaceWire> = self.get_json(url).await?;
        list.into_page(query.page, query.limit)
    }

    async fn create_workspace(&self, name: &WorkspaceName) -> AppResult<WorkspaceId> {
        let url = self.endpoint(&["custom", "admin", "workspaces"])?;
        let body = serde_json::json!({ "name": name.as_str() });

        let created: Wrapped<CreatedWire> = self.send_json(Method::POST, url, &body).await?;
        WorkspaceId::new(created.into_inner().id)
    }

    async fn delete_workspace(&self, workspace_id: &WorkspaceId) -> AppResult<()> {
        let url = self.endpoint(&["custom", "admin", "workspaces", workspace_id.as_str()])?;
        self.send_ack(Method::DELETE, url, None).await
    }

    async fn list_members(
        &self,
        workspace_id: &WorkspaceId,
        query: &PageQuery,
    ) -> AppResult<MemberPage> {
        let mut url = self.endpoint(&[
            "custom",
            "admin",
            "workspaces",
            workspace_id.as_str(),
            "members",
        ])?;
        append_page_query(&mut url, query.page, query.limit, query.search.as_deref());

        let list: MemberListWire = self.get_json(url).await?;
        list.into_member_page(query.page, query.limit)
    }

    async fn add_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        let url = self.endpoint(&[
            "custom",
            "admin",
            "workspaces",
            workspace_id.as_str(),
            "members",
        ])?;
        let body = serde_json::json!({ "user_id": user_id.as_str(), "role": role.as_str() });
        self.send_ack(Method::POST, url, Some(&body)).await
    }

    async fn update_member_role(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        role: WorkspaceRole,
    ) -> AppResult<()> {
        let url = self.endpoint(&[
            "custom",
            "admin",
            "workspaces",
            workspace_id.as_str(),
            "members",
            user_id.as_str(),
        ])?;
        let body = serde_json::json!({ "role": role.as_str() });
        self.send_ack(Method::PUT, url, Some(&body)).await
    }

    async fn remove_member(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> AppResult<()> {
        let url = self.endpoint(&[
            "custom",
            "admin",
            "workspaces",
            workspace_id.as_str(),
            "members",
            user_id.as_str(),
        ])?;
        self.send_ack(Method::DELETE, url, None).await
    }

    async fn available_users(
        &self,
        workspace_id: &WorkspaceId,
        query: &AvailableUserQuery,
    ) -> AppResult<Vec<AvailableUser>> {
        let mut url = self.endpoint(&[
            "custom",
            "admin",
            "workspaces",
            workspace_id.as_str(),
            "available-users",
        ])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            if let Some(search) = query.search.as_deref() {
                pairs.append_pair("search", search);
            }
        }

        let list: ListWire<AvailableUserWire> = self.get_json(url).await?;
        list.data.into_iter().map(AvailableUser::try_from).collect()
    }

    async fn list_workspace_roles(&self) -> AppResult<Vec<RoleOption<WorkspaceRole>>> {
        let url = self.endpoint(&["custom", "admin", "workspace-roles"])?;
        let options: RoleOptionsWire = self.get_json(url).await?;
        Ok(options.workspace_roles())
    }
}

#[cfg(test)]
mod tests;
