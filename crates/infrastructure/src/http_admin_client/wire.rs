//! JSON shapes of the admin API and their conversion into domain types.
//!
//! Timestamps arrive as numbers, numeric strings or ISO strings depending on
//! the endpoint, so every timestamp field goes through [`lenient_timestamp`].

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use warden_application::{
    BatchActionReport, BatchItemFailure, DashboardStats, FeatureFlags, MemberPage, Page,
    SessionRole,
};
use warden_core::{AppError, AppResult};
use warden_domain::{
    AdminUser, AvailableUser, RoleOption, SystemRole, UserId, UserStatus, UserWorkspace,
    Workspace, WorkspaceId, WorkspaceMember, WorkspaceRole,
};

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Entity that may or may not be wrapped in `{"data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum Wrapped<T> {
    Data { data: T },
    Bare(T),
}

impl<T> Wrapped<T> {
    pub(super) fn into_inner(self) -> T {
        match self {
            Self::Data { data } | Self::Bare(data) => data,
        }
    }
}

/// Parses a timestamp field leniently; unreadable values become `None`.
pub(super) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

pub(super) fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(text) => parse_timestamp_text(text.trim()),
        _ => None,
    }
}

fn parse_timestamp_text(text: &str) -> Option<i64> {
    if text.is_empty() || text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("null")
    {
        return None;
    }

    if let Ok(seconds) = text.parse::<i64>() {
        return Some(seconds);
    }
    if let Ok(float) = text.parse::<f64>() {
        return float.is_finite().then(|| float.trunc() as i64);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp());
    }

    NAIVE_TIMESTAMP_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .map(|parsed| parsed.and_utc().timestamp())
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn workspace_role_from_wire(value: Option<&str>) -> WorkspaceRole {
    value
        .and_then(|value| value.parse().ok())
        .unwrap_or(WorkspaceRole::Normal)
}

fn status_from_wire(value: Option<&str>) -> UserStatus {
    value.map_or(UserStatus::Active, UserStatus::from_wire)
}

#[derive(Debug, Deserialize)]
pub(super) struct SessionWire {
    #[serde(default)]
    system_role: Option<String>,
    #[serde(default)]
    multi_workspace_permission_enabled: bool,
}

impl From<SessionWire> for SessionRole {
    fn from(value: SessionWire) -> Self {
        Self {
            system_role: value
                .system_role
                .as_deref()
                .map_or(SystemRole::User, SystemRole::from_wire),
            multi_workspace_permission_enabled: value.multi_workspace_permission_enabled,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FeatureFlagsWire {
    #[serde(default)]
    multi_workspace_permission_enabled: bool,
}

impl From<FeatureFlagsWire> for FeatureFlags {
    fn from(value: FeatureFlagsWire) -> Self {
        Self {
            multi_workspace_permission_enabled: value.multi_workspace_permission_enabled,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct DashboardWire {
    total_users: u64,
    active_users: u64,
    banned_users: u64,
    total_workspaces: u64,
}

impl From<DashboardWire> for DashboardStats {
    fn from(value: DashboardWire) -> Self {
        Self {
            total_users: value.total_users,
            active_users: value.active_users,
            banned_users: value.banned_users,
            total_workspaces: value.total_workspaces,
        }
    }
}

/// Paginated listing envelope.
#[derive(Debug, Deserialize)]
pub(super) struct ListWire<T> {
    #[serde(default = "Vec::new")]
    pub(super) data: Vec<T>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    has_more: Option<bool>,
}

impl<T> ListWire<T> {
    pub(super) fn into_page<U>(self, page: u32, limit: u32) -> AppResult<Page<U>>
    where
        T: TryInto<U, Error = AppError>,
    {
        let items = self
            .data
            .into_iter()
            .map(TryInto::try_into)
            .collect::<AppResult<Vec<U>>>()?;
        let total = self.total.unwrap_or(items.len() as u64);

        let mut result = Page::new(
            items,
            self.page.unwrap_or(page),
            self.limit.unwrap_or(limit),
            total,
        );
        if let Some(has_more) = self.has_more {
            result.has_more = has_more;
        }

        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserWorkspaceWire {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<i64>,
}

impl From<UserWorkspaceWire> for UserWorkspace {
    fn from(value: UserWorkspaceWire) -> Self {
        Self {
            id: value.id,
            name: value.name,
            role: workspace_role_from_wire(value.role.as_deref()),
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserWire {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    system_role: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    last_login_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    last_active_at: Option<i64>,
    #[serde(default)]
    workspaces: Vec<UserWorkspaceWire>,
}

impl TryFrom<UserWire> for AdminUser {
    type Error = AppError;

    fn try_from(value: UserWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(value.id)?,
            name: value.name,
            email: value.email,
            avatar_url: non_blank(value.avatar_url).or_else(|| non_blank(value.avatar)),
            system_role: value
                .system_role
                .as_deref()
                .map_or(SystemRole::User, SystemRole::from_wire),
            status: status_from_wire(value.status.as_deref()),
            created_at: value.created_at,
            last_login_at: value.last_login_at,
            last_active_at: value.last_active_at,
            workspaces: value.workspaces.into_iter().map(Into::into).collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WorkspaceWire {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    plan: String,
    #[serde(default)]
    status: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<i64>,
    #[serde(default)]
    member_count: u32,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    created_by: Option<String>,
}

impl TryFrom<WorkspaceWire> for Workspace {
    type Error = AppError;

    fn try_from(value: WorkspaceWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WorkspaceId::new(value.id)?,
            name: value.name,
            plan: value.plan,
            status: value.status,
            created_at: value.created_at,
            member_count: value.member_count,
            is_default: value.is_default,
            created_by: non_blank(value.created_by).map(UserId::new).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MemberWire {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    joined_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    last_active_at: Option<i64>,
}

impl TryFrom<MemberWire> for WorkspaceMember {
    type Error = AppError;

    fn try_from(value: MemberWire) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(value.id)?,
            name: value.name,
            email: value.email,
            avatar_url: non_blank(value.avatar_url).or_else(|| non_blank(value.avatar)),
            role: workspace_role_from_wire(value.role.as_deref()),
            status: status_from_wire(value.status.as_deref()),
            joined_at: value.joined_at,
            last_active_at: value.last_active_at,
        })
    }
}

/// Member listing; the workspace arrives as an object or as a bare name.
#[derive(Debug, Deserialize)]
pub(super) struct MemberListWire {
    #[serde(default)]
    data: Vec<MemberWire>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    has_more: Option<bool>,
    #[serde(default)]
    workspace: Option<Value>,
    #[serde(default)]
    workspace_name: Option<String>,
}

impl MemberListWire {
    pub(super) fn into_member_page(self, page: u32, limit: u32) -> AppResult<MemberPage> {
        let from_workspace = self.workspace.as_ref().and_then(|workspace| match workspace {
            Value::String(name) => Some(name.clone()),
            Value::Object(object) => object
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        });
        let list = ListWire {
            data: self.data,
            page: self.page,
            limit: self.limit,
            total: self.total,
            has_more: self.has_more,
        };

        Ok(MemberPage {
            workspace_name: non_blank(self.workspace_name).or_else(|| non_blank(from_workspace)),
            members: list.into_page(page, limit)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AvailableUserWire {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

impl TryFrom<AvailableUserWire> for AvailableUser {
    type Error = AppError;

    fn try_from(value: AvailableUserWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(value.id)?,
            name: value.name,
            email: value.email,
            avatar_url: non_blank(value.avatar_url).or_else(|| non_blank(value.avatar)),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedWire {
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct BatchErrorWire {
    id: String,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct BatchReportWire {
    processed: u32,
    failed: u32,
    errors: Vec<BatchErrorWire>,
}

impl TryFrom<BatchReportWire> for BatchActionReport {
    type Error = AppError;

    fn try_from(value: BatchReportWire) -> Result<Self, Self::Error> {
        let errors = value
            .errors
            .into_iter()
            .map(|failure| {
                Ok(BatchItemFailure {
                    user_id: UserId::new(failure.id)?,
                    error: failure.error,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            processed: value.processed,
            failed: value.failed,
            errors,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RoleOptionWire {
    value: String,
}

/// Role options answered as `{"roles": [...]}` or `{"data": [...]}`.
///
/// The server decides which values are offered; labels come from the local
/// lookup and unknown values are dropped.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RoleOptionsWire {
    roles: Option<Vec<RoleOptionWire>>,
    data: Option<Vec<RoleOptionWire>>,
}

impl RoleOptionsWire {
    fn values(self) -> Vec<String> {
        self.roles
            .or(self.data)
            .unwrap_or_default()
            .into_iter()
            .map(|option| option.value)
            .collect()
    }

    pub(super) fn system_roles(self) -> Vec<RoleOption<SystemRole>> {
        let mut roles: Vec<SystemRole> = Vec::new();
        for role in self.values().iter().filter_map(|value| SystemRole::resolve(value)) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        roles
            .into_iter()
            .map(|role| RoleOption {
                value: role,
                label: role.label(),
                description: role.tip(),
            })
            .collect()
    }

    pub(super) fn workspace_roles(self) -> Vec<RoleOption<WorkspaceRole>> {
        let mut roles: Vec<WorkspaceRole> = Vec::new();
        for role in self
            .values()
            .iter()
            .filter_map(|value| value.parse::<WorkspaceRole>().ok())
        {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        roles
            .into_iter()
            .map(|role| RoleOption {
                value: role,
                label: role.label(),
                description: role.tip(),
            })
            .collect()
    }
}
