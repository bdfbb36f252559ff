//! Role and status model.
//!
//! Server data may still carry the role names used before the rename
//! migration (`super_admin`, `workspace_admin`, `normal`). Every lookup goes
//! through [`SystemRole::legacy_name`] and [`SystemRole::as_str`], so both
//! spellings resolve to the same canonical role, label and badge tone.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::AppError;

/// Badge color family used when rendering roles and statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    /// Highest privilege or destructive state.
    Red,
    /// Elevated but scoped privilege.
    BlueLight,
    /// Workspace ownership.
    Violet,
    /// Healthy or editing state.
    Green,
    /// Pending or restricted state.
    Warning,
    /// Default, unknown or inactive.
    Gray,
}

/// Selectable role entry shown in role pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleOption<R> {
    /// Role value submitted on selection.
    pub value: R,
    /// Display label.
    pub label: &'static str,
    /// One-line description of the role's reach.
    pub description: &'static str,
}

/// Platform-wide privilege level, independent of any workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Full system access: every workspace and every user.
    #[serde(alias = "super_admin")]
    SystemAdmin,
    /// Can reach the admin panel and manage workspaces.
    #[serde(alias = "workspace_admin")]
    TenantManager,
    /// Default role, limited to joined workspaces.
    #[serde(alias = "normal")]
    User,
}

impl SystemRole {
    /// Returns all system roles, most privileged first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemRole] = &[
            SystemRole::SystemAdmin,
            SystemRole::TenantManager,
            SystemRole::User,
        ];

        ALL
    }

    /// Returns the canonical wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "system_admin",
            Self::TenantManager => "tenant_manager",
            Self::User => "user",
        }
    }

    /// Returns the pre-rename wire value still found in historical data.
    #[must_use]
    pub fn legacy_name(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "super_admin",
            Self::TenantManager => "workspace_admin",
            Self::User => "normal",
        }
    }

    /// Resolves a canonical or legacy wire value.
    #[must_use]
    pub fn resolve(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value || role.legacy_name() == value)
    }

    /// Resolves server data, treating unrecognized values as [`SystemRole::User`].
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        Self::resolve(value).unwrap_or(Self::User)
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "System Admin",
            Self::TenantManager => "Tenant Manager",
            Self::User => "User",
        }
    }

    /// Returns the role tooltip text.
    #[must_use]
    pub fn tip(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "Full system access, can manage all workspaces and users",
            Self::TenantManager => "Can access the admin panel and manage workspaces",
            Self::User => "Standard user with no special system permissions",
        }
    }

    /// Returns the badge tone.
    #[must_use]
    pub fn tone(&self) -> BadgeTone {
        match self {
            Self::SystemAdmin => BadgeTone::Red,
            Self::TenantManager => BadgeTone::BlueLight,
            Self::User => BadgeTone::Gray,
        }
    }

    /// Returns whether the role is the highest privilege level.
    #[must_use]
    pub fn is_system_admin(&self) -> bool {
        matches!(self, Self::SystemAdmin)
    }

    /// Returns whether the role can open the admin panel at all.
    #[must_use]
    pub fn can_access_admin_panel(&self) -> bool {
        matches!(self, Self::SystemAdmin | Self::TenantManager)
    }

    /// Returns whether the role can list, create and modify user accounts.
    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        self.is_system_admin()
    }

    /// Returns whether the role can view the admin dashboard.
    #[must_use]
    pub fn can_view_dashboard(&self) -> bool {
        self.is_system_admin()
    }

    /// Returns whether the role can create workspaces.
    #[must_use]
    pub fn can_create_workspace(&self) -> bool {
        self.can_access_admin_panel()
    }

    /// Returns whether the role can manage workspaces and their members.
    #[must_use]
    pub fn can_manage_workspaces(&self) -> bool {
        self.can_access_admin_panel()
    }

    /// Returns whether the role sees every workspace, joined or not.
    #[must_use]
    pub fn can_access_all_workspaces(&self) -> bool {
        self.is_system_admin()
    }

    /// Returns whether the role can assign members to workspaces it has not joined.
    #[must_use]
    pub fn can_assign_members(&self) -> bool {
        self.is_system_admin()
    }

    /// Returns the option list offered by system role pickers.
    #[must_use]
    pub fn options() -> Vec<RoleOption<Self>> {
        Self::all()
            .iter()
            .map(|role| RoleOption {
                value: *role,
                label: role.label(),
                description: role.tip(),
            })
            .collect()
    }
}

impl FromStr for SystemRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::resolve(value).ok_or_else(|| {
            AppError::Validation(format!("unknown system role '{value}'"))
        })
    }
}

impl std::fmt::Display for SystemRole {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Returns the label for any raw system role value, falling back to "User".
#[must_use]
pub fn system_role_label(value: &str) -> &'static str {
    SystemRole::from_wire(value).label()
}

/// Returns the badge tone for any raw system role value.
#[must_use]
pub fn system_role_tone(value: &str) -> BadgeTone {
    SystemRole::from_wire(value).tone()
}

/// Privilege level scoped to a single workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceRole {
    /// Owns the workspace; at least one must always exist.
    Owner,
    /// Manages members and settings.
    Admin,
    /// Builds and edits apps.
    Editor,
    /// Uses published apps.
    Normal,
    /// Manages datasets only.
    DatasetOperator,
}

impl WorkspaceRole {
    /// Returns all workspace roles, most privileged first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[WorkspaceRole] = &[
            WorkspaceRole::Owner,
            WorkspaceRole::Admin,
            WorkspaceRole::Editor,
            WorkspaceRole::Normal,
            WorkspaceRole::DatasetOperator,
        ];

        ALL
    }

    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Normal => "normal",
            Self::DatasetOperator => "dataset_operator",
        }
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Editor => "Editor",
            Self::Normal => "Normal",
            Self::DatasetOperator => "Dataset Operator",
        }
    }

    /// Returns the role tooltip text.
    #[must_use]
    pub fn tip(&self) -> &'static str {
        match self {
            Self::Owner => "Full control of the workspace, including members and billing",
            Self::Admin => "Manages members, apps and workspace settings",
            Self::Editor => "Creates and edits apps and knowledge",
            Self::Normal => "Uses the apps published in the workspace",
            Self::DatasetOperator => "Manages datasets without app access",
        }
    }

    /// Returns the badge tone.
    #[must_use]
    pub fn tone(&self) -> BadgeTone {
        match self {
            Self::Owner => BadgeTone::Violet,
            Self::Admin => BadgeTone::BlueLight,
            Self::Editor => BadgeTone::Green,
            Self::Normal => BadgeTone::Gray,
            Self::DatasetOperator => BadgeTone::Warning,
        }
    }

    /// Returns the option list offered by workspace role pickers.
    #[must_use]
    pub fn options() -> Vec<RoleOption<Self>> {
        Self::all()
            .iter()
            .map(|role| RoleOption {
                value: *role,
                label: role.label(),
                description: role.tip(),
            })
            .collect()
    }
}

impl FromStr for WorkspaceRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown workspace role '{value}'")))
    }
}

impl std::fmt::Display for WorkspaceRole {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Returns the label for a raw workspace role value, or the value itself.
#[must_use]
pub fn workspace_role_label(value: &str) -> &str {
    value
        .parse::<WorkspaceRole>()
        .map(|role| role.label())
        .unwrap_or(value)
}

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account can sign in.
    Active,
    /// Invited or unverified account.
    Pending,
    /// Disabled by an administrator.
    Banned,
    /// Closed by the account holder.
    Closed,
}

impl UserStatus {
    /// Returns all statuses.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[UserStatus] = &[
            UserStatus::Active,
            UserStatus::Pending,
            UserStatus::Banned,
            UserStatus::Closed,
        ];

        ALL
    }

    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Banned => "banned",
            Self::Closed => "closed",
        }
    }

    /// Resolves server data, treating unrecognized values as [`UserStatus::Closed`].
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or(Self::Closed)
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pending => "Pending",
            Self::Banned => "Banned",
            Self::Closed => "Closed",
        }
    }

    /// Returns the badge tone.
    #[must_use]
    pub fn tone(&self) -> BadgeTone {
        match self {
            Self::Active => BadgeTone::Green,
            Self::Pending => BadgeTone::Warning,
            Self::Banned => BadgeTone::Red,
            Self::Closed => BadgeTone::Gray,
        }
    }

    /// Returns whether an administrator may set this status directly.
    #[must_use]
    pub fn is_admin_settable(&self) -> bool {
        matches!(self, Self::Active | Self::Banned)
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown user status '{value}'")))
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Returns the label for a raw status value, or the value itself.
#[must_use]
pub fn status_label(value: &str) -> &str {
    value
        .parse::<UserStatus>()
        .map(|status| status.label())
        .unwrap_or(value)
}
