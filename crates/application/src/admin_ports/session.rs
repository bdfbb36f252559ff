use warden_domain::SystemRole;

/// Signed-in user's system role as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRole {
    /// Current system role; unknown values already resolved to `user`.
    pub system_role: SystemRole,
    /// Whether multi-workspace permission control is switched on.
    pub multi_workspace_permission_enabled: bool,
}

/// Server feature flags relevant to the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// Multi-workspace permission control gate.
    pub multi_workspace_permission_enabled: bool,
}

/// Aggregate counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    /// All accounts.
    pub total_users: u64,
    /// Accounts with status `active`.
    pub active_users: u64,
    /// Accounts with status `banned`.
    pub banned_users: u64,
    /// Workspaces in normal status.
    pub total_workspaces: u64,
}
