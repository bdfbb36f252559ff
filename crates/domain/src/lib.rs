//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod period;
mod permission;
mod retry;
mod role;
mod timestamp;
mod user;
mod workspace;

pub use period::{DateTimeRange, RANGE_QUERY_FORMAT, TimePeriod};
pub use permission::{
    ActorContext, DenialReason, PermissionDecision, PermissionEvaluator, can_delete_workspace,
    can_modify_membership, membership_controls,
};
pub use retry::{BackoffStrategy, MIN_JITTER_FLOOR_MS, RetryConfig};
pub use role::{
    BadgeTone, RoleOption, SystemRole, UserStatus, WorkspaceRole, status_label, system_role_label,
    system_role_tone, workspace_role_label,
};
pub use timestamp::{
    DateInput, DisplayTimezone, EMPTY_DATE, MILLISECOND_THRESHOLD, format_date, format_date_time,
    resolve_date,
};
pub use user::{
    AdminUser, EmailAddress, NewUser, PASSWORD_MIN_LENGTH, UserId, UserWorkspace,
    validate_password,
};
pub use workspace::{AvailableUser, MemberRoster, Workspace, WorkspaceId, WorkspaceMember, WorkspaceName};
