//! Application services and ports.

#![forbid(unsafe_code)]

mod admin_console_service;
mod admin_ports;
mod mutation;
mod retry_jitter;
mod search_debouncer;

pub use admin_console_service::{AdminConsoleService, FEATURE_DISABLED_MESSAGE};
pub use admin_ports::{
    AVAILABLE_USERS_MAX_LIMIT, AdminSessionRepository, AdminUserRepository,
    AdminWorkspaceRepository, AvailableUserQuery, BatchActionReport, BatchItemFailure,
    BatchUserAction, DEFAULT_PAGE_LIMIT, DashboardStats, FeatureFlags, MAX_PAGE_LIMIT, MemberPage,
    Page, PageQuery, SessionRole, UserListQuery,
};
pub use mutation::{CacheScope, MutationOutcome};
pub use retry_jitter::{jittered_wait, sample_jitter};
pub use search_debouncer::{SEARCH_DEBOUNCE, SearchDebouncer};
