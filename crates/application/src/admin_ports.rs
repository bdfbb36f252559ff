mod batch;
mod queries;
mod repositories;
mod session;

pub use batch::{BatchActionReport, BatchItemFailure, BatchUserAction};
pub use queries::{
    AVAILABLE_USERS_MAX_LIMIT, AvailableUserQuery, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MemberPage,
    Page, PageQuery, UserListQuery,
};
pub use repositories::{AdminSessionRepository, AdminUserRepository, AdminWorkspaceRepository};
pub use session::{DashboardStats, FeatureFlags, SessionRole};
