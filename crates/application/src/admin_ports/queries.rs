use warden_domain::{SystemRole, UserStatus, WorkspaceMember};

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page size the admin API accepts.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Largest result size of the available-users lookup.
pub const AVAILABLE_USERS_MAX_LIMIT: u32 = 50;

const SEARCH_MAX_CHARS: usize = 100;

fn normalize_search(search: Option<String>) -> Option<String> {
    search
        .map(|value| value.trim().chars().take(SEARCH_MAX_CHARS).collect::<String>())
        .filter(|value| !value.is_empty())
}

/// Pagination and search for workspace and member listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// One-based page number.
    pub page: u32,
    /// Rows per page.
    pub limit: u32,
    /// Optional name search.
    pub search: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            search: None,
        }
    }
}

impl PageQuery {
    /// Returns a copy pulled into the ranges the API accepts.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
            search: normalize_search(self.search),
        }
    }
}

/// Filters and pagination for the user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    /// One-based page number.
    pub page: u32,
    /// Rows per page.
    pub limit: u32,
    /// Optional name or email search.
    pub search: Option<String>,
    /// Optional system role filter.
    pub system_role: Option<SystemRole>,
    /// Optional status filter.
    pub status: Option<UserStatus>,
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            search: None,
            system_role: None,
            status: None,
        }
    }
}

impl UserListQuery {
    /// Returns a copy pulled into the ranges the API accepts.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
            search: normalize_search(self.search),
            ..self
        }
    }
}

/// Search for accounts that can join a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUserQuery {
    /// Optional name or email search.
    pub search: Option<String>,
    /// Maximum rows returned.
    pub limit: u32,
}

impl Default for AvailableUserQuery {
    fn default() -> Self {
        Self {
            search: None,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl AvailableUserQuery {
    /// Returns a copy pulled into the ranges the API accepts.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            search: normalize_search(self.search),
            limit: self.limit.clamp(1, AVAILABLE_USERS_MAX_LIMIT),
        }
    }
}

/// One page of a server-side paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Total rows across all pages.
    pub total: u64,
    /// Whether a later page exists.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Builds a page, deriving `has_more` from the totals.
    #[must_use]
    pub fn new(items: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        Self {
            items,
            page,
            limit,
            total,
            has_more: u64::from(page) * u64::from(limit) < total,
        }
    }
}

/// One page of a workspace member listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPage {
    /// Workspace name, when returned by the server.
    pub workspace_name: Option<String>,
    /// Member rows.
    pub members: Page<WorkspaceMember>,
}
