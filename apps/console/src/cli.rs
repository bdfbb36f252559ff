//! Command-line surface of the console.

use clap::{Args, Parser, Subcommand};

use warden_application::{BatchUserAction, DEFAULT_PAGE_LIMIT, PageQuery, UserListQuery};
use warden_core::{AppError, AppResult};
use warden_domain::{SystemRole, TimePeriod, UserId, UserStatus, WorkspaceId, WorkspaceRole};

#[derive(Parser, Debug)]
#[command(name = "warden-console")]
#[command(about = "Warden multi-workspace admin console")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the signed-in actor and their capabilities
    #[command(name = "whoami")]
    WhoAmI,
    /// Show the admin feature flags
    Flags,
    /// Show dashboard counters
    Dashboard,
    /// Manage users
    #[command(subcommand)]
    Users(UserCommand),
    /// Manage workspaces
    #[command(subcommand)]
    Workspaces(WorkspaceCommand),
    /// Manage workspace members
    #[command(subcommand)]
    Members(MemberCommand),
    /// Resolve a time period preset (today, all, DAYS) or a custom range
    Range {
        /// Preset, or the start of a custom range
        first: String,
        /// End of a custom range
        end: Option<String>,
    },
    /// Print the retry schedule for a retry config
    RetryPlan {
        /// Retry config as JSON; retries enabled with defaults when omitted
        config: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// List users
    List(UserListArgs),
    /// Show one user with their workspaces
    Show {
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
    },
    /// Show the system roles the actor may assign to a user
    Roles {
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
    },
    /// Create a user; the password is read from stdin
    Create {
        name: String,
        email: String,
        #[arg(long)]
        role: Option<SystemRole>,
    },
    /// Change a user's system role
    Role {
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
        role: SystemRole,
    },
    /// Change a user's status (active or banned)
    Status {
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
        status: UserStatus,
    },
    /// Delete a user
    Delete {
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
    },
    /// Enable, disable or delete several users
    Batch {
        action: BatchUserAction,
        #[arg(required = true, value_parser = parse_user_id)]
        user_ids: Vec<UserId>,
    },
    /// Search users interactively; one query per stdin line
    Search,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceCommand {
    /// List workspaces
    List(PageArgs),
    /// Create a workspace owned by the actor
    Create { name: String },
    /// Delete a workspace
    Delete {
        #[arg(value_parser = parse_workspace_id)]
        workspace_id: WorkspaceId,
    },
    /// Show the workspace role options
    Roles,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MemberCommand {
    /// List members of a workspace
    List {
        #[arg(value_parser = parse_workspace_id)]
        workspace_id: WorkspaceId,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show the full roster with per-member controls
    Roster {
        #[arg(value_parser = parse_workspace_id)]
        workspace_id: WorkspaceId,
    },
    /// Add a user to a workspace
    Add {
        #[arg(value_parser = parse_workspace_id)]
        workspace_id: WorkspaceId,
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
        #[arg(long, default_value_t = WorkspaceRole::Normal)]
        role: WorkspaceRole,
    },
    /// Change a member's workspace role
    Role {
        #[arg(value_parser = parse_workspace_id)]
        workspace_id: WorkspaceId,
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
        role: WorkspaceRole,
    },
    /// Remove a member from a workspace
    Remove {
        #[arg(value_parser = parse_workspace_id)]
        workspace_id: WorkspaceId,
        #[arg(value_parser = parse_user_id)]
        user_id: UserId,
    },
    /// List users that can still be added to a workspace
    Available {
        #[arg(value_parser = parse_workspace_id)]
        workspace_id: WorkspaceId,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
}

/// Paging options shared by list commands.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    pub limit: u32,
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UserListArgs {
    #[command(flatten)]
    pub page: PageArgs,
    #[arg(long)]
    pub role: Option<SystemRole>,
    #[arg(long)]
    pub status: Option<UserStatus>,
}

impl From<PageArgs> for PageQuery {
    fn from(args: PageArgs) -> Self {
        Self {
            page: args.page,
            limit: args.limit,
            search: args.search,
        }
    }
}

impl From<UserListArgs> for UserListQuery {
    fn from(args: UserListArgs) -> Self {
        Self {
            page: args.page.page,
            limit: args.page.limit,
            search: args.page.search,
            system_role: args.role,
            status: args.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRequest {
    Preset(TimePeriod),
    Custom { start: String, end: String },
}

impl RangeRequest {
    /// Reads `range` arguments: one preset, or a start and an end.
    pub fn from_arguments(first: String, end: Option<String>) -> AppResult<Self> {
        if let Some(end) = end {
            return Ok(Self::Custom { start: first, end });
        }

        let period = match first.as_str() {
            "today" => TimePeriod::Today,
            "all" => TimePeriod::AllTime,
            days => {
                let value = days
                    .parse::<i64>()
                    .map_err(|_| AppError::Validation(format!("invalid period '{days}'")))?;
                TimePeriod::from_preset_value(value)?
            }
        };

        Ok(Self::Preset(period))
    }
}

fn parse_user_id(value: &str) -> AppResult<UserId> {
    UserId::new(value)
}

fn parse_workspace_id(value: &str) -> AppResult<WorkspaceId> {
    WorkspaceId::new(value)
}
