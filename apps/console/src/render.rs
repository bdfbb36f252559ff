//! Plain-text rendering of console results.

use std::fmt::Write as _;
use std::time::Duration;

use warden_application::{
    BatchActionReport, CacheScope, DashboardStats, FeatureFlags, MemberPage, Page,
};
use warden_domain::{
    ActorContext, AdminUser, AvailableUser, DateInput, DateTimeRange, DenialReason,
    DisplayTimezone, MemberRoster, PermissionDecision, RetryConfig, RoleOption, SystemRole,
    TimePeriod, UserId, Workspace, WorkspaceRole, format_date, format_date_time,
};

fn date(value: Option<i64>, timezone: &DisplayTimezone) -> String {
    format_date(value.map(DateInput::from).as_ref(), timezone)
}

fn date_time(value: Option<i64>, timezone: &DisplayTimezone) -> String {
    format_date_time(value.map(DateInput::from).as_ref(), timezone)
}

fn page_footer<T>(output: &mut String, page: &Page<T>) {
    let _ = writeln!(
        output,
        "page {} (limit {}), {} total{}",
        page.page,
        page.limit,
        page.total,
        if page.has_more { ", more available" } else { "" }
    );
}

pub fn actor(actor: &ActorContext) -> String {
    let role = actor.system_role();
    format!(
        "{} as {} ({})\n  user management: {}\n  workspace management: {}\n",
        actor.user_id(),
        role.label(),
        role,
        yes_no(role.can_manage_users()),
        yes_no(role.can_manage_workspaces()),
    )
}

pub fn feature_flags(flags: &FeatureFlags) -> String {
    format!(
        "multi_workspace_permission_enabled: {}\n",
        flags.multi_workspace_permission_enabled
    )
}

pub fn dashboard(stats: &DashboardStats) -> String {
    format!(
        "users: {} ({} active, {} banned)\nworkspaces: {}\n",
        stats.total_users, stats.active_users, stats.banned_users, stats.total_workspaces
    )
}

pub fn user_page(page: &Page<AdminUser>, timezone: &DisplayTimezone) -> String {
    let mut output = String::new();
    for user in &page.items {
        let _ = writeln!(
            output,
            "{:<38} {:<24} {:<32} {:<15} {:<8} last login {}",
            user.id,
            user.name,
            user.email,
            user.system_role.label(),
            user.status.label(),
            date(user.last_login_at, timezone),
        );
    }
    page_footer(&mut output, page);
    output
}

pub fn user_detail(user: &AdminUser, timezone: &DisplayTimezone) -> String {
    let mut output = format!(
        "{} <{}>\n  id: {}\n  role: {}\n  status: {}\n  created: {}\n  last login: {}\n  last active: {}\n",
        user.name,
        user.email,
        user.id,
        user.system_role.label(),
        user.status.label(),
        date_time(user.created_at, timezone),
        date_time(user.last_login_at, timezone),
        date_time(user.last_active_at, timezone),
    );

    if user.workspaces.is_empty() {
        output.push_str("  workspaces: none\n");
    } else {
        output.push_str("  workspaces:\n");
        for workspace in &user.workspaces {
            let _ = writeln!(
                output,
                "    {} ({}) as {} since {}",
                workspace.name,
                workspace.id,
                workspace.role.label(),
                date(workspace.created_at, timezone),
            );
        }
    }

    output
}

pub fn system_role_options(options: &[RoleOption<SystemRole>]) -> String {
    role_options(options)
}

pub fn workspace_role_options(options: &[RoleOption<WorkspaceRole>]) -> String {
    role_options(options)
}

fn role_options<R: std::fmt::Display>(options: &[RoleOption<R>]) -> String {
    options.iter().fold(String::new(), |mut output, option| {
        let _ = writeln!(
            output,
            "{:<17} {:<15} {}",
            option.value.to_string(),
            option.label,
            option.description
        );
        output
    })
}

pub fn role_choices(choices: &[(RoleOption<SystemRole>, Option<DenialReason>)]) -> String {
    choices
        .iter()
        .fold(String::new(), |mut output, (option, disabled)| {
            let _ = match disabled {
                Some(reason) => writeln!(
                    output,
                    "  {:<15} unavailable: {reason}",
                    option.label
                ),
                None => writeln!(output, "* {:<15} {}", option.label, option.description),
            };
            output
        })
}

pub fn batch_report(report: &BatchActionReport) -> String {
    let mut output = format!("processed: {}, failed: {}\n", report.processed, report.failed);
    for failure in &report.errors {
        let _ = writeln!(output, "  {}: {}", failure.user_id, failure.error);
    }
    output
}

pub fn workspace_page(page: &Page<Workspace>, timezone: &DisplayTimezone) -> String {
    let mut output = String::new();
    for workspace in &page.items {
        let _ = writeln!(
            output,
            "{:<38} {:<24} {:<3} members  created {}{}",
            workspace.id,
            workspace.name,
            workspace.member_count,
            date(workspace.created_at, timezone),
            if workspace.is_default { "  [default]" } else { "" },
        );
    }
    page_footer(&mut output, page);
    output
}

pub fn member_page(page: &MemberPage, timezone: &DisplayTimezone) -> String {
    let mut output = String::new();
    if let Some(name) = &page.workspace_name {
        let _ = writeln!(output, "{name}");
    }
    for member in &page.members.items {
        let _ = writeln!(
            output,
            "{:<38} {:<24} {:<16} {:<8} joined {}",
            member.user_id,
            member.name,
            member.role.label(),
            member.status.label(),
            date(member.joined_at, timezone),
        );
    }
    page_footer(&mut output, &page.members);
    output
}

pub fn roster(roster: &MemberRoster, controls: &[(UserId, PermissionDecision)]) -> String {
    let mut output = format!(
        "{} ({} owners)\n",
        roster
            .workspace_name
            .as_deref()
            .unwrap_or(roster.workspace_id.as_str()),
        roster.owner_count()
    );

    for member in &roster.members {
        let control = controls
            .iter()
            .find(|(user_id, _)| user_id == &member.user_id)
            .and_then(|(_, decision)| decision.reason())
            .map_or_else(|| "editable".to_owned(), |reason| format!("locked: {reason}"));
        let _ = writeln!(
            output,
            "{:<38} {:<24} {:<16} {control}",
            member.user_id,
            member.name,
            member.role.label(),
        );
    }

    output
}

pub fn available_users(users: &[AvailableUser]) -> String {
    if users.is_empty() {
        return "no users available\n".to_owned();
    }

    users.iter().fold(String::new(), |mut output, user| {
        let _ = writeln!(output, "{:<38} {:<24} {}", user.id, user.name, user.email);
        output
    })
}

/// Lists the views a caller must refetch.
pub fn invalidated(scopes: &[CacheScope]) -> String {
    let names: Vec<String> = scopes.iter().map(ToString::to_string).collect();
    format!("refresh: {}\n", names.join(", "))
}

pub fn range(period: Option<TimePeriod>, range: Option<&DateTimeRange>) -> String {
    let label = period.map_or_else(|| "Custom".to_owned(), |period| period.label());
    match range {
        Some(range) => {
            let (start, end) = range.query_bounds();
            format!("{label}: {start} .. {end}\n")
        }
        None => format!("{label}: unbounded\n"),
    }
}

pub fn retry_plan(config: &RetryConfig, waits: &[Duration]) -> String {
    if !config.retry_enabled {
        return "retries disabled\n".to_owned();
    }

    let mut output = format!(
        "{} retries, {} backoff\n",
        config.max_retries,
        config.backoff_strategy.as_str()
    );
    let caps = config.schedule();
    for (index, (cap, wait)) in caps.iter().zip(waits).enumerate() {
        let _ = writeln!(
            output,
            "  retry {}: wait {} ms (cap {} ms)",
            index + 1,
            wait.as_millis(),
            cap.as_millis()
        );
    }
    output
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
