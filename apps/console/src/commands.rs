//! Executes parsed console commands against the admin service.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use warden_application::{
    AdminConsoleService, AvailableUserQuery, MutationOutcome, SearchDebouncer, UserListQuery,
    jittered_wait,
};
use warden_core::{AppError, AppResult};
use warden_domain::{DateTimeRange, DisplayTimezone, NewUser, RetryConfig};

use crate::cli::{Command, MemberCommand, RangeRequest, UserCommand, WorkspaceCommand};
use crate::render;

/// Runs one console command, reading stdin-style input from `input`.
pub async fn run<R, W>(
    service: &AdminConsoleService,
    timezone: &DisplayTimezone,
    command: Command,
    input: &mut R,
    output: &mut W,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let text = match command {
        Command::WhoAmI => render::actor(&service.current_actor().await?),
        Command::Flags => render::feature_flags(&service.feature_flags().await?),
        Command::Dashboard => render::dashboard(&service.dashboard().await?),
        Command::Users(command) => run_users(service, timezone, command, input, output).await?,
        Command::Workspaces(command) => run_workspaces(service, timezone, command).await?,
        Command::Members(command) => run_members(service, timezone, command).await?,
        Command::Range { first, end } => {
            range(timezone, RangeRequest::from_arguments(first, end)?)?
        }
        Command::RetryPlan { config } => retry_plan(config.as_deref())?,
    };

    write(output, &text).await
}

async fn run_users<R, W>(
    service: &AdminConsoleService,
    timezone: &DisplayTimezone,
    command: UserCommand,
    input: &mut R,
    output: &mut W,
) -> AppResult<String>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    Ok(match command {
        UserCommand::List(args) => {
            render::user_page(&service.list_users(args.into()).await?, timezone)
        }
        UserCommand::Show { user_id } => {
            render::user_detail(&service.get_user(&user_id).await?, timezone)
        }
        UserCommand::Roles { user_id } => {
            render::role_choices(&service.role_choices(&user_id).await?)
        }
        UserCommand::Create { name, email, role } => {
            let password = read_line(input).await?.ok_or_else(|| {
                AppError::Validation("password is required on stdin".to_owned())
            })?;
            let outcome = service
                .create_user(NewUser::new(name, email, password, role)?)
                .await?;
            with_scopes(format!("created user {}\n", outcome.value), &outcome)
        }
        UserCommand::Role { user_id, role } => {
            let outcome = service.change_user_role(&user_id, role).await?;
            with_scopes(format!("{user_id} is now {}\n", role.label()), &outcome)
        }
        UserCommand::Status { user_id, status } => {
            let outcome = service.change_user_status(&user_id, status).await?;
            with_scopes(format!("{user_id} is now {}\n", status.label()), &outcome)
        }
        UserCommand::Delete { user_id } => {
            let outcome = service.delete_user(&user_id).await?;
            with_scopes(format!("deleted user {user_id}\n"), &outcome)
        }
        UserCommand::Batch { action, user_ids } => {
            let outcome = service.batch_user_action(&user_ids, action).await?;
            with_scopes(render::batch_report(&outcome.value), &outcome)
        }
        UserCommand::Search => {
            search_users(service, timezone, input, output).await?;
            String::new()
        }
    })
}

async fn run_workspaces(
    service: &AdminConsoleService,
    timezone: &DisplayTimezone,
    command: WorkspaceCommand,
) -> AppResult<String> {
    Ok(match command {
        WorkspaceCommand::List(page) => {
            render::workspace_page(&service.list_workspaces(page.into()).await?, timezone)
        }
        WorkspaceCommand::Create { name } => {
            let outcome = service.create_workspace(&name).await?;
            with_scopes(format!("created workspace {}\n", outcome.value), &outcome)
        }
        WorkspaceCommand::Delete { workspace_id } => {
            let outcome = service.delete_workspace(&workspace_id).await?;
            with_scopes(format!("deleted workspace {workspace_id}\n"), &outcome)
        }
        WorkspaceCommand::Roles => {
            render::workspace_role_options(&service.workspace_role_options().await?)
        }
    })
}

async fn run_members(
    service: &AdminConsoleService,
    timezone: &DisplayTimezone,
    command: MemberCommand,
) -> AppResult<String> {
    Ok(match command {
        MemberCommand::List { workspace_id, page } => render::member_page(
            &service.list_members(&workspace_id, page.into()).await?,
            timezone,
        ),
        MemberCommand::Roster { workspace_id } => {
            let (roster, controls) = service.member_roster(&workspace_id).await?;
            render::roster(&roster, &controls)
        }
        MemberCommand::Add {
            workspace_id,
            user_id,
            role,
        } => {
            let outcome = service.add_member(&workspace_id, &user_id, role).await?;
            with_scopes(
                format!("added {user_id} to {workspace_id} as {}\n", role.label()),
                &outcome,
            )
        }
        MemberCommand::Role {
            workspace_id,
            user_id,
            role,
        } => {
            let outcome = service
                .update_member_role(&workspace_id, &user_id, role)
                .await?;
            with_scopes(
                format!("{user_id} is now {} in {workspace_id}\n", role.label()),
                &outcome,
            )
        }
        MemberCommand::Remove {
            workspace_id,
            user_id,
        } => {
            let outcome = service.remove_member(&workspace_id, &user_id).await?;
            with_scopes(
                format!("removed {user_id} from {workspace_id}\n"),
                &outcome,
            )
        }
        MemberCommand::Available {
            workspace_id,
            search,
            limit,
        } => {
            let query = AvailableUserQuery { search, limit };
            render::available_users(&service.available_users(&workspace_id, query).await?)
        }
    })
}

/// Runs a user listing for every search term that stays unchanged for the
/// debounce window. Each input line replaces the pending term.
async fn search_users<R, W>(
    service: &AdminConsoleService,
    timezone: &DisplayTimezone,
    input: &mut R,
    output: &mut W,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let (sender, typed) = mpsc::channel(16);
    let mut settled = SearchDebouncer::default().spawn(typed);

    let feed = async move {
        loop {
            match read_line(input).await {
                Ok(Some(term)) => {
                    if sender.send(term).await.is_err() {
                        return Ok(());
                    }
                }
                Ok(None) => return Ok(()),
                Err(error) => return Err(error),
            }
        }
    };

    let answer = async {
        while let Some(term) = settled.recv().await {
            debug!(search = term.as_str(), "running settled search");
            let page = service
                .list_users(UserListQuery {
                    search: Some(term.clone()),
                    ..UserListQuery::default()
                })
                .await?;
            write(output, &format!("search '{term}':\n")).await?;
            write(output, &render::user_page(&page, timezone)).await?;
        }
        Ok::<(), AppError>(())
    };

    tokio::try_join!(feed, answer).map(|_| ())
}

fn range(timezone: &DisplayTimezone, request: RangeRequest) -> AppResult<String> {
    match request {
        RangeRequest::Preset(period) => {
            let resolved = period.resolve_now(timezone)?;
            Ok(render::range(Some(period), resolved.as_ref()))
        }
        RangeRequest::Custom { start, end } => {
            let resolved = DateTimeRange::parse(&start, &end, timezone)?;
            Ok(render::range(None, Some(&resolved)))
        }
    }
}

fn retry_plan(config: Option<&str>) -> AppResult<String> {
    let config = match config {
        Some(raw) => serde_json::from_str::<RetryConfig>(raw).map_err(|error| {
            AppError::Validation(format!("invalid retry config: {error}"))
        })?,
        None => RetryConfig {
            retry_enabled: true,
            ..RetryConfig::default()
        },
    }
    .normalized();

    let waits = (0..config.schedule().len())
        .map(|index| {
            let retry_index = u32::try_from(index).unwrap_or(u32::MAX);
            jittered_wait(&config, retry_index)
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(render::retry_plan(&config, &waits))
}

fn with_scopes<T>(mut text: String, outcome: &MutationOutcome<T>) -> String {
    text.push_str(&render::invalidated(&outcome.invalidates));
    text
}

async fn read_line<R>(input: &mut R) -> AppResult<Option<String>>
where
    R: AsyncBufRead + Unpin + Send,
{
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read stdin: {error}")))?;
    if read == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

async fn write<W>(output: &mut W, text: &str) -> AppResult<()>
where
    W: AsyncWrite + Unpin + Send,
{
    output
        .write_all(text.as_bytes())
        .await
        .map_err(|error| AppError::Internal(format!("failed to write output: {error}")))
}
