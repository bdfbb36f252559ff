//! Warden multi-workspace admin console.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod console_config;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use warden_application::AdminConsoleService;
use warden_core::AppResult;
use warden_domain::{SystemRole, WorkspaceName};
use warden_infrastructure::{HttpAdminClient, InMemoryAdminBackend};

use crate::cli::Cli;
use crate::console_config::{BackendConfig, ConsoleConfig};

const MEMORY_ADMIN_NAME: &str = "Console Admin";
const MEMORY_ADMIN_EMAIL: &str = "admin@warden.local";
const MEMORY_DEFAULT_WORKSPACE: &str = "Default";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(error = %error, "console command failed");
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = ConsoleConfig::load()?;
    let timezone = config.display_timezone();
    let service = build_service(&config).await?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    commands::run(&service, &timezone, cli.command, &mut stdin, &mut stdout).await?;
    stdout.flush().await.ok();

    Ok(())
}

async fn build_service(config: &ConsoleConfig) -> AppResult<AdminConsoleService> {
    match &config.backend {
        BackendConfig::Http {
            base_url,
            access_token,
            timeout,
        } => {
            info!(base_url = %base_url, actor_id = %config.actor_id, "using admin API backend");
            let client = Arc::new(HttpAdminClient::new(
                base_url.clone(),
                access_token.clone(),
                *timeout,
            )?);

            Ok(AdminConsoleService::new(
                client.clone(),
                client.clone(),
                client,
                config.actor_id.clone(),
            ))
        }
        BackendConfig::Memory => {
            info!(actor_id = %config.actor_id, "using in-memory backend");
            let backend = Arc::new(InMemoryAdminBackend::new(true));
            backend
                .seed_user(
                    config.actor_id.clone(),
                    MEMORY_ADMIN_NAME,
                    MEMORY_ADMIN_EMAIL,
                    SystemRole::SystemAdmin,
                )
                .await?;
            backend
                .seed_workspace(
                    &WorkspaceName::new(MEMORY_DEFAULT_WORKSPACE)?,
                    &config.actor_id,
                    true,
                )
                .await?;

            Ok(AdminConsoleService::new(
                Arc::new(backend.session(config.actor_id.clone())),
                backend.clone(),
                backend,
                config.actor_id.clone(),
            ))
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
