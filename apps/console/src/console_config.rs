//! Console configuration read from `WARDEN_*` environment variables.

use std::env;
use std::time::Duration;

use url::Url;
use warden_core::{AccessToken, AppError, AppResult};
use warden_domain::{DisplayTimezone, UserId};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Admin backend the console talks to.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Remote admin API.
    Http {
        base_url: Url,
        access_token: AccessToken,
        timeout: Duration,
    },
    /// Process-local backend seeded with the actor as system admin.
    Memory,
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub backend: BackendConfig,
    pub actor_id: UserId,
    pub log_timezone: Option<DisplayTimezone>,
    pub user_timezone: Option<DisplayTimezone>,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let actor_id = non_empty("WARDEN_ACTOR_ID")
            .ok_or_else(|| AppError::Validation("WARDEN_ACTOR_ID is required".to_owned()))
            .and_then(UserId::new)?;

        let backend = match non_empty("WARDEN_BACKEND")
            .unwrap_or_else(|| "http".to_owned())
            .as_str()
        {
            "memory" => BackendConfig::Memory,
            "http" => {
                let base_url = non_empty("WARDEN_API_BASE_URL").ok_or_else(|| {
                    AppError::Validation("WARDEN_API_BASE_URL is required".to_owned())
                })?;
                let base_url = Url::parse(&base_url).map_err(|error| {
                    AppError::Validation(format!(
                        "invalid WARDEN_API_BASE_URL value '{base_url}': {error}"
                    ))
                })?;
                let access_token = non_empty("WARDEN_ACCESS_TOKEN")
                    .ok_or_else(|| {
                        AppError::Validation("WARDEN_ACCESS_TOKEN is required".to_owned())
                    })
                    .and_then(AccessToken::new)?;

                let timeout_secs = match non_empty("WARDEN_HTTP_TIMEOUT_SECS") {
                    Some(value) => value.parse::<u64>().map_err(|error| {
                        AppError::Validation(format!(
                            "invalid WARDEN_HTTP_TIMEOUT_SECS value '{value}': {error}"
                        ))
                    })?,
                    None => DEFAULT_HTTP_TIMEOUT_SECS,
                };
                if timeout_secs == 0 {
                    return Err(AppError::Validation(
                        "WARDEN_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
                    ));
                }

                BackendConfig::Http {
                    base_url,
                    access_token,
                    timeout: Duration::from_secs(timeout_secs),
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "WARDEN_BACKEND must be either 'http' or 'memory', got '{other}'"
                )));
            }
        };

        let timezone = |name: &str| {
            non_empty(name)
                .map(|value| {
                    value.parse::<DisplayTimezone>().map_err(|error| {
                        AppError::Validation(format!("invalid {name} value '{value}': {error}"))
                    })
                })
                .transpose()
        };

        Ok(Self {
            backend,
            actor_id,
            log_timezone: timezone("WARDEN_LOG_TIMEZONE")?,
            user_timezone: timezone("WARDEN_USER_TIMEZONE")?,
        })
    }

    /// Timezone used to render dates; the log timezone wins when both are set.
    pub fn display_timezone(&self) -> DisplayTimezone {
        DisplayTimezone::effective(self.log_timezone, self.user_timezone)
    }
}
