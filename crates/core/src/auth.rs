use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Bearer credential presented to the admin API.
///
/// The token value never appears in `Debug` output so it can travel through
/// structured logs safely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a token from a non-blank value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "access token must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("AccessToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::AccessToken;

    #[test]
    fn debug_output_redacts_token() {
        let token = AccessToken::new("secret-value").unwrap_or_else(|_| panic!("test"));
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
        assert_eq!(token.bearer_header(), "Bearer secret-value");
    }

    #[test]
    fn blank_token_is_rejected() {
        assert!(AccessToken::new("  ").is_err());
    }
}
