//! User domain types and validation rules.

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

use crate::{SystemRole, UserStatus, WorkspaceRole};

/// Opaque identifier of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a user identifier from a non-blank value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("user id must not be empty".to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Accepts `local@domain.tld` shapes: a local part without whitespace or
    /// `@`, then a domain whose first label is followed by a `.` and at least
    /// one more character.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "email address must not contain whitespace".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain '@'".to_owned(),
            ));
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        let mut domain_chars = domain.chars();
        let Some(first) = domain_chars.next() else {
            return Err(AppError::Validation(
                "email domain must not be empty".to_owned(),
            ));
        };
        let rest = &domain[first.len_utf8()..];
        let has_top_level = rest
            .find('.')
            .is_some_and(|position| position + 1 < rest.len());
        if !has_top_level {
            return Err(AppError::Validation(
                "email domain must contain a '.' followed by a top-level label".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Minimum password length accepted for admin-created accounts.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Validates a plaintext password for an admin-created account.
///
/// Requires at least [`PASSWORD_MIN_LENGTH`] characters, one ASCII letter of
/// either case and one ASCII digit.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if !password.chars().any(|character| character.is_ascii_alphabetic()) {
        return Err(AppError::Validation(
            "password must contain at least one letter".to_owned(),
        ));
    }

    if !password.chars().any(|character| character.is_ascii_digit()) {
        return Err(AppError::Validation(
            "password must contain at least one digit".to_owned(),
        ));
    }

    Ok(())
}

/// Workspace joined by a user, as shown on the user detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWorkspace {
    /// Workspace identifier.
    pub id: String,
    /// Workspace name.
    pub name: String,
    /// The user's role in the workspace.
    pub role: WorkspaceRole,
    /// Membership creation time, Unix seconds.
    pub created_at: Option<i64>,
}

/// User account as seen by the admin console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Avatar URL, if uploaded.
    pub avatar_url: Option<String>,
    /// Platform-wide role.
    pub system_role: SystemRole,
    /// Account status.
    pub status: UserStatus,
    /// Account creation time, Unix seconds.
    pub created_at: Option<i64>,
    /// Last successful login, Unix seconds.
    pub last_login_at: Option<i64>,
    /// Last recorded activity, Unix seconds.
    pub last_active_at: Option<i64>,
    /// Joined workspaces; populated on detail reads only.
    pub workspaces: Vec<UserWorkspace>,
}

/// Validated input for creating a user account.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    name: NonEmptyString,
    email: EmailAddress,
    password: String,
    system_role: SystemRole,
}

impl NewUser {
    /// Validates name, email and password policy.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        system_role: Option<SystemRole>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name.into().trim())
            .map_err(|_| AppError::Validation("name is required".to_owned()))?;
        let email = EmailAddress::new(email)?;
        let password = password.into();
        validate_password(&password)?;

        Ok(Self {
            name,
            email,
            password,
            system_role: system_role.unwrap_or(SystemRole::User),
        })
    }

    /// Returns the trimmed display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the normalized email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the plaintext password to submit.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Returns the requested system role.
    #[must_use]
    pub fn system_role(&self) -> SystemRole {
        self.system_role
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("system_role", &self.system_role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_is_accepted_and_normalized() {
        let email = EmailAddress::new(" USER@Example.COM ");
        assert_eq!(
            email.unwrap_or_else(|_| panic!("test")).as_str(),
            "user@example.com"
        );
    }

    #[test]
    fn email_shapes_follow_form_rules() {
        assert!(EmailAddress::new("a@b.co").is_ok());
        assert!(EmailAddress::new("a@b.c.d").is_ok());
        assert!(EmailAddress::new("noatsign").is_err());
        assert!(EmailAddress::new("user@nodot").is_err());
        assert!(EmailAddress::new("user@host.").is_err());
        assert!(EmailAddress::new("@host.com").is_err());
        assert!(EmailAddress::new("a@b@c.com").is_err());
        assert!(EmailAddress::new("jo hn@host.com").is_err());
        assert!(EmailAddress::new("").is_err());
    }

    #[test]
    fn password_policy_examples() {
        assert!(validate_password("abc12345").is_ok());
        assert!(validate_password("ABC12345").is_ok());
        assert!(validate_password("abcdefgh").is_err());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_err());
    }

    #[test]
    fn new_user_defaults_role_to_user() {
        let user = NewUser::new("Ada", "ada@example.com", "abc12345", None)
            .unwrap_or_else(|_| panic!("test"));
        assert_eq!(user.system_role(), SystemRole::User);
        assert_eq!(user.name(), "Ada");
    }

    #[test]
    fn new_user_requires_name() {
        let result = NewUser::new("   ", "ada@example.com", "abc12345", None);
        assert!(matches!(result, Err(AppError::Validation(message)) if message == "name is required"));
    }

    #[test]
    fn user_id_rejects_blank() {
        assert!(UserId::new(" ").is_err());
        assert_eq!(
            UserId::new(" u-1 ").map(|id| id.to_string()).ok(),
            Some("u-1".to_owned())
        );
    }
}
