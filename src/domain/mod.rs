//! Domain types for access control with strong typing.
//!
//! Roles form a closed set checked in one place (the authorization gate)
//! instead of string comparisons scattered across handlers.

pub mod password;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role granted to an application user.
///
/// # Examples
///
/// ```rust
/// use poseidon::domain::Role;
///
/// let role: Role = "ROLE_ADMIN".parse().unwrap();
/// assert_eq!(role, Role::Admin);
/// assert_eq!(role.authority(), "ROLE_ADMIN");
/// assert!(role.can_access(Role::User));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub const ALL: [Self; 2] = [Self::Admin, Self::User];

    /// Canonical name as stored in the `users.role` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    /// The single authority a principal holding this role is granted.
    #[must_use]
    pub const fn authority(&self) -> &'static str {
        match self {
            Self::Admin => "ROLE_ADMIN",
            Self::User => "ROLE_USER",
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role satisfies a route that requires `required`.
    #[must_use]
    pub const fn can_access(&self, required: Self) -> bool {
        match self {
            Self::Admin => true,
            Self::User => matches!(required, Self::User),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts `ADMIN`, `admin` and `ROLE_ADMIN` style spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed
            .strip_prefix("ROLE_")
            .or_else(|| trimmed.strip_prefix("role_"))
            .unwrap_or(trimmed);

        if name.eq_ignore_ascii_case("admin") {
            Ok(Self::Admin)
        } else if name.eq_ignore_ascii_case("user") {
            Ok(Self::User)
        } else {
            Err(UnknownRole(s.to_string()))
        }
    }
}

/// A user as seen by the authentication provider: identity, role and the
/// stored digest to verify a login attempt against.
#[derive(Clone)]
pub struct Principal {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub role: Role,
    pub password_hash: String,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("password_hash", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Principal {
    #[must_use]
    pub fn authority(&self) -> &'static str {
        self.role.authority()
    }

    #[must_use]
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// The authenticated identity kept in the session and handed to handlers as
/// a request extension. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}
