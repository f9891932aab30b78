//! Static user directory and current-user resolution.
//!
//! The directory is a read-only table used for display lookups and for
//! validating logins. Which user is "current" is answered by a
//! [`UserProvider`]; story creation stamps that user's id as the owner.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::model::{ParseEnumError, normalize};

/// Placeholder shown when an id does not resolve to a record or user.
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    DevOps,
    Dev,
}

impl Role {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::DevOps => "DevOps",
            Self::Dev => "Dev",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "admin" => Ok(Self::Admin),
            "devops" => Ok(Self::DevOps),
            "dev" => Ok(Self::Dev),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub surname: String,
    pub role: Role,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        surname: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            surname: surname.into(),
            role,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }
}

/// Read-only lookup table of known users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl Default for UserDirectory {
    /// The three built-in accounts.
    fn default() -> Self {
        Self::new(vec![
            User::new("1", "Maksymilian", "Dąbrowski", Role::Admin),
            User::new("2", "Borys", "Bojan", Role::DevOps),
            User::new("3", "Krzysztof", "Popiela", Role::Dev),
        ])
    }
}

impl UserDirectory {
    #[must_use]
    pub const fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    #[must_use]
    pub fn all(&self) -> &[User] {
        &self.users
    }

    /// "First Surname" for a known id, [`UNKNOWN_NAME`] otherwise.
    #[must_use]
    pub fn display_name(&self, id: &str) -> String {
        self.find_by_id(id)
            .map_or_else(|| UNKNOWN_NAME.to_string(), User::display_name)
    }
}

/// Source of the currently signed-in user.
pub trait UserProvider {
    fn current_user(&self) -> Option<User>;
}

/// Provider that always answers with the same user (or nobody).
#[derive(Debug, Clone, Default)]
pub struct FixedUser(pub Option<User>);

impl UserProvider for FixedUser {
    fn current_user(&self) -> Option<User> {
        self.0.clone()
    }
}

/// Ask each provider in turn; the first answer wins.
#[derive(Default)]
pub struct FirstOf(pub Vec<Box<dyn UserProvider>>);

impl UserProvider for FirstOf {
    fn current_user(&self) -> Option<User> {
        self.0.iter().find_map(|provider| provider.current_user())
    }
}
