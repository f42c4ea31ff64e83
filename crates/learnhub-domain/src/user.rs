//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role.
///
/// Wire and storage format: `"STUDENT"`, `"INSTRUCTOR"`, `"ADMIN"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
}

/// Roles allowed to author courses, sections and lectures.
pub const COURSE_AUTHORS: &[UserRole] = &[UserRole::Admin, UserRole::Instructor];

/// Roles allowed to read the order book.
pub const ORDER_VIEWERS: &[UserRole] = &[UserRole::Admin, UserRole::Instructor];

/// Roles allowed to manage other accounts.
pub const ADMINS: &[UserRole] = &[UserRole::Admin];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Instructor => "INSTRUCTOR",
            Self::Admin => "ADMIN",
        }
    }

    /// Role granted at registration: the very first account administers the
    /// marketplace, everybody after it starts as a student.
    pub fn for_registration(existing_users: u64) -> Self {
        if existing_users == 0 {
            Self::Admin
        } else {
            Self::Student
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Self::Student),
            "INSTRUCTOR" => Ok(Self::Instructor),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Capability check used by every role-gated operation.
///
/// An empty `required` set admits everyone; otherwise at least one of the
/// subject's roles must appear in it.
pub fn is_permitted(subject: &[UserRole], required: &[UserRole]) -> bool {
    required.is_empty() || subject.iter().any(|role| required.contains(role))
}
