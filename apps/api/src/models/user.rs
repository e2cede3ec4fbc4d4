use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role. Stored as TEXT; unknown values fail closed at the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Faculty => "FACULTY",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "STUDENT" => Some(Role::Student),
            "FACULTY" => Some(Role::Faculty),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Account review state. Students are APPROVED at creation; faculty stay
/// PENDING until an admin reviews them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "PENDING",
            UserStatus::Approved => "APPROVED",
            UserStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<UserStatus> {
        match s {
            "PENDING" => Some(UserStatus::Pending),
            "APPROVED" => Some(UserStatus::Approved),
            "REJECTED" => Some(UserStatus::Rejected),
            _ => None,
        }
    }

    /// Initial status for a freshly created account of the given role.
    pub fn initial_for(role: Role) -> UserStatus {
        match role {
            Role::Student => UserStatus::Approved,
            _ => UserStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fname: String,
    pub lname: String,
    pub bio: Option<String>,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.fname, self.lname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Student, Role::Faculty, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("student"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_students_start_approved() {
        assert_eq!(UserStatus::initial_for(Role::Student), UserStatus::Approved);
        assert_eq!(UserStatus::initial_for(Role::Faculty), UserStatus::Pending);
        assert_eq!(UserStatus::initial_for(Role::Admin), UserStatus::Pending);
    }
}
