use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Closed set of account roles.
///
/// Every check site matches on this exhaustively, so adding a role forces a
/// review of each sign-in and guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Admin,
    Manager,
    Collector,
    Supervisor,
    Member,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::Manager,
        UserRole::Collector,
        UserRole::Supervisor,
        UserRole::Member,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Collector => "collector",
            UserRole::Supervisor => "supervisor",
            UserRole::Member => "member",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "collector" => Ok(UserRole::Collector),
            "supervisor" => Ok(UserRole::Supervisor),
            "member" => Ok(UserRole::Member),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// User model
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Email or phone number, stored normalised (trimmed, lower-case)
    pub identifier: String,
    pub name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Canonical form used for storage, lookup and exempt-identity comparison.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_their_names() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>(), Ok(role));
        }
        assert_eq!(" Manager ".parse::<UserRole>(), Ok(UserRole::Manager));
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn identifiers_are_trimmed_and_lowercased() {
        assert_eq!(normalize_identifier("  Karim@X.com "), "karim@x.com");
        assert_eq!(normalize_identifier("+998901234567"), "+998901234567");
    }
}
