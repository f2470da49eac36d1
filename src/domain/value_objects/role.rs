//! Roles and authorization tiers.
//!
//! Roles are totally ordered: `Student < Instructor < Admin`. A policy names the
//! minimum role it admits, so every higher role inherits the access of the tiers
//! below it.

use serde::{Deserialize, Serialize};

/// Account role. Declaration order defines privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    /// Parse the database/claim string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "student" => Some(Self::Student),
            "instructor" => Some(Self::Instructor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }

    /// Whether this role satisfies the given policy.
    pub fn satisfies(&self, policy: Policy) -> bool {
        *self >= policy.min_role()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization tiers gating route groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Administrators only
    AdminOnly,
    /// Instructors and administrators
    InstructorOrAdmin,
    /// Any authenticated studio member
    AnyMember,
}

impl Policy {
    pub fn min_role(&self) -> Role {
        match self {
            Self::AdminOnly => Role::Admin,
            Self::InstructorOrAdmin => Role::Instructor,
            Self::AnyMember => Role::Student,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AdminOnly => "AdminOnly",
            Self::InstructorOrAdmin => "InstructorOrAdmin",
            Self::AnyMember => "StudentOrInstructorOrAdmin",
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Staff (instructors and admins) act on any student's records.
    pub fn is_staff(&self) -> bool {
        self.role.satisfies(Policy::InstructorOrAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Role::Admin, Policy::AdminOnly, true)]
    #[test_case(Role::Instructor, Policy::AdminOnly, false)]
    #[test_case(Role::Student, Policy::AdminOnly, false)]
    #[test_case(Role::Admin, Policy::InstructorOrAdmin, true)]
    #[test_case(Role::Instructor, Policy::InstructorOrAdmin, true)]
    #[test_case(Role::Student, Policy::InstructorOrAdmin, false)]
    #[test_case(Role::Admin, Policy::AnyMember, true)]
    #[test_case(Role::Instructor, Policy::AnyMember, true)]
    #[test_case(Role::Student, Policy::AnyMember, true)]
    fn test_role_satisfies_policy(role: Role, policy: Policy, expected: bool) {
        assert_eq!(role.satisfies(policy), expected);
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Student < Role::Instructor);
        assert!(Role::Instructor < Role::Admin);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("instructor"), Some(Role::Instructor));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Instructor).unwrap(), "\"instructor\"");
    }
}
