use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, ToSchema)]
pub enum Role {
    None,
    Student,
    Instructor,
    Admin,
}

impl Into<u8> for Role {
    fn into(self) -> u8 {
        match self {
            Role::None => 0u8,
            Role::Student => 1u8,
            Role::Instructor => 2u8,
            Role::Admin => 3u8,
        }
    }
}

impl From<u8> for Role {
    fn from(value: u8) -> Self {
        vec![Role::None, Role::Student, Role::Instructor, Role::Admin][value as usize]
    }
}

impl Role {
    /// Indicates whether a user with this role can submit student work
    /// (quiz attempts, assignment files, watch progress).
    pub fn is_student(self) -> bool {
        self >= Role::Student
    }
}

impl std::default::Default for Role {
    fn default() -> Self {
        Role::None
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::None => write!(f, "none"),
            Role::Student => write!(f, "student"),
            Role::Instructor => write!(f, "instructor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::convert::Into<String> for Role {
    fn into(self) -> String {
        self.to_string()
    }
}
