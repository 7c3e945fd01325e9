use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// The joined users + user_profile row returned by the profile and login
/// routes. `user_profile` is 1:1 with `users` via email.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserWithProfile {
    pub user_id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub joined: OffsetDateTime,
    pub isadmin: bool,
    pub github: String,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub role: String,
    pub skills: Option<String>,
    pub bio: Option<String>,
}

/// Credential row in user_login. The stored hash never leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserLogin {
    pub email: String,
    #[serde(skip_serializing)]
    pub hashpass: String,
}

/// Project membership row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contribution {
    pub user_id: i32,
    pub project_id: i32,
}

/// Everything needed to create the users / user_profile / user_login rows
/// of one registration.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub github: String,
    pub role: String,
    pub hashpass: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_login_never_serializes_hashpass() {
        let row = UserLogin {
            email: "a@b.cc".into(),
            hashpass: "$argon2id$v=19$secret".into(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("a@b.cc"));
        assert!(!json.contains("hashpass"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn user_with_profile_serializes_optional_fields_as_null() {
        let row = UserWithProfile {
            user_id: 1,
            email: "dev@example.com".into(),
            first_name: "Dev".into(),
            last_name: "One".into(),
            joined: OffsetDateTime::UNIX_EPOCH,
            isadmin: false,
            github: "devone".into(),
            linkedin: None,
            website: None,
            location: None,
            role: "backend".into(),
            skills: None,
            bio: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["email"], "dev@example.com");
        assert_eq!(json["github"], "devone");
        assert!(json["linkedin"].is_null());
        assert!(json["bio"].is_null());
    }
}
