use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::users::repo_types::UserWithProfile;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

// Body fields are modelled as Option so a missing field produces the
// route's own 400 message instead of a deserialization rejection.

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> Result<(String, String), &'static str> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err("Please provide your E-mail and password"),
        }
    }
}

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub github: Option<String>,
    pub role: Option<String>,
}

/// Field-checked registration form.
#[derive(Debug)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub github: String,
    pub role: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<RegisterForm, &'static str> {
        const MISSING: &str =
            "Email, password, first name, last name, github or role is missing.";
        let present = |field: Option<String>| field.filter(|v| !v.is_empty()).ok_or(MISSING);
        Ok(RegisterForm {
            email: present(self.email)?,
            password: present(self.password)?,
            first_name: present(self.first_name)?,
            last_name: present(self.last_name)?,
            github: present(self.github)?,
            role: present(self.role)?,
        })
    }
}

/// Request body for joining a user to a project.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub user: Option<i32>,
    pub project: Option<i32>,
}

impl JoinRequest {
    pub fn validate(self) -> Result<(i32, i32), &'static str> {
        match (self.user, self.project) {
            (Some(user), Some(project)) => Ok((user, project)),
            _ => Err("User ID or Project ID is missing"),
        }
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserWithProfile,
    pub message: String,
}

/// Plain `{"message": ...}` success body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: Some("dev@example.com".into()),
            password: Some("hunter22".into()),
            first_name: Some("Dev".into()),
            last_name: Some("One".into()),
            github: Some("devone".into()),
            role: Some("backend".into()),
        }
    }

    #[test]
    fn login_validate_passes_full_payload_through() {
        let req = LoginRequest {
            email: Some("dev@example.com".into()),
            password: Some("hunter22".into()),
        };
        let (email, password) = req.validate().unwrap();
        assert_eq!(email, "dev@example.com");
        assert_eq!(password, "hunter22");
    }

    #[test]
    fn login_validate_rejects_missing_or_empty_fields() {
        let missing = LoginRequest {
            email: Some("dev@example.com".into()),
            password: None,
        };
        assert_eq!(
            missing.validate().unwrap_err(),
            "Please provide your E-mail and password"
        );

        let empty = LoginRequest {
            email: Some(String::new()),
            password: Some("hunter22".into()),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn register_validate_passes_full_payload_through() {
        let form = register_request().validate().unwrap();
        assert_eq!(form.email, "dev@example.com");
        assert_eq!(form.github, "devone");
        assert_eq!(form.role, "backend");
    }

    #[test]
    fn register_validate_rejects_each_missing_field() {
        let blank = |mutate: fn(&mut RegisterRequest)| {
            let mut req = register_request();
            mutate(&mut req);
            req.validate().unwrap_err()
        };
        let expected = "Email, password, first name, last name, github or role is missing.";
        assert_eq!(blank(|r| r.email = None), expected);
        assert_eq!(blank(|r| r.password = None), expected);
        assert_eq!(blank(|r| r.first_name = None), expected);
        assert_eq!(blank(|r| r.last_name = None), expected);
        assert_eq!(blank(|r| r.github = None), expected);
        assert_eq!(blank(|r| r.role = None), expected);
        assert_eq!(blank(|r| r.github = Some(String::new())), expected);
    }

    #[test]
    fn join_validate_requires_both_ids() {
        let full = JoinRequest {
            user: Some(3),
            project: Some(8),
        };
        assert_eq!(full.validate().unwrap(), (3, 8));

        let missing = JoinRequest {
            user: Some(3),
            project: None,
        };
        assert_eq!(
            missing.validate().unwrap_err(),
            "User ID or Project ID is missing"
        );
    }

    #[test]
    fn email_format_check_accepts_normal_addresses() {
        assert!(is_valid_email("dev@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn email_format_check_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@domain"));
        assert!(!is_valid_email("spaces in@mail.com"));
        assert!(!is_valid_email("@no-local.com"));
    }
}
