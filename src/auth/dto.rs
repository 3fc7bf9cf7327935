use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Signup payload. Optional fields let validation report missing values as a
/// 400 instead of a transport-level rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub recovery_question: Option<String>,
    pub recovery_answer: Option<String>,
}

/// Fully validated signup payload: trimmed fields, lowercased email.
#[derive(Debug)]
pub struct ValidSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub recovery_question: String,
    pub recovery_answer: String,
}

impl SignupRequest {
    pub fn validate(self) -> Result<ValidSignup, ApiError> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if name.len() < 2 {
            return Err(ApiError::validation("Name must be at least 2 characters"));
        }

        let email = normalize_email(self.email.as_deref())?;

        let password = self.password.unwrap_or_default();
        if password.len() < 6 {
            return Err(ApiError::validation(
                "Password must be at least 6 characters",
            ));
        }

        let recovery_question = self
            .recovery_question
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if recovery_question.len() < 5 {
            return Err(ApiError::validation(
                "Recovery question must be at least 5 characters",
            ));
        }

        let recovery_answer = self
            .recovery_answer
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if recovery_answer.len() < 2 {
            return Err(ApiError::validation(
                "Recovery answer must be at least 2 characters",
            ));
        }

        Ok(ValidSignup {
            name,
            email,
            password,
            recovery_question,
            recovery_answer,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let email = normalize_email(self.email.as_deref())?;
        let password = self.password.unwrap_or_default();
        if password.len() < 6 {
            return Err(ApiError::validation("Invalid credentials"));
        }
        Ok((email, password))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub recovery_answer: Option<String>,
    pub new_password: Option<String>,
}

impl ResetPasswordRequest {
    pub fn validate(self) -> Result<(String, String, String), ApiError> {
        let (Some(email), Some(answer), Some(new_password)) =
            (self.email, self.recovery_answer, self.new_password)
        else {
            return Err(ApiError::validation("Missing required fields"));
        };
        if new_password.len() < 6 {
            return Err(ApiError::validation(
                "Password must be at least 6 characters",
            ));
        }
        Ok((email.trim().to_lowercase(), answer, new_password))
    }
}

fn normalize_email(email: Option<&str>) -> Result<String, ApiError> {
    let email = email.map(str::trim).unwrap_or_default().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::validation("Invalid email"));
    }
    Ok(email)
}

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Returned by signup and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Returned by GET /auth/me.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupRequest {
        SignupRequest {
            name: Some("Ananya Sharma".into()),
            email: Some("Ananya@Campus.Edu".into()),
            password: Some("hunter22".into()),
            recovery_question: Some("What is your pet's name?".into()),
            recovery_answer: Some("fluffy".into()),
        }
    }

    #[test]
    fn signup_lowercases_email() {
        let valid = signup().validate().expect("valid signup");
        assert_eq!(valid.email, "ananya@campus.edu");
    }

    #[test]
    fn signup_rejects_short_fields() {
        let mut req = signup();
        req.name = Some("A".into());
        assert!(req.validate().is_err());

        let mut req = signup();
        req.password = Some("12345".into());
        assert!(req.validate().is_err());

        let mut req = signup();
        req.recovery_question = Some("Pet?".into());
        assert!(req.validate().is_err());

        let mut req = signup();
        req.recovery_answer = Some("f".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn signup_rejects_bad_email() {
        let mut req = signup();
        req.email = Some("not-an-email".into());
        assert!(req.validate().is_err());

        let mut req = signup();
        req.email = None;
        assert!(req.validate().is_err());
    }

    #[test]
    fn reset_requires_all_fields() {
        let req = ResetPasswordRequest {
            email: Some("a@b.c".into()),
            recovery_answer: None,
            new_password: Some("hunter22".into()),
        };
        assert!(req.validate().is_err());

        let req = ResetPasswordRequest {
            email: Some("A@B.C".into()),
            recovery_answer: Some("fluffy".into()),
            new_password: Some("hunter22".into()),
        };
        let (email, _, _) = req.validate().expect("valid reset");
        assert_eq!(email, "a@b.c");
    }

    #[test]
    fn public_user_wire_shape() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ananya".into(),
            email: "ananya@campus.edu".into(),
            password_hash: "hash".into(),
            recovery_question: "Pet name?".into(),
            recovery_answer_hash: "hash".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let value = serde_json::to_value(PublicUser::from(&user)).expect("serialize user");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
    }
}
