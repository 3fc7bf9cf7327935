use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// User record in the database. Credential and recovery hashes never leave
/// the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub recovery_question: String,
    #[serde(skip_serializing)]
    pub recovery_answer_hash: String,
    pub created_at: OffsetDateTime,
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub recovery_question: String,
    pub recovery_answer_hash: String,
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, recovery_question, recovery_answer_hash, created_at";

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

impl User {
    /// Create a user. Emails are unique case-insensitively: the address is
    /// stored lowercased and the UNIQUE constraint backs the insert race.
    pub async fn create(db: &PgPool, new: &NewUser) -> ApiResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, recovery_question, recovery_answer_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(new.email.to_lowercase())
        .bind(&new.password_hash)
        .bind(&new.recovery_question)
        .bind(&new.recovery_answer_hash)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Email already registered")
            } else {
                ApiError::Database(e)
            }
        })?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn update_password_hash(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(())
    }
}
