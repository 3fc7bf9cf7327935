use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::{JwtKeys, TokenError};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the bearer token to the live user record. The lookup is a
/// just-in-time refresh of the identity store: a structurally valid token for
/// a user that no longer exists is rejected.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::auth("Missing authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::auth("Invalid authorization header"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "bearer token rejected");
            match e {
                TokenError::Expired => ApiError::auth("Token expired"),
                TokenError::Invalid => ApiError::auth("Invalid token"),
            }
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                ApiError::auth("User not found")
            })?;

        Ok(CurrentUser(user))
    }
}
