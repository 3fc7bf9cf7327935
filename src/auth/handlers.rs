use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{
    AuthResponse, LoginRequest, MessageResponse, PublicUser, QuestionResponse,
    ResetPasswordRequest, SignupRequest, UserResponse,
};
use crate::auth::extractors::CurrentUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::password;
use crate::auth::repo::{NewUser, User};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/security-question/:email", get(security_question))
        .route("/auth/reset-password", post(reset_password))
}

fn hashing_failed(e: anyhow::Error) -> ApiError {
    error!(error = %e, "password hashing failed");
    ApiError::internal(e.to_string())
}

fn signing_failed(e: anyhow::Error) -> ApiError {
    error!(error = %e, "jwt signing failed");
    ApiError::internal(e.to_string())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let valid = payload.validate()?;

    // Ensure email is not taken; the unique index still decides under races.
    if User::find_by_email(&state.db, &valid.email).await?.is_some() {
        warn!(email = %valid.email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = password::hash_password(&valid.password).map_err(hashing_failed)?;
    let recovery_answer_hash =
        password::hash_recovery_answer(&valid.recovery_answer).map_err(hashing_failed)?;

    let user = User::create(
        &state.db,
        &NewUser {
            name: valid.name,
            email: valid.email,
            password_hash,
            recovery_question: valid.recovery_question,
            recovery_answer_hash,
        },
    )
    .await?;

    let token = JwtKeys::from_ref(&state)
        .sign(user.id)
        .map_err(signing_failed)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: PublicUser::from(&user),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (email, plain) = payload.validate()?;

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "login with unknown email");
            ApiError::auth("Invalid credentials")
        })?;

    let ok = password::verify_password(&plain, &user.password_hash).map_err(hashing_failed)?;
    if !ok {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::auth("Invalid credentials"));
    }

    let token = JwtKeys::from_ref(&state)
        .sign(user.id)
        .map_err(signing_failed)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        user: PublicUser::from(&user),
        token,
    }))
}

#[instrument(skip(user))]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse {
        user: PublicUser::from(&user),
    })
}

#[instrument(skip(state))]
pub async fn security_question(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<QuestionResponse>> {
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.recovery_question.is_empty() {
        return Err(ApiError::bad_request(
            "No security question set for this account",
        ));
    }

    Ok(Json(QuestionResponse {
        question: user.recovery_question,
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (email, answer, new_password) = payload.validate()?;

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.recovery_answer_hash.is_empty() {
        return Err(ApiError::bad_request("Security answer not set"));
    }

    let ok = password::verify_recovery_answer(&answer, &user.recovery_answer_hash)
        .map_err(hashing_failed)?;
    if !ok {
        warn!(user_id = %user.id, "password reset with wrong answer");
        return Err(ApiError::auth("Incorrect security answer"));
    }

    let password_hash = password::hash_password(&new_password).map_err(hashing_failed)?;
    User::update_password_hash(&state.db, user.id, &password_hash).await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse {
        message: "Password reset successfully".into(),
    }))
}
