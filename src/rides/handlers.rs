use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::rides::dto::{CreateRideRequest, RideResponse};
use crate::rides::repo::{self, JoinRejection, Participant};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/rides", get(list_rides))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/rides", post(create_ride))
        .route("/rides/:id/join", post(join_ride))
}

#[instrument(skip(state))]
pub async fn list_rides(State(state): State<AppState>) -> ApiResult<Json<Vec<RideResponse>>> {
    let rides = repo::list(&state.db).await?;
    Ok(Json(rides.into_iter().map(RideResponse::from).collect()))
}

#[instrument(skip(state, payload, user))]
pub async fn create_ride(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateRideRequest>,
) -> ApiResult<(StatusCode, Json<RideResponse>)> {
    let new = payload.validate()?;

    let ride = repo::insert(&state.db, &new, user.id, &user.name).await?;

    info!(ride_id = %ride.id, host_id = %user.id, "ride posted");
    Ok((StatusCode::CREATED, Json(ride.into())))
}

/// The only operation with a real concurrency hazard. The repo runs the
/// admission check and the append as one conditional statement; this handler
/// only turns a no-match outcome into the right error.
#[instrument(skip(state, user))]
pub async fn join_ride(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(ride_id): Path<Uuid>,
) -> ApiResult<Json<RideResponse>> {
    let participant = Participant {
        user_id: user.id,
        name: user.name.clone(),
        joined_at: OffsetDateTime::now_utc(),
    };

    let joined = repo::try_join(&state.db, ride_id, &participant).await?;

    if let Some(ride) = joined {
        info!(ride_id = %ride.id, user_id = %user.id, "ride joined");
        return Ok(Json(ride.into()));
    }

    let ride = repo::find(&state.db, ride_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ride not found"))?;

    match JoinRejection::classify(&ride, user.id) {
        Some(rejection) => {
            warn!(ride_id = %ride_id, user_id = %user.id, ?rejection, "join rejected");
            Err(ApiError::bad_request(rejection.message()))
        }
        // The conditional update matched nothing, yet the re-read ride admits
        // the user. Join conditions are monotonic, so this cannot happen.
        None => Err(ApiError::internal("join failed without a rejection cause")),
    }
}
