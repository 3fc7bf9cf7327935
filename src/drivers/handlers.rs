use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::drivers::dto::DriverResponse;
use crate::drivers::repo;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/drivers", get(list_drivers))
}

#[instrument(skip(state))]
pub async fn list_drivers(State(state): State<AppState>) -> ApiResult<Json<Vec<DriverResponse>>> {
    let drivers = repo::list(&state.db).await?;
    Ok(Json(drivers.into_iter().map(DriverResponse::from).collect()))
}
