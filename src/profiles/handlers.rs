use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiError,
    profiles::{dto::UpdateProfileRequest, repo::Profile},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = Profile::find(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }

    let profile = Profile::update(&state.db, user_id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    info!(user_id = %user_id, "profile updated");
    Ok(Json(profile))
}
