use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    profiles::repo::Profile,
    sessions::{
        dto::{RequestSessionBody, RoleQuery, SessionRole, StatusUpdateBody},
        repo::Session,
        services,
    },
    state::AppState,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(request_session))
        .route("/sessions/:id/status", put(update_status))
}

#[instrument(skip(state, payload))]
pub async fn request_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RequestSessionBody>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    // The profile supplies the learner's email for the snapshot and the
    // balance for the funds check.
    let learner = Profile::find(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    let session = services::request_session(&state.db, &learner, &payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let sessions = match query.role {
        SessionRole::Requester => Session::list_for_learner(&state.db, user_id).await?,
        SessionRole::Provider => Session::list_for_teacher(&state.db, user_id).await?,
    };
    Ok(Json(sessions))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateBody>,
) -> Result<Json<Session>, ApiError> {
    let session = services::decide_session(&state.db, id, user_id, payload.status).await?;
    Ok(Json(session))
}
