use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    profiles::repo::Profile,
    skills::{
        dto::{CreateSkillRequest, SkillFilterQuery},
        repo::{NewSkill, Skill},
        services::{filter_skills, search_skills, validate_new_skill},
    },
    state::AppState,
};

pub fn skill_routes() -> Router<AppState> {
    Router::new()
        .route("/skills", get(browse_skills).post(create_skill))
        .route("/skills/mine", get(my_skills))
        .route("/skills/:id", axum::routing::delete(delete_skill))
}

#[instrument(skip(state, payload))]
pub async fn create_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), ApiError> {
    let validated = validate_new_skill(&payload)?;

    // A profile must exist before listing anything; its email is the
    // denormalized teacher contact on the listing.
    let profile = Profile::find(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    let skill = Skill::create(
        &state.db,
        &NewSkill {
            name: &validated.name,
            description: &validated.description,
            payment_kind: validated.payment_kind,
            payment_amount: validated.payment_amount,
            session_mode: validated.session_mode,
            teacher_id: user_id,
            teacher_email: &profile.email,
        },
    )
    .await?;

    info!(skill_id = %skill.id, teacher_id = %user_id, "skill created");
    Ok((StatusCode::CREATED, Json(skill)))
}

#[instrument(skip(state))]
pub async fn my_skills(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let skills = Skill::list_by_teacher(&state.db, user_id).await?;
    Ok(Json(skills))
}

#[instrument(skip(state))]
pub async fn browse_skills(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<SkillFilterQuery>,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let skills = Skill::list_all_except(&state.db, user_id).await?;
    let mut skills = filter_skills(skills, query.payment, query.mode);
    if let Some(term) = &query.q {
        skills = search_skills(skills, term);
    }
    Ok(Json(skills))
}

#[instrument(skip(state))]
pub async fn delete_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let skill = Skill::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Skill not found"))?;

    if skill.teacher_id != user_id {
        warn!(skill_id = %id, caller = %user_id, owner = %skill.teacher_id, "delete denied");
        return Err(ApiError::forbidden("Only the owner can delete a skill"));
    }

    Skill::delete(&state.db, id).await?;
    info!(skill_id = %id, teacher_id = %user_id, "skill deleted");
    Ok(StatusCode::NO_CONTENT)
}
