//! Student mood tracker handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::models::{MoodEntry, MoodFilter, SaveMoodRequest, MAX_STUDENT_ID_LEN};

fn check_student_id(student_id: &str) -> AppResult<()> {
    if student_id.trim().is_empty() || student_id.len() > MAX_STUDENT_ID_LEN {
        return Err(AppError::ValidationError(format!(
            "student_id must be 1 to {} characters",
            MAX_STUDENT_ID_LEN
        )));
    }
    Ok(())
}

/// Record a mood entry for a student
pub async fn save(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    req: Result<Json<SaveMoodRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MoodEntry>)> {
    check_student_id(&student_id)?;
    let Json(req) = req?;
    req.validate()?;
    let pool = state.db()?;

    let entry = MoodEntry::create(pool, &student_id, &req).await?;
    tracing::debug!("Mood saved for {}: {} (stress={})", entry.student_id, entry.mood, entry.stress_level);

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Newest mood entries for a student
pub async fn list(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    filter: Result<Query<MoodFilter>, QueryRejection>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let Query(filter) = filter?;
    check_student_id(&student_id)?;
    let pool = state.db()?;

    let entries = MoodEntry::recent(pool, &student_id, filter.limit()).await?;
    Ok(Json(entries))
}
