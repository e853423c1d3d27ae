use chrono::Utc;
use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::progress::db::{LectureProgress, ProgressDbExt};
use crate::data::progress::is_completed;
use crate::resp::jwt::{auth_problem, UserClaims};
use crate::resp::problem::Problem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProgressSaveRequest {
    pub course_id: Uuid,
    pub lecture_id: Uuid,
    pub watch_time: f64,
    pub duration: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressSavedResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressListResponse {
    pub progress: Vec<LectureProgress>,
}

/// Save or update watch progress for a lecture
#[utoipa::path(
    request_body(content = ProgressSaveRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Progress stored", body = ProgressSavedResponse),
    ),
    security(
        ("jwt" = [])
    )
)]
#[post("/progress/save", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(body))]
pub async fn progress_save(
    body: Json<ProgressSaveRequest>,
    auth: UserClaims,
    db: &State<Database>,
) -> Result<Json<ProgressSavedResponse>, Problem> {
    if !auth.role.is_student() {
        return Err(auth_problem("Only students can save watch progress."));
    }

    let body = body.into_inner();

    let progress = LectureProgress {
        id: Uuid::new_v4(),
        user_id: auth.sub,
        course_id: body.course_id,
        lecture_id: body.lecture_id,
        watch_time: body.watch_time,
        duration: body.duration,
        // Always derived server-side, never taken from the client.
        completed: is_completed(body.watch_time, body.duration),
        last_updated: Utc::now(),
    };

    db.upsert_progress(&progress).await?;

    Ok(Json(ProgressSavedResponse { success: true }))
}

/// All of the caller's progress records in a course
#[utoipa::path(
    params(
        ("course_id", description = "course ID")
    ),
    responses(
        (status = 200, description = "Progress records for the course", body = ProgressListResponse),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/progress/course/<course_id>")]
#[tracing::instrument]
pub async fn progress_for_course(
    course_id: Uuid,
    auth: UserClaims,
    db: &State<Database>,
) -> Result<Json<ProgressListResponse>, Problem> {
    if !auth.role.is_student() {
        return Err(auth_problem("Only students can view watch progress."));
    }

    let progress = db.progress_for_course(auth.sub, course_id).await?;

    Ok(Json(ProgressListResponse { progress }))
}
