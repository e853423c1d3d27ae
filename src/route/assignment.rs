use chrono::{DateTime, Utc};
use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::assignment::db::{
    problem, AssignmentSubmission, SubmissionDbExt,
};
use crate::data::assignment::{
    deletion_block, AssignmentSpec, SubmissionStatus, SubmissionWindow, SubmittedFile,
};
use crate::data::lecture::db::ContentDbExt;
use crate::data::lecture::{CourseInfo, LectureInfo};
use crate::resp::jwt::{auth_problem, UserClaims};
use crate::resp::problem::Problem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignmentSubmitRequest {
    pub lecture_id: Uuid,
    #[serde(default)]
    pub course_id: Option<Uuid>,
    #[serde(default)]
    pub files: Vec<SubmittedFile>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Assignment metadata denormalized into responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentInfo {
    pub title: String,
    pub file_url: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub allow_resubmission: bool,
}

impl From<&AssignmentSpec> for AssignmentInfo {
    fn from(spec: &AssignmentSpec) -> Self {
        AssignmentInfo {
            title: spec.title.clone(),
            file_url: spec.file_url.clone(),
            due_date: spec.due_date,
            allow_resubmission: spec.allow_resubmission,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentSubmitResponse {
    pub message: String,
    pub submission: AssignmentSubmission,
    pub assignment: AssignmentInfo,
    pub course: CourseInfo,
    pub lecture: LectureInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentStatusResponse {
    pub submitted: bool,
    pub submission: Option<AssignmentSubmission>,
    pub assignment: AssignmentInfo,
    pub course: CourseInfo,
    pub lecture: LectureInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionDeletedResponse {
    pub message: String,
}

fn submit_message(resubmission: bool, late: bool) -> &'static str {
    match (resubmission, late) {
        (true, _) => "Resubmission saved.",
        (false, true) => "Late submission saved.",
        (false, false) => "Assignment submitted.",
    }
}

/// Submit assignment files for a lecture
#[utoipa::path(
    request_body(content = AssignmentSubmitRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Persisted submission with assignment metadata", body = AssignmentSubmitResponse),
        (status = 400, description = "Missing files or course mismatch", body = Problem),
        (status = 404, description = "Lecture, assignment or course doesn't exist", body = Problem),
        (status = 409, description = "Blocked by the submission window policy", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[post("/assignments/submit", format = "application/json", data = "<body>")]
#[tracing::instrument(skip(body))]
pub async fn assignment_submit(
    body: Json<AssignmentSubmitRequest>,
    auth: UserClaims,
    db: &State<Database>,
) -> Result<Json<AssignmentSubmitResponse>, Problem> {
    if !auth.role.is_student() {
        return Err(auth_problem("Only students can submit assignments."));
    }

    let body = body.into_inner();

    let files: Vec<SubmittedFile> = body
        .files
        .into_iter()
        .filter(|file| !file.file_url.is_empty())
        .collect();
    if files.is_empty() {
        return Err(problem::no_files());
    }

    let (lecture, course) = db.lecture_with_course(body.lecture_id).await?;

    let spec = lecture
        .assignment
        .as_ref()
        .ok_or_else(|| problem::assignment_not_found(lecture.id))?;

    if let Some(course_id) = body.course_id {
        if course_id != course.id {
            return Err(problem::course_mismatch());
        }
    }

    let existing = db.find_submission(auth.sub, lecture.id).await?;

    let now = Utc::now();
    let window = SubmissionWindow::from(spec);
    let status = window
        .evaluate(existing.as_ref(), now)
        .map_err(problem::window_blocked)?;

    let submission = AssignmentSubmission {
        // Upsert keeps the original record id across resubmissions.
        id: existing
            .as_ref()
            .map(|prior| prior.id)
            .unwrap_or_else(Uuid::new_v4),
        student_id: auth.sub,
        lecture_id: lecture.id,
        course_id: course.id,
        files,
        remarks: body
            .remarks
            .or_else(|| existing.as_ref().and_then(|prior| prior.remarks.clone())),
        grade: None,
        score: None,
        status,
        is_late: status == SubmissionStatus::Late,
        submitted_at: now,
    };

    let saved = db.upsert_submission(&submission).await?;

    Ok(Json(AssignmentSubmitResponse {
        message: submit_message(existing.is_some(), status == SubmissionStatus::Late).to_string(),
        submission: saved,
        assignment: AssignmentInfo::from(spec),
        course: CourseInfo::from(&course),
        lecture: LectureInfo::from(&lecture),
    }))
}

/// Current submission state plus assignment metadata
#[utoipa::path(
    params(
        ("lecture_id", description = "lecture ID")
    ),
    responses(
        (status = 200, description = "Submission state, present or not", body = AssignmentStatusResponse),
        (status = 404, description = "Lecture, assignment or course doesn't exist", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/assignments/<lecture_id>/status")]
#[tracing::instrument]
pub async fn assignment_status(
    lecture_id: Uuid,
    auth: UserClaims,
    db: &State<Database>,
) -> Result<Json<AssignmentStatusResponse>, Problem> {
    if !auth.role.is_student() {
        return Err(auth_problem("Only students can view assignment status."));
    }

    let (lecture, course) = db.lecture_with_course(lecture_id).await?;

    let spec = lecture
        .assignment
        .as_ref()
        .ok_or_else(|| problem::assignment_not_found(lecture.id))?;

    let submission = db.find_submission(auth.sub, lecture.id).await?;

    Ok(Json(AssignmentStatusResponse {
        submitted: submission.is_some(),
        submission,
        assignment: AssignmentInfo::from(spec),
        course: CourseInfo::from(&course),
        lecture: LectureInfo::from(&lecture),
    }))
}

/// Delete the caller's own ungraded, not-past-due submission
#[utoipa::path(
    params(
        ("submission_id", description = "submission ID")
    ),
    responses(
        (status = 200, description = "Submission deleted", body = SubmissionDeletedResponse),
        (status = 403, description = "Submission belongs to another student", body = Problem),
        (status = 404, description = "Submission doesn't exist", body = Problem),
        (status = 409, description = "Submission is graded or past due", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[delete("/assignments/<submission_id>")]
#[tracing::instrument]
pub async fn assignment_delete(
    submission_id: Uuid,
    auth: UserClaims,
    db: &State<Database>,
) -> Result<Json<SubmissionDeletedResponse>, Problem> {
    if !auth.role.is_student() {
        return Err(auth_problem("Only students can delete submissions."));
    }

    let submission = db
        .find_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| problem::submission_not_found(submission_id))?;

    if submission.student_id != auth.sub {
        return Err(problem::not_owner());
    }

    let (lecture, _course) = db.lecture_with_course(submission.lecture_id).await?;
    let due_date = lecture.assignment.as_ref().and_then(|spec| spec.due_date);

    if let Some(block) = deletion_block(&submission, due_date, Utc::now()) {
        return Err(problem::delete_blocked(block));
    }

    db.delete_submission(submission.id).await?;

    Ok(Json(SubmissionDeletedResponse {
        message: "Submission deleted.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_messages_distinguish_outcomes() {
        assert_eq!(submit_message(false, false), "Assignment submitted.");
        assert_eq!(submit_message(false, true), "Late submission saved.");
        assert_eq!(submit_message(true, false), "Resubmission saved.");
    }

    #[test]
    fn status_response_shape_is_unconditional() {
        let spec = AssignmentSpec {
            title: "Essay".to_string(),
            description: None,
            file_url: None,
            due_date: None,
            allow_resubmission: true,
        };

        let response = AssignmentStatusResponse {
            submitted: false,
            submission: None,
            assignment: AssignmentInfo::from(&spec),
            course: CourseInfo {
                id: Uuid::new_v4(),
                title: "Course".to_string(),
            },
            lecture: LectureInfo {
                id: Uuid::new_v4(),
                title: "Lecture".to_string(),
            },
        };

        let json = serde_json::to_value(&response).expect("serializable");

        assert_eq!(json["submitted"], false);
        assert!(json["submission"].is_null());
        assert_eq!(json["assignment"]["allow_resubmission"], true);
    }
}
