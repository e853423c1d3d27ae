use chrono::{DateTime, Utc};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Database;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::resp::problem::Problem;

use super::{SubmissionStatus, SubmittedFile};

pub static SUBMISSION_COLLECTION_NAME: &str = "assignment.submissions";

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;
    use uuid::Uuid;

    use super::super::{DeleteBlock, WindowBlock};

    #[inline]
    pub fn assignment_not_found(lecture_id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "Assignment not found for this lecture.")
            .insert_str("lecture_id", lecture_id)
            .clone()
    }

    #[inline]
    pub fn submission_not_found(id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "Submission not found.")
            .insert_str("submission_id", id)
            .clone()
    }

    #[inline]
    pub fn no_files() -> Problem {
        Problem::new_untyped(Status::BadRequest, "At least one file required.")
    }

    #[inline]
    pub fn course_mismatch() -> Problem {
        Problem::new_untyped(Status::BadRequest, "course_id mismatch with lecture.")
    }

    #[inline]
    pub fn not_owner() -> Problem {
        Problem::new_untyped(Status::Forbidden, "Not your submission.")
    }

    #[inline]
    pub fn window_blocked(block: WindowBlock) -> Problem {
        let title = match block {
            WindowBlock::AlreadyGraded => "Submission already graded. Resubmission not allowed.",
            WindowBlock::ResubmissionDisabled => "Resubmission disabled.",
            WindowBlock::PastDue => "Past due date. Resubmission not allowed.",
        };
        Problem::new_untyped(Status::Conflict, title)
    }

    #[inline]
    pub fn delete_blocked(block: DeleteBlock) -> Problem {
        let title = match block {
            DeleteBlock::Graded => "Cannot delete graded submission.",
            DeleteBlock::PastDue => "Cannot delete after due date.",
        };
        Problem::new_untyped(Status::Conflict, title)
    }
}

/// A student's assignment submission. One record per
/// `(student_id, lecture_id)`; resubmission overwrites it in place, so only
/// the latest submission is ever queryable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentSubmission {
    #[serde(rename = "_id", default = "Uuid::new_v4")]
    pub id: Uuid,
    pub student_id: Uuid,
    pub lecture_id: Uuid,
    pub course_id: Uuid,

    pub files: Vec<SubmittedFile>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,

    pub status: SubmissionStatus,
    #[serde(default)]
    pub is_late: bool,

    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
}

impl AssignmentSubmission {
    /// Grading is recorded either through `status` or by setting a grade or
    /// score directly; any of the three marks the record immutable.
    pub fn is_graded(&self) -> bool {
        self.status == SubmissionStatus::Graded || self.grade.is_some() || self.score.is_some()
    }
}

pub mod filter {
    use bson::{doc, Document};
    use uuid::Uuid;

    #[inline]
    pub fn by_id(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }

    #[inline]
    pub fn by_student_and_lecture(student_id: Uuid, lecture_id: Uuid) -> Document {
        doc! {
            "student_id": student_id.to_string(),
            "lecture_id": lecture_id.to_string(),
        }
    }
}

pub trait SubmissionDbExt {
    async fn find_submission(
        &self,
        student_id: Uuid,
        lecture_id: Uuid,
    ) -> Result<Option<AssignmentSubmission>, Problem>;

    async fn find_submission_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AssignmentSubmission>, Problem>;

    /// Upserts on `(student_id, lecture_id)`: the prior record's files,
    /// remarks, status and timestamp are overwritten, its `_id` is kept.
    async fn upsert_submission(
        &self,
        submission: &AssignmentSubmission,
    ) -> Result<AssignmentSubmission, Problem>;

    async fn delete_submission(&self, id: Uuid) -> Result<(), Problem>;
}

impl SubmissionDbExt for Database {
    async fn find_submission(
        &self,
        student_id: Uuid,
        lecture_id: Uuid,
    ) -> Result<Option<AssignmentSubmission>, Problem> {
        self.collection(SUBMISSION_COLLECTION_NAME)
            .find_one(filter::by_student_and_lecture(student_id, lecture_id), None)
            .await
            .map_err(Problem::from)
    }

    async fn find_submission_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AssignmentSubmission>, Problem> {
        self.collection(SUBMISSION_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn upsert_submission(
        &self,
        submission: &AssignmentSubmission,
    ) -> Result<AssignmentSubmission, Problem> {
        let mut fields = bson::to_document(submission)?;
        let id = fields
            .remove("_id")
            .expect("submission documents carry an _id");

        let update = bson::doc! {
            "$set": fields,
            "$setOnInsert": { "_id": id },
        };

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection::<AssignmentSubmission>(SUBMISSION_COLLECTION_NAME)
            .find_one_and_update(
                filter::by_student_and_lecture(submission.student_id, submission.lecture_id),
                update,
                options,
            )
            .await
            .map_err(Problem::from)?;

        updated.ok_or_else(|| {
            Problem::new_untyped(
                rocket::http::Status::InternalServerError,
                "Submission upsert returned no document.",
            )
        })
    }

    async fn delete_submission(&self, id: Uuid) -> Result<(), Problem> {
        self.collection::<AssignmentSubmission>(SUBMISSION_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)?;

        Ok(())
    }
}
