use chrono::{DateTime, Utc};
use mongodb::Database;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::resp::problem::Problem;

use super::AnswerRecord;

pub static ATTEMPT_COLLECTION_NAME: &str = "quiz.responses";

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;
    use uuid::Uuid;

    #[inline]
    pub fn quiz_not_found(lecture_id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "Quiz not found for this lecture.")
            .insert_str("lecture_id", lecture_id)
            .clone()
    }

    #[inline]
    pub fn already_attempted(attempt_id: Uuid) -> Problem {
        Problem::new_untyped(Status::Conflict, "You have already submitted this quiz.")
            .insert_str("attempt_id", attempt_id)
            .clone()
    }

    #[inline]
    pub fn result_not_found(lecture_id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "Quiz result not found.")
            .insert_str("lecture_id", lecture_id)
            .clone()
    }
}

/// One student's graded quiz attempt. Created exactly once per
/// `(student_id, lecture_id)` and never mutated afterwards; the unique index
/// created at startup is what enforces the pair under concurrent submits.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizAttempt {
    #[serde(rename = "_id", default = "Uuid::new_v4")]
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub lecture_id: Uuid,
    pub course_id: Uuid,

    pub answers: Vec<AnswerRecord>,
    pub score: i64,
    pub total_questions: i64,
    // Kept alongside `score` for parity with older records; always equal.
    pub correct_answers: i64,
    pub time_taken: i64,

    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
}

/// Result of attempting to persist an attempt.
#[derive(Debug)]
pub enum AttemptInsert {
    Inserted,
    /// The unique index rejected the write; another attempt already exists.
    Duplicate,
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::BulkWrite(bulk) => bulk
            .write_errors
            .as_ref()
            .map_or(false, |errors| errors.iter().any(|e| e.code == 11000)),
        _ => false,
    }
}

pub trait QuizAttemptDbExt {
    async fn find_attempt(
        &self,
        student_id: Uuid,
        lecture_id: Uuid,
    ) -> Result<Option<QuizAttempt>, Problem>;

    /// Inserts atomically; a concurrent duplicate loses against the unique
    /// index and is reported as [`AttemptInsert::Duplicate`], not an error.
    async fn insert_attempt(&self, attempt: &QuizAttempt) -> Result<AttemptInsert, Problem>;
}

pub mod filter {
    use bson::{doc, Document};
    use uuid::Uuid;

    #[inline]
    pub fn by_student_and_lecture(student_id: Uuid, lecture_id: Uuid) -> Document {
        doc! {
            "student_id": student_id.to_string(),
            "lecture_id": lecture_id.to_string(),
        }
    }
}

impl QuizAttemptDbExt for Database {
    async fn find_attempt(
        &self,
        student_id: Uuid,
        lecture_id: Uuid,
    ) -> Result<Option<QuizAttempt>, Problem> {
        self.collection(ATTEMPT_COLLECTION_NAME)
            .find_one(filter::by_student_and_lecture(student_id, lecture_id), None)
            .await
            .map_err(Problem::from)
    }

    async fn insert_attempt(&self, attempt: &QuizAttempt) -> Result<AttemptInsert, Problem> {
        match self
            .collection::<QuizAttempt>(ATTEMPT_COLLECTION_NAME)
            .insert_one(attempt, None)
            .await
        {
            Ok(_) => Ok(AttemptInsert::Inserted),
            Err(e) if is_duplicate_key(&e) => Ok(AttemptInsert::Duplicate),
            Err(e) => Err(Problem::from(e)),
        }
    }
}
