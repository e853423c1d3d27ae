use bson::Document;
use mongodb::{options::IndexOptions, Database, IndexModel};

pub mod assignment;
pub mod lecture;
pub mod progress;
pub mod quiz;

fn student_lecture_index(student_key: &str) -> IndexModel {
    let mut keys = Document::new();
    keys.insert(student_key, 1);
    keys.insert("lecture_id", 1);

    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// Creates the unique compound indexes the engines rely on. The quiz attempt
/// index is the only thing preventing duplicate attempts under concurrent
/// double-submit, so startup fails if it can't be created.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    db.collection::<quiz::db::QuizAttempt>(quiz::db::ATTEMPT_COLLECTION_NAME)
        .create_index(student_lecture_index("student_id"), None)
        .await?;

    db.collection::<assignment::db::AssignmentSubmission>(
        assignment::db::SUBMISSION_COLLECTION_NAME,
    )
    .create_index(student_lecture_index("student_id"), None)
    .await?;

    db.collection::<progress::db::LectureProgress>(progress::db::PROGRESS_COLLECTION_NAME)
        .create_index(student_lecture_index("user_id"), None)
        .await?;

    Ok(())
}
