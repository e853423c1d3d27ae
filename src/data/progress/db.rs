use chrono::{DateTime, Utc};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Database;
use rocket::futures::StreamExt;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::resp::problem::Problem;

pub static PROGRESS_COLLECTION_NAME: &str = "lecture.progress";

/// Periodic watch-time snapshot per `(user_id, lecture_id)`, overwritten on
/// every save.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LectureProgress {
    #[serde(rename = "_id", default = "Uuid::new_v4")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub lecture_id: Uuid,

    pub watch_time: f64,
    pub duration: f64,
    pub completed: bool,

    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

pub mod filter {
    use bson::{doc, Document};
    use uuid::Uuid;

    #[inline]
    pub fn by_user_and_lecture(user_id: Uuid, lecture_id: Uuid) -> Document {
        doc! {
            "user_id": user_id.to_string(),
            "lecture_id": lecture_id.to_string(),
        }
    }

    #[inline]
    pub fn by_user_and_course(user_id: Uuid, course_id: Uuid) -> Document {
        doc! {
            "user_id": user_id.to_string(),
            "course_id": course_id.to_string(),
        }
    }
}

pub trait ProgressDbExt {
    async fn upsert_progress(&self, progress: &LectureProgress) -> Result<(), Problem>;

    async fn progress_for_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<LectureProgress>, Problem>;
}

impl ProgressDbExt for Database {
    async fn upsert_progress(&self, progress: &LectureProgress) -> Result<(), Problem> {
        let mut fields = bson::to_document(progress)?;
        let id = fields
            .remove("_id")
            .expect("progress documents carry an _id");

        let update = bson::doc! {
            "$set": fields,
            "$setOnInsert": { "_id": id },
        };

        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<LectureProgress>(PROGRESS_COLLECTION_NAME)
            .find_one_and_update(
                filter::by_user_and_lecture(progress.user_id, progress.lecture_id),
                update,
                options,
            )
            .await
            .map_err(Problem::from)?;

        Ok(())
    }

    async fn progress_for_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<LectureProgress>, Problem> {
        let mut cursor = self
            .collection::<LectureProgress>(PROGRESS_COLLECTION_NAME)
            .find(filter::by_user_and_course(user_id, course_id), None)
            .await
            .map_err(Problem::from)?;

        let mut records = vec![];
        while let Some(result) = cursor.next().await {
            match result {
                Ok(progress) => records.push(progress),
                Err(_) => {
                    tracing::warn!("Unable to deserialize LectureProgress document.")
                }
            }
        }

        Ok(records)
    }
}
