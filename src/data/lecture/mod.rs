use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

use crate::data::assignment::AssignmentSpec;
use crate::data::quiz::QuizSpec;

pub static COURSE_COLLECTION_NAME: &str = "courses";
pub static LECTURE_COLLECTION_NAME: &str = "lectures";

/// Course document, as authored by the instructor tooling. Only the fields
/// this service reads are modeled; authoring owns the rest.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Course {
    #[serde(rename = "_id", default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
}

/// A content unit belonging to a course, optionally carrying an embedded quiz
/// and/or assignment spec.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lecture {
    #[serde(rename = "_id", default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub course_id: Uuid,

    #[serde(default)]
    pub quiz: Option<QuizSpec>,
    #[serde(default)]
    pub assignment: Option<AssignmentSpec>,
}

/// Course summary denormalized into engine responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseInfo {
    pub id: Uuid,
    pub title: String,
}

impl From<&Course> for CourseInfo {
    fn from(course: &Course) -> Self {
        CourseInfo {
            id: course.id,
            title: course.title.clone(),
        }
    }
}

/// Lecture summary denormalized into engine responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LectureInfo {
    pub id: Uuid,
    pub title: String,
}

impl From<&Lecture> for LectureInfo {
    fn from(lecture: &Lecture) -> Self {
        LectureInfo {
            id: lecture.id,
            title: lecture.title.clone(),
        }
    }
}

pub mod filter {
    use bson::{doc, Document};
    use uuid::Uuid;

    #[inline]
    pub fn by_id(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }
}
