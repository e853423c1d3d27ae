use mongodb::Database;
use uuid::Uuid;

use crate::resp::problem::Problem;

use super::{filter, Course, Lecture, COURSE_COLLECTION_NAME, LECTURE_COLLECTION_NAME};

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;
    use uuid::Uuid;

    #[inline]
    pub fn lecture_not_found(id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "Lecture not found.")
            .insert_str("lecture_id", id)
            .clone()
    }

    #[inline]
    pub fn course_not_found(id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "Course not found for this lecture.")
            .insert_str("course_id", id)
            .clone()
    }
}

/// Read-only access to content authored elsewhere. The engines never write to
/// these collections.
pub trait ContentDbExt {
    async fn find_lecture(&self, id: Uuid) -> Result<Option<Lecture>, Problem>;

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, Problem>;

    /// Resolves a lecture together with its owning course, failing with
    /// `NotFound` problems when either is missing.
    async fn lecture_with_course(&self, lecture_id: Uuid) -> Result<(Lecture, Course), Problem>;
}

impl ContentDbExt for Database {
    async fn find_lecture(&self, id: Uuid) -> Result<Option<Lecture>, Problem> {
        self.collection(LECTURE_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, Problem> {
        self.collection(COURSE_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn lecture_with_course(&self, lecture_id: Uuid) -> Result<(Lecture, Course), Problem> {
        let lecture = self
            .find_lecture(lecture_id)
            .await?
            .ok_or_else(|| problem::lecture_not_found(lecture_id))?;

        let course = self
            .find_course(lecture.course_id)
            .await?
            .ok_or_else(|| problem::course_not_found(lecture.course_id))?;

        Ok((lecture, course))
    }
}
