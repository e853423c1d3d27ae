use std::collections::BTreeMap;

use rocket::{Build, Rocket, Route};

pub mod assignment;
pub mod progress;
pub mod quiz;

use assignment::*;
use progress::*;
use quiz::*;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    data::{
        assignment::{self as ad, db::AssignmentSubmission},
        lecture::{CourseInfo, LectureInfo},
        progress::db::LectureProgress,
        quiz as qd,
    },
    resp::{jwt::doc::JWTAuth, problem::Problem},
    role::Role,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        quiz_submit,
        quiz_status,
        quiz_result,
        assignment_submit,
        assignment_status,
        assignment_delete,
        progress_save,
        progress_for_course
    ),
    components(schemas(
        Role,
        qd::QuizSpec,
        qd::Question,
        qd::PublicQuestion,
        qd::AnswerInput,
        qd::AnswerRecord,
        quiz::QuizSubmission,
        quiz::QuizSubmitResponse,
        quiz::AttemptSummary,
        quiz::QuizStatusResponse,
        quiz::QuizResultResponse,
        ad::AssignmentSpec,
        ad::SubmittedFile,
        ad::SubmissionStatus,
        AssignmentSubmission,
        assignment::AssignmentSubmitRequest,
        assignment::AssignmentInfo,
        assignment::AssignmentSubmitResponse,
        assignment::AssignmentStatusResponse,
        assignment::SubmissionDeletedResponse,
        progress::ProgressSaveRequest,
        progress::ProgressSavedResponse,
        progress::ProgressListResponse,
        LectureProgress,
        CourseInfo,
        LectureInfo,
        Problem
    )),
    modifiers(&JWTAuth, &V1_PREFIX)
)]
pub struct ApiDocV1;

pub struct PathPrefix(pub &'static str);
static V1_PREFIX: PathPrefix = PathPrefix("/api/v1");

impl utoipa::Modify for PathPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut new_paths = BTreeMap::new();

        for (path, item) in std::mem::take(&mut openapi.paths.paths) {
            new_paths.insert(self.0.to_string() + path.as_ref(), item);
        }

        openapi.paths.paths = new_paths;
    }
}

pub fn api_v1() -> Vec<Route> {
    routes![
        quiz_submit,
        quiz_status,
        quiz_result,
        assignment_submit,
        assignment_status,
        assignment_delete,
        progress_save,
        progress_for_course
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api/v1", api_v1()).mount(
        "/",
        SwaggerUi::new("/swagger/<_..>").url("/api/v1/openapi.json", ApiDocV1::openapi()),
    )
}
