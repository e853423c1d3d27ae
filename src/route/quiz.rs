use chrono::{DateTime, Utc};
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::lecture::db::ContentDbExt;
use crate::data::quiz::db::{problem, AttemptInsert, QuizAttempt, QuizAttemptDbExt};
use crate::data::quiz::{score_answers, AnswerInput, AnswerRecord, PublicQuestion};
use crate::resp::jwt::{auth_problem, UserClaims};
use crate::resp::problem::Problem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuizSubmission {
    pub answers: Vec<AnswerInput>,
    #[serde(default)]
    pub time_taken: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizSubmitResponse {
    pub message: String,
    pub student_name: String,
    pub score: i64,
    pub total_questions: i64,
    pub percentage: String,
    pub attempt_id: Uuid,
    pub result: Vec<AnswerRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttemptSummary {
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub submitted_at: DateTime<Utc>,
}

impl From<&QuizAttempt> for AttemptSummary {
    fn from(attempt: &QuizAttempt) -> Self {
        AttemptSummary {
            score: attempt.score,
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers,
            submitted_at: attempt.submitted_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum QuizStatusResponse {
    Attempted {
        attempted: bool,
        result: AttemptSummary,
    },
    Pending {
        attempted: bool,
        questions: Vec<PublicQuestion>,
        time_limit: i64,
    },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizResultResponse {
    pub score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub time_taken: i64,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<AnswerRecord>,
}

/// Submit a quiz attempt
#[utoipa::path(
    request_body(content = QuizSubmission, content_type = "application/json"),
    responses(
        (status = 200, description = "Graded attempt breakdown", body = QuizSubmitResponse),
        (status = 404, description = "Lecture or quiz doesn't exist", body = Problem),
        (status = 409, description = "Quiz was already attempted", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[post("/quiz/<lecture_id>", format = "application/json", data = "<submission>")]
#[tracing::instrument(skip(submission))]
pub async fn quiz_submit(
    lecture_id: Uuid,
    submission: Json<QuizSubmission>,
    auth: UserClaims,
    db: &State<Database>,
) -> Result<Json<QuizSubmitResponse>, Problem> {
    if !auth.role.is_student() {
        return Err(auth_problem("Only students can submit quiz attempts."));
    }

    if let Some(existing) = db.find_attempt(auth.sub, lecture_id).await? {
        return Err(problem::already_attempted(existing.id));
    }

    let lecture = db
        .find_lecture(lecture_id)
        .await?
        .ok_or_else(|| problem::quiz_not_found(lecture_id))?;

    let quiz = lecture
        .quiz
        .as_ref()
        .filter(|quiz| !quiz.questions.is_empty())
        .ok_or_else(|| problem::quiz_not_found(lecture_id))?;

    let card = score_answers(&quiz.questions, &submission.answers);

    let attempt = QuizAttempt {
        id: Uuid::new_v4(),
        student_id: auth.sub,
        student_name: auth.name.clone(),
        lecture_id,
        course_id: lecture.course_id,
        answers: card.answers.clone(),
        score: card.correct,
        total_questions: card.total,
        correct_answers: card.correct,
        // Client-reported, untrusted: clamped non-negative.
        time_taken: submission.time_taken.max(0),
        submitted_at: Utc::now(),
    };

    match db.insert_attempt(&attempt).await? {
        AttemptInsert::Inserted => {}
        // Lost the race against a concurrent submit; report the winner.
        AttemptInsert::Duplicate => {
            return Err(match db.find_attempt(auth.sub, lecture_id).await? {
                Some(winner) => problem::already_attempted(winner.id),
                None => Problem::new_untyped(
                    Status::Conflict,
                    "You have already submitted this quiz.",
                ),
            });
        }
    }

    Ok(Json(QuizSubmitResponse {
        message: "Quiz submitted successfully".to_string(),
        student_name: attempt.student_name,
        score: card.correct,
        total_questions: card.total,
        percentage: format!("{:.2}", card.percentage()),
        attempt_id: attempt.id,
        result: card.answers,
    }))
}

/// Check whether the quiz was attempted; returns the question set (without
/// correct answers) when it wasn't
#[utoipa::path(
    params(
        ("lecture_id", description = "lecture ID")
    ),
    responses(
        (status = 200, description = "Attempt summary or pending question set", body = QuizStatusResponse),
        (status = 404, description = "Lecture or quiz doesn't exist", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/quiz/<lecture_id>/status")]
#[tracing::instrument]
pub async fn quiz_status(
    lecture_id: Uuid,
    auth: UserClaims,
    db: &State<Database>,
) -> Result<Json<QuizStatusResponse>, Problem> {
    if !auth.role.is_student() {
        return Err(auth_problem("Only students can view quiz status."));
    }

    if let Some(attempt) = db.find_attempt(auth.sub, lecture_id).await? {
        return Ok(Json(QuizStatusResponse::Attempted {
            attempted: true,
            result: AttemptSummary::from(&attempt),
        }));
    }

    let lecture = db
        .find_lecture(lecture_id)
        .await?
        .ok_or_else(|| problem::quiz_not_found(lecture_id))?;

    let quiz = lecture
        .quiz
        .as_ref()
        .filter(|quiz| !quiz.questions.is_empty())
        .ok_or_else(|| problem::quiz_not_found(lecture_id))?;

    Ok(Json(QuizStatusResponse::Pending {
        attempted: false,
        questions: quiz.questions.iter().map(PublicQuestion::from).collect(),
        time_limit: quiz.effective_time_limit(),
    }))
}

/// Full scored breakdown of the caller's attempt
#[utoipa::path(
    params(
        ("lecture_id", description = "lecture ID")
    ),
    responses(
        (status = 200, description = "Stored attempt with per-question answers", body = QuizResultResponse),
        (status = 404, description = "No attempt exists for this lecture", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/quiz/<lecture_id>/result")]
#[tracing::instrument]
pub async fn quiz_result(
    lecture_id: Uuid,
    auth: UserClaims,
    db: &State<Database>,
) -> Result<Json<QuizResultResponse>, Problem> {
    if !auth.role.is_student() {
        return Err(auth_problem("Only students can view quiz results."));
    }

    let attempt = db
        .find_attempt(auth.sub, lecture_id)
        .await?
        .ok_or_else(|| problem::result_not_found(lecture_id))?;

    Ok(Json(QuizResultResponse {
        score: attempt.score,
        total_questions: attempt.total_questions,
        correct_answers: attempt.correct_answers,
        time_taken: attempt.time_taken,
        submitted_at: attempt.submitted_at,
        answers: attempt.answers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::quiz::Question;

    #[test]
    fn pending_status_payload_conceals_answers() {
        let question = Question {
            id: Uuid::new_v4(),
            text: "Sky color at noon?".to_string(),
            options: vec!["red".to_string(), "blue".to_string()],
            correct_answer: "blue".to_string(),
        };

        let status = QuizStatusResponse::Pending {
            attempted: false,
            questions: vec![PublicQuestion::from(&question)],
            time_limit: 900,
        };

        let json = serde_json::to_string(&status).expect("serializable");

        assert!(json.contains("\"attempted\":false"));
        assert!(json.contains("\"time_limit\":900"));
        assert!(
            !json.contains("correct"),
            "pending payload must not leak the answer key: {}",
            json
        );
    }

    #[test]
    fn attempted_status_payload_has_summary_only() {
        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            student_name: "Ada".to_string(),
            lecture_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            answers: vec![AnswerRecord {
                question: "q".to_string(),
                selected_answer: "a".to_string(),
                correct_answer: "a".to_string(),
                is_correct: true,
            }],
            score: 1,
            total_questions: 1,
            correct_answers: 1,
            time_taken: 30,
            submitted_at: Utc::now(),
        };

        let status = QuizStatusResponse::Attempted {
            attempted: true,
            result: AttemptSummary::from(&attempt),
        };

        let json = serde_json::to_value(&status).expect("serializable");

        assert_eq!(json["attempted"], true);
        assert_eq!(json["result"]["score"], 1);
        assert!(
            json["result"].get("answers").is_none(),
            "status must not include the per-question breakdown"
        );
    }
}
