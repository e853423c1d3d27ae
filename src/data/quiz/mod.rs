use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

/// Time limit applied when the quiz spec doesn't carry a positive one.
pub const DEFAULT_TIME_LIMIT_SECONDS: i64 = 900;

/// Quiz definition embedded in a lecture. Owned by content authoring; this
/// service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizSpec {
    #[serde(default)]
    pub time_limit: Option<i64>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuizSpec {
    pub fn effective_time_limit(&self) -> i64 {
        self.time_limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_TIME_LIMIT_SECONDS)
    }
}

/// Answers are matched to questions by the stable `id`, never by text, so two
/// questions with identical wording stay distinguishable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Question {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Question as exposed to a student who hasn't attempted the quiz yet. The
/// correct answer must never appear in this shape.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(question: &Question) -> Self {
        PublicQuestion {
            id: question.id,
            text: question.text.clone(),
            options: question.options.clone(),
        }
    }
}

/// One submitted answer, referencing a question by its stable id.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnswerInput {
    pub question: Uuid,
    pub selected_answer: String,
}

/// Scored answer, stored on the attempt and echoed in result payloads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerRecord {
    pub question: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Outcome of grading one answer set against a quiz spec.
#[derive(Debug, Clone)]
pub struct ScoreCard {
    pub answers: Vec<AnswerRecord>,
    pub correct: i64,
    pub total: i64,
}

impl ScoreCard {
    /// Score as a percentage, rounded to two decimal places.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.correct as f64 / self.total as f64 * 10_000.0).round() / 100.0
    }
}

/// Grades a submitted answer set. Stored question order is authoritative; a
/// question with no matching answer is recorded as incorrect with an empty
/// selection, never treated as an error. Answers referencing unknown question
/// ids are ignored; the first answer wins when a question id is repeated.
pub fn score_answers(questions: &[Question], submitted: &[AnswerInput]) -> ScoreCard {
    let mut answers = Vec::with_capacity(questions.len());
    let mut correct = 0i64;

    for question in questions {
        let selected = submitted
            .iter()
            .find(|answer| answer.question == question.id)
            .map(|answer| answer.selected_answer.as_str())
            .unwrap_or("");

        let is_correct = !selected.is_empty() && selected == question.correct_answer;
        if is_correct {
            correct += 1;
        }

        answers.push(AnswerRecord {
            question: question.text.clone(),
            selected_answer: selected.to_string(),
            correct_answer: question.correct_answer.clone(),
            is_correct,
        });
    }

    ScoreCard {
        answers,
        correct,
        total: questions.len() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, correct: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: text.to_string(),
            options: vec!["red".to_string(), "green".to_string(), "blue".to_string()],
            correct_answer: correct.to_string(),
        }
    }

    fn answer(question: &Question, selected: &str) -> AnswerInput {
        AnswerInput {
            question: question.id,
            selected_answer: selected.to_string(),
        }
    }

    #[test]
    fn scores_correct_and_missing_answers() {
        let questions = vec![question("Sky color at noon?", "blue"), question("Grass?", "green")];

        let card = score_answers(&questions, &[answer(&questions[0], "blue")]);

        assert_eq!(card.total, 2);
        assert_eq!(card.correct, 1);
        assert_eq!(card.percentage(), 50.0);

        assert!(card.answers[0].is_correct);
        assert_eq!(card.answers[0].selected_answer, "blue");

        assert!(!card.answers[1].is_correct);
        assert_eq!(card.answers[1].selected_answer, "");
        assert_eq!(card.answers[1].correct_answer, "green");
    }

    #[test]
    fn breakdown_follows_stored_question_order() {
        let questions = vec![question("first", "red"), question("second", "green")];

        // Answers arrive reversed; the breakdown must not.
        let card = score_answers(
            &questions,
            &[answer(&questions[1], "green"), answer(&questions[0], "red")],
        );

        assert_eq!(card.answers[0].question, "first");
        assert_eq!(card.answers[1].question, "second");
        assert_eq!(card.correct, 2);
    }

    #[test]
    fn identical_question_text_stays_distinguishable() {
        let questions = vec![question("Pick one", "red"), question("Pick one", "green")];

        let card = score_answers(&questions, &[answer(&questions[1], "green")]);

        assert!(!card.answers[0].is_correct);
        assert!(card.answers[1].is_correct);
        assert_eq!(card.correct, 1);
    }

    #[test]
    fn unknown_and_duplicate_answers_are_tolerated() {
        let questions = vec![question("only", "red")];

        let stray = AnswerInput {
            question: Uuid::new_v4(),
            selected_answer: "red".to_string(),
        };
        let first = answer(&questions[0], "red");
        let second = answer(&questions[0], "green");

        let card = score_answers(&questions, &[stray, first, second]);

        assert_eq!(card.total, 1);
        assert_eq!(card.correct, 1, "first answer for a question wins");
    }

    #[test]
    fn wrong_selection_is_incorrect() {
        let questions = vec![question("only", "red")];

        let card = score_answers(&questions, &[answer(&questions[0], "blue")]);

        assert_eq!(card.correct, 0);
        assert_eq!(card.percentage(), 0.0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        let questions = vec![
            question("a", "red"),
            question("b", "red"),
            question("c", "red"),
        ];

        let card = score_answers(&questions, &[answer(&questions[0], "red")]);

        assert_eq!(card.percentage(), 33.33);
    }

    #[test]
    fn effective_time_limit_defaults() {
        let with_limit = QuizSpec {
            time_limit: Some(300),
            questions: vec![],
        };
        let zero_limit = QuizSpec {
            time_limit: Some(0),
            questions: vec![],
        };
        let no_limit = QuizSpec {
            time_limit: None,
            questions: vec![],
        };

        assert_eq!(with_limit.effective_time_limit(), 300);
        assert_eq!(zero_limit.effective_time_limit(), DEFAULT_TIME_LIMIT_SECONDS);
        assert_eq!(no_limit.effective_time_limit(), DEFAULT_TIME_LIMIT_SECONDS);
    }

    #[test]
    fn public_question_conceals_correct_answer() {
        let question = question("Sky color at noon?", "blue");

        let public = PublicQuestion::from(&question);
        let json = serde_json::to_value(&public).expect("serializable");

        let keys: Vec<&String> = json.as_object().expect("an object").keys().collect();
        assert!(!keys.iter().any(|k| k.contains("correct")));
        assert_eq!(json["text"], "Sky color at noon?");
    }
}
