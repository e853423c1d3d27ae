use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

use db::AssignmentSubmission;

fn true_bool() -> bool {
    true
}

/// Assignment definition embedded in a lecture. Owned by content authoring.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentSpec {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default = "true_bool")]
    pub allow_resubmission: bool,
}

/// One file reference attached to a submission. Files are uploaded elsewhere;
/// only resolved URLs reach this service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmittedFile {
    pub file_url: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Late,
    Resubmitted,
    Graded,
}

/// Why a submission attempt was rejected by the window policy.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WindowBlock {
    AlreadyGraded,
    ResubmissionDisabled,
    PastDue,
}

/// Why a deletion request was rejected.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeleteBlock {
    Graded,
    PastDue,
}

/// The attempt window: decides whether a (re)submission is accepted and which
/// status it lands with, from the assignment's due date and resubmission flag.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionWindow {
    pub due_date: Option<DateTime<Utc>>,
    pub allow_resubmission: bool,
}

impl From<&AssignmentSpec> for SubmissionWindow {
    fn from(spec: &AssignmentSpec) -> Self {
        SubmissionWindow {
            due_date: spec.due_date,
            allow_resubmission: spec.allow_resubmission,
        }
    }
}

impl SubmissionWindow {
    pub fn past_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date.map_or(false, |due| now > due)
    }

    /// Policy table:
    ///
    /// | existing | past due | allow resub | outcome                |
    /// |----------|----------|-------------|------------------------|
    /// | no       | no       | -           | submitted              |
    /// | no       | yes      | -           | late                   |
    /// | yes      | no       | yes         | resubmitted            |
    /// | yes      | no       | no          | ResubmissionDisabled   |
    /// | yes      | yes      | any         | PastDue                |
    ///
    /// A graded existing submission is never overwritten, whatever the rest
    /// of the table says.
    pub fn evaluate(
        &self,
        existing: Option<&AssignmentSubmission>,
        now: DateTime<Utc>,
    ) -> Result<SubmissionStatus, WindowBlock> {
        if existing.map_or(false, AssignmentSubmission::is_graded) {
            return Err(WindowBlock::AlreadyGraded);
        }

        let past_due = self.past_due(now);

        match (existing.is_some(), past_due) {
            (false, false) => Ok(SubmissionStatus::Submitted),
            (false, true) => Ok(SubmissionStatus::Late),
            (true, false) if self.allow_resubmission => Ok(SubmissionStatus::Resubmitted),
            (true, false) => Err(WindowBlock::ResubmissionDisabled),
            (true, true) => Err(WindowBlock::PastDue),
        }
    }
}

/// Deletion is a student-initiated rollback: only ungraded submissions, and
/// only while the window is still open.
pub fn deletion_block(
    submission: &AssignmentSubmission,
    due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DeleteBlock> {
    if submission.is_graded() {
        return Some(DeleteBlock::Graded);
    }

    if due_date.map_or(false, |due| now > due) {
        return Some(DeleteBlock::PastDue);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn submission(status: SubmissionStatus) -> AssignmentSubmission {
        AssignmentSubmission {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            lecture_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            files: vec![SubmittedFile {
                file_url: "https://cdn.example.com/essay.pdf".to_string(),
                file_name: Some("essay.pdf".to_string()),
            }],
            remarks: None,
            grade: None,
            score: None,
            status,
            is_late: false,
            submitted_at: Utc::now(),
        }
    }

    fn window(due_in: Option<Duration>, allow_resubmission: bool) -> (SubmissionWindow, DateTime<Utc>) {
        let now = Utc::now();
        (
            SubmissionWindow {
                due_date: due_in.map(|offset| now + offset),
                allow_resubmission,
            },
            now,
        )
    }

    #[test]
    fn first_submission_before_due() {
        let (w, now) = window(Some(Duration::days(1)), true);
        assert_eq!(w.evaluate(None, now), Ok(SubmissionStatus::Submitted));
    }

    #[test]
    fn first_submission_after_due_is_accepted_late() {
        let (w, now) = window(Some(Duration::days(-1)), true);
        assert_eq!(w.evaluate(None, now), Ok(SubmissionStatus::Late));
    }

    #[test]
    fn resubmission_before_due_when_allowed() {
        let (w, now) = window(Some(Duration::days(1)), true);
        let existing = submission(SubmissionStatus::Submitted);
        assert_eq!(
            w.evaluate(Some(&existing), now),
            Ok(SubmissionStatus::Resubmitted)
        );
    }

    #[test]
    fn resubmission_before_due_when_disabled() {
        let (w, now) = window(Some(Duration::days(1)), false);
        let existing = submission(SubmissionStatus::Submitted);
        assert_eq!(
            w.evaluate(Some(&existing), now),
            Err(WindowBlock::ResubmissionDisabled)
        );
    }

    #[test]
    fn resubmission_after_due_is_blocked_regardless_of_flag() {
        let existing = submission(SubmissionStatus::Submitted);

        for allow in [true, false] {
            let (w, now) = window(Some(Duration::days(-1)), allow);
            assert_eq!(w.evaluate(Some(&existing), now), Err(WindowBlock::PastDue));
        }
    }

    #[test]
    fn no_due_date_never_counts_as_late() {
        let (w, now) = window(None, true);
        assert_eq!(w.evaluate(None, now), Ok(SubmissionStatus::Submitted));

        let existing = submission(SubmissionStatus::Submitted);
        assert_eq!(
            w.evaluate(Some(&existing), now),
            Ok(SubmissionStatus::Resubmitted)
        );
    }

    #[test]
    fn graded_submission_is_never_overwritten() {
        let mut graded = submission(SubmissionStatus::Submitted);
        graded.grade = Some("A".to_string());

        // Even in the most permissive window.
        let (w, now) = window(Some(Duration::days(1)), true);
        assert_eq!(
            w.evaluate(Some(&graded), now),
            Err(WindowBlock::AlreadyGraded)
        );

        let by_status = submission(SubmissionStatus::Graded);
        assert_eq!(
            w.evaluate(Some(&by_status), now),
            Err(WindowBlock::AlreadyGraded)
        );
    }

    #[test]
    fn deletion_blocked_for_graded() {
        let now = Utc::now();

        let mut with_score = submission(SubmissionStatus::Submitted);
        with_score.score = Some(87.5);
        assert_eq!(
            deletion_block(&with_score, None, now),
            Some(DeleteBlock::Graded)
        );

        let plain = submission(SubmissionStatus::Graded);
        assert_eq!(deletion_block(&plain, None, now), Some(DeleteBlock::Graded));
    }

    #[test]
    fn deletion_blocked_after_due_date() {
        let now = Utc::now();
        let s = submission(SubmissionStatus::Submitted);

        assert_eq!(
            deletion_block(&s, Some(now - Duration::hours(1)), now),
            Some(DeleteBlock::PastDue)
        );
        assert_eq!(deletion_block(&s, Some(now + Duration::hours(1)), now), None);
        assert_eq!(deletion_block(&s, None, now), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Resubmitted).unwrap(),
            "\"resubmitted\""
        );
        assert_eq!(
            serde_json::from_str::<SubmissionStatus>("\"late\"").unwrap(),
            SubmissionStatus::Late
        );
    }
}
