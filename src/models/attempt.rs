// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{
    question::{PublicQuestion, QuestionOption, QuestionType},
    settings::EffectiveSettings,
};

/// Represents the 'user_quizzes' table: one attempt of a user on a quiz.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserQuiz {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub attempt_number: i64,
    /// Percentage, set once the attempt is completed.
    pub score: Option<f64>,
    pub earned_points: Option<i64>,
    pub total_points: Option<i64>,
    pub total_questions_answered: i64,
    /// Seconds.
    pub time_spent: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'user_answers' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAnswer {
    pub id: i64,
    pub user_quiz_id: i64,
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub short_answer_text: Option<String>,
    pub is_correct: bool,
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

/// Compact attempt row for history lists.
#[derive(Debug, Serialize, FromRow)]
pub struct AttemptSummary {
    pub id: i64,
    pub attempt_number: i64,
    pub score: Option<f64>,
    pub time_spent: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregated struct for displaying the leaderboard.
/// Represents a row joined from `users` and `user_quizzes`.
#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub username: String,
    pub score: f64,
    pub time_spent: i64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Entry of the caller's recent-quizzes feed.
#[derive(Debug, Serialize, FromRow)]
pub struct RecentQuiz {
    pub id: i64,
    pub quiz_id: i64,
    pub subject_id: i64,
    pub title: String,
    pub subject_title: String,
    pub score: Option<f64>,
    pub questions_count: i64,
    pub time_spent: i64,
    pub time_duration: Option<i64>,
    pub attempt_number: i64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One answered question in a submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    /// Chosen option for multiple-choice and true-or-false questions.
    pub selected_option_id: Option<i64>,
    /// Free text for short-answer questions.
    #[validate(length(max = 1000))]
    pub short_answer_text: Option<String>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    /// In-progress attempt to complete. A fresh attempt is created when absent.
    pub attempt_id: Option<i64>,

    /// Seconds spent, used when no started attempt is referenced. At most a year.
    #[validate(range(min = 0, max = 31_536_000))]
    pub time_spent: Option<i64>,

    #[validate(nested)]
    pub answers: Vec<SubmittedAnswer>,
}

/// Correctness of one answer, revealed when the quiz shows answers immediately.
#[derive(Debug, Serialize)]
pub struct AnswerFeedback {
    pub question_id: i64,
    pub is_correct: bool,
    pub correct_option_ids: Vec<i64>,
}

/// Result returned after a submission.
#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub attempt_id: i64,
    pub attempt_number: i64,
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub earned_points: i64,
    pub total_points: i64,
    pub passed: bool,
    pub passing_threshold: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<AnswerFeedback>>,
}

/// Response of starting an attempt.
#[derive(Debug, Serialize)]
pub struct StartAttemptResponse {
    pub attempt_id: i64,
    pub attempt_number: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub time_duration: i64,
}

/// Quiz as presented to a taker.
#[derive(Debug, Serialize)]
pub struct TakeQuizView {
    pub id: i64,
    pub title: String,
    pub subject_id: i64,
    pub subject_title: String,
    pub settings: EffectiveSettings,
    pub questions: Vec<PublicQuestion>,
}

/// The caller's answer to one question on the results page.
#[derive(Debug, Serialize)]
pub struct ResultAnswer {
    pub selected_option_id: Option<i64>,
    pub short_answer_text: Option<String>,
    pub is_correct: bool,
}

/// One question on the results page, with its answer key.
#[derive(Debug, Serialize)]
pub struct ResultQuestion {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub points: i64,
    pub required: bool,
    pub order_number: i64,
    pub options: Vec<QuestionOption>,
    pub user_answer: Option<ResultAnswer>,
}

/// Results page view-model.
#[derive(Debug, Serialize)]
pub struct QuizResults {
    pub quiz_id: i64,
    pub title: String,
    pub subject_id: i64,
    pub subject_title: String,
    pub user_quiz: UserQuiz,
    pub passed: bool,
    pub questions: Vec<ResultQuestion>,
}

/// Query parameters for the results page.
#[derive(Debug, Deserialize)]
pub struct ResultsParams {
    pub attempt_id: Option<i64>,
}
