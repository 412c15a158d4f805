// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{
    attempt::{AttemptSummary, LeaderboardEntry},
    question::QuestionInput,
    settings::{EffectiveSettings, QuizSettingOverrides},
};
use crate::utils::nullable::deserialize_nullable;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,

    /// Time limit in seconds. Falls back to the owner's default when unset.
    pub time_duration: Option<i64>,

    /// Attempt cap per user. Falls back to the owner's default when unset.
    pub max_attempts: Option<i64>,

    pub is_archived: bool,
    pub archived_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Quiz row scoped by its subject, used for ownership checks.
#[derive(Debug, Clone, FromRow)]
pub struct QuizWithOwner {
    #[sqlx(flatten)]
    pub quiz: Quiz,
    pub owner_id: i64,
    pub subject_title: String,
}

/// DTO for creating a quiz under a subject.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 255, message = "Title length must be between 1 and 255 characters."))]
    pub title: String,
    #[validate(range(min = 0))]
    pub time_duration: Option<i64>,
    #[validate(range(min = 1))]
    pub max_attempts: Option<i64>,
    /// When true, `settings` must carry every override field.
    #[serde(default)]
    pub override_settings: bool,
    #[serde(default)]
    #[validate(nested)]
    pub settings: QuizSettingOverrides,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionInput>,
}

/// DTO for updating a quiz. Fields are optional.
///
/// `time_duration` and `max_attempts` accept an explicit `null`, which clears
/// the quiz's own value so the owner's default applies again.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 255, message = "Title length must be between 1 and 255 characters."))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(range(min = 0))]
    pub time_duration: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(range(min = 1))]
    pub max_attempts: Option<Option<i64>>,
}

/// Quiz row on the subject's quiz list.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizListItem {
    pub id: i64,
    pub title: String,
    pub time_duration: Option<i64>,
    pub is_archived: bool,
    pub total_questions: i64,
    pub user_attempt_count: i64,
    pub max_attempts: Option<i64>,
    #[sqlx(default)]
    pub user_has_attempted: bool,
    #[sqlx(default)]
    pub attempts_remaining: Option<i64>,
}

/// Four-tier label derived from a quiz's average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[serde(rename = "Very Hard")]
    VeryHard,
}

impl Difficulty {
    /// Boundary values belong to the easier tier.
    pub fn from_average(average_score: f64) -> Self {
        if average_score >= 90.0 {
            Difficulty::Easy
        } else if average_score >= 70.0 {
            Difficulty::Medium
        } else if average_score >= 50.0 {
            Difficulty::Hard
        } else {
            Difficulty::VeryHard
        }
    }
}

/// Completed attempts as a percentage of started ones. Zero when nothing was started.
pub fn completion_rate(completed: i64, started: i64) -> f64 {
    if started <= 0 {
        return 0.0;
    }
    completed as f64 / started as f64 * 100.0
}

/// Attempts left under a cap, never negative. `None` when uncapped.
pub fn attempts_remaining(max_attempts: Option<i64>, used: i64) -> Option<i64> {
    max_attempts.map(|max| (max - used).max(0))
}

/// Aggregates over every attempt on a quiz.
#[derive(Debug, Serialize)]
pub struct QuizStats {
    pub total_attempts: i64,
    pub average_score: f64,
    pub average_time: f64,
    pub completion_rate: f64,
}

/// The caller's standing on a quiz.
#[derive(Debug, Serialize)]
pub struct UserProgress {
    pub attempts: Vec<AttemptSummary>,
    pub attempt_count: i64,
    pub best_score: f64,
    pub attempts_left: Option<i64>,
    pub can_take_quiz: bool,
}

/// Full quiz page view-model.
#[derive(Debug, Serialize)]
pub struct QuizOverview {
    pub quiz: Quiz,
    pub subject_title: String,
    pub is_owner: bool,
    pub total_questions: i64,
    pub total_points: i64,
    pub settings: EffectiveSettings,
    pub user_progress: UserProgress,
    pub quiz_stats: QuizStats,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub difficulty: Difficulty,
}

/// Archived quiz row for the archive listing.
#[derive(Debug, Serialize, FromRow)]
pub struct ArchivedQuiz {
    pub id: i64,
    pub title: String,
    pub subject_id: i64,
    pub subject_title: String,
    pub archived_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_reference_points() {
        assert_eq!(Difficulty::from_average(90.0), Difficulty::Easy);
        assert_eq!(Difficulty::from_average(70.0), Difficulty::Medium);
        assert_eq!(Difficulty::from_average(50.0), Difficulty::Hard);
        assert_eq!(Difficulty::from_average(0.0), Difficulty::VeryHard);
    }

    #[test]
    fn test_difficulty_just_below_boundaries() {
        assert_eq!(Difficulty::from_average(89.99), Difficulty::Medium);
        assert_eq!(Difficulty::from_average(69.5), Difficulty::Hard);
        assert_eq!(Difficulty::from_average(49.9), Difficulty::VeryHard);
        assert_eq!(Difficulty::from_average(100.0), Difficulty::Easy);
    }

    #[test]
    fn test_difficulty_label() {
        let json = serde_json::to_value(Difficulty::VeryHard).unwrap();
        assert_eq!(json, "Very Hard");
    }

    #[test]
    fn test_completion_rate_handles_zero_started() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(3, 4), 75.0);
        assert_eq!(completion_rate(2, 2), 100.0);
    }

    #[test]
    fn test_attempts_remaining() {
        assert_eq!(attempts_remaining(None, 12), None);
        assert_eq!(attempts_remaining(Some(3), 1), Some(2));
        assert_eq!(attempts_remaining(Some(3), 5), Some(0));
    }
}
