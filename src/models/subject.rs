// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

use crate::utils::nullable::deserialize_nullable;

/// Represents the 'subjects' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,

    /// Owner of the subject.
    pub user_id: i64,

    pub title: String,

    pub description: Option<String>,

    /// URL of the cover image.
    pub image: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Row of the subject index, joined with per-user aggregates.
#[derive(Debug, Serialize, FromRow)]
pub struct SubjectListItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub total_quizzes: i64,
    pub is_favorited: bool,
}

/// DTO for creating a new subject.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 characters."
    ))]
    pub title: String,

    #[validate(length(max = 300, message = "Description must be at most 300 characters."))]
    pub description: Option<String>,

    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub image: Option<String>,
}

/// DTO for updating a subject. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubjectRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 characters."
    ))]
    pub title: Option<String>,

    #[validate(length(max = 300, message = "Description must be at most 300 characters."))]
    pub description: Option<String>,

    /// An explicit `null` removes the cover image.
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub image: Option<Option<String>>,
}

/// Query parameters for the subject index.
#[derive(Debug, Deserialize)]
pub struct SubjectListParams {
    /// 1-based page number (default: 1).
    pub page: Option<i64>,
}

/// Quiz summary shown on the subject details page.
#[derive(Debug, Serialize)]
pub struct SubjectQuizSummary {
    pub id: i64,
    pub title: String,
    /// Human readable time limit, e.g. "15m".
    pub time_duration: Option<String>,
    pub total_questions: i64,
    pub user_has_attempted: bool,
    pub user_attempt_count: i64,
    pub best_score: f64,
}

/// Subject details with the caller's aggregates.
#[derive(Debug, Serialize)]
pub struct SubjectDetails {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_owner: bool,
    pub is_favorited: bool,
    pub total_quizzes: usize,
    pub avg_duration: String,
    pub avg_accuracy: f64,
    pub total_points: i64,
    pub total_attempts: i64,
    pub quizzes: Vec<SubjectQuizSummary>,
}

/// Favorited subject with its quiz count.
#[derive(Debug, Serialize, FromRow)]
pub struct FavoriteSubject {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub total_quizzes: i64,
    pub favorited_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_subject_accepts_missing_image() {
        let req = CreateSubjectRequest {
            title: "Biology".to_string(),
            description: None,
            image: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_subject_rejects_bad_url() {
        let req = CreateSubjectRequest {
            title: "Biology".to_string(),
            description: Some("Cells and more".to_string()),
            image: Some("not a url".to_string()),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("image"));
    }

    #[test]
    fn test_create_subject_rejects_long_title() {
        let req = CreateSubjectRequest {
            title: "x".repeat(101),
            description: None,
            image: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }
}
