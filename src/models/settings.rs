// src/models/settings.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Order in which questions are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestionOrder {
    Sequential,
    Random,
}

/// How many questions are shown at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DisplayFormat {
    OnePerPage,
    AllOnPage,
}

/// When the answer key is revealed to the quiz taker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ShowCorrectAnswers {
    Immediately,
    AfterQuiz,
}

pub const DEFAULT_SETTINGS_NAME: &str = "Default Quiz Settings";
pub const DEFAULT_PASSING_THRESHOLD: i64 = 70;
/// 15 minutes.
pub const DEFAULT_TIME_DURATION: i64 = 900;

/// Represents the 'system_settings' table: one row of defaults per user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SystemSetting {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub question_order: QuestionOrder,
    pub display_format: DisplayFormat,
    pub show_question_number: bool,
    pub visible_timer: bool,
    pub question_required: bool,
    pub show_correct_answers: ShowCorrectAnswers,
    pub passing_threshold: i64,
    /// Default time limit in seconds.
    pub time_duration: i64,
    pub max_attempts: Option<i64>,
}

/// Represents the 'quiz_settings' table: nullable per-quiz overrides.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct QuizSetting {
    pub quiz_id: i64,
    pub use_default_settings: bool,
    pub question_order: Option<QuestionOrder>,
    pub display_format: Option<DisplayFormat>,
    pub show_question_number: Option<bool>,
    pub visible_timer: Option<bool>,
    pub question_required: Option<bool>,
    pub show_correct_answers: Option<ShowCorrectAnswers>,
    pub passing_threshold: Option<i64>,
}

/// Quiz overrides merged over the account defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveSettings {
    pub question_order: QuestionOrder,
    pub display_format: DisplayFormat,
    pub show_question_number: bool,
    pub visible_timer: bool,
    pub question_required: bool,
    pub show_correct_answers: ShowCorrectAnswers,
    pub passing_threshold: i64,
    pub time_duration: i64,
    pub max_attempts: Option<i64>,
    /// False when at least one quiz override is in effect.
    pub uses_defaults: bool,
}

impl EffectiveSettings {
    /// Merges a quiz's overrides over the owner's system settings.
    ///
    /// Presentation and grading fields take the quiz value only when the quiz
    /// has opted out of defaults and the value is set. The time limit and
    /// attempt cap belong to the quiz row itself and fall back independently.
    pub fn resolve(
        system: &SystemSetting,
        quiz: Option<&QuizSetting>,
        quiz_time_duration: Option<i64>,
        quiz_max_attempts: Option<i64>,
    ) -> Self {
        let overrides = quiz.filter(|q| !q.use_default_settings);

        let uses_defaults = match overrides {
            None => true,
            Some(q) => {
                q.question_order.is_none()
                    && q.display_format.is_none()
                    && q.show_question_number.is_none()
                    && q.visible_timer.is_none()
                    && q.question_required.is_none()
                    && q.show_correct_answers.is_none()
                    && q.passing_threshold.is_none()
            }
        };

        Self {
            question_order: overrides
                .and_then(|q| q.question_order)
                .unwrap_or(system.question_order),
            display_format: overrides
                .and_then(|q| q.display_format)
                .unwrap_or(system.display_format),
            show_question_number: overrides
                .and_then(|q| q.show_question_number)
                .unwrap_or(system.show_question_number),
            visible_timer: overrides
                .and_then(|q| q.visible_timer)
                .unwrap_or(system.visible_timer),
            question_required: overrides
                .and_then(|q| q.question_required)
                .unwrap_or(system.question_required),
            show_correct_answers: overrides
                .and_then(|q| q.show_correct_answers)
                .unwrap_or(system.show_correct_answers),
            passing_threshold: overrides
                .and_then(|q| q.passing_threshold)
                .unwrap_or(system.passing_threshold),
            time_duration: quiz_time_duration.unwrap_or(system.time_duration),
            max_attempts: quiz_max_attempts.or(system.max_attempts),
            uses_defaults,
        }
    }
}

/// DTO for saving the caller's system settings.
#[derive(Debug, Deserialize, Validate)]
pub struct SystemSettingRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub question_order: QuestionOrder,
    pub display_format: DisplayFormat,
    pub show_question_number: bool,
    pub visible_timer: bool,
    pub question_required: bool,
    pub show_correct_answers: ShowCorrectAnswers,
    #[validate(range(min = 0, max = 100))]
    pub passing_threshold: i64,
    #[validate(range(min = 0))]
    pub time_duration: i64,
    #[validate(range(min = 1))]
    pub max_attempts: Option<i64>,
}

/// Override values carried by quiz creation and quiz-setting updates.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuizSettingOverrides {
    pub question_order: Option<QuestionOrder>,
    pub display_format: Option<DisplayFormat>,
    pub show_question_number: Option<bool>,
    pub visible_timer: Option<bool>,
    pub question_required: Option<bool>,
    pub show_correct_answers: Option<ShowCorrectAnswers>,
    #[validate(range(min = 0, max = 100))]
    pub passing_threshold: Option<i64>,
}

impl QuizSettingOverrides {
    /// Every field must be present once a quiz stops using the defaults.
    pub fn require_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let missing = [
            ("question_order", self.question_order.is_none()),
            ("display_format", self.display_format.is_none()),
            ("show_question_number", self.show_question_number.is_none()),
            ("visible_timer", self.visible_timer.is_none()),
            ("question_required", self.question_required.is_none()),
            ("show_correct_answers", self.show_correct_answers.is_none()),
            ("passing_threshold", self.passing_threshold.is_none()),
        ];

        for (field, is_missing) in missing {
            if is_missing {
                let mut err = ValidationError::new("required");
                err.message = Some(format!("{field} is required when overriding defaults").into());
                errors.add(field, err);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// DTO for `PATCH /api/quiz-settings/{quiz_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuizSettingRequest {
    pub use_default_settings: bool,
    #[serde(flatten)]
    pub overrides: QuizSettingOverrides,
}

#[cfg(test)]
pub(crate) fn system_defaults(user_id: i64) -> SystemSetting {
    SystemSetting {
        id: 1,
        user_id,
        name: DEFAULT_SETTINGS_NAME.to_string(),
        question_order: QuestionOrder::Sequential,
        display_format: DisplayFormat::OnePerPage,
        show_question_number: true,
        visible_timer: true,
        question_required: true,
        show_correct_answers: ShowCorrectAnswers::AfterQuiz,
        passing_threshold: DEFAULT_PASSING_THRESHOLD,
        time_duration: DEFAULT_TIME_DURATION,
        max_attempts: None,
    }
}
