// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::{Validate, ValidationError};

use crate::utils::html::has_visible_content;

/// Kind of question. Stored as snake_case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueOrFalse,
    ShortAnswer,
}

/// Whether a question's options are shuffled when the quiz is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ChoiceOrder {
    #[default]
    KeepChoicesInCurrentOrder,
    Randomize,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub quiz_id: i64,

    /// The text content of the question.
    pub text: String,

    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub question_type: QuestionType,

    /// Whether the question must be answered before submitting.
    pub required: bool,

    pub points: i64,

    /// 1-based position inside the quiz.
    pub order_number: i64,

    /// Estimated time to answer, in seconds.
    pub time_estimation: Option<i64>,

    pub choice_order: ChoiceOrder,
}

/// Represents the 'question_options' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
    pub order_number: i64,
}

/// A question with its options, as shown to the quiz owner.
#[derive(Debug, Serialize)]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: Question,
    pub options: Vec<QuestionOption>,
}

/// DTO for an option presented to a quiz taker (excludes correctness).
#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub id: i64,
    pub text: String,
}

/// DTO for a question presented to a quiz taker.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub points: i64,
    pub required: bool,
    pub time_estimation: Option<i64>,
    pub order_number: i64,
    pub options: Vec<PublicOption>,
}

/// One choice inside a question payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChoiceInput {
    /// Present when updating an existing option.
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 500, message = "Choice text must be between 1 and 500 characters."))]
    pub text: String,
    pub is_correct: bool,
    #[validate(range(min = 1))]
    pub order_number: Option<i64>,
}

/// DTO for creating or updating a question.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = validate_choices_for_type))]
pub struct QuestionInput {
    #[validate(
        length(min = 1, max = 2000, message = "Question text must be between 1 and 2000 characters."),
        custom(function = validate_visible_text)
    )]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default = "default_points")]
    #[validate(range(min = 1, max = 1000))]
    pub points: i64,
    #[serde(default = "default_required")]
    pub required: bool,
    #[validate(range(min = 0))]
    pub time_estimation: Option<i64>,
    #[serde(default)]
    pub choice_order: ChoiceOrder,
    #[validate(nested)]
    pub choices: Vec<ChoiceInput>,
}

fn default_points() -> i64 {
    1
}

fn default_required() -> bool {
    true
}

/// DTO for appending questions to a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveQuestionsRequest {
    #[validate(length(min = 1, message = "At least one question is required."), nested)]
    pub questions: Vec<QuestionInput>,
}

/// Rejects text that sanitizing would leave empty, e.g. a lone `<script>`.
fn validate_visible_text(text: &str) -> Result<(), ValidationError> {
    if !has_visible_content(text) {
        return Err(ValidationError::new("empty_after_sanitizing")
            .with_message("Question text must contain visible content.".into()));
    }
    Ok(())
}

/// Checks option counts and correctness flags against the question type.
fn validate_choices_for_type(input: &QuestionInput) -> Result<(), ValidationError> {
    let total = input.choices.len();
    let correct = input.choices.iter().filter(|c| c.is_correct).count();

    match input.question_type {
        QuestionType::MultipleChoice => {
            if total < 2 {
                return Err(ValidationError::new("multiple_choice_needs_two_choices"));
            }
            if correct == 0 {
                return Err(ValidationError::new("multiple_choice_needs_a_correct_choice"));
            }
        }
        QuestionType::TrueOrFalse => {
            if total != 2 {
                return Err(ValidationError::new("true_or_false_needs_exactly_two_choices"));
            }
            if correct != 1 {
                return Err(ValidationError::new("true_or_false_needs_one_correct_choice"));
            }
        }
        QuestionType::ShortAnswer => {
            if total == 0 {
                return Err(ValidationError::new("short_answer_needs_an_accepted_answer"));
            }
            if correct != total {
                return Err(ValidationError::new("short_answer_choices_must_all_be_correct"));
            }
        }
    }

    Ok(())
}
