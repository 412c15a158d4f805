// src/db.rs

use std::str::FromStr;
use std::time::Duration;

use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    error::AppError,
    models::{
        question::{Question, QuestionOption, QuestionWithOptions},
        quiz::QuizWithOwner,
        settings::{DEFAULT_SETTINGS_NAME, EffectiveSettings, QuizSetting, SystemSetting},
        subject::Subject,
    },
};

/// Embedded schema migrations from `./migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a pool on the given SQLite URL, creating the file if needed.
/// Foreign keys are enforced on every connection.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

const QUIZ_WITH_OWNER: &str = r#"
    SELECT
        q.id, q.subject_id, q.title, q.time_duration, q.max_attempts,
        q.is_archived, q.archived_at, q.created_at, q.updated_at,
        s.user_id AS owner_id,
        s.title AS subject_title
    FROM quizzes q
    JOIN subjects s ON s.id = q.subject_id
"#;

/// Loads a subject by id.
pub async fn find_subject(pool: &SqlitePool, id: i64) -> Result<Subject, AppError> {
    sqlx::query_as::<_, Subject>(
        r#"
        SELECT id, user_id, title, description, image, created_at, updated_at
        FROM subjects
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Subject not found".to_string()))
}

/// Loads a subject the caller owns. Other users' subjects read as missing.
pub async fn find_owned_subject(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<Subject, AppError> {
    let subject = find_subject(pool, id).await?;
    if subject.user_id != user_id {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }
    Ok(subject)
}

/// Loads a quiz and checks that it lives under `subject_id`.
pub async fn find_quiz(
    pool: &SqlitePool,
    subject_id: i64,
    quiz_id: i64,
) -> Result<QuizWithOwner, AppError> {
    let quiz = find_quiz_by_id(pool, quiz_id).await?;
    if quiz.quiz.subject_id != subject_id {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }
    Ok(quiz)
}

/// Loads a quiz with its owner regardless of subject.
pub async fn find_quiz_by_id(pool: &SqlitePool, quiz_id: i64) -> Result<QuizWithOwner, AppError> {
    sqlx::query_as::<_, QuizWithOwner>(&format!("{QUIZ_WITH_OWNER} WHERE q.id = $1"))
        .bind(quiz_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

/// Loads a quiz under a subject the caller owns.
pub async fn find_owned_quiz(
    pool: &SqlitePool,
    subject_id: i64,
    quiz_id: i64,
    user_id: i64,
) -> Result<QuizWithOwner, AppError> {
    let quiz = find_quiz(pool, subject_id, quiz_id).await?;
    if quiz.owner_id != user_id {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }
    Ok(quiz)
}

/// Returns the user's system settings, creating the default row on first use.
pub async fn ensure_system_settings(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<SystemSetting, AppError> {
    sqlx::query(
        r#"
        INSERT INTO system_settings (user_id, name)
        VALUES ($1, $2)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(DEFAULT_SETTINGS_NAME)
    .execute(pool)
    .await?;

    let settings = sqlx::query_as::<_, SystemSetting>(
        r#"
        SELECT
            id, user_id, name, question_order, display_format,
            show_question_number, visible_timer, question_required,
            show_correct_answers, passing_threshold, time_duration, max_attempts
        FROM system_settings
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(settings)
}

/// Loads the override row of a quiz, if one was ever written.
pub async fn find_quiz_setting(
    pool: &SqlitePool,
    quiz_id: i64,
) -> Result<Option<QuizSetting>, AppError> {
    let setting = sqlx::query_as::<_, QuizSetting>(
        r#"
        SELECT
            quiz_id, use_default_settings, question_order, display_format,
            show_question_number, visible_timer, question_required,
            show_correct_answers, passing_threshold
        FROM quiz_settings
        WHERE quiz_id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?;

    Ok(setting)
}

/// Resolves the settings a quiz runs with, using the quiz owner's defaults.
pub async fn effective_settings(
    pool: &SqlitePool,
    quiz: &QuizWithOwner,
) -> Result<EffectiveSettings, AppError> {
    let system = ensure_system_settings(pool, quiz.owner_id).await?;
    let quiz_setting = find_quiz_setting(pool, quiz.quiz.id).await?;

    Ok(EffectiveSettings::resolve(
        &system,
        quiz_setting.as_ref(),
        quiz.quiz.time_duration,
        quiz.quiz.max_attempts,
    ))
}

/// Loads a quiz's questions in order, each with its options in order.
pub async fn questions_with_options(
    pool: &SqlitePool,
    quiz_id: i64,
) -> Result<Vec<QuestionWithOptions>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT
            id, quiz_id, text, type, required, points,
            order_number, time_estimation, choice_order
        FROM questions
        WHERE quiz_id = $1
        ORDER BY order_number, id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let options = sqlx::query_as::<_, QuestionOption>(
        r#"
        SELECT o.id, o.question_id, o.text, o.is_correct, o.order_number
        FROM question_options o
        JOIN questions q ON q.id = o.question_id
        WHERE q.quiz_id = $1
        ORDER BY o.order_number, o.id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    Ok(group_options(questions, options))
}

/// Attaches options to their questions, preserving both orderings.
fn group_options(
    questions: Vec<Question>,
    options: Vec<QuestionOption>,
) -> Vec<QuestionWithOptions> {
    let mut grouped: Vec<QuestionWithOptions> = questions
        .into_iter()
        .map(|question| QuestionWithOptions {
            question,
            options: Vec::new(),
        })
        .collect();

    for option in options {
        if let Some(entry) = grouped
            .iter_mut()
            .find(|q| q.question.id == option.question_id)
        {
            entry.options.push(option);
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{ChoiceOrder, QuestionType};

    fn question(id: i64, order_number: i64) -> Question {
        Question {
            id,
            quiz_id: 1,
            text: format!("Q{id}"),
            question_type: QuestionType::MultipleChoice,
            required: true,
            points: 1,
            order_number,
            time_estimation: None,
            choice_order: ChoiceOrder::KeepChoicesInCurrentOrder,
        }
    }

    fn option(id: i64, question_id: i64) -> QuestionOption {
        QuestionOption {
            id,
            question_id,
            text: format!("O{id}"),
            is_correct: id % 2 == 0,
            order_number: id,
        }
    }

    #[test]
    fn test_group_options_keeps_order() {
        let grouped = group_options(
            vec![question(2, 1), question(1, 2)],
            vec![option(10, 1), option(11, 2), option(12, 1), option(99, 3)],
        );

        assert_eq!(grouped[0].question.id, 2);
        assert_eq!(
            grouped[0].options.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![11]
        );
        assert_eq!(
            grouped[1].options.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![10, 12]
        );
    }
}
