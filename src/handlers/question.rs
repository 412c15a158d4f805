// src/handlers/question.rs

use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    db,
    error::AppError,
    models::question::{ChoiceInput, QuestionInput, SaveQuestionsRequest},
    utils::{html::clean_html, jwt::Claims},
};

/// Inserts questions with their options, numbering them from `start_order`.
/// Runs on the caller's connection so it can join an open transaction.
pub(crate) async fn insert_questions(
    conn: &mut SqliteConnection,
    quiz_id: i64,
    start_order: i64,
    questions: &[QuestionInput],
) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    for (offset, input) in (0_i64..).zip(questions) {
        let question_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions (
                quiz_id, text, type, required, points, order_number,
                time_estimation, choice_order, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(quiz_id)
        .bind(clean_html(input.text.trim()))
        .bind(input.question_type)
        .bind(input.required)
        .bind(input.points)
        .bind(start_order + offset)
        .bind(input.time_estimation)
        .bind(input.choice_order)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        for (position, choice) in (1_i64..).zip(&input.choices) {
            insert_option(&mut *conn, question_id, choice, position).await?;
        }
    }

    Ok(())
}

async fn insert_option(
    conn: &mut SqliteConnection,
    question_id: i64,
    choice: &ChoiceInput,
    position: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO question_options (question_id, text, is_correct, order_number, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(question_id)
    .bind(choice.text.trim())
    .bind(choice.is_correct)
    .bind(choice.order_number.unwrap_or(position))
    .bind(chrono::Utc::now())
    .execute(conn)
    .await?;

    Ok(())
}

/// Lists a quiz's questions with their answer key. Owner only.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    db::find_owned_quiz(&pool, subject_id, quiz_id, claims.user_id()?).await?;

    let questions = db::questions_with_options(&pool, quiz_id).await?;

    Ok(Json(questions))
}

/// Appends questions after the quiz's current last question. Owner only.
pub async fn save_questions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
    Json(payload): Json<SaveQuestionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    db::find_owned_quiz(&pool, subject_id, quiz_id, claims.user_id()?).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let last_order: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(order_number), 0) FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .fetch_one(&mut *tx)
            .await?;

    insert_questions(&mut *tx, quiz_id, last_order + 1, &payload.questions)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save questions: {:?}", e);
            AppError::InternalServerError("Failed to save questions".to_string())
        })?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"created": payload.questions.len()})),
    ))
}

/// Replaces a question's fields and reconciles its options.
///
/// Choices carrying the `id` of one of its options update that option, any
/// other choice is created, and options left out are deleted. Owner only.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id, question_id)): Path<(i64, i64, i64)>,
    Json(payload): Json<QuestionInput>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    db::find_owned_quiz(&pool, subject_id, quiz_id, claims.user_id()?).await?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM questions WHERE id = $1 AND quiz_id = $2)",
    )
    .bind(question_id)
    .bind(quiz_id)
    .fetch_one(&pool)
    .await?;

    if !exists {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    let current_ids: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT id FROM question_options WHERE question_id = $1")
            .bind(question_id)
            .fetch_all(&pool)
            .await?
            .into_iter()
            .collect();

    let now = chrono::Utc::now();
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    sqlx::query(
        r#"
        UPDATE questions
        SET text = $1, type = $2, required = $3, points = $4,
            time_estimation = $5, choice_order = $6, updated_at = $7
        WHERE id = $8
        "#,
    )
    .bind(clean_html(payload.text.trim()))
    .bind(payload.question_type)
    .bind(payload.required)
    .bind(payload.points)
    .bind(payload.time_estimation)
    .bind(payload.choice_order)
    .bind(now)
    .bind(question_id)
    .execute(&mut *tx)
    .await?;

    // Ids of other questions' options count as unknown and are created fresh.
    let known_id = |choice: &ChoiceInput| choice.id.filter(|id| current_ids.contains(id));
    let kept: HashSet<i64> = payload.choices.iter().filter_map(known_id).collect();

    for id in current_ids.difference(&kept) {
        sqlx::query("DELETE FROM question_options WHERE id = $1")
            .bind(*id)
            .execute(&mut *tx)
            .await?;
    }

    for (position, choice) in (1_i64..).zip(&payload.choices) {
        match known_id(choice) {
            Some(option_id) => {
                sqlx::query(
                    r#"
                    UPDATE question_options
                    SET text = $1, is_correct = $2, order_number = $3, updated_at = $4
                    WHERE id = $5
                    "#,
                )
                .bind(choice.text.trim())
                .bind(choice.is_correct)
                .bind(choice.order_number.unwrap_or(position))
                .bind(now)
                .bind(option_id)
                .execute(&mut *tx)
                .await?;
            }
            None => insert_option(&mut *tx, question_id, choice, position).await?,
        }
    }

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let updated = db::questions_with_options(&pool, quiz_id)
        .await?
        .into_iter()
        .find(|q| q.question.id == question_id)
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a question and renumbers the remaining ones from 1. Owner only.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id, question_id)): Path<(i64, i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    db::find_owned_quiz(&pool, subject_id, quiz_id, claims.user_id()?).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let deleted = sqlx::query("DELETE FROM questions WHERE id = $1 AND quiz_id = $2")
        .bind(question_id)
        .bind(quiz_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    let remaining: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM questions WHERE quiz_id = $1 ORDER BY order_number, id",
    )
    .bind(quiz_id)
    .fetch_all(&mut *tx)
    .await?;

    for (order_number, id) in (1_i64..).zip(remaining) {
        sqlx::query("UPDATE questions SET order_number = $1 WHERE id = $2")
            .bind(order_number)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}
