// src/handlers/settings.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    db,
    error::AppError,
    models::settings::{
        QuizSettingOverrides, SystemSetting, SystemSettingRequest, UpdateQuizSettingRequest,
    },
    utils::jwt::Claims,
};

/// Returns the caller's account defaults, creating them on first access.
pub async fn get_system_settings(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let settings = db::ensure_system_settings(&pool, claims.user_id()?).await?;
    Ok(Json(settings))
}

/// Creates or replaces the caller's account defaults.
pub async fn save_system_settings(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SystemSettingRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let settings = sqlx::query_as::<_, SystemSetting>(
        r#"
        INSERT INTO system_settings (
            user_id, name, question_order, display_format, show_question_number,
            visible_timer, question_required, show_correct_answers,
            passing_threshold, time_duration, max_attempts, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
        ON CONFLICT(user_id) DO UPDATE SET
            name = excluded.name,
            question_order = excluded.question_order,
            display_format = excluded.display_format,
            show_question_number = excluded.show_question_number,
            visible_timer = excluded.visible_timer,
            question_required = excluded.question_required,
            show_correct_answers = excluded.show_correct_answers,
            passing_threshold = excluded.passing_threshold,
            time_duration = excluded.time_duration,
            max_attempts = excluded.max_attempts,
            updated_at = excluded.updated_at
        RETURNING
            id, user_id, name, question_order, display_format,
            show_question_number, visible_timer, question_required,
            show_correct_answers, passing_threshold, time_duration, max_attempts
        "#,
    )
    .bind(claims.user_id()?)
    .bind(payload.name.trim())
    .bind(payload.question_order)
    .bind(payload.display_format)
    .bind(payload.show_question_number)
    .bind(payload.visible_timer)
    .bind(payload.question_required)
    .bind(payload.show_correct_answers)
    .bind(payload.passing_threshold)
    .bind(payload.time_duration)
    .bind(payload.max_attempts)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to save system settings: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(settings))
}

/// Switches a quiz between the account defaults and a full set of overrides.
///
/// Going back to defaults clears every stored override. Opting out requires
/// every override field. Owner only.
pub async fn update_quiz_setting(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<UpdateQuizSettingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = db::find_quiz_by_id(&pool, quiz_id).await?;
    if quiz.owner_id != claims.user_id()? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let cleared = QuizSettingOverrides::default();
    let overrides = if payload.use_default_settings {
        &cleared
    } else {
        payload.overrides.require_all()?;
        &payload.overrides
    };

    sqlx::query(
        r#"
        INSERT INTO quiz_settings (
            quiz_id, use_default_settings, question_order, display_format,
            show_question_number, visible_timer, question_required,
            show_correct_answers, passing_threshold, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        ON CONFLICT(quiz_id) DO UPDATE SET
            use_default_settings = excluded.use_default_settings,
            question_order = excluded.question_order,
            display_format = excluded.display_format,
            show_question_number = excluded.show_question_number,
            visible_timer = excluded.visible_timer,
            question_required = excluded.question_required,
            show_correct_answers = excluded.show_correct_answers,
            passing_threshold = excluded.passing_threshold,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(quiz_id)
    .bind(payload.use_default_settings)
    .bind(overrides.question_order)
    .bind(overrides.display_format)
    .bind(overrides.show_question_number)
    .bind(overrides.visible_timer)
    .bind(overrides.question_required)
    .bind(overrides.show_correct_answers)
    .bind(overrides.passing_threshold)
    .bind(chrono::Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update quiz settings: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let effective = db::effective_settings(&pool, &quiz).await?;

    Ok(Json(effective))
}

/// Resolved settings a quiz runs with.
pub async fn get_effective_settings(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = db::find_quiz_by_id(&pool, quiz_id).await?;
    let effective = db::effective_settings(&pool, &quiz).await?;

    Ok(Json(effective))
}
