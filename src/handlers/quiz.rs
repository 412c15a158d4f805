// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    config::{LEADERBOARD_SIZE, RECENT_ATTEMPTS_LIMIT},
    db,
    error::AppError,
    handlers::question::insert_questions,
    models::{
        attempt::{AttemptSummary, LeaderboardEntry},
        quiz::{
            ArchivedQuiz, CreateQuizRequest, Difficulty, QuizListItem, QuizOverview, QuizStats,
            UpdateQuizRequest, UserProgress, attempts_remaining, completion_rate,
        },
    },
    utils::{format::round_to, jwt::Claims},
};

/// Attempt aggregates over everyone who took a quiz.
#[derive(sqlx::FromRow)]
struct StatsRow {
    started: i64,
    completed: i64,
    average_score: f64,
    average_time: f64,
}

/// Lists every quiz of a subject with the caller's attempt counts.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    db::find_subject(&pool, subject_id).await?;

    let mut quizzes = sqlx::query_as::<_, QuizListItem>(
        r#"
        SELECT
            q.id, q.title, q.time_duration, q.is_archived, q.max_attempts,
            (SELECT COUNT(*) FROM questions qs WHERE qs.quiz_id = q.id) AS total_questions,
            (SELECT COUNT(*) FROM user_quizzes uq
                WHERE uq.quiz_id = q.id AND uq.user_id = $2) AS user_attempt_count
        FROM quizzes q
        WHERE q.subject_id = $1
        ORDER BY q.id DESC
        "#,
    )
    .bind(subject_id)
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list quizzes: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    for quiz in &mut quizzes {
        quiz.user_has_attempted = quiz.user_attempt_count > 0;
        quiz.attempts_remaining = attempts_remaining(quiz.max_attempts, quiz.user_attempt_count);
    }

    Ok(Json(quizzes))
}

/// Creates a quiz with its settings row and any initial questions, atomically.
/// Owner only.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(subject_id): Path<i64>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if payload.override_settings {
        payload.settings.require_all()?;
    }

    db::find_owned_subject(&pool, subject_id, claims.user_id()?).await?;

    let now = chrono::Utc::now();
    let overrides = payload
        .override_settings
        .then_some(&payload.settings);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let quiz_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quizzes (subject_id, title, time_duration, max_attempts, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id
        "#,
    )
    .bind(subject_id)
    .bind(payload.title.trim())
    .bind(payload.time_duration)
    .bind(payload.max_attempts)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError("Failed to create quiz".to_string())
    })?;

    sqlx::query(
        r#"
        INSERT INTO quiz_settings (
            quiz_id, use_default_settings, question_order, display_format,
            show_question_number, visible_timer, question_required,
            show_correct_answers, passing_threshold, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        "#,
    )
    .bind(quiz_id)
    .bind(!payload.override_settings)
    .bind(overrides.and_then(|s| s.question_order))
    .bind(overrides.and_then(|s| s.display_format))
    .bind(overrides.and_then(|s| s.show_question_number))
    .bind(overrides.and_then(|s| s.visible_timer))
    .bind(overrides.and_then(|s| s.question_required))
    .bind(overrides.and_then(|s| s.show_correct_answers))
    .bind(overrides.and_then(|s| s.passing_threshold))
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz settings: {:?}", e);
        AppError::InternalServerError("Failed to create quiz".to_string())
    })?;

    insert_questions(&mut *tx, quiz_id, 1, &payload.questions)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz questions: {:?}", e);
            AppError::InternalServerError("Failed to create quiz".to_string())
        })?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(quiz_id, subject_id, "Created quiz with {} questions", payload.questions.len());

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": quiz_id}))))
}

/// Quiz page: effective settings, the caller's progress, global stats,
/// leaderboard and difficulty.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let quiz = db::find_quiz(&pool, subject_id, quiz_id).await?;
    let settings = db::effective_settings(&pool, &quiz).await?;

    let (total_questions, total_points): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(points), 0) FROM questions WHERE quiz_id = $1",
    )
    .bind(quiz_id)
    .fetch_one(&pool)
    .await?;

    let attempts = sqlx::query_as::<_, AttemptSummary>(
        r#"
        SELECT id, attempt_number, score, time_spent, started_at, completed_at
        FROM user_quizzes
        WHERE quiz_id = $1 AND user_id = $2
        ORDER BY id DESC
        LIMIT $3
        "#,
    )
    .bind(quiz_id)
    .bind(user_id)
    .bind(RECENT_ATTEMPTS_LIMIT)
    .fetch_all(&pool)
    .await?;

    let (attempt_count, best_score): (i64, f64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(MAX(score), 0.0)
        FROM user_quizzes
        WHERE quiz_id = $1 AND user_id = $2
        "#,
    )
    .bind(quiz_id)
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let stats = sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT
            COUNT(*) AS started,
            COUNT(completed_at) AS completed,
            COALESCE(AVG(CASE WHEN completed_at IS NOT NULL THEN score END), 0.0) AS average_score,
            COALESCE(AVG(CASE WHEN completed_at IS NOT NULL THEN time_spent END), 0.0) AS average_time
        FROM user_quizzes
        WHERE quiz_id = $1
        "#,
    )
    .bind(quiz_id)
    .fetch_one(&pool)
    .await?;

    let leaderboard = sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT uq.id, u.username, uq.score, uq.time_spent, uq.completed_at
        FROM user_quizzes uq
        JOIN users u ON u.id = uq.user_id
        WHERE uq.quiz_id = $1 AND uq.completed_at IS NOT NULL
        ORDER BY uq.score DESC, uq.time_spent ASC, uq.id ASC
        LIMIT $2
        "#,
    )
    .bind(quiz_id)
    .bind(LEADERBOARD_SIZE)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let attempts_left = attempts_remaining(settings.max_attempts, attempt_count);
    let average_score = round_to(stats.average_score, 2);

    Ok(Json(QuizOverview {
        is_owner: quiz.owner_id == user_id,
        subject_title: quiz.subject_title,
        quiz: quiz.quiz,
        total_questions,
        total_points,
        user_progress: UserProgress {
            attempts,
            attempt_count,
            best_score,
            attempts_left,
            can_take_quiz: attempts_left != Some(0),
        },
        quiz_stats: QuizStats {
            total_attempts: stats.started,
            average_score,
            average_time: round_to(stats.average_time, 1),
            completion_rate: round_to(completion_rate(stats.completed, stats.started), 2),
        },
        leaderboard,
        difficulty: Difficulty::from_average(average_score),
        settings,
    }))
}

/// Updates the title, time limit or attempt cap of a quiz. Owner only.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    db::find_owned_quiz(&pool, subject_id, quiz_id, claims.user_id()?).await?;

    if payload.title.is_none() && payload.time_duration.is_none() && payload.max_attempts.is_none()
    {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE quizzes SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title.trim().to_string());
    }

    // Some(None) clears the column back to the owner's default.
    if let Some(time_duration) = payload.time_duration {
        separated.push("time_duration = ");
        separated.push_bind_unseparated(time_duration);
    }

    if let Some(max_attempts) = payload.max_attempts {
        separated.push("max_attempts = ");
        separated.push_bind_unseparated(max_attempts);
    }

    separated.push("updated_at = ");
    separated.push_bind_unseparated(chrono::Utc::now());

    builder.push(" WHERE id = ");
    builder.push_bind(quiz_id);

    builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(StatusCode::OK)
}

/// Deletes a quiz with its questions and attempts. Owner only.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    db::find_owned_quiz(&pool, subject_id, quiz_id, claims.user_id()?).await?;

    sqlx::query("DELETE FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete quiz: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Flips the archived flag of a quiz. Owner only.
pub async fn toggle_archive(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    db::find_owned_quiz(&pool, subject_id, quiz_id, claims.user_id()?).await?;

    let is_archived: bool = sqlx::query_scalar(
        r#"
        UPDATE quizzes
        SET is_archived = NOT is_archived,
            archived_at = CASE WHEN is_archived THEN NULL ELSE $2 END,
            updated_at = $2
        WHERE id = $1
        RETURNING is_archived
        "#,
    )
    .bind(quiz_id)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to toggle quiz archive: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(serde_json::json!({
        "quiz_id": quiz_id,
        "is_archived": is_archived,
    })))
}

/// Lists archived quizzes across the caller's subjects.
pub async fn list_archives(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let archived = sqlx::query_as::<_, ArchivedQuiz>(
        r#"
        SELECT q.id, q.title, q.subject_id, s.title AS subject_title, q.archived_at
        FROM quizzes q
        JOIN subjects s ON s.id = q.subject_id
        WHERE s.user_id = $1 AND q.is_archived = 1
        ORDER BY q.archived_at DESC, q.id DESC
        "#,
    )
    .bind(claims.user_id()?)
    .fetch_all(&pool)
    .await?;

    Ok(Json(archived))
}
