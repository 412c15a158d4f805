// src/handlers/subject.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    config::SUBJECTS_PER_PAGE,
    db,
    error::AppError,
    models::subject::{
        CreateSubjectRequest, SubjectDetails, SubjectListItem, SubjectListParams,
        SubjectQuizSummary, UpdateSubjectRequest,
    },
    utils::{
        format::{round_to, short_duration},
        html::clean_optional,
        jwt::Claims,
        pagination::{Page, page_offset},
    },
};

/// Per-quiz aggregates for the subject details page.
#[derive(sqlx::FromRow)]
struct QuizAggregate {
    id: i64,
    title: String,
    time_duration: Option<i64>,
    total_questions: i64,
    user_attempt_count: i64,
    best_score: f64,
}

/// The caller's attempt aggregates across a subject.
#[derive(sqlx::FromRow)]
struct AttemptAggregate {
    total_attempts: i64,
    avg_accuracy: f64,
    avg_duration: f64,
}

/// Lists the caller's subjects, newest first, 15 per page.
pub async fn list_subjects(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<SubjectListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let (page, offset) = page_offset(params.page, SUBJECTS_PER_PAGE);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await?;

    let subjects = sqlx::query_as::<_, SubjectListItem>(
        r#"
        SELECT
            s.id, s.title, s.description, s.image, s.created_at, s.updated_at,
            (SELECT COUNT(*) FROM quizzes q WHERE q.subject_id = s.id) AS total_quizzes,
            EXISTS(
                SELECT 1 FROM favorites f WHERE f.subject_id = s.id AND f.user_id = $1
            ) AS is_favorited
        FROM subjects s
        WHERE s.user_id = $1
        ORDER BY s.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(SUBJECTS_PER_PAGE)
    .bind(offset)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list subjects: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(Page::new(subjects, page, SUBJECTS_PER_PAGE, total)))
}

/// Creates a subject owned by the caller.
pub async fn create_subject(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;
    let now = chrono::Utc::now();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO subjects (user_id, title, description, image, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(payload.title.trim())
    .bind(clean_optional(payload.description.as_deref()))
    .bind(payload.image.as_deref().map(str::trim))
    .bind(now)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create subject: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Subject details with the caller's progress across its active quizzes.
pub async fn get_subject(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let subject = db::find_subject(&pool, id).await?;

    let quizzes = sqlx::query_as::<_, QuizAggregate>(
        r#"
        SELECT
            q.id, q.title, q.time_duration,
            (SELECT COUNT(*) FROM questions qs WHERE qs.quiz_id = q.id) AS total_questions,
            (SELECT COUNT(*) FROM user_quizzes uq
                WHERE uq.quiz_id = q.id AND uq.user_id = $2) AS user_attempt_count,
            (SELECT COALESCE(MAX(uq.score), 0.0) FROM user_quizzes uq
                WHERE uq.quiz_id = q.id AND uq.user_id = $2) AS best_score
        FROM quizzes q
        WHERE q.subject_id = $1 AND q.is_archived = 0
        ORDER BY q.id DESC
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    let attempts = sqlx::query_as::<_, AttemptAggregate>(
        r#"
        SELECT
            COUNT(*) AS total_attempts,
            COALESCE(AVG(uq.score), 0.0) AS avg_accuracy,
            COALESCE(AVG(uq.time_spent), 0.0) AS avg_duration
        FROM user_quizzes uq
        JOIN quizzes q ON q.id = uq.quiz_id
        WHERE q.subject_id = $1
          AND q.is_archived = 0
          AND uq.user_id = $2
          AND uq.completed_at IS NOT NULL
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let total_points: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(qs.points), 0)
        FROM questions qs
        JOIN quizzes q ON q.id = qs.quiz_id
        WHERE q.subject_id = $1 AND q.is_archived = 0
        "#,
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let is_favorited: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND subject_id = $2)",
    )
    .bind(user_id)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let quizzes: Vec<SubjectQuizSummary> = quizzes
        .into_iter()
        .map(|q| SubjectQuizSummary {
            id: q.id,
            title: q.title,
            time_duration: q.time_duration.map(short_duration),
            total_questions: q.total_questions,
            user_has_attempted: q.user_attempt_count > 0,
            user_attempt_count: q.user_attempt_count,
            best_score: round_to(q.best_score, 0),
        })
        .collect();

    Ok(Json(SubjectDetails {
        id: subject.id,
        title: subject.title,
        description: subject.description,
        image: subject.image,
        created_at: subject.created_at,
        updated_at: subject.updated_at,
        is_owner: subject.user_id == user_id,
        is_favorited,
        total_quizzes: quizzes.len(),
        avg_duration: short_duration(attempts.avg_duration.round() as i64),
        avg_accuracy: round_to(attempts.avg_accuracy, 1),
        total_points,
        total_attempts: attempts.total_attempts,
        quizzes,
    }))
}

/// Updates any subset of a subject's fields. Owner only.
pub async fn update_subject(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    db::find_owned_subject(&pool, id, claims.user_id()?).await?;

    if payload.title.is_none() && payload.description.is_none() && payload.image.is_none() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE subjects SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title.trim().to_string());
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(clean_optional(Some(&description)));
    }

    if let Some(image) = payload.image {
        separated.push("image = ");
        separated.push_bind_unseparated(image.map(|url| url.trim().to_string()));
    }

    separated.push("updated_at = ");
    separated.push_bind_unseparated(chrono::Utc::now());

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update subject: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(StatusCode::OK)
}

/// Deletes a subject with everything under it. Owner only.
pub async fn delete_subject(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    db::find_owned_subject(&pool, id, claims.user_id()?).await?;

    sqlx::query("DELETE FROM subjects WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete subject: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!(subject_id = id, "Deleted subject");

    Ok(StatusCode::NO_CONTENT)
}
