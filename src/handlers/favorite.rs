// src/handlers/favorite.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{db, error::AppError, models::subject::FavoriteSubject, utils::jwt::Claims};

/// Lists the caller's favorited subjects, most recently favorited first.
pub async fn list_favorites(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let favorites = sqlx::query_as::<_, FavoriteSubject>(
        r#"
        SELECT
            s.id, s.title, s.description, s.image,
            (SELECT COUNT(*) FROM quizzes q WHERE q.subject_id = s.id) AS total_quizzes,
            f.created_at AS favorited_at
        FROM favorites f
        JOIN subjects s ON s.id = f.subject_id
        WHERE f.user_id = $1
        ORDER BY f.rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list favorites: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(favorites))
}

/// Toggles the favorite mark on a subject for the caller.
pub async fn toggle_favorite(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    db::find_subject(&pool, subject_id).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let removed = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND subject_id = $2")
        .bind(user_id)
        .bind(subject_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .rows_affected();

    let is_favorited = removed == 0;

    if is_favorited {
        sqlx::query("INSERT INTO favorites (user_id, subject_id, created_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(subject_id)
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "subject_id": subject_id,
        "is_favorited": is_favorited,
    })))
}
