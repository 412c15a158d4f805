// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, patch, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, auth, favorite, question, quiz, settings, subject},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * `/api/auth` is public, everything else requires a Bearer token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool and config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let subject_routes = Router::new()
        .route("/", get(subject::list_subjects).post(subject::create_subject))
        .route(
            "/{id}",
            get(subject::get_subject)
                .put(subject::update_subject)
                .delete(subject::delete_subject),
        )
        .route(
            "/{id}/quizzes",
            get(quiz::list_quizzes).post(quiz::create_quiz),
        )
        .route(
            "/{id}/quizzes/{quiz_id}",
            get(quiz::get_quiz)
                .put(quiz::update_quiz)
                .delete(quiz::delete_quiz),
        )
        .route("/{id}/quizzes/{quiz_id}/archive", post(quiz::toggle_archive))
        .route(
            "/{id}/quizzes/{quiz_id}/questions",
            get(question::list_questions).post(question::save_questions),
        )
        .route(
            "/{id}/quizzes/{quiz_id}/questions/{question_id}",
            put(question::update_question).delete(question::delete_question),
        )
        .route("/{id}/quizzes/{quiz_id}/take", get(attempt::take_quiz))
        .route("/{id}/quizzes/{quiz_id}/attempts", post(attempt::start_attempt))
        .route("/{id}/quizzes/{quiz_id}/submit", post(attempt::submit_quiz))
        .route("/{id}/quizzes/{quiz_id}/results", get(attempt::quiz_results));

    let settings_routes = Router::new()
        .route(
            "/",
            get(settings::get_system_settings).post(settings::save_system_settings),
        )
        .route("/{quiz_id}", patch(settings::update_quiz_setting))
        .route("/{quiz_id}/effective", get(settings::get_effective_settings));

    let protected_routes = Router::new()
        .nest("/subjects", subject_routes)
        .nest("/quiz-settings", settings_routes)
        .route("/attempts/{id}", delete(attempt::delete_attempt))
        .route("/recent-quizzes", get(attempt::recent_quizzes))
        .route("/archives", get(quiz::list_archives))
        .route("/favorites", get(favorite::list_favorites))
        .route("/favorites/toggle/{id}", post(favorite::toggle_favorite))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        // Global middleware, applied top to bottom
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
