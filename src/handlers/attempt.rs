// src/handlers/attempt.rs

use std::collections::{HashMap, HashSet};

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::seq::SliceRandom;
use sqlx::{SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    config::RECENT_QUIZZES_LIMIT,
    db,
    error::AppError,
    models::{
        attempt::{
            AnswerFeedback, QuizResults, RecentQuiz, ResultAnswer, ResultQuestion, ResultsParams,
            StartAttemptResponse, SubmitQuizRequest, SubmitQuizResponse, SubmittedAnswer,
            TakeQuizView, UserAnswer, UserQuiz,
        },
        question::{ChoiceOrder, PublicOption, PublicQuestion, QuestionType, QuestionWithOptions},
        quiz::QuizWithOwner,
        settings::{QuestionOrder, ShowCorrectAnswers},
    },
    utils::{format::round_to, jwt::Claims},
};

const USER_QUIZ_COLUMNS: &str = r#"
    id, user_id, quiz_id, attempt_number, score, earned_points, total_points,
    total_questions_answered, time_spent, started_at, completed_at
"#;

/// One graded answer, ready to be stored.
#[derive(Debug)]
struct GradedAnswer {
    question_id: i64,
    selected_option_id: Option<i64>,
    short_answer_text: Option<String>,
    is_correct: bool,
    correct_option_ids: Vec<i64>,
}

/// Outcome of grading a submission against a quiz's answer key.
#[derive(Debug)]
struct ScoredSubmission {
    answers: Vec<GradedAnswer>,
    correct_count: usize,
    answered_count: usize,
    earned_points: i64,
    total_points: i64,
    score: f64,
}

/// Grades submitted answers against the answer key.
///
/// Rejects answers to questions outside the quiz, duplicate answers, and
/// options that belong to another question. When `enforce_required` is set,
/// every required question must carry an answer.
fn score_submission(
    questions: &[QuestionWithOptions],
    submitted: &[SubmittedAnswer],
    enforce_required: bool,
) -> Result<ScoredSubmission, AppError> {
    let by_id: HashMap<i64, &QuestionWithOptions> =
        questions.iter().map(|q| (q.question.id, q)).collect();

    let mut seen = HashSet::new();
    let mut answers = Vec::with_capacity(submitted.len());

    for answer in submitted {
        let question = by_id.get(&answer.question_id).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Question {} does not belong to this quiz",
                answer.question_id
            ))
        })?;

        if !seen.insert(answer.question_id) {
            return Err(AppError::BadRequest(format!(
                "Question {} was answered more than once",
                answer.question_id
            )));
        }

        if let Some(option_id) = answer.selected_option_id {
            if !question.options.iter().any(|o| o.id == option_id) {
                return Err(AppError::BadRequest(format!(
                    "Option {} does not belong to question {}",
                    option_id, answer.question_id
                )));
            }
        }

        let short_answer_text = answer
            .short_answer_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let is_correct = match question.question.question_type {
            QuestionType::MultipleChoice | QuestionType::TrueOrFalse => answer
                .selected_option_id
                .is_some_and(|id| question.options.iter().any(|o| o.id == id && o.is_correct)),
            QuestionType::ShortAnswer => short_answer_text.is_some_and(|text| {
                question
                    .options
                    .iter()
                    .any(|o| o.is_correct && o.text.trim().eq_ignore_ascii_case(text))
            }),
        };

        answers.push(GradedAnswer {
            question_id: answer.question_id,
            selected_option_id: answer.selected_option_id,
            short_answer_text: short_answer_text.map(str::to_string),
            is_correct,
            correct_option_ids: question
                .options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.id)
                .collect(),
        });
    }

    // An answer only counts when it has the shape its question type expects.
    let answered: HashSet<i64> = answers
        .iter()
        .filter(|a| {
            by_id.get(&a.question_id).is_some_and(|q| match q.question.question_type {
                QuestionType::MultipleChoice | QuestionType::TrueOrFalse => {
                    a.selected_option_id.is_some()
                }
                QuestionType::ShortAnswer => a.short_answer_text.is_some(),
            })
        })
        .map(|a| a.question_id)
        .collect();

    if enforce_required {
        let missing: Vec<String> = questions
            .iter()
            .filter(|q| q.question.required && !answered.contains(&q.question.id))
            .map(|q| q.question.id.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Required questions were not answered: {}",
                missing.join(", ")
            )));
        }
    }

    let total_points: i64 = questions.iter().map(|q| q.question.points).sum();
    let earned_points: i64 = answers
        .iter()
        .filter(|a| a.is_correct)
        .filter_map(|a| by_id.get(&a.question_id))
        .map(|q| q.question.points)
        .sum();
    let correct_count = answers.iter().filter(|a| a.is_correct).count();

    let score = if total_points == 0 {
        0.0
    } else {
        round_to(earned_points as f64 / total_points as f64 * 100.0, 2)
    };

    Ok(ScoredSubmission {
        answered_count: answered.len(),
        answers,
        correct_count,
        earned_points,
        total_points,
        score,
    })
}

/// Issues the next attempt number for (user, quiz) inside the caller's transaction.
/// The counter is never decremented, so deleted attempts leave gaps.
async fn next_attempt_number(
    conn: &mut SqliteConnection,
    user_id: i64,
    quiz_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO attempt_counters (user_id, quiz_id, last_attempt_number)
        VALUES ($1, $2, 1)
        ON CONFLICT(user_id, quiz_id) DO UPDATE
            SET last_attempt_number = last_attempt_number + 1
        RETURNING last_attempt_number
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_one(conn)
    .await
}

/// Fails with 403 once the user has used every allowed attempt.
async fn ensure_attempts_left(
    conn: &mut SqliteConnection,
    user_id: i64,
    quiz_id: i64,
    max_attempts: Option<i64>,
) -> Result<(), AppError> {
    let Some(max_attempts) = max_attempts else {
        return Ok(());
    };

    let used: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_quizzes WHERE user_id = $1 AND quiz_id = $2")
            .bind(user_id)
            .bind(quiz_id)
            .fetch_one(conn)
            .await?;

    if used >= max_attempts {
        return Err(AppError::Forbidden(
            "Maximum number of attempts reached".to_string(),
        ));
    }

    Ok(())
}

fn ensure_active(quiz: &QuizWithOwner) -> Result<(), AppError> {
    if quiz.quiz.is_archived {
        return Err(AppError::Forbidden("Quiz is archived".to_string()));
    }
    Ok(())
}

fn submit_failed(e: sqlx::Error) -> AppError {
    tracing::error!("Failed to submit quiz: {:?}", e);
    AppError::InternalServerError("Failed to submit quiz".to_string())
}

/// Quiz as presented to a taker: no answer key, ordered per the effective settings.
pub async fn take_quiz(
    State(pool): State<SqlitePool>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = db::find_quiz(&pool, subject_id, quiz_id).await?;
    ensure_active(&quiz)?;

    let settings = db::effective_settings(&pool, &quiz).await?;
    let questions = db::questions_with_options(&pool, quiz_id).await?;

    let mut rng = rand::thread_rng();
    let mut public: Vec<PublicQuestion> = questions
        .into_iter()
        .map(|q| {
            let mut options: Vec<PublicOption> = q
                .options
                .into_iter()
                .map(|o| PublicOption {
                    id: o.id,
                    text: o.text,
                })
                .collect();

            if q.question.choice_order == ChoiceOrder::Randomize {
                options.shuffle(&mut rng);
            }

            PublicQuestion {
                id: q.question.id,
                text: q.question.text,
                question_type: q.question.question_type,
                points: q.question.points,
                required: q.question.required,
                time_estimation: q.question.time_estimation,
                order_number: q.question.order_number,
                options,
            }
        })
        .collect();

    if settings.question_order == QuestionOrder::Random {
        public.shuffle(&mut rng);
    }

    Ok(Json(TakeQuizView {
        id: quiz.quiz.id,
        title: quiz.quiz.title,
        subject_id: quiz.quiz.subject_id,
        subject_title: quiz.subject_title,
        settings,
        questions: public,
    }))
}

/// Opens an in-progress attempt and allocates its number.
pub async fn start_attempt(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let quiz = db::find_quiz(&pool, subject_id, quiz_id).await?;
    ensure_active(&quiz)?;
    let settings = db::effective_settings(&pool, &quiz).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    ensure_attempts_left(&mut *tx, user_id, quiz_id, settings.max_attempts).await?;

    let attempt_number = next_attempt_number(&mut *tx, user_id, quiz_id).await?;
    let started_at = chrono::Utc::now();

    let attempt_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO user_quizzes (user_id, quiz_id, attempt_number, started_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(attempt_number)
    .bind(started_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to start attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(StartAttemptResponse {
            attempt_id,
            attempt_number,
            started_at,
            time_duration: settings.time_duration,
        }),
    ))
}

/// Scores a submission and stores the attempt with its answers atomically.
///
/// With `attempt_id` the named in-progress attempt is completed and its
/// duration measured from `started_at`. Without it a new attempt is created.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let quiz = db::find_quiz(&pool, subject_id, quiz_id).await?;
    ensure_active(&quiz)?;
    let settings = db::effective_settings(&pool, &quiz).await?;
    let questions = db::questions_with_options(&pool, quiz_id).await?;

    let scored = score_submission(&questions, &payload.answers, settings.question_required)?;
    let now = chrono::Utc::now();

    let mut tx = pool.begin().await.map_err(submit_failed)?;

    let (attempt_id, attempt_number) = match payload.attempt_id {
        Some(attempt_id) => {
            let attempt = sqlx::query_as::<_, UserQuiz>(&format!(
                "SELECT {USER_QUIZ_COLUMNS} FROM user_quizzes WHERE id = $1 AND user_id = $2 AND quiz_id = $3"
            ))
            .bind(attempt_id)
            .bind(user_id)
            .bind(quiz_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(submit_failed)?
            .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

            if attempt.completed_at.is_some() {
                return Err(AppError::Conflict(
                    "Attempt has already been submitted".to_string(),
                ));
            }

            let time_spent = (now - attempt.started_at).num_seconds().max(0);

            sqlx::query(
                r#"
                UPDATE user_quizzes
                SET score = $1, earned_points = $2, total_points = $3,
                    total_questions_answered = $4, time_spent = $5, completed_at = $6
                WHERE id = $7
                "#,
            )
            .bind(scored.score)
            .bind(scored.earned_points)
            .bind(scored.total_points)
            .bind(scored.answered_count as i64)
            .bind(time_spent)
            .bind(now)
            .bind(attempt_id)
            .execute(&mut *tx)
            .await
            .map_err(submit_failed)?;

            (attempt_id, attempt.attempt_number)
        }
        None => {
            ensure_attempts_left(&mut *tx, user_id, quiz_id, settings.max_attempts).await?;

            let attempt_number = next_attempt_number(&mut *tx, user_id, quiz_id)
                .await
                .map_err(submit_failed)?;
            let time_spent = payload.time_spent.unwrap_or(0);
            let started_at = chrono::TimeDelta::try_seconds(time_spent)
                .and_then(|spent| now.checked_sub_signed(spent))
                .ok_or_else(|| AppError::BadRequest("time_spent is out of range".to_string()))?;

            let attempt_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO user_quizzes (
                    user_id, quiz_id, attempt_number, score, earned_points, total_points,
                    total_questions_answered, time_spent, started_at, completed_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id
                "#,
            )
            .bind(user_id)
            .bind(quiz_id)
            .bind(attempt_number)
            .bind(scored.score)
            .bind(scored.earned_points)
            .bind(scored.total_points)
            .bind(scored.answered_count as i64)
            .bind(time_spent)
            .bind(started_at)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(submit_failed)?;

            (attempt_id, attempt_number)
        }
    };

    for answer in &scored.answers {
        sqlx::query(
            r#"
            INSERT INTO user_answers (
                user_quiz_id, question_id, selected_option_id, short_answer_text,
                is_correct, answered_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(attempt_id)
        .bind(answer.question_id)
        .bind(answer.selected_option_id)
        .bind(answer.short_answer_text.as_deref())
        .bind(answer.is_correct)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(submit_failed)?;
    }

    tx.commit().await.map_err(submit_failed)?;

    tracing::info!(
        user_id,
        quiz_id,
        attempt_number,
        "Quiz submitted with score {}",
        scored.score
    );

    let feedback = (settings.show_correct_answers == ShowCorrectAnswers::Immediately).then(|| {
        scored
            .answers
            .iter()
            .map(|a| AnswerFeedback {
                question_id: a.question_id,
                is_correct: a.is_correct,
                correct_option_ids: a.correct_option_ids.clone(),
            })
            .collect()
    });

    Ok(Json(SubmitQuizResponse {
        attempt_id,
        attempt_number,
        score: scored.score,
        correct_count: scored.correct_count,
        total_questions: questions.len(),
        earned_points: scored.earned_points,
        total_points: scored.total_points,
        passed: scored.score >= settings.passing_threshold as f64,
        passing_threshold: settings.passing_threshold,
        answers: feedback,
    }))
}

/// Results of the caller's latest completed attempt, or of the one named.
pub async fn quiz_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path((subject_id, quiz_id)): Path<(i64, i64)>,
    Query(params): Query<ResultsParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let quiz = db::find_quiz(&pool, subject_id, quiz_id).await?;

    let attempt = match params.attempt_id {
        Some(attempt_id) => sqlx::query_as::<_, UserQuiz>(&format!(
            r#"
            SELECT {USER_QUIZ_COLUMNS} FROM user_quizzes
            WHERE id = $1 AND user_id = $2 AND quiz_id = $3 AND completed_at IS NOT NULL
            "#
        ))
        .bind(attempt_id)
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&pool)
        .await?,
        None => sqlx::query_as::<_, UserQuiz>(&format!(
            r#"
            SELECT {USER_QUIZ_COLUMNS} FROM user_quizzes
            WHERE user_id = $1 AND quiz_id = $2 AND completed_at IS NOT NULL
            ORDER BY completed_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&pool)
        .await?,
    }
    .ok_or(AppError::NotFound("No completed attempt found".to_string()))?;

    let settings = db::effective_settings(&pool, &quiz).await?;
    let questions = db::questions_with_options(&pool, quiz_id).await?;

    let mut answers: HashMap<i64, UserAnswer> = sqlx::query_as::<_, UserAnswer>(
        r#"
        SELECT id, user_quiz_id, question_id, selected_option_id, short_answer_text,
               is_correct, answered_at
        FROM user_answers
        WHERE user_quiz_id = $1
        "#,
    )
    .bind(attempt.id)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .map(|a| (a.question_id, a))
    .collect();

    let questions = questions
        .into_iter()
        .map(|q| ResultQuestion {
            user_answer: answers.remove(&q.question.id).map(|a| ResultAnswer {
                selected_option_id: a.selected_option_id,
                short_answer_text: a.short_answer_text,
                is_correct: a.is_correct,
            }),
            id: q.question.id,
            text: q.question.text,
            question_type: q.question.question_type,
            points: q.question.points,
            required: q.question.required,
            order_number: q.question.order_number,
            options: q.options,
        })
        .collect();

    Ok(Json(QuizResults {
        quiz_id,
        title: quiz.quiz.title,
        subject_id: quiz.quiz.subject_id,
        subject_title: quiz.subject_title,
        passed: attempt.score.unwrap_or(0.0) >= settings.passing_threshold as f64,
        user_quiz: attempt,
        questions,
    }))
}

/// Deletes one of the caller's attempts with its answers.
pub async fn delete_attempt(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM user_quizzes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(claims.user_id()?)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete attempt: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Attempt not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// The caller's most recent attempts across all quizzes.
pub async fn recent_quizzes(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let recent = sqlx::query_as::<_, RecentQuiz>(
        r#"
        SELECT
            uq.id, uq.quiz_id, q.subject_id, q.title, s.title AS subject_title,
            uq.score,
            (SELECT COUNT(*) FROM questions qs WHERE qs.quiz_id = q.id) AS questions_count,
            uq.time_spent, q.time_duration, uq.attempt_number, uq.completed_at
        FROM user_quizzes uq
        JOIN quizzes q ON q.id = uq.quiz_id
        JOIN subjects s ON s.id = q.subject_id
        WHERE uq.user_id = $1
        ORDER BY COALESCE(uq.completed_at, uq.started_at) DESC, uq.id DESC
        LIMIT $2
        "#,
    )
    .bind(claims.user_id()?)
    .bind(RECENT_QUIZZES_LIMIT)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch recent quizzes: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(recent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Question, QuestionOption};

    fn question(
        id: i64,
        question_type: QuestionType,
        points: i64,
        required: bool,
        options: &[(i64, &str, bool)],
    ) -> QuestionWithOptions {
        QuestionWithOptions {
            question: Question {
                id,
                quiz_id: 1,
                text: format!("Question {id}"),
                question_type,
                required,
                points,
                order_number: id,
                time_estimation: None,
                choice_order: ChoiceOrder::KeepChoicesInCurrentOrder,
            },
            options: options
                .iter()
                .map(|(option_id, text, is_correct)| QuestionOption {
                    id: *option_id,
                    question_id: id,
                    text: text.to_string(),
                    is_correct: *is_correct,
                    order_number: *option_id,
                })
                .collect(),
        }
    }

    fn sample_quiz() -> Vec<QuestionWithOptions> {
        vec![
            question(
                1,
                QuestionType::MultipleChoice,
                2,
                true,
                &[(10, "Paris", true), (11, "Rome", false)],
            ),
            question(
                2,
                QuestionType::TrueOrFalse,
                1,
                true,
                &[(20, "True", true), (21, "False", false)],
            ),
            question(
                3,
                QuestionType::ShortAnswer,
                1,
                false,
                &[(30, "Mitochondria", true)],
            ),
        ]
    }

    fn pick(question_id: i64, option_id: i64) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_option_id: Some(option_id),
            short_answer_text: None,
        }
    }

    fn write(question_id: i64, text: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_option_id: None,
            short_answer_text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_score_submission_perfect() {
        let answers = vec![pick(1, 10), pick(2, 20), write(3, "  mitochondria ")];
        let scored = score_submission(&sample_quiz(), &answers, true).unwrap();

        assert_eq!(scored.correct_count, 3);
        assert_eq!(scored.earned_points, 4);
        assert_eq!(scored.total_points, 4);
        assert_eq!(scored.score, 100.0);
    }

    #[test]
    fn test_score_submission_weights_by_points() {
        let answers = vec![pick(1, 11), pick(2, 20), write(3, "mitochondria")];
        let scored = score_submission(&sample_quiz(), &answers, true).unwrap();

        assert_eq!(scored.correct_count, 2);
        assert_eq!(scored.earned_points, 2);
        assert_eq!(scored.score, 50.0);
    }

    #[test]
    fn test_score_submission_rounds_to_two_decimals() {
        let questions = vec![
            question(1, QuestionType::TrueOrFalse, 1, true, &[(10, "True", true), (11, "False", false)]),
            question(2, QuestionType::TrueOrFalse, 1, true, &[(20, "True", true), (21, "False", false)]),
            question(3, QuestionType::TrueOrFalse, 1, true, &[(30, "True", true), (31, "False", false)]),
        ];
        let answers = vec![pick(1, 10), pick(2, 21), pick(3, 31)];
        let scored = score_submission(&questions, &answers, true).unwrap();

        assert_eq!(scored.score, 33.33);
        assert!(scored.earned_points <= scored.total_points);
    }

    #[test]
    fn test_score_submission_zero() {
        let answers = vec![pick(1, 11), pick(2, 21), write(3, "nucleus")];
        let scored = score_submission(&sample_quiz(), &answers, true).unwrap();

        assert_eq!(scored.correct_count, 0);
        assert_eq!(scored.score, 0.0);
    }

    #[test]
    fn test_score_submission_empty_quiz_scores_zero() {
        let scored = score_submission(&[], &[], true).unwrap();
        assert_eq!(scored.total_points, 0);
        assert_eq!(scored.score, 0.0);
    }

    #[test]
    fn test_score_submission_rejects_foreign_question() {
        let answers = vec![pick(1, 10), pick(2, 20), pick(99, 10)];
        assert!(score_submission(&sample_quiz(), &answers, false).is_err());
    }

    #[test]
    fn test_score_submission_rejects_duplicate_answers() {
        let answers = vec![pick(1, 10), pick(1, 11), pick(2, 20)];
        assert!(score_submission(&sample_quiz(), &answers, false).is_err());
    }

    #[test]
    fn test_score_submission_rejects_option_of_other_question() {
        let answers = vec![pick(1, 20), pick(2, 20)];
        assert!(score_submission(&sample_quiz(), &answers, false).is_err());
    }

    #[test]
    fn test_score_submission_required_questions() {
        // Question 3 is optional, question 2 is not.
        let answers = vec![pick(1, 10)];
        assert!(score_submission(&sample_quiz(), &answers, true).is_err());

        let scored = score_submission(&sample_quiz(), &answers, false).unwrap();
        assert_eq!(scored.answered_count, 1);
        assert_eq!(scored.score, 50.0);

        let answers = vec![pick(1, 10), pick(2, 21)];
        assert!(score_submission(&sample_quiz(), &answers, true).is_ok());
    }

    #[test]
    fn test_score_submission_text_does_not_answer_a_choice_question() {
        let answers = vec![write(1, "Paris"), pick(2, 20)];
        assert!(score_submission(&sample_quiz(), &answers, true).is_err());

        let scored = score_submission(&sample_quiz(), &answers, false).unwrap();
        assert_eq!(scored.answered_count, 1);
        assert!(!scored.answers[0].is_correct);
    }

    #[test]
    fn test_score_submission_option_does_not_answer_a_short_answer_question() {
        let mut quiz = sample_quiz();
        quiz[2].question.required = true;

        let answers = vec![pick(1, 10), pick(2, 20), pick(3, 30)];
        assert!(score_submission(&quiz, &answers, true).is_err());

        let answers = vec![pick(1, 10), pick(2, 20), write(3, "   ")];
        assert!(score_submission(&quiz, &answers, true).is_err());

        let answers = vec![pick(1, 10), pick(2, 20), write(3, "mitochondria")];
        assert_eq!(score_submission(&quiz, &answers, true).unwrap().answered_count, 3);
    }

    #[test]
    fn test_score_submission_reports_answer_key() {
        let answers = vec![pick(1, 11), pick(2, 20)];
        let scored = score_submission(&sample_quiz(), &answers, false).unwrap();

        assert!(!scored.answers[0].is_correct);
        assert_eq!(scored.answers[0].correct_option_ids, vec![10]);
        assert!(scored.answers[1].is_correct);
    }
}
