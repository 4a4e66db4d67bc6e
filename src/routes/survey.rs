use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::answers::{normalize_submission, SubmitError};
use crate::models::{ErrorResponse, ReloadResponse, SubmitSurveyRequest, SubmitSurveyResponse};
use crate::routes::AppState;

/// Configure questionnaire routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/questions", web::get().to(get_questions))
        .route("/survey/submit", web::post().to(submit_survey))
        .route("/schema/reload", web::post().to(reload_schema));
}

/// Active questionnaire endpoint
///
/// GET /api/v1/questions
///
/// Returns the full catalogue as `{id: {label, type, weight}}`, the shape
/// the questionnaire UI renders from.
async fn get_questions(state: web::Data<AppState>) -> impl Responder {
    let schema = state.schema.active().await;
    HttpResponse::Ok().json(&*schema)
}

/// Survey submission endpoint
///
/// POST /api/v1/survey/submit
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "answers": { "q_smoking": "No", "q_tidy": "Agree", ... }
/// }
/// ```
///
/// Every scored question must be answered; free-text ones are optional.
/// A resubmission replaces the previous answer set wholesale.
async fn submit_survey(
    state: web::Data<AppState>,
    req: web::Json<SubmitSurveyRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "invalid_request",
            errors.to_string(),
            400,
        ));
    }

    let schema = state.schema.active().await;

    let set = match normalize_submission(&schema, &req.answers, chrono::Utc::now()) {
        Ok(set) => set,
        Err(SubmitError::Incomplete(missing)) => {
            tracing::info!(
                "Rejected submission from {}: {} questions unanswered",
                req.user_id,
                missing.len()
            );
            return HttpResponse::BadRequest().json(
                ErrorResponse::new(
                    "incomplete_submission",
                    format!("{} required question(s) unanswered", missing.len()),
                    400,
                )
                .with_details(missing),
            );
        }
        Err(SubmitError::Invalid(err)) => {
            tracing::info!("Rejected submission from {}: {}", req.user_id, err);
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "invalid_answer",
                err.to_string(),
                400,
            ));
        }
    };

    if let Err(e) = state.storage.save_answer_set(&req.user_id, &set).await {
        tracing::error!("Failed to store answer set for {}: {}", req.user_id, e);
        return HttpResponse::InternalServerError().json(ErrorResponse::new(
            "storage_error",
            "failed to store submission",
            500,
        ));
    }

    // The ranking snapshot must pick this submission up promptly
    state.cache.invalidate().await;

    tracing::info!("Stored survey for {} ({} answers)", req.user_id, set.len());

    HttpResponse::Ok().json(SubmitSurveyResponse {
        ok: true,
        answered: set.len(),
    })
}

/// Questionnaire reload endpoint
///
/// POST /api/v1/schema/reload
///
/// Re-reads the configured questionnaire file and swaps it in atomically;
/// the previous catalogue stays active if the new one fails validation.
async fn reload_schema(state: web::Data<AppState>) -> impl Responder {
    match state.schema.reload().await {
        Ok(questions) => HttpResponse::Ok().json(ReloadResponse { questions }),
        Err(e) => {
            tracing::error!("Schema reload failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "schema_error",
                e.to_string(),
                500,
            ))
        }
    }
}
