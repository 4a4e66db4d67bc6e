use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::rank_candidates;
use crate::models::{
    DecideRequest, Decision, ErrorResponse, HealthResponse, MatchEntry, MatchRecordView,
    MatchStatus, MatchesResponse,
};
use crate::routes::AppState;
use crate::services::LedgerError;

/// Configure match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/decide", web::post().to(decide_match))
        .route("/matches/{user_id}", web::get().to(get_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let storage_healthy = state.storage.health_check().await.unwrap_or(false);

    let status = if storage_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Ranked matches endpoint
///
/// GET /api/v1/matches/{user_id}
///
/// Scores the user against every other stored answer set and returns the
/// candidates best-first. Peers with no scorable overlap come last with a
/// null compatibility. Scoring also lazily creates (or refreshes) the
/// pair's match record, which is what later decisions act on.
async fn get_matches(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let user_id = path.into_inner();

    // The viewer's own answers are always read fresh, never from the
    // population snapshot
    let own = match state.storage.load_answer_set(&user_id).await {
        Ok(Some(set)) => set,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::new(
                "survey_not_completed",
                format!("user {} has not completed the survey", user_id),
                404,
            ));
        }
        Err(e) => {
            tracing::error!("Failed to load answers for {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "storage_error",
                "failed to load answer set",
                500,
            ));
        }
    };

    let population = match state.cache.population(state.storage.as_ref()).await {
        Ok(population) => population,
        Err(e) => {
            tracing::error!("Failed to load population for {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "storage_error",
                "failed to load candidate answer sets",
                500,
            ));
        }
    };

    let schema = state.schema.active().await;
    let ranked = rank_candidates(&user_id, &own, &population, &schema);

    let mut matches = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        // A defined score creates or refreshes the pair record; an undefined
        // one only looks up whatever record already exists
        let record = match candidate.compatibility {
            Some(score) => match state
                .ledger
                .record_score(&user_id, &candidate.peer_id, score)
                .await
            {
                Ok(record) => Some(record),
                Err(LedgerError::UnknownPair) => None,
                Err(e) => {
                    tracing::error!("Failed to record score for {}: {}", user_id, e);
                    return HttpResponse::InternalServerError().json(ErrorResponse::new(
                        "storage_error",
                        "failed to persist match record",
                        500,
                    ));
                }
            },
            None => match state.ledger.get(&user_id, &candidate.peer_id).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::error!("Failed to load match record for {}: {}", user_id, e);
                    return HttpResponse::InternalServerError().json(ErrorResponse::new(
                        "storage_error",
                        "failed to load match record",
                        500,
                    ));
                }
            },
        };

        let status = record
            .as_ref()
            .and_then(|r| r.status_of(&user_id))
            .unwrap_or(MatchStatus::Pending);
        let mutual = record.as_ref().map(|r| r.mutual()).unwrap_or(false);

        matches.push(MatchEntry {
            peer_id: candidate.peer_id,
            compatibility: candidate.compatibility,
            status,
            mutual,
        });
    }

    tracing::info!("Ranked {} candidates for {}", matches.len(), user_id);

    let total = matches.len();
    HttpResponse::Ok().json(MatchesResponse {
        user_id,
        matches,
        total,
    })
}

/// Decision endpoint
///
/// POST /api/v1/matches/decide
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "peerId": "string",
///   "decision": "accepted|denied"
/// }
/// ```
///
/// Only the caller's own half of the pair changes; the peer's standing
/// decision is untouchable from here.
async fn decide_match(state: web::Data<AppState>, req: web::Json<DecideRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "invalid_request",
            errors.to_string(),
            400,
        ));
    }

    let decision = match req.decision.to_lowercase().as_str() {
        "accepted" => Decision::Accepted,
        "denied" => Decision::Denied,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "invalid_decision",
                "Decision must be one of: accepted, denied",
                400,
            ));
        }
    };

    match state.ledger.decide(&req.user_id, &req.peer_id, decision).await {
        Ok(record) => HttpResponse::Ok().json(MatchRecordView::from(&record)),
        Err(LedgerError::UnknownPair) => HttpResponse::NotFound().json(ErrorResponse::new(
            "unknown_pair",
            "no match record for this pair; fetch matches first",
            404,
        )),
        Err(e) => {
            tracing::error!(
                "Failed to record decision {} -> {}: {}",
                req.user_id,
                req.peer_id,
                e
            );
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "storage_error",
                "failed to store decision",
                500,
            ))
        }
    }
}
