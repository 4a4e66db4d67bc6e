mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::routes::AppState;
use crate::services::{
    MatchLedger, MemoryStore, PopulationCache, PostgresStore, SchemaRegistry, Storage,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Roomeo matching service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Load the questionnaire schema (file if configured, built-in otherwise)
    let schema = match &settings.questionnaire.path {
        Some(path) => {
            let registry = SchemaRegistry::from_file(path).unwrap_or_else(|e| {
                error!("Failed to load questionnaire from {}: {}", path, e);
                panic!("Questionnaire error: {}", e);
            });
            info!("Questionnaire loaded from {}", path);
            Arc::new(registry)
        }
        None => {
            info!("No questionnaire file configured, using the built-in catalogue");
            Arc::new(SchemaRegistry::builtin())
        }
    };

    let question_count = schema.active().await.len();
    info!("Questionnaire active ({} questions)", question_count);

    // Initialize storage
    let storage: Arc<dyn Storage> = match &settings.database.url {
        Some(url) => {
            let store = PostgresStore::from_settings(
                url,
                settings.database.max_connections,
                settings.database.min_connections,
            )
            .await
            .unwrap_or_else(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                panic!("PostgreSQL connection error: {}", e);
            });
            info!("PostgreSQL storage initialized");
            Arc::new(store)
        }
        None => {
            warn!("No database.url configured; answers and matches will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Population snapshot cache for ranking
    let cache_ttl = settings.cache.population_ttl_secs;
    let cache = Arc::new(PopulationCache::new(cache_ttl));
    info!("Population cache initialized (TTL: {}s)", cache_ttl);

    let ledger = Arc::new(MatchLedger::new(storage.clone()));

    // Build application state
    let app_state = AppState {
        storage,
        schema,
        ledger,
        cache,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
