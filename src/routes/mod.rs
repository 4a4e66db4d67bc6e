// Route exports
pub mod matches;
pub mod survey;

use actix_web::web;
use std::sync::Arc;

use crate::services::{MatchLedger, PopulationCache, SchemaRegistry, Storage};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub schema: Arc<SchemaRegistry>,
    pub ledger: Arc<MatchLedger>,
    pub cache: Arc<PopulationCache>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(survey::configure)
            .configure(matches::configure),
    );
}
