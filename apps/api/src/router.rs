use std::sync::Arc;

use axum::{routing::get, Router};

use scheduling_cell::router::{scheduling_routes, SchedulingState};
use shared_config::AppConfig;
use shared_store::ClinicStore;
use shared_utils::{Clock, SystemClock};
use voice_cell::router::{voice_routes, VoiceState};

pub fn create_router(config: &AppConfig) -> Router {
    let store = Arc::new(ClinicStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let scheduling_state = Arc::new(SchedulingState::new(Arc::clone(&store), Arc::clone(&clock)));
    let voice_state = Arc::new(VoiceState::new(config, Arc::clone(&store), clock));

    Router::new()
        .route("/", get(|| async { "Clinic queue API is running!" }))
        .nest("/appointments", scheduling_routes(scheduling_state))
        .nest("/voice", voice_routes(voice_state))
}
