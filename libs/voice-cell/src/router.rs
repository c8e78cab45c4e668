// libs/voice-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, post},
    Router,
};

use scheduling_cell::services::booking::SchedulingService;
use shared_config::AppConfig;
use shared_store::ClinicStore;
use shared_utils::Clock;

use crate::handlers;
use crate::services::session::{VoiceBookingService, VoiceSessionManager};

pub struct VoiceState {
    pub booking: Arc<VoiceBookingService>,
    pub sessions: VoiceSessionManager,
    pub store: Arc<ClinicStore>,
}

impl VoiceState {
    pub fn new(config: &AppConfig, store: Arc<ClinicStore>, clock: Arc<dyn Clock>) -> Self {
        let scheduling = Arc::new(SchedulingService::new(Arc::clone(&store), Arc::clone(&clock)));
        let booking = Arc::new(VoiceBookingService::new(
            config.matcher.clone(),
            scheduling,
            clock,
        ));
        let sessions = VoiceSessionManager::new(
            Arc::clone(&booking),
            Arc::clone(&store),
            config.voice_session.clone(),
        );
        Self {
            booking,
            sessions,
            store,
        }
    }
}

pub fn voice_routes(state: Arc<VoiceState>) -> Router {
    Router::new()
        .route("/interpret", post(handlers::interpret_command))
        .route("/sessions", post(handlers::start_session))
        .route("/sessions/{session_id}/commands", post(handlers::submit_command))
        .route("/sessions/{session_id}", delete(handlers::stop_session))
        .with_state(state)
}
