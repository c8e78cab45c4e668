// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_store::ClinicStore;
use shared_utils::Clock;

use crate::handlers;
use crate::services::booking::SchedulingService;
use crate::services::queue::QueueService;

pub struct SchedulingState {
    pub scheduling: SchedulingService,
    pub queue: QueueService,
    pub store: Arc<ClinicStore>,
}

impl SchedulingState {
    pub fn new(store: Arc<ClinicStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scheduling: SchedulingService::new(Arc::clone(&store), clock),
            queue: QueueService::new(Arc::clone(&store)),
            store,
        }
    }
}

pub fn scheduling_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/pharmacy-status", patch(handlers::update_pharmacy_status))
        .route("/prescriptions", get(handlers::list_prescriptions))
        .route("/patients", post(handlers::register_patient))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/doctors", post(handlers::register_doctor))
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor_id}/queue", get(handlers::get_doctor_queue))
        .with_state(state)
}
