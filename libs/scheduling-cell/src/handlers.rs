// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{AppError, AvailabilityWindow, Doctor, Patient};

use crate::models::{
    BookAppointmentRequest, CompleteAppointmentRequest, RegisterDoctorRequest,
    RegisterPatientRequest, SchedulingError, UpdatePharmacyStatusRequest,
};
use crate::router::SchedulingState;

fn map_scheduling_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::DoctorUnavailable => {
            AppError::NotFound("Doctor not found or not accepting bookings".to_string())
        }
        SchedulingError::DateNotBookable => {
            AppError::BadRequest("The selected date/time has passed".to_string())
        }
        SchedulingError::DuplicateBooking => AppError::Conflict(
            "You already have an appointment with this doctor that day".to_string(),
        ),
        SchedulingError::CapacityExceeded => {
            AppError::Conflict("Doctor's schedule is full for that day".to_string())
        }
        SchedulingError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
    }
}

// ==============================================================================
// BOOKING & COMPLETION
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let confirmation = state
        .scheduling
        .attempt_booking(request.doctor_id, request.patient_id, request.date)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": confirmation,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if request.prescription.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Prescription text must not be empty".to_string(),
        ));
    }

    let result = state
        .queue
        .complete_appointment(appointment_id, request.prescription)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "completion": result,
        "message": "Prescription sent to pharmacist"
    })))
}

// ==============================================================================
// LISTINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<SchedulingState>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if state.store.get_patient(patient_id).await.is_none() {
        return Err(AppError::NotFound("Patient not found".to_string()));
    }

    let appointments = state.store.appointments_for_patient(patient_id).await;
    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn get_doctor_queue(
    State(state): State<Arc<SchedulingState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if state.store.get_doctor(doctor_id).await.is_none() {
        return Err(AppError::NotFound("Doctor not found".to_string()));
    }

    let pending = state.store.pending_for_doctor(doctor_id).await;
    Ok(Json(json!({ "pending": pending })))
}

#[axum::debug_handler]
pub async fn list_prescriptions(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<Value>, AppError> {
    let prescriptions = state.store.appointments_with_prescriptions().await;
    Ok(Json(json!({ "prescriptions": prescriptions })))
}

// ==============================================================================
// DIRECTORY ADMINISTRATION
// ==============================================================================

#[axum::debug_handler]
pub async fn register_doctor(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    if request.avg_consult_minutes == Some(0) {
        return Err(AppError::ValidationError(
            "Average consult minutes must be at least 1".to_string(),
        ));
    }
    if request.max_daily_patients == Some(0) {
        return Err(AppError::ValidationError(
            "Daily patient capacity must be at least 1".to_string(),
        ));
    }

    let availability_window = match (request.window_start, request.window_end) {
        (None, None) => match &request.available_time {
            Some(legacy) => AvailabilityWindow::parse_legacy(legacy),
            None => AvailabilityWindow { start: None, end: None },
        },
        (start, end) => AvailabilityWindow { start, end },
    };

    let doctor = Doctor {
        id: Uuid::new_v4(),
        first_name: request.first_name,
        last_name: request.last_name,
        specialty: request.specialty,
        availability_window,
        avg_consult_minutes: request.avg_consult_minutes.unwrap_or(15),
        max_daily_patients: request.max_daily_patients.unwrap_or(5),
        accepting_bookings: true,
        created_at: Utc::now(),
    };
    state.store.upsert_doctor(doctor.clone()).await;

    Ok(Json(json!({ "success": true, "doctor": doctor })))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<Value>, AppError> {
    let doctors = state.store.list_doctors().await;
    Ok(Json(json!({ "doctors": doctors })))
}

#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<Json<Value>, AppError> {
    let patient = Patient {
        id: Uuid::new_v4(),
        first_name: request.first_name,
        last_name: request.last_name,
        created_at: Utc::now(),
    };
    state.store.upsert_patient(patient.clone()).await;

    Ok(Json(json!({ "success": true, "patient": patient })))
}

// ==============================================================================
// PHARMACY HAND-OFF
// ==============================================================================

/// Advance the pharmacy lifecycle on a prescription-bearing appointment.
/// Deliberately bypasses the scheduling engine: pharmacy state is an
/// independent lifecycle and never triggers reindexing.
#[axum::debug_handler]
pub async fn update_pharmacy_status(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdatePharmacyStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let mut appointment = state
        .store
        .get_appointment(appointment_id)
        .await
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    if appointment.prescription.is_none() {
        return Err(AppError::BadRequest(
            "Appointment has no prescription to process".to_string(),
        ));
    }

    appointment.pharmacy_status = request.pharmacy_status;
    state.store.update_appointment(appointment.clone()).await;

    Ok(Json(json!({ "success": true, "appointment": appointment })))
}
