// libs/scheduling-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::{Appointment, EstimatedTime};

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
}

/// Result of a successful booking attempt. Carries everything a surface
/// (visual or spoken) needs to phrase confirmation without further lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub appointment: Appointment,
    pub doctor_name: String,
    pub queue_position: u32,
    pub estimated_time: EstimatedTime,
    /// Advisory flag: the estimate lands at or past the doctor's window end.
    /// Never blocks the booking; the position arithmetic is authoritative.
    pub estimate_past_window: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub prescription: String,
}

/// Partition state after a completion: the completed record plus every
/// Pending appointment with its reassigned position and estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResult {
    pub completed: Appointment,
    pub reindexed: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDoctorRequest {
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    /// Structured window; `available_time` below is the legacy fallback.
    pub window_start: Option<chrono::NaiveTime>,
    pub window_end: Option<chrono::NaiveTime>,
    /// Legacy `"09:00–17:00"` string, accepted for interop with old records.
    pub available_time: Option<String>,
    pub avg_consult_minutes: Option<u32>,
    pub max_daily_patients: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPatientRequest {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePharmacyStatusRequest {
    pub pharmacy_status: shared_models::PharmacyStatus,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingError {
    #[error("Doctor not found or not accepting bookings")]
    DoctorUnavailable,

    #[error("The requested date cannot be booked")]
    DateNotBookable,

    #[error("Patient already has an appointment with this doctor on this date")]
    DuplicateBooking,

    #[error("Doctor's schedule is full for that day")]
    CapacityExceeded,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Appointment not found")]
    NotFound,
}
