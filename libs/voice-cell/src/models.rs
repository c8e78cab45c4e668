// libs/voice-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scheduling_cell::models::SchedulingError;
use shared_models::EstimatedTime;

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceCommandRequest {
    /// Raw recognized text from the speech collaborator.
    pub text: String,
}

/// One-shot interpretation request, no session involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretRequest {
    pub patient_id: Uuid,
    pub text: String,
}

/// Which relative-date rule fired during resolution. Surfaced so the voice
/// collaborator can say "booked for tomorrow" out loud when the command had
/// no recognizable temporal cue instead of silently defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRule {
    Today,
    Tomorrow,
    /// No temporal cue recognized; the next-day fail-safe applied.
    DefaultTomorrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub rule: DateRule,
}

/// Structured outcome of one interpreted command. Carries everything the
/// voice I/O collaborator needs to phrase spoken feedback; this cell never
/// produces natural-language text itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BookingOutcome {
    Booked {
        appointment_id: Uuid,
        doctor_id: Uuid,
        doctor_name: String,
        date: NaiveDate,
        date_rule: DateRule,
        queue_position: u32,
        estimated_time: EstimatedTime,
    },
    /// A stop phrase was heard; the session loop has terminated.
    SessionStopped,
    /// No doctor in the directory scored above the acceptance threshold.
    /// The caller should prompt for a retry, not terminate.
    DoctorNotFound,
    /// Doctor and date resolved, but the scheduling engine refused.
    BookingFailed {
        doctor_id: Uuid,
        doctor_name: String,
        date: NaiveDate,
        date_rule: DateRule,
        reason: SchedulingError,
    },
    /// Too many consecutive unmatched commands; the session gave up.
    RepromptLimitReached,
}

impl BookingOutcome {
    /// Whether the session loop should end after emitting this outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingOutcome::Booked { .. }
                | BookingOutcome::SessionStopped
                | BookingOutcome::RepromptLimitReached
        )
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("Voice session not found")]
    SessionNotFound,

    #[error("Voice session already ended")]
    SessionClosed,

    #[error("Patient not found")]
    PatientNotFound,
}
