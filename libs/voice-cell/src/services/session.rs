// libs/voice-cell/src/services/session.rs
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use scheduling_cell::services::booking::SchedulingService;
use shared_config::{MatcherConfig, VoiceSessionConfig};
use shared_models::Doctor;
use shared_store::ClinicStore;
use shared_utils::Clock;

use crate::models::{BookingOutcome, VoiceError};
use crate::services::matcher::{self, DoctorMatcher};

/// Interprets one recognized command and, when it resolves, delegates to the
/// scheduling engine. Stateless between calls; all session state lives in
/// the session task.
pub struct VoiceBookingService {
    matcher: DoctorMatcher,
    scheduling: Arc<SchedulingService>,
    clock: Arc<dyn Clock>,
}

impl VoiceBookingService {
    pub fn new(
        matcher_config: MatcherConfig,
        scheduling: Arc<SchedulingService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            matcher: DoctorMatcher::new(matcher_config),
            scheduling,
            clock,
        }
    }

    /// normalize -> stop-phrase check -> doctor match -> date resolution ->
    /// booking attempt. Every exit is a structured outcome; the caller
    /// phrases the spoken response.
    pub async fn interpret_and_book(
        &self,
        raw_command: &str,
        patient_id: Uuid,
        candidates: &[Doctor],
    ) -> BookingOutcome {
        let command = raw_command.to_lowercase();
        debug!("Interpreting command: {:?}", command);

        if matcher::is_stop_phrase(&command) {
            return BookingOutcome::SessionStopped;
        }

        let Some(doctor) = self.matcher.match_doctor(&command, candidates) else {
            return BookingOutcome::DoctorNotFound;
        };

        let resolved = matcher::resolve_relative_date(&command, self.clock.today());

        // The partition lock is taken (and released) inside attempt_booking;
        // nothing here holds it while waiting on session input.
        match self
            .scheduling
            .attempt_booking(doctor.id, patient_id, resolved.date)
            .await
        {
            Ok(confirmation) => BookingOutcome::Booked {
                appointment_id: confirmation.appointment.id,
                doctor_id: doctor.id,
                doctor_name: confirmation.doctor_name,
                date: resolved.date,
                date_rule: resolved.rule,
                queue_position: confirmation.queue_position,
                estimated_time: confirmation.estimated_time,
            },
            Err(reason) => BookingOutcome::BookingFailed {
                doctor_id: doctor.id,
                doctor_name: doctor.full_name(),
                date: resolved.date,
                date_rule: resolved.rule,
                reason,
            },
        }
    }
}

struct SessionHandle {
    command_tx: mpsc::Sender<String>,
    outcome_rx: Arc<Mutex<mpsc::Receiver<BookingOutcome>>>,
    task: JoinHandle<()>,
}

/// One long-lived background task per active voice session.
///
/// Each task receives raw recognized text over a channel (the speech
/// collaborator's seam) and emits structured outcomes on a reply channel.
/// The task holds a snapshot of the data it needs (patient id, doctor
/// directory) taken at session start, never a live reference into shared
/// request state.
pub struct VoiceSessionManager {
    booking: Arc<VoiceBookingService>,
    store: Arc<ClinicStore>,
    config: VoiceSessionConfig,
    sessions: Mutex<HashMap<Uuid, SessionHandle>>,
}

impl VoiceSessionManager {
    pub fn new(
        booking: Arc<VoiceBookingService>,
        store: Arc<ClinicStore>,
        config: VoiceSessionConfig,
    ) -> Self {
        Self {
            booking,
            store,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a session for a patient and spawn its background loop.
    pub async fn start_session(&self, patient_id: Uuid) -> Result<Uuid, VoiceError> {
        if self.store.get_patient(patient_id).await.is_none() {
            return Err(VoiceError::PatientNotFound);
        }

        let session_id = Uuid::new_v4();
        let doctors = self.store.list_doctors().await;

        let (command_tx, command_rx) = mpsc::channel::<String>(16);
        let (outcome_tx, outcome_rx) = mpsc::channel::<BookingOutcome>(16);

        let booking = Arc::clone(&self.booking);
        let max_reprompts = self.config.max_reprompts;
        let task = tokio::spawn(async move {
            session_loop(booking, patient_id, doctors, command_rx, outcome_tx, max_reprompts)
                .await;
        });

        self.sessions.lock().await.insert(
            session_id,
            SessionHandle {
                command_tx,
                outcome_rx: Arc::new(Mutex::new(outcome_rx)),
                task,
            },
        );

        info!("Voice session {} started for patient {}", session_id, patient_id);
        Ok(session_id)
    }

    /// Feed one recognized command to a session and wait for its outcome.
    pub async fn submit_command(
        &self,
        session_id: Uuid,
        text: String,
    ) -> Result<BookingOutcome, VoiceError> {
        // Clone the channel ends out so the session map is never held across
        // an await; sessions stay independent of each other.
        let (command_tx, outcome_rx) = {
            let sessions = self.sessions.lock().await;
            let handle = sessions.get(&session_id).ok_or(VoiceError::SessionNotFound)?;
            (handle.command_tx.clone(), Arc::clone(&handle.outcome_rx))
        };

        command_tx
            .send(text)
            .await
            .map_err(|_| VoiceError::SessionClosed)?;

        let outcome = {
            let mut rx = outcome_rx.lock().await;
            rx.recv().await.ok_or(VoiceError::SessionClosed)?
        };

        if outcome.is_terminal() {
            self.remove_session(session_id).await;
        }
        Ok(outcome)
    }

    /// End a session immediately. The loop observes the closed channel and
    /// exits; no partial appointment state can exist because appointments
    /// are only ever created by a completed booking call.
    pub async fn stop_session(&self, session_id: Uuid) -> Result<(), VoiceError> {
        let handle = self
            .sessions
            .lock()
            .await
            .remove(&session_id)
            .ok_or(VoiceError::SessionNotFound)?;
        handle.task.abort();
        info!("Voice session {} stopped", session_id);
        Ok(())
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn remove_session(&self, session_id: Uuid) {
        if let Some(handle) = self.sessions.lock().await.remove(&session_id) {
            handle.task.abort();
            debug!("Voice session {} finished", session_id);
        }
    }
}

#[instrument(skip_all, fields(patient_id = %patient_id))]
async fn session_loop(
    booking: Arc<VoiceBookingService>,
    patient_id: Uuid,
    doctors: Vec<Doctor>,
    mut command_rx: mpsc::Receiver<String>,
    outcome_tx: mpsc::Sender<BookingOutcome>,
    max_reprompts: u32,
) {
    let mut failed_attempts = 0u32;

    while let Some(raw_command) = command_rx.recv().await {
        let mut outcome = booking
            .interpret_and_book(&raw_command, patient_id, &doctors)
            .await;

        match &outcome {
            BookingOutcome::DoctorNotFound | BookingOutcome::BookingFailed { .. } => {
                failed_attempts += 1;
                if failed_attempts >= max_reprompts {
                    warn!("Re-prompt limit ({}) reached, ending session", max_reprompts);
                    outcome = BookingOutcome::RepromptLimitReached;
                }
            }
            _ => {}
        }

        let terminal = outcome.is_terminal();
        if outcome_tx.send(outcome).await.is_err() {
            // Collaborator went away; nothing left to report to.
            break;
        }
        if terminal {
            break;
        }
    }

    debug!("Session loop ended");
}
