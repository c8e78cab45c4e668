// libs/scheduling-cell/src/services/queue.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::{Appointment, AppointmentStatus, EstimatedTime};
use shared_store::ClinicStore;

use crate::models::{CompletionResult, SchedulingError};
use crate::services::estimate;

/// Completion handling and queue compaction.
pub struct QueueService {
    store: Arc<ClinicStore>,
}

impl QueueService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Mark an appointment Completed, attach the prescription, and compact
    /// the remaining queue for its partition.
    ///
    /// Completing a missing or already-Completed appointment returns
    /// `NotFound`; the already-Completed case must never renumber twice.
    pub async fn complete_appointment(
        &self,
        appointment_id: Uuid,
        prescription: String,
    ) -> Result<CompletionResult, SchedulingError> {
        let existing = self
            .store
            .get_appointment(appointment_id)
            .await
            .ok_or(SchedulingError::NotFound)?;

        let _guard = self
            .store
            .lock_partition(existing.doctor_id, existing.date)
            .await;

        // Re-read under the guard: a concurrent completion may have won.
        let mut appointment = self
            .store
            .get_appointment(appointment_id)
            .await
            .ok_or(SchedulingError::NotFound)?;
        if appointment.status == AppointmentStatus::Completed {
            return Err(SchedulingError::NotFound);
        }

        appointment.status = AppointmentStatus::Completed;
        appointment.prescription = Some(prescription);
        self.store.update_appointment(appointment.clone()).await;

        info!(
            "Appointment {} completed; reindexing doctor {} on {}",
            appointment.id, appointment.doctor_id, appointment.date
        );

        let reindexed = self
            .reindex_partition(appointment.doctor_id, appointment.date)
            .await;

        Ok(CompletionResult {
            completed: appointment,
            reindexed,
        })
    }

    /// Reassign queue positions 1..N (creation order) and recompute every
    /// estimate for one partition. Caller must hold the partition guard.
    pub async fn reindex_partition(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Appointment> {
        let doctor = self.store.get_doctor(doctor_id).await;
        let pending = self.store.pending_partition(doctor_id, date).await;

        debug!("Reindexing {} pending appointments for doctor {} on {}", pending.len(), doctor_id, date);

        let mut reindexed = Vec::with_capacity(pending.len());
        for (index, mut appointment) in pending.into_iter().enumerate() {
            appointment.queue_position = index as u32 + 1;
            appointment.estimated_time = match &doctor {
                Some(d) => estimate::estimate_time(d, appointment.queue_position),
                None => EstimatedTime::Unavailable,
            };
            self.store.update_appointment(appointment.clone()).await;
            reindexed.push(appointment);
        }

        reindexed
    }
}
