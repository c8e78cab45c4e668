// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::{Appointment, AppointmentStatus, Doctor, PharmacyStatus};
use shared_store::ClinicStore;
use shared_utils::Clock;

use crate::models::{BookingConfirmation, SchedulingError};
use crate::services::estimate;

/// Queue-position assignment and booking validation for one clinic.
///
/// All checks run in a fixed order and short-circuit on the first failure;
/// the count-then-insert sequence runs under the store's partition guard so
/// two bookings for the same doctor and date can never race.
pub struct SchedulingService {
    store: Arc<ClinicStore>,
    clock: Arc<dyn Clock>,
}

impl SchedulingService {
    pub fn new(store: Arc<ClinicStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Whether a date can still accept bookings for this doctor.
    ///
    /// Past dates never can. Today can until the doctor's window end has
    /// passed; a missing end fails open so a misconfigured doctor still
    /// receives bookings. Future dates always can (daily load is the
    /// capacity check's job, not this one's).
    pub fn is_bookable(&self, doctor: &Doctor, requested_date: NaiveDate) -> bool {
        let today = self.clock.today();

        if requested_date < today {
            return false;
        }

        if requested_date == today {
            return match doctor.availability_window.end {
                Some(end) => self.clock.time_of_day() < end,
                None => true,
            };
        }

        true
    }

    /// Attempt to book `patient_id` with `doctor_id` on `date`.
    pub async fn attempt_booking(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        date: NaiveDate,
    ) -> Result<BookingConfirmation, SchedulingError> {
        debug!("Booking attempt: patient {} with doctor {} on {}", patient_id, doctor_id, date);

        // Step 1: doctor must exist and be accepting bookings.
        let doctor = self
            .store
            .get_doctor(doctor_id)
            .await
            .ok_or(SchedulingError::DoctorUnavailable)?;
        if !doctor.accepting_bookings {
            warn!("Doctor {} is not accepting bookings", doctor_id);
            return Err(SchedulingError::DoctorUnavailable);
        }

        // Step 2: the date must still be bookable right now.
        if !self.is_bookable(&doctor, date) {
            return Err(SchedulingError::DateNotBookable);
        }

        let patient = self
            .store
            .get_patient(patient_id)
            .await
            .ok_or(SchedulingError::PatientNotFound)?;

        // Steps 3-4 read the partition and then insert, so they hold the
        // partition guard for the whole sequence.
        let _guard = self.store.lock_partition(doctor.id, date).await;

        // Step 3: one appointment per patient per doctor per date.
        if self
            .store
            .has_pending_booking(patient.id, doctor.id, date)
            .await
        {
            return Err(SchedulingError::DuplicateBooking);
        }

        // Step 4: daily capacity.
        let pending_count = self.store.pending_partition(doctor.id, date).await.len() as u32;
        if pending_count >= doctor.max_daily_patients {
            info!("Doctor {} is at capacity ({}) for {}", doctor.id, doctor.max_daily_patients, date);
            return Err(SchedulingError::CapacityExceeded);
        }

        let queue_position = pending_count + 1;
        let estimated_time = estimate::estimate_time(&doctor, queue_position);

        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            patient_id: patient.id,
            date,
            queue_position,
            estimated_time,
            status: AppointmentStatus::Pending,
            prescription: None,
            pharmacy_status: PharmacyStatus::NotProcessed,
            created_at: self.clock.now(),
        };
        self.store.insert_appointment(appointment.clone()).await;

        info!(
            "Appointment {} booked: doctor {}, {} at position {} ({})",
            appointment.id, doctor.id, date, queue_position, estimated_time
        );

        Ok(BookingConfirmation {
            doctor_name: doctor.full_name(),
            queue_position,
            estimated_time,
            estimate_past_window: estimate::exceeds_window(&doctor, queue_position),
            appointment,
        })
    }
}
