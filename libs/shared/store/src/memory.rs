// libs/shared/store/src/memory.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;
use uuid::Uuid;

use shared_models::{Appointment, Doctor, Patient};

/// Guard serializing all read-then-write access to one (doctor, date)
/// partition. Booking and completion hold it for the whole count-then-insert
/// or complete-then-reindex sequence; different partitions never contend.
pub type PartitionGuard = OwnedMutexGuard<()>;

type PartitionKey = (Uuid, NaiveDate);

/// In-memory storage collaborator.
///
/// Owns the doctor directory, patient registry, and appointment records, and
/// hands out per-partition guards. The scheduling engine never touches the
/// maps directly; everything flows through these lookups so a persistent
/// backend can replace this crate without touching the cells.
#[derive(Default)]
pub struct ClinicStore {
    doctors: RwLock<HashMap<Uuid, Doctor>>,
    patients: RwLock<HashMap<Uuid, Patient>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    partition_locks: Mutex<HashMap<PartitionKey, Arc<Mutex<()>>>>,
}

impl ClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the serialization guard for one (doctor, date) partition.
    pub async fn lock_partition(&self, doctor_id: Uuid, date: NaiveDate) -> PartitionGuard {
        let lock = {
            let mut locks = self.partition_locks.lock().await;
            Arc::clone(
                locks
                    .entry((doctor_id, date))
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        debug!("Acquiring partition lock for doctor {} on {}", doctor_id, date);
        lock.lock_owned().await
    }

    // ------------------------------------------------------------------
    // Doctors
    // ------------------------------------------------------------------

    pub async fn upsert_doctor(&self, doctor: Doctor) {
        self.doctors.write().await.insert(doctor.id, doctor);
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Option<Doctor> {
        self.doctors.read().await.get(&doctor_id).cloned()
    }

    /// Doctor directory snapshot, stable across calls (sorted by creation
    /// time, then id). Candidate order is observable: the command matcher's
    /// tie-break picks the first candidate in this order.
    pub async fn list_doctors(&self) -> Vec<Doctor> {
        let mut doctors: Vec<Doctor> = self.doctors.read().await.values().cloned().collect();
        doctors.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        doctors
    }

    // ------------------------------------------------------------------
    // Patients
    // ------------------------------------------------------------------

    pub async fn upsert_patient(&self, patient: Patient) {
        self.patients.write().await.insert(patient.id, patient);
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Option<Patient> {
        self.patients.read().await.get(&patient_id).cloned()
    }

    // ------------------------------------------------------------------
    // Appointments
    // ------------------------------------------------------------------

    pub async fn insert_appointment(&self, appointment: Appointment) {
        debug!(
            "Persisting appointment {} (doctor {}, position {})",
            appointment.id, appointment.doctor_id, appointment.queue_position
        );
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment);
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Option<Appointment> {
        self.appointments.read().await.get(&appointment_id).cloned()
    }

    pub async fn update_appointment(&self, appointment: Appointment) {
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment);
    }

    /// Pending appointments for one partition, in creation order.
    ///
    /// Creation order (not prior queue position) is the reindexing key, so
    /// FIFO fairness survives any amount of renumbering.
    pub async fn pending_partition(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Appointment> {
        let mut pending: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.date == date && a.is_pending())
            .cloned()
            .collect();
        pending.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        pending
    }

    pub async fn has_pending_booking(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> bool {
        self.appointments.read().await.values().any(|a| {
            a.patient_id == patient_id && a.doctor_id == doctor_id && a.date == date && a.is_pending()
        })
    }

    /// All of a patient's appointments, newest date first.
    pub async fn appointments_for_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        let mut list: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        list
    }

    /// A doctor's pending queue across all dates, by date then position.
    pub async fn pending_for_doctor(&self, doctor_id: Uuid) -> Vec<Appointment> {
        let mut list: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.is_pending())
            .cloned()
            .collect();
        list.sort_by(|a, b| (a.date, a.queue_position).cmp(&(b.date, b.queue_position)));
        list
    }

    /// Appointments carrying a prescription, newest date first. Pharmacy view.
    pub async fn appointments_with_prescriptions(&self) -> Vec<Appointment> {
        let mut list: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.prescription.is_some())
            .cloned()
            .collect();
        list.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        list
    }
}
