// libs/scheduling-cell/tests/queue_invariant_test.rs
use std::collections::HashSet;
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use scheduling_cell::models::SchedulingError;
use scheduling_cell::services::booking::SchedulingService;
use scheduling_cell::services::queue::QueueService;
use shared_models::{AppointmentStatus, Doctor, Patient};
use shared_store::ClinicStore;
use shared_utils::test_utils::{test_doctor, test_patient};
use shared_utils::{Clock, FixedClock};

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

struct TestSetup {
    store: Arc<ClinicStore>,
    scheduling: SchedulingService,
    queue: QueueService,
    date: NaiveDate,
}

impl TestSetup {
    async fn new() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(
            NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        ));
        let store = Arc::new(ClinicStore::new());
        let scheduling = SchedulingService::new(Arc::clone(&store), Arc::clone(&clock));
        let queue = QueueService::new(Arc::clone(&store));
        let date = clock.today() + Duration::days(1);
        Self {
            store,
            scheduling,
            queue,
            date,
        }
    }

    async fn add_doctor(&self, doctor: Doctor) -> Doctor {
        self.store.upsert_doctor(doctor.clone()).await;
        doctor
    }

    async fn add_patient(&self) -> Patient {
        let patient = test_patient("Pat", "Example");
        self.store.upsert_patient(patient.clone()).await;
        patient
    }

    /// Positions of the pending partition must always be exactly 1..=N.
    async fn assert_contiguous_positions(&self, doctor_id: Uuid) {
        let pending = self.store.pending_partition(doctor_id, self.date).await;
        let mut positions: Vec<u32> = pending.iter().map(|a| a.queue_position).collect();
        positions.sort_unstable();
        let expected: Vec<u32> = (1..=pending.len() as u32).collect();
        assert_eq!(positions, expected, "queue positions must stay contiguous");
    }

    /// No patient may hold two pending slots with the same doctor and date.
    async fn assert_no_duplicate_patients(&self, doctor_id: Uuid) {
        let pending = self.store.pending_partition(doctor_id, self.date).await;
        let patients: HashSet<Uuid> = pending.iter().map(|a| a.patient_id).collect();
        assert_eq!(patients.len(), pending.len(), "one pending slot per patient");
    }
}

// ==============================================================================
// COMPLETION AND REINDEXING
// ==============================================================================

#[tokio::test]
async fn completion_compacts_positions_and_recomputes_estimates() {
    let setup = TestSetup::new().await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;

    let mut booked = Vec::new();
    for _ in 0..3 {
        let patient = setup.add_patient().await;
        let confirmation = setup
            .scheduling
            .attempt_booking(doctor.id, patient.id, setup.date)
            .await
            .expect("booking should succeed");
        booked.push(confirmation.appointment);
    }

    let result = setup
        .queue
        .complete_appointment(booked[1].id, "rest and fluids".into())
        .await
        .expect("completion should succeed");

    assert_eq!(result.completed.status, AppointmentStatus::Completed);
    assert_eq!(result.completed.prescription.as_deref(), Some("rest and fluids"));
    assert_eq!(result.reindexed.len(), 2);

    let pending = setup.store.pending_partition(doctor.id, setup.date).await;
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|a| a.id != booked[1].id));
    assert_eq!(pending[0].queue_position, 1);
    assert_eq!(pending[1].queue_position, 2);
    // Estimates follow the compacted positions, not the original ones.
    assert_eq!(pending[0].estimated_time.to_string(), "09:00 AM");
    assert_eq!(pending[1].estimated_time.to_string(), "09:15 AM");
}

#[tokio::test]
async fn completing_twice_returns_not_found() {
    let setup = TestSetup::new().await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;
    let patient = setup.add_patient().await;
    let confirmation = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.date)
        .await
        .expect("booking should succeed");

    setup
        .queue
        .complete_appointment(confirmation.appointment.id, "rx-1".into())
        .await
        .expect("first completion should succeed");

    let second = setup
        .queue
        .complete_appointment(confirmation.appointment.id, "rx-2".into())
        .await;
    assert_matches!(second, Err(SchedulingError::NotFound));

    // The first prescription must survive the rejected retry.
    let stored = setup
        .store
        .get_appointment(confirmation.appointment.id)
        .await
        .expect("appointment should still exist");
    assert_eq!(stored.prescription.as_deref(), Some("rx-1"));
}

#[tokio::test]
async fn completing_unknown_appointment_returns_not_found() {
    let setup = TestSetup::new().await;
    let result = setup
        .queue
        .complete_appointment(Uuid::new_v4(), "rx".into())
        .await;
    assert_matches!(result, Err(SchedulingError::NotFound));
}

#[tokio::test]
async fn completion_leaves_other_partitions_untouched() {
    let setup = TestSetup::new().await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;
    let other_doctor = setup.add_doctor(test_doctor("Alice", "Jones")).await;

    let patient = setup.add_patient().await;
    setup
        .scheduling
        .attempt_booking(other_doctor.id, patient.id, setup.date)
        .await
        .expect("booking should succeed");

    let patient = setup.add_patient().await;
    let confirmation = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.date)
        .await
        .expect("booking should succeed");

    setup
        .queue
        .complete_appointment(confirmation.appointment.id, "rx".into())
        .await
        .expect("completion should succeed");

    let other_pending = setup.store.pending_partition(other_doctor.id, setup.date).await;
    assert_eq!(other_pending.len(), 1);
    assert_eq!(other_pending[0].queue_position, 1);
}

// ==============================================================================
// RANDOMIZED INTERLEAVING
// ==============================================================================

// Seeded churn of bookings and completions against one partition. The
// contiguity and one-slot-per-patient invariants must hold after every
// single operation, not just at the end.
#[tokio::test]
async fn random_book_complete_interleaving_keeps_invariants() {
    let setup = TestSetup::new().await;
    let mut doctor = test_doctor("Jane", "Smith");
    doctor.max_daily_patients = 100;
    let doctor = setup.add_doctor(doctor).await;

    let mut patients = Vec::new();
    for _ in 0..10 {
        patients.push(setup.add_patient().await);
    }

    let mut rng = StdRng::seed_from_u64(0x5eed_c11c);
    let mut completions = 0u32;

    for _ in 0..200 {
        if rng.gen_bool(0.6) {
            let patient = &patients[rng.gen_range(0..patients.len())];
            match setup
                .scheduling
                .attempt_booking(doctor.id, patient.id, setup.date)
                .await
            {
                Ok(_) | Err(SchedulingError::DuplicateBooking) => {}
                Err(other) => panic!("unexpected booking failure: {other:?}"),
            }
        } else {
            let pending = setup.store.pending_partition(doctor.id, setup.date).await;
            if !pending.is_empty() {
                let victim = &pending[rng.gen_range(0..pending.len())];
                setup
                    .queue
                    .complete_appointment(victim.id, "rx".into())
                    .await
                    .expect("completing a pending appointment should succeed");
                completions += 1;
            }
        }

        setup.assert_contiguous_positions(doctor.id).await;
        setup.assert_no_duplicate_patients(doctor.id).await;
    }

    assert!(completions > 0, "seed must exercise the completion path");
}
