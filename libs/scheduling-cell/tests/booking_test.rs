// libs/scheduling-cell/tests/booking_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, NaiveTime};

use scheduling_cell::models::SchedulingError;
use scheduling_cell::services::booking::SchedulingService;
use shared_models::{AvailabilityWindow, Doctor, EstimatedTime, Patient};
use shared_store::ClinicStore;
use shared_utils::test_utils::{test_doctor, test_doctor_with_window, test_patient};
use shared_utils::{Clock, FixedClock};

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

struct TestSetup {
    store: Arc<ClinicStore>,
    scheduling: SchedulingService,
    today: NaiveDate,
}

impl TestSetup {
    fn clock_at(time: NaiveTime) -> FixedClock {
        FixedClock::at(NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(), time)
    }

    async fn new() -> Self {
        Self::with_clock(Self::clock_at(NaiveTime::from_hms_opt(10, 0, 0).unwrap())).await
    }

    async fn with_clock(clock: FixedClock) -> Self {
        let store = Arc::new(ClinicStore::new());
        let clock: Arc<dyn Clock> = Arc::new(clock);
        let scheduling = SchedulingService::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            scheduling,
            today: clock.today(),
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

    fn tomorrow(&self) -> NaiveDate {
        self.today + Duration::days(1)
    }
}

// ==============================================================================
// QUEUE POSITION AND ESTIMATES
// ==============================================================================

#[tokio::test]
async fn fourth_booking_gets_position_four_at_nine_forty_five() {
    let setup = TestSetup::new().await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;
    let date = setup.tomorrow();

    for _ in 0..3 {
        let patient = setup.add_patient().await;
        setup
            .scheduling
            .attempt_booking(doctor.id, patient.id, date)
            .await
            .expect("prior booking should succeed");
    }

    let patient = setup.add_patient().await;
    let confirmation = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, date)
        .await
        .expect("fourth booking should succeed");

    assert_eq!(confirmation.queue_position, 4);
    assert_eq!(confirmation.estimated_time.to_string(), "09:45 AM");
    assert!(!confirmation.estimate_past_window);
}

#[tokio::test]
async fn booking_succeeds_with_unavailable_estimate_when_start_missing() {
    let setup = TestSetup::new().await;
    let doctor = setup
        .add_doctor(test_doctor_with_window(
            "No",
            "Window",
            AvailabilityWindow { start: None, end: None },
        ))
        .await;
    let patient = setup.add_patient().await;

    let confirmation = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.tomorrow())
        .await
        .expect("scheduling must degrade gracefully, not block");

    assert_eq!(confirmation.estimated_time, EstimatedTime::Unavailable);
    assert_eq!(confirmation.estimated_time.to_string(), "N/A");
}

// ==============================================================================
// VALIDATION CHAIN
// ==============================================================================

#[tokio::test]
async fn unknown_doctor_is_unavailable() {
    let setup = TestSetup::new().await;
    let patient = setup.add_patient().await;

    let result = setup
        .scheduling
        .attempt_booking(uuid::Uuid::new_v4(), patient.id, setup.tomorrow())
        .await;
    assert_matches!(result, Err(SchedulingError::DoctorUnavailable));
}

#[tokio::test]
async fn doctor_not_accepting_bookings_is_unavailable() {
    let setup = TestSetup::new().await;
    let mut doctor = test_doctor("Jane", "Smith");
    doctor.accepting_bookings = false;
    let doctor = setup.add_doctor(doctor).await;
    let patient = setup.add_patient().await;

    let result = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.tomorrow())
        .await;
    assert_matches!(result, Err(SchedulingError::DoctorUnavailable));
}

#[tokio::test]
async fn unknown_patient_is_rejected() {
    let setup = TestSetup::new().await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;

    let result = setup
        .scheduling
        .attempt_booking(doctor.id, uuid::Uuid::new_v4(), setup.tomorrow())
        .await;
    assert_matches!(result, Err(SchedulingError::PatientNotFound));
}

#[tokio::test]
async fn duplicate_booking_is_rejected_and_creates_nothing() {
    let setup = TestSetup::new().await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;
    let patient = setup.add_patient().await;
    let date = setup.tomorrow();

    setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, date)
        .await
        .expect("first booking should succeed");

    let result = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, date)
        .await;
    assert_matches!(result, Err(SchedulingError::DuplicateBooking));
    assert_eq!(setup.store.pending_partition(doctor.id, date).await.len(), 1);
}

#[tokio::test]
async fn capacity_exceeded_at_max_daily_patients() {
    let setup = TestSetup::new().await;
    let mut doctor = test_doctor("Jane", "Smith");
    doctor.max_daily_patients = 2;
    let doctor = setup.add_doctor(doctor).await;
    let date = setup.tomorrow();

    for _ in 0..2 {
        let patient = setup.add_patient().await;
        setup
            .scheduling
            .attempt_booking(doctor.id, patient.id, date)
            .await
            .expect("booking below capacity should succeed");
    }

    let patient = setup.add_patient().await;
    let result = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, date)
        .await;
    assert_matches!(result, Err(SchedulingError::CapacityExceeded));
}

// ==============================================================================
// DATE AVAILABILITY
// ==============================================================================

#[tokio::test]
async fn past_dates_are_never_bookable() {
    let setup = TestSetup::new().await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;
    let patient = setup.add_patient().await;

    let result = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.today - Duration::days(1))
        .await;
    assert_matches!(result, Err(SchedulingError::DateNotBookable));
}

#[tokio::test]
async fn same_day_is_bookable_until_window_end() {
    // One minute before the 17:00 window end.
    let setup =
        TestSetup::with_clock(TestSetup::clock_at(NaiveTime::from_hms_opt(16, 59, 0).unwrap()))
            .await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;
    let patient = setup.add_patient().await;

    let result = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.today)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn same_day_closes_exactly_at_window_end() {
    let setup =
        TestSetup::with_clock(TestSetup::clock_at(NaiveTime::from_hms_opt(17, 0, 0).unwrap()))
            .await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;
    let patient = setup.add_patient().await;

    let result = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.today)
        .await;
    assert_matches!(result, Err(SchedulingError::DateNotBookable));
}

#[tokio::test]
async fn same_day_fails_open_when_window_end_missing() {
    let setup =
        TestSetup::with_clock(TestSetup::clock_at(NaiveTime::from_hms_opt(23, 30, 0).unwrap()))
            .await;
    let doctor = setup
        .add_doctor(test_doctor_with_window(
            "Jane",
            "Smith",
            AvailabilityWindow {
                start: NaiveTime::from_hms_opt(9, 0, 0),
                end: None,
            },
        ))
        .await;
    let patient = setup.add_patient().await;

    let result = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.today)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn future_dates_bookable_even_after_hours() {
    let setup =
        TestSetup::with_clock(TestSetup::clock_at(NaiveTime::from_hms_opt(22, 0, 0).unwrap()))
            .await;
    let doctor = setup.add_doctor(test_doctor("Jane", "Smith")).await;
    let patient = setup.add_patient().await;

    let result = setup
        .scheduling
        .attempt_booking(doctor.id, patient.id, setup.tomorrow())
        .await;
    assert!(result.is_ok());
}
