// libs/shared/utils/src/test_utils.rs
//
// Shared builders for cell test suites. Kept in the main tree (not behind
// cfg(test)) so downstream crates' tests/ directories can use them.

use chrono::{NaiveTime, Utc};
use uuid::Uuid;

use shared_models::{AvailabilityWindow, Doctor, Patient};

pub fn test_doctor(first_name: &str, last_name: &str) -> Doctor {
    Doctor {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        specialty: "General Practice".to_string(),
        availability_window: AvailabilityWindow::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        ),
        avg_consult_minutes: 15,
        max_daily_patients: 5,
        accepting_bookings: true,
        created_at: Utc::now(),
    }
}

pub fn test_doctor_with_window(
    first_name: &str,
    last_name: &str,
    window: AvailabilityWindow,
) -> Doctor {
    Doctor {
        availability_window: window,
        ..test_doctor(first_name, last_name)
    }
}

pub fn test_patient(first_name: &str, last_name: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        created_at: Utc::now(),
    }
}
