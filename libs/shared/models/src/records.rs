// libs/shared/models/src/records.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A doctor's daily working window, half-open `[start, end)`.
///
/// Either bound may be absent when the clinic never configured it or the
/// legacy string could not be parsed; consumers fail soft on `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl AvailabilityWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Compatibility adapter for the legacy `"09:00–17:00"` column format.
    ///
    /// The historical data uses an en-dash delimiter; hand-edited rows use an
    /// ASCII hyphen. Each half parses independently, so a malformed start
    /// still yields a usable end (and vice versa).
    pub fn parse_legacy(raw: &str) -> Self {
        let mut parts = raw.splitn(2, ['\u{2013}', '-']);
        let start = parts
            .next()
            .and_then(|s| NaiveTime::parse_from_str(s.trim(), "%H:%M").ok());
        let end = parts
            .next()
            .and_then(|s| NaiveTime::parse_from_str(s.trim(), "%H:%M").ok());
        Self { start, end }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub availability_window: AvailabilityWindow,
    pub avg_consult_minutes: u32,
    pub max_daily_patients: u32,
    pub accepting_bookings: bool,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Pharmacy processing state. Owned by the pharmacy surface; the scheduling
/// engine never reads or writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PharmacyStatus {
    NotProcessed,
    Processing,
    Ready,
    Collected,
}

impl fmt::Display for PharmacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PharmacyStatus::NotProcessed => write!(f, "not_processed"),
            PharmacyStatus::Processing => write!(f, "processing"),
            PharmacyStatus::Ready => write!(f, "ready"),
            PharmacyStatus::Collected => write!(f, "collected"),
        }
    }
}

/// Estimated service time for a queue position.
///
/// `Unavailable` stands in wherever the doctor's window start is missing;
/// scheduling proceeds and the surface shows "N/A" instead of blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatedTime {
    At(NaiveTime),
    Unavailable,
}

impl fmt::Display for EstimatedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatedTime::At(t) => write!(f, "{}", t.format("%I:%M %p")),
            EstimatedTime::Unavailable => write!(f, "N/A"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    /// 1-based rank within the (doctor, date, Pending) partition.
    pub queue_position: u32,
    pub estimated_time: EstimatedTime,
    pub status: AppointmentStatus,
    pub prescription: Option<String>,
    pub pharmacy_status: PharmacyStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_pending(&self) -> bool {
        self.status == AppointmentStatus::Pending
    }
}
