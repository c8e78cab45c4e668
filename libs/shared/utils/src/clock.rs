// libs/shared/utils/src/clock.rs
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

/// Clock collaborator. Injected everywhere "now" matters so date-availability
/// checks and relative-date resolution stay deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The clinic's current calendar date (local wall clock).
    fn today(&self) -> NaiveDate;

    /// The clinic's current time of day (local wall clock).
    fn time_of_day(&self) -> NaiveTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Frozen clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl FixedClock {
    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.date.and_time(self.time), Utc)
    }

    fn today(&self) -> NaiveDate {
        self.date
    }

    fn time_of_day(&self) -> NaiveTime {
        self.time
    }
}
