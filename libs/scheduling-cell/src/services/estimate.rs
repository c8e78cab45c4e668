// libs/scheduling-cell/src/services/estimate.rs
use chrono::Duration;

use shared_models::{Doctor, EstimatedTime};

/// Estimated service time for a 1-based queue position.
///
/// Position 1 maps exactly to the window start; each later position adds one
/// average consult. A missing window start degrades to `Unavailable` rather
/// than failing the booking. The sum deliberately runs past the window end
/// when the queue is long enough; `exceeds_window` reports that separately.
pub fn estimate_time(doctor: &Doctor, queue_position: u32) -> EstimatedTime {
    let Some(start) = doctor.availability_window.start else {
        return EstimatedTime::Unavailable;
    };

    let offset_minutes =
        queue_position.saturating_sub(1) as i64 * doctor.avg_consult_minutes as i64;
    EstimatedTime::At(start + Duration::minutes(offset_minutes))
}

/// Advisory check: would this position's estimate land at or past the
/// doctor's window end? False whenever either bound is missing.
pub fn exceeds_window(doctor: &Doctor, queue_position: u32) -> bool {
    match (estimate_time(doctor, queue_position), doctor.availability_window.end) {
        (EstimatedTime::At(estimate), Some(end)) => estimate >= end,
        _ => false,
    }
}
