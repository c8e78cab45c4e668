pub mod booking;
pub mod estimate;
pub mod queue;
