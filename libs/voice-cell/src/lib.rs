pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::{voice_routes, VoiceState};
pub use services::matcher::DoctorMatcher;
pub use services::session::{VoiceBookingService, VoiceSessionManager};
