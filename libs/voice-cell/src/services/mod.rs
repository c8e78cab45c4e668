pub mod matcher;
pub mod session;
