pub mod memory;

pub use memory::{ClinicStore, PartitionGuard};
