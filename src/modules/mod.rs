pub mod perception;
pub mod analysis;
pub mod memory;
pub mod reporting;
pub mod scheduler;
