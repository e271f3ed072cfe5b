pub mod app;
pub mod scanner;

pub use app::{AppContext, SchedulerLoop, TickOutcome};
pub use scanner::{NewsScanner, ScanSummary};
