pub mod classifier;
pub mod recency;

pub use classifier::{ActionLabel, Classification, NewsClassifier};
pub use recency::{is_recent, DEFAULT_WINDOW_HOURS};
