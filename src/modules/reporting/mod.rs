pub mod alert;
pub mod digest;

pub use alert::Alert;
pub use digest::DigestReporter;
