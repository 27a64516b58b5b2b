//! Report module - profile and segment output, JSON export

pub mod export;
pub mod profile_report;
pub mod segment_report;

pub use export::*;
pub use profile_report::*;
pub use segment_report::*;
